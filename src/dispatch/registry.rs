//! Handler registry
//!
//! Maps normalized paths to handlers. Built once at startup and only read
//! afterwards; lookups that miss return the not-found fallback.

use std::collections::HashMap;

use super::handler::Handler;
use super::request::normalize_path;
use crate::config::RoutesConfig;

/// Normalized path of the built-in sample route
pub const SAMPLE_PATH: &str = "sample";

#[derive(Debug, Clone)]
pub struct HandlerRegistry {
    routes: HashMap<String, Handler>,
    fallback: Handler,
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl HandlerRegistry {
    /// Empty registry: every path resolves to the not-found handler
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
            fallback: Handler::NotFound,
        }
    }

    /// Registry with the built-in `sample` route
    pub fn with_defaults() -> Self {
        Self::new().with_route(SAMPLE_PATH, Handler::Sample)
    }

    /// Built-in routes (unless disabled) followed by the configured ones.
    /// A configured route replaces a built-in one with the same path.
    pub fn from_config(routes: &RoutesConfig) -> Self {
        let base = if routes.builtin_sample {
            Self::with_defaults()
        } else {
            Self::new()
        };

        routes.custom.iter().fold(base, |registry, route| {
            registry.with_route(&route.path, Handler::from(&route.handler))
        })
    }

    /// Add a route. The key is normalized, so `/a/` and `a` are the same route.
    #[must_use]
    pub fn with_route(mut self, path: &str, handler: Handler) -> Self {
        self.routes
            .insert(normalize_path(path).to_string(), handler);
        self
    }

    /// Handler for a normalized path, or the not-found fallback
    pub fn resolve(&self, path: &str) -> &Handler {
        self.routes.get(path).unwrap_or(&self.fallback)
    }

    /// Registered paths, sorted
    pub fn paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self.routes.keys().map(String::as_str).collect();
        paths.sort_unstable();
        paths
    }
}
