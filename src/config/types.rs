// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;
use serde_json::Value;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
    #[serde(default)]
    pub routes: RoutesConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Listen backlog passed to `listen(2)`
    pub backlog: i32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Lowest level written: `info`, `warn` or `error`
    pub level: String,
    pub access_log: bool,
    /// `combined`, `common`, `json`, or a custom `$variable` pattern
    pub access_log_format: String,
    #[serde(default)]
    pub access_log_file: Option<String>,
    #[serde(default)]
    pub error_log_file: Option<String>,
    pub show_headers: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    /// Seconds an idle connection may wait for its next request head; `0` disables keep-alive
    pub keep_alive_timeout: u64,
    /// Seconds allowed for reading one request body; `0` means unbounded
    pub read_timeout: u64,
    #[serde(default)]
    pub max_connections: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    #[serde(default)]
    pub mode: ResponseMode,
    /// Body written for every request in `echo-text` mode
    pub greeting: String,
    pub server_name: String,
}

/// How the server answers requests
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ResponseMode {
    /// Fixed plain-text greeting for every request
    EchoText,
    /// Dispatch through the handler registry and answer with JSON
    #[default]
    JsonRouted,
}

/// Routes configuration
#[derive(Debug, Deserialize, Clone)]
pub struct RoutesConfig {
    /// Register the built-in `sample` route
    pub builtin_sample: bool,
    /// Extra routes, applied on top of the built-in ones
    #[serde(default)]
    pub custom: Vec<CustomRoute>,
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            builtin_sample: true,
            custom: Vec::new(),
        }
    }
}

/// A route declared in the configuration file
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CustomRoute {
    /// Request path; normalized before registration
    pub path: String,
    pub handler: RouteHandler,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RouteHandler {
    /// Canned reply. Values are kept raw so they go through the usual coercion.
    Fixed {
        #[serde(default)]
        status: Option<Value>,
        #[serde(default)]
        body: Option<Value>,
    },
    /// Reflect the request metadata back as JSON
    Echo,
    /// Same result as an unregistered path
    NotFound,
}
