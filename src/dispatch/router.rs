//! Request dispatch module
//!
//! Entry point for HTTP request processing: builds the request descriptor,
//! picks a handler from the registry and turns its reply into a response.

use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::{Request, Response, StatusCode};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::registry::HandlerRegistry;
use super::request::{read_body, BodyTimeout, RequestDescriptor};
use crate::config::{AppState, Config, ResponseMode};
use crate::http;
use crate::logger::{self, AccessLogEntry};

/// Answers requests according to the configured mode.
///
/// The registry is handed over at construction and never changes; the
/// dispatcher can be shared freely between connections.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    mode: ResponseMode,
    greeting: String,
    server_name: String,
    registry: HandlerRegistry,
    body_timeout: Option<Duration>,
}

impl Dispatcher {
    pub fn new(
        mode: ResponseMode,
        greeting: impl Into<String>,
        server_name: impl Into<String>,
        registry: HandlerRegistry,
    ) -> Self {
        Self {
            mode,
            greeting: greeting.into(),
            server_name: server_name.into(),
            registry,
            body_timeout: None,
        }
    }

    /// Give up on requests whose body takes longer than `limit`
    #[must_use]
    pub fn with_body_timeout(mut self, limit: Option<Duration>) -> Self {
        self.body_timeout = limit;
        self
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.http.mode,
            config.http.greeting.clone(),
            config.http.server_name.clone(),
            HandlerRegistry::from_config(&config.routes),
        )
        .with_body_timeout(config.body_timeout())
    }

    pub const fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Produce exactly one response for a request.
    ///
    /// The only failure is a body that outlives the body timeout; no
    /// response is produced for it.
    pub async fn handle<B>(&self, req: Request<B>) -> Result<Response<Full<Bytes>>, BodyTimeout>
    where
        B: Body<Data = Bytes> + Unpin,
        B::Error: std::fmt::Display,
    {
        let response = match self.mode {
            ResponseMode::EchoText => {
                // Drain the body anyway so the connection stays reusable
                read_body(req.into_body(), self.body_timeout).await?;
                http::build_text_response(StatusCode::OK, &self.greeting, &self.server_name)
            }
            ResponseMode::JsonRouted => {
                let descriptor = RequestDescriptor::from_request(req, self.body_timeout).await?;
                let (status, payload) = self.dispatch(&descriptor);
                http::build_json_response(status, &payload, &self.server_name)
            }
        };
        Ok(response)
    }

    /// Resolve a descriptor to its final status and payload
    pub fn dispatch(&self, req: &RequestDescriptor) -> (StatusCode, Value) {
        self.registry.resolve(&req.path).call(req).resolve()
    }
}

/// hyper service entry: dispatch plus access logging.
///
/// An error makes hyper close the connection without answering.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, BodyTimeout>
where
    B: Body<Data = Bytes> + Unpin,
    B::Error: std::fmt::Display,
{
    let started = Instant::now();
    let logging = &state.config.logging;

    logger::log_headers_count(req.headers().len(), logging.show_headers);

    let (parts, body) = req.into_parts();
    let entry = logging
        .access_log
        .then(|| AccessLogEntry::from_parts(&peer_addr, &parts));

    let response = state
        .dispatcher
        .handle(Request::from_parts(parts, body))
        .await
        .inspect_err(|e| {
            logger::log_warning(&format!("Dropping request from {peer_addr}: {e}"));
        })?;

    if let Some(mut entry) = entry {
        entry.status = response.status().as_u16();
        entry.body_bytes = usize::try_from(response.body().size_hint().exact().unwrap_or(0))
            .unwrap_or(usize::MAX);
        entry.request_time_us =
            u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &logging.access_log_format);
    }

    Ok(response)
}
