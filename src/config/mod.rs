// Configuration module entry point
// Loads layered configuration and holds the per-process application state

mod state;
pub mod types;

use std::net::SocketAddr;
use std::time::Duration;

// Re-export public types
pub use state::AppState;
pub use types::{Config, ResponseMode, RouteHandler, RoutesConfig};

/// Default config file name, resolved without extension
pub const DEFAULT_CONFIG_PATH: &str = "config";

impl Config {
    /// Load configuration from specified file path (without extension)
    ///
    /// Sources, lowest priority first: built-in defaults, the optional file,
    /// then `HOWDY_*` environment variables (`HOWDY_SERVER__PORT=8080`).
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        Self::load_layered(config_path, None)
    }

    /// Same as [`Config::load_from`], reading variables from `env` instead of
    /// the process environment when given.
    fn load_layered(
        config_path: &str,
        env: Option<config::Map<String, String>>,
    ) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("HOWDY")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            )
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.backlog", 128)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("logging.show_headers", false)?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("http.mode", "json-routed")?
            .set_default("http.greeting", "Howdy mates!\n")?
            .set_default("http.server_name", "howdy/0.1")?
            .set_default("routes.builtin_sample", true)?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }

    /// Limit on reading one request body, `None` when unbounded
    pub fn body_timeout(&self) -> Option<Duration> {
        non_zero_secs(self.performance.read_timeout)
    }

    /// Limit on waiting for a request head.
    ///
    /// Covers the idle gap between keep-alive requests, so it follows
    /// `keep_alive_timeout`; without keep-alive only the first head is read
    /// and `read_timeout` applies.
    pub fn header_read_timeout(&self) -> Option<Duration> {
        if self.keep_alive_enabled() {
            non_zero_secs(self.performance.keep_alive_timeout)
        } else {
            non_zero_secs(self.performance.read_timeout)
        }
    }

    pub const fn keep_alive_enabled(&self) -> bool {
        self.performance.keep_alive_timeout > 0
    }
}

fn non_zero_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp_config(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("howdy-{}-{name}.toml", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_defaults_without_file() {
        let cfg = Config::load_from("/nonexistent/howdy-config").unwrap();
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.server.port, 3000);
        assert_eq!(cfg.http.mode, ResponseMode::JsonRouted);
        assert_eq!(cfg.http.greeting, "Howdy mates!\n");
        assert!(cfg.routes.builtin_sample);
        assert!(cfg.routes.custom.is_empty());
        assert!(cfg.performance.max_connections.is_none());
        assert_eq!(cfg.get_socket_addr().unwrap().port(), 3000);
    }

    #[test]
    fn test_file_overrides_and_custom_routes() {
        let path = write_temp_config(
            "routes",
            r#"
[server]
port = 4000

[http]
mode = "echo-text"

[[routes.custom]]
path = "/hello/"
handler = { type = "fixed", status = 201, body = { ok = true } }

[[routes.custom]]
path = "debug/echo"
handler = { type = "echo" }
"#,
        );

        let cfg = Config::load_from(path.to_str().unwrap()).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(cfg.server.port, 4000);
        assert_eq!(cfg.http.mode, ResponseMode::EchoText);
        assert_eq!(cfg.routes.custom.len(), 2);
        assert_eq!(cfg.routes.custom[0].path, "/hello/");
        match &cfg.routes.custom[0].handler {
            RouteHandler::Fixed { status, body } => {
                assert_eq!(status.as_ref().and_then(serde_json::Value::as_i64), Some(201));
                assert_eq!(body.as_ref(), Some(&serde_json::json!({ "ok": true })));
            }
            other => panic!("unexpected handler: {other:?}"),
        }
        assert_eq!(cfg.routes.custom[1].handler, RouteHandler::Echo);
    }

    #[test]
    fn test_invalid_host_is_reported() {
        let mut cfg = Config::load_from("/nonexistent/howdy-config").unwrap();
        cfg.server.host = "not an address".to_string();
        assert!(cfg.get_socket_addr().is_err());
    }

    #[test]
    fn test_environment_layer_overrides_file_and_defaults() {
        let path = write_temp_config("env", "[server]\nport = 4000\n");
        let env = [
            ("HOWDY_SERVER__PORT", "8080"),
            ("HOWDY_HTTP__MODE", "echo-text"),
            ("HOWDY_PERFORMANCE__MAX_CONNECTIONS", "64"),
            ("OTHER_SERVER__PORT", "9"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let cfg = Config::load_layered(path.to_str().unwrap(), Some(env)).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.http.mode, ResponseMode::EchoText);
        assert_eq!(cfg.performance.max_connections, Some(64));
        assert_eq!(cfg.server.host, "127.0.0.1");
    }

    #[test]
    fn test_routes_must_be_an_array_of_tables() {
        let path = write_temp_config(
            "route-map",
            "[routes.custom.\"hello\"]\ntype = \"fixed\"\nstatus = 201\n",
        );
        let result = Config::load_from(path.to_str().unwrap());
        std::fs::remove_file(&path).ok();
        assert!(result.is_err());
    }

    #[test]
    fn test_timeouts_follow_performance_settings() {
        let mut cfg = Config::load_from("/nonexistent/howdy-config").unwrap();
        assert_eq!(cfg.body_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(cfg.header_read_timeout(), Some(Duration::from_secs(75)));

        cfg.performance.read_timeout = 0;
        assert_eq!(cfg.body_timeout(), None);

        cfg.performance.keep_alive_timeout = 0;
        cfg.performance.read_timeout = 5;
        assert!(!cfg.keep_alive_enabled());
        assert_eq!(cfg.header_read_timeout(), Some(Duration::from_secs(5)));
    }
}
