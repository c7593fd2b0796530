// Application state module
// Holds the loaded configuration and the request dispatcher built from it

use super::types::Config;
use crate::dispatch::Dispatcher;

/// Application state, shared read-only by every connection
pub struct AppState {
    pub config: Config,
    pub dispatcher: Dispatcher,
}

impl AppState {
    /// Build the state once at startup. The handler registry inside the
    /// dispatcher is never modified afterwards.
    pub fn new(config: Config) -> Self {
        let dispatcher = Dispatcher::from_config(&config);
        Self { config, dispatcher }
    }
}
