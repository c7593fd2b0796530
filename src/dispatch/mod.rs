//! Request dispatcher
//!
//! Resolves every request to a handler through an immutable registry keyed
//! by normalized path, and writes the handler's reply back as HTTP.

pub mod handler;
pub mod registry;
pub mod request;
pub mod router;

// Re-export main entry points
pub use router::{handle_request, Dispatcher};
