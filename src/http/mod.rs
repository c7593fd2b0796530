//! HTTP protocol layer module
//!
//! Response builders, kept apart from the dispatch logic that decides what
//! goes into them.

pub mod response;

pub use response::{build_json_response, build_text_response};
