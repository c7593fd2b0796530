//! HTTP response building module
//!
//! Builders for the two kinds of response the server produces: JSON
//! payloads and the plain-text greeting.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde_json::Value;

/// Build a JSON response. The body is always valid JSON text.
pub fn build_json_response(
    status: StatusCode,
    payload: &Value,
    server_name: &str,
) -> Response<Full<Bytes>> {
    let json = serde_json::to_string(payload).unwrap_or_else(|e| {
        crate::logger::log_error(&format!("Failed to serialize response: {e}"));
        "{}".to_string()
    });

    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Server", server_name)
        .body(Full::new(Bytes::from(json)))
        .unwrap_or_else(|e| {
            log_build_error(status, &e);
            let mut resp = Response::new(Full::new(Bytes::from_static(b"{}")));
            *resp.status_mut() = status;
            resp
        })
}

/// Build a plain-text response
pub fn build_text_response(
    status: StatusCode,
    text: &str,
    server_name: &str,
) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header("Content-Type", "text/plain; charset=utf-8")
        .header("Server", server_name)
        .body(Full::new(Bytes::from(text.to_string())))
        .unwrap_or_else(|e| {
            log_build_error(status, &e);
            let mut resp = Response::new(Full::new(Bytes::from(text.to_string())));
            *resp.status_mut() = status;
            resp
        })
}

/// Log response build error
fn log_build_error(status: StatusCode, error: &hyper::http::Error) {
    crate::logger::log_error(&format!(
        "Failed to build {} response: {error}",
        status.as_u16()
    ));
}
