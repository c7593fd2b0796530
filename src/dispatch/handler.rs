//! Route handlers
//!
//! Every route resolves to one variant of [`Handler`]. A handler returns a
//! [`Reply`] exactly once; [`Reply::resolve`] applies the status and payload
//! fallbacks before the reply is written out.

use hyper::StatusCode;
use serde_json::{json, Map, Value};

use super::request::RequestDescriptor;
use crate::config::RouteHandler;

/// Name reported by the built-in `sample` route
pub const SAMPLE_HANDLER_NAME: &str = "Sample Handler";

#[derive(Debug, Clone, PartialEq)]
pub enum Handler {
    /// Built-in demo route: 406 with its own name
    Sample,
    /// Fallback for unregistered paths: 404 with no payload
    NotFound,
    /// Reflects the request descriptor back to the caller
    Echo,
    /// Canned status and payload taken from the configuration
    Fixed {
        status: Option<Value>,
        payload: Option<Value>,
    },
}

impl Handler {
    pub fn call(&self, req: &RequestDescriptor) -> Reply {
        match self {
            Self::Sample => Reply::new()
                .status(StatusCode::NOT_ACCEPTABLE.as_u16().into())
                .payload(json!({ "name": SAMPLE_HANDLER_NAME })),
            Self::NotFound => Reply::new().status(StatusCode::NOT_FOUND.as_u16().into()),
            Self::Echo => match serde_json::to_value(req) {
                Ok(payload) => Reply::new().payload(payload),
                Err(_) => Reply::new(),
            },
            Self::Fixed { status, payload } => Reply {
                status: status.as_ref().and_then(Value::as_i64),
                payload: payload.clone(),
            },
        }
    }
}

impl From<&RouteHandler> for Handler {
    fn from(route: &RouteHandler) -> Self {
        match route {
            RouteHandler::Fixed { status, body } => Self::Fixed {
                status: status.clone(),
                payload: body.clone(),
            },
            RouteHandler::Echo => Self::Echo,
            RouteHandler::NotFound => Self::NotFound,
        }
    }
}

/// What a handler hands back, before any fallback is applied
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reply {
    pub status: Option<i64>,
    pub payload: Option<Value>,
}

impl Reply {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn status(mut self, status: i64) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub fn payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Apply the fallbacks: a missing or out-of-range status becomes 200, a
    /// payload that is not an object or array becomes `{}`.
    pub fn resolve(self) -> (StatusCode, Value) {
        (coerce_status(self.status), coerce_payload(self.payload))
    }
}

fn coerce_status(status: Option<i64>) -> StatusCode {
    status
        .and_then(|code| u16::try_from(code).ok())
        .and_then(|code| StatusCode::from_u16(code).ok())
        .unwrap_or(StatusCode::OK)
}

fn coerce_payload(payload: Option<Value>) -> Value {
    match payload {
        Some(value @ (Value::Object(_) | Value::Array(_))) => value,
        _ => Value::Object(Map::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_handler() {
        let (status, body) = Handler::Sample.call(&RequestDescriptor::default()).resolve();
        assert_eq!(status, StatusCode::NOT_ACCEPTABLE);
        assert_eq!(body, json!({ "name": "Sample Handler" }));
    }

    #[test]
    fn test_not_found_handler() {
        let (status, body) = Handler::NotFound.call(&RequestDescriptor::default()).resolve();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({}));
    }

    #[test]
    fn test_sample_ignores_request_body() {
        let req = RequestDescriptor {
            path: "sample".to_string(),
            method: "POST".to_string(),
            body: "name=Ravi&hobby=basketball".to_string(),
            ..RequestDescriptor::default()
        };
        let (status, body) = Handler::Sample.call(&req).resolve();
        assert_eq!(status, StatusCode::NOT_ACCEPTABLE);
        assert_eq!(body, json!({ "name": "Sample Handler" }));
    }

    #[test]
    fn test_missing_or_invalid_status_defaults_to_ok() {
        assert_eq!(Reply::new().resolve().0, StatusCode::OK);
        assert_eq!(Reply::new().status(99).resolve().0, StatusCode::OK);
        assert_eq!(Reply::new().status(1000).resolve().0, StatusCode::OK);
        assert_eq!(Reply::new().status(-404).resolve().0, StatusCode::OK);
        assert_eq!(Reply::new().status(201).resolve().0, StatusCode::CREATED);
    }

    #[test]
    fn test_non_structured_payload_defaults_to_empty_object() {
        for payload in [json!(null), json!("text"), json!(42), json!(true)] {
            assert_eq!(Reply::new().payload(payload).resolve().1, json!({}));
        }
        assert_eq!(Reply::new().resolve().1, json!({}));
        assert_eq!(Reply::new().payload(json!([1, 2])).resolve().1, json!([1, 2]));
    }

    #[test]
    fn test_fixed_handler_coerces_raw_values() {
        let handler = Handler::Fixed {
            status: Some(json!("teapot")),
            payload: Some(json!("not an object")),
        };
        let (status, body) = handler.call(&RequestDescriptor::default()).resolve();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({}));

        let handler = Handler::Fixed {
            status: Some(json!(418)),
            payload: Some(json!({ "short": "stout" })),
        };
        let (status, body) = handler.call(&RequestDescriptor::default()).resolve();
        assert_eq!(status.as_u16(), 418);
        assert_eq!(body, json!({ "short": "stout" }));
    }

    #[test]
    fn test_echo_handler_reflects_request() {
        let mut req = RequestDescriptor {
            path: "debug/echo".to_string(),
            method: "PUT".to_string(),
            body: "hello".to_string(),
            ..RequestDescriptor::default()
        };
        req.query.insert("q".to_string(), "1".to_string());
        req.headers.insert("x-trace".to_string(), "abc".to_string());

        let (status, body) = Handler::Echo.call(&req).resolve();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["path"], "debug/echo");
        assert_eq!(body["method"], "PUT");
        assert_eq!(body["query"]["q"], "1");
        assert_eq!(body["headers"]["x-trace"], "abc");
        assert_eq!(body["body"], "hello");
    }

    #[test]
    fn test_handler_from_route_config() {
        assert_eq!(Handler::from(&RouteHandler::Echo), Handler::Echo);
        assert_eq!(Handler::from(&RouteHandler::NotFound), Handler::NotFound);
        assert_eq!(
            Handler::from(&RouteHandler::Fixed {
                status: Some(json!(202)),
                body: None,
            }),
            Handler::Fixed {
                status: Some(json!(202)),
                payload: None,
            }
        );
    }
}
