//! Request descriptor module
//!
//! Turns an incoming HTTP request into an owned, immutable description:
//! normalized path, decoded query parameters, case-insensitive headers,
//! method and the fully accumulated body.

use http_body_util::BodyExt;
use hyper::body::{Body, Bytes};
use hyper::{HeaderMap, Request};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use crate::logger;

/// Everything a handler gets to see about a request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RequestDescriptor {
    /// Path with leading and trailing slashes removed
    pub path: String,
    pub method: String,
    pub query: HashMap<String, String>,
    /// Header names are lowercased, so lookups must use lowercase keys
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl RequestDescriptor {
    /// Build a descriptor, waiting for the whole body to arrive first.
    ///
    /// Fails only when `body_timeout` runs out before the body ends.
    pub async fn from_request<B>(
        req: Request<B>,
        body_timeout: Option<Duration>,
    ) -> Result<Self, BodyTimeout>
    where
        B: Body<Data = Bytes> + Unpin,
        B::Error: std::fmt::Display,
    {
        let (parts, body) = req.into_parts();

        Ok(Self {
            path: normalize_path(parts.uri.path()).to_string(),
            method: parts.method.as_str().to_string(),
            query: parts.uri.query().map(parse_query).unwrap_or_default(),
            headers: collect_headers(&parts.headers),
            body: read_body(body, body_timeout).await?,
        })
    }
}

/// The request body did not end within the allowed time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyTimeout(pub Duration);

impl fmt::Display for BodyTimeout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "request body not completed within {:?}", self.0)
    }
}

impl std::error::Error for BodyTimeout {}

/// Strip every leading and trailing `/`; inner slashes are kept as-is.
pub fn normalize_path(path: &str) -> &str {
    path.trim_matches('/')
}

/// Parse a query string (without the leading `?`).
///
/// Keys and values are percent-decoded and `+` becomes a space. A bare key
/// maps to an empty string; a repeated key keeps its last value.
pub fn parse_query(query: &str) -> HashMap<String, String> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (url_decode(key), url_decode(value))
        })
        .collect()
}

/// Percent-decode a query component. Malformed escapes are kept verbatim.
fn url_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'+' => out.push(b' '),
            b'%' if i + 2 < bytes.len() => {
                match (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                    (Some(hi), Some(lo)) => {
                        out.push((hi << 4) | lo);
                        i += 2;
                    }
                    _ => out.push(b'%'),
                }
            }
            b => out.push(b),
        }
        i += 1;
    }

    String::from_utf8_lossy(&out).into_owned()
}

const fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// Flatten a header map into lowercase name → value.
/// Repeated headers are joined with `", "`.
pub fn collect_headers(headers: &HeaderMap) -> HashMap<String, String> {
    let mut map: HashMap<String, String> = HashMap::with_capacity(headers.keys_len());

    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes());
        map.entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert_with(|| value.into_owned());
    }

    map
}

/// Drain a body stream into one UTF-8 string, chunks appended in arrival order.
///
/// Decoding happens once at the end so characters split across chunks
/// survive. A stream error keeps whatever arrived before it.
pub async fn accumulate_body<B>(mut body: B) -> String
where
    B: Body<Data = Bytes> + Unpin,
    B::Error: std::fmt::Display,
{
    let mut buf: Vec<u8> = Vec::new();

    while let Some(frame) = body.frame().await {
        match frame {
            Ok(frame) => {
                if let Ok(data) = frame.into_data() {
                    buf.extend_from_slice(&data);
                }
            }
            Err(e) => {
                logger::log_warning(&format!(
                    "Request body ended early after {} bytes: {e}",
                    buf.len()
                ));
                break;
            }
        }
    }

    String::from_utf8_lossy(&buf).into_owned()
}

/// [`accumulate_body`] bounded by `limit`; `None` waits for end-of-stream.
pub async fn read_body<B>(body: B, limit: Option<Duration>) -> Result<String, BodyTimeout>
where
    B: Body<Data = Bytes> + Unpin,
    B::Error: std::fmt::Display,
{
    match limit {
        Some(limit) => tokio::time::timeout(limit, accumulate_body(body))
            .await
            .map_err(|_| BodyTimeout(limit)),
        None => Ok(accumulate_body(body).await),
    }
}
