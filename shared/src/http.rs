//! HTTP helpers for Lambda functions.

use lambda_http::{Body, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{error, warn};

use crate::Error;

/// Error body returned by every endpoint.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upstream_status: Option<u16>,
}

fn builder(status: u16, methods: &str) -> lambda_http::http::response::Builder {
    Response::builder()
        .status(status)
        .header("access-control-allow-origin", "*")
        .header("access-control-allow-headers", "Content-Type")
        .header("access-control-allow-methods", methods)
        .header("content-type", "application/json")
}

/// Create a JSON response with the given status code and data.
pub fn json_response<T: Serialize>(
    status: u16,
    methods: &str,
    data: &T,
) -> Result<Response<Body>, lambda_http::Error> {
    Ok(builder(status, methods).body(Body::from(serde_json::to_string(data)?))?)
}

/// Create a response without a body (CORS preflight, 204).
pub fn empty_response(status: u16, methods: &str) -> Result<Response<Body>, lambda_http::Error> {
    Ok(builder(status, methods).body(Body::Empty)?)
}

/// Create an error response with the given status code and message.
pub fn error_response(
    status: u16,
    methods: &str,
    message: impl Into<String>,
) -> Result<Response<Body>, lambda_http::Error> {
    json_response(
        status,
        methods,
        &ErrorBody {
            error: message.into(),
            upstream_status: None,
        },
    )
}

/// Turn a core error into its HTTP response, logging server-side failures.
pub fn error_for(err: &Error, methods: &str) -> Result<Response<Body>, lambda_http::Error> {
    let status = err.status_code();
    if status >= 500 {
        error!("Request failed: {}", err);
    } else {
        warn!("Request rejected: {}", err);
    }

    let message = match err {
        Error::Validation(msg) | Error::NotFound(msg) => msg.clone(),
        Error::Config(msg) => msg.clone(),
        other => other.to_string(),
    };

    json_response(
        status,
        methods,
        &ErrorBody {
            error: message,
            upstream_status: err.upstream_status(),
        },
    )
}

/// Parse a request body as JSON.
///
/// A missing body or malformed JSON is a validation error (400).
pub fn parse_json_body<T: DeserializeOwned>(body: &Body) -> Result<T, Error> {
    let bytes: &[u8] = body.as_ref();
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(Error::Validation("Missing request body".to_string()));
    }

    serde_json::from_slice(bytes)
        .map_err(|e| Error::Validation(format!("Invalid request body: {}", e)))
}

/// Strip deployment prefixes and trailing slashes from a request path.
pub fn normalize_path(raw_path: &str) -> &str {
    let path = strip_segment_prefix(raw_path, "/.netlify/functions/api")
        .or_else(|| strip_segment_prefix(raw_path, "/api"))
        .unwrap_or(raw_path);

    match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    }
}

fn strip_segment_prefix<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    path.strip_prefix(prefix)
        .filter(|rest| rest.is_empty() || rest.starts_with('/'))
}
