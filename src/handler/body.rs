//! Request body module
//!
//! Reads a request body to completion under a size bound and a deadline,
//! then decodes it as a JSON object.

use std::time::Duration;

use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderMap, CONTENT_LENGTH};
use serde_json::{Map, Value};

use super::error::BoardError;
use crate::logger;

/// Reject a declared `Content-Length` above `max_body_size` before reading.
///
/// Unparseable values are left to the streaming limit.
pub fn check_declared_length(headers: &HeaderMap, max_body_size: u64) -> Result<(), BoardError> {
    let Some(value) = headers.get(CONTENT_LENGTH) else {
        return Ok(());
    };
    match value.to_str().ok().and_then(|v| v.trim().parse::<u64>().ok()) {
        Some(size) if size > max_body_size => {
            logger::log_warning(&format!(
                "Request body too large: {size} bytes (max: {max_body_size})"
            ));
            Err(BoardError::PayloadTooLarge {
                limit: max_body_size,
            })
        }
        Some(_) => Ok(()),
        None => {
            logger::log_warning("Invalid Content-Length value, relying on streaming limit");
            Ok(())
        }
    }
}

/// Collect every chunk of `body` into one buffer.
pub async fn collect_body<B>(
    body: B,
    max_body_size: u64,
    timeout: Duration,
) -> Result<Bytes, BoardError>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
    let limited = Limited::new(body, limit);

    match tokio::time::timeout(timeout, limited.collect()).await {
        Ok(Ok(collected)) => Ok(collected.to_bytes()),
        Ok(Err(err)) if err.downcast_ref::<LengthLimitError>().is_some() => {
            Err(BoardError::PayloadTooLarge {
                limit: max_body_size,
            })
        }
        Ok(Err(err)) => Err(BoardError::Transport(err.to_string())),
        Err(_) => Err(BoardError::BodyTimeout {
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        }),
    }
}

/// Decode `bytes` as a JSON object
pub fn parse_object(bytes: &[u8]) -> Result<Map<String, Value>, BoardError> {
    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(BoardError::MalformedBody(format!(
            "expected a JSON object, got {}",
            json_type_name(&other)
        ))),
        Err(e) => Err(BoardError::MalformedBody(e.to_string())),
    }
}

const fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
