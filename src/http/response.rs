//! HTTP response building module
//!
//! Every builder starts from [`base_builder`], so CORS and `Server` headers
//! are present on every response regardless of status.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    ACCESS_CONTROL_MAX_AGE, ALLOW, CONTENT_LENGTH, CONTENT_TYPE, SERVER,
};
use hyper::http::response::Builder;
use hyper::{Response, StatusCode};
use serde::Serialize;

use crate::config::Config;

pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const EMPTY_CONTENT_TYPE: &str = "text/plain";

/// Response builder carrying the headers shared by all responses
pub fn base_builder(status: StatusCode, config: &Config) -> Builder {
    Response::builder()
        .status(status)
        .header(SERVER, config.http.server_name.as_str())
        .header(ACCESS_CONTROL_ALLOW_ORIGIN, config.cors.allow_origin.as_str())
        .header(ACCESS_CONTROL_ALLOW_METHODS, config.cors.allow_methods.as_str())
        .header(ACCESS_CONTROL_ALLOW_HEADERS, config.cors.allow_headers.as_str())
        .header(ACCESS_CONTROL_MAX_AGE, config.cors.max_age)
}

/// Build a response whose body is `body` serialized as JSON
pub fn build_json_response<T: Serialize>(
    status: StatusCode,
    body: &T,
    config: &Config,
) -> Response<Full<Bytes>> {
    let json = match serde_json::to_vec(body) {
        Ok(j) => j,
        Err(e) => {
            crate::logger::log_error(&format!("Failed to serialize response: {e}"));
            return finish(
                base_builder(StatusCode::INTERNAL_SERVER_ERROR, config)
                    .header(CONTENT_TYPE, JSON_CONTENT_TYPE),
                Bytes::from_static(br#"{"error":"Internal server error"}"#),
                "500",
            );
        }
    };

    finish(
        base_builder(status, config).header(CONTENT_TYPE, JSON_CONTENT_TYPE),
        Bytes::from(json),
        status.as_str(),
    )
}

/// Build a response with an empty body
pub fn build_empty_response(status: StatusCode, config: &Config) -> Response<Full<Bytes>> {
    finish(
        base_builder(status, config).header(CONTENT_TYPE, EMPTY_CONTENT_TYPE),
        Bytes::new(),
        status.as_str(),
    )
}

/// Build OPTIONS response (preflight request)
pub fn build_options_response(config: &Config) -> Response<Full<Bytes>> {
    build_empty_response(StatusCode::OK, config)
}

/// Build 404 Not Found response
pub fn build_404_response(config: &Config) -> Response<Full<Bytes>> {
    build_empty_response(StatusCode::NOT_FOUND, config)
}

/// Build 405 Method Not Allowed response with a JSON body
pub fn build_405_response<T: Serialize>(
    allow: &str,
    body: &T,
    config: &Config,
) -> Response<Full<Bytes>> {
    let mut response = build_json_response(StatusCode::METHOD_NOT_ALLOWED, body, config);
    match allow.parse() {
        Ok(value) => {
            response.headers_mut().insert(ALLOW, value);
        }
        Err(e) => log_build_error("405", &e),
    }
    response
}

fn finish(builder: Builder, body: Bytes, status: &str) -> Response<Full<Bytes>> {
    let fallback_body = body.clone();
    builder
        .header(CONTENT_LENGTH, body.len())
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error(status, &e);
            Response::new(Full::new(fallback_body))
        })
}

/// Log response build error
fn log_build_error(status: &str, error: &dyn std::fmt::Display) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
