//! Request error taxonomy
//!
//! Every failure a request can hit, mapped to the status code and error body
//! the client receives. All of these are detected before a response is built.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Method, Response, StatusCode};

use super::router::ALLOWED_METHODS;
use crate::config::Config;
use crate::http;

/// Errors returned by the message board handlers
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    /// `order` is not `-createdAt` or `+createdAt`
    #[error("invalid order value: '{0}'")]
    InvalidOrder(String),
    /// `limit` is not a non-negative integer
    #[error("invalid limit value: '{0}'")]
    InvalidLimit(String),
    /// A query key other than `order` or `limit`
    #[error("unsupported query parameter: '{0}'")]
    UnsupportedQuery(String),
    /// Request body is not a JSON object
    #[error("malformed body: {0}")]
    MalformedBody(String),
    /// Request body exceeds `http.max_body_size`
    #[error("request body exceeds {limit} bytes")]
    PayloadTooLarge { limit: u64 },
    /// Request body did not finish arriving in time
    #[error("request body not received within {timeout_ms} ms")]
    BodyTimeout { timeout_ms: u64 },
    /// The connection failed while the body was being read
    #[error("transport error: {0}")]
    Transport(String),
    /// Method other than GET, POST or OPTIONS on the resource path
    #[error("method {0} not allowed")]
    MethodNotSupported(Method),
    /// Path is not the resource path
    #[error("path not found: {0}")]
    PathNotFound(String),
}

impl BoardError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidOrder(_)
            | Self::InvalidLimit(_)
            | Self::UnsupportedQuery(_)
            | Self::MalformedBody(_)
            | Self::Transport(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::BodyTimeout { .. } => StatusCode::REQUEST_TIMEOUT,
            Self::MethodNotSupported(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::PathNotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    /// Machine-readable kind used in error bodies
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidOrder(_) => "invalid_order",
            Self::InvalidLimit(_) => "invalid_limit",
            Self::UnsupportedQuery(_) => "unsupported_query",
            Self::MalformedBody(_) => "malformed_body",
            Self::PayloadTooLarge { .. } => "payload_too_large",
            Self::BodyTimeout { .. } => "body_timeout",
            Self::Transport(_) => "transport_error",
            Self::MethodNotSupported(_) => "method_not_supported",
            Self::PathNotFound(_) => "path_not_found",
        }
    }

    pub fn to_body(&self) -> serde_json::Value {
        serde_json::json!({
            "error_detail": {
                "code": self.status().as_u16(),
                "kind": self.kind(),
                "message": self.to_string()
            }
        })
    }

    /// 404 stays empty; every other kind carries the JSON error body
    pub fn to_response(&self, config: &Config) -> Response<Full<Bytes>> {
        match self {
            Self::PathNotFound(_) => http::build_404_response(config),
            Self::MethodNotSupported(_) => {
                http::build_405_response(ALLOWED_METHODS, &self.to_body(), config)
            }
            _ => http::build_json_response(self.status(), &self.to_body(), config),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_are_bad_request() {
        for err in [
            BoardError::InvalidOrder("-createdBy".into()),
            BoardError::InvalidLimit("two".into()),
            BoardError::UnsupportedQuery("name".into()),
            BoardError::MalformedBody("eof".into()),
            BoardError::Transport("reset".into()),
        ] {
            assert_eq!(err.status(), StatusCode::BAD_REQUEST, "{err}");
        }
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            BoardError::PathNotFound("/x".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            BoardError::MethodNotSupported(Method::PUT).status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            BoardError::PayloadTooLarge { limit: 1 }.status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            BoardError::BodyTimeout { timeout_ms: 5 }.status(),
            StatusCode::REQUEST_TIMEOUT
        );
    }

    #[test]
    fn test_error_body_shape() {
        let body = BoardError::InvalidLimit("two".into()).to_body();
        assert_eq!(body["error_detail"]["code"], 400);
        assert_eq!(body["error_detail"]["kind"], "invalid_limit");
        assert_eq!(body["error_detail"]["message"], "invalid limit value: 'two'");
    }

    #[test]
    fn test_responses() {
        let config = Config::default();

        let resp = BoardError::PathNotFound("/arglebargle".into()).to_response(&config);
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(resp.headers()["content-length"], "0");

        let resp = BoardError::MethodNotSupported(Method::DELETE).to_response(&config);
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(resp.headers()["allow"], ALLOWED_METHODS);

        let resp = BoardError::UnsupportedQuery("name".into()).to_response(&config);
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(resp.headers()["content-type"], "application/json");
        assert_eq!(resp.headers()["access-control-allow-origin"], "*");
    }
}
