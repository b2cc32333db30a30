//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: matches the path against the
//! single resource, picks the operation from the method, and turns every
//! outcome into exactly one response.

use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::sync::Arc;

use super::error::BoardError;
use super::messages;
use crate::config::{AppState, BoardConfig, MatchMode};
use crate::http;
use crate::logger;

/// Value of the `Allow` header on the resource path
pub const ALLOWED_METHODS: &str = "GET, POST, OPTIONS";

/// Routing decision for a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    List,
    Create,
    Preflight,
    NotFound,
    MethodNotAllowed,
}

/// Decide the operation for `method` on `path`
pub fn resolve(method: &Method, path: &str, board: &BoardConfig) -> Route {
    if !matches_resource(path, board) {
        return Route::NotFound;
    }

    match *method {
        Method::GET => Route::List,
        Method::POST => Route::Create,
        Method::OPTIONS => Route::Preflight,
        _ => Route::MethodNotAllowed,
    }
}

/// Check `path` against the configured resource path
pub fn matches_resource(path: &str, board: &BoardConfig) -> bool {
    let resource = board.resource_path.as_str();
    match board.match_mode {
        MatchMode::Exact => path == resource,
        MatchMode::Prefix => path
            .strip_prefix(resource.trim_end_matches('/'))
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/')),
    }
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let (parts, body) = req.into_parts();
    logger::log_request(&parts.method, &parts.uri, parts.version);

    let path = parts.uri.path();
    let result = match resolve(&parts.method, path, &state.config.board) {
        Route::List => messages::list(parts.uri.query(), &state).await,
        Route::Create => messages::create(&parts.headers, body, &state).await,
        Route::Preflight => Ok(http::build_options_response(&state.config)),
        Route::NotFound => Err(BoardError::PathNotFound(path.to_string())),
        Route::MethodNotAllowed => Err(BoardError::MethodNotSupported(parts.method.clone())),
    };

    Ok(result.unwrap_or_else(|err| {
        match err {
            BoardError::PathNotFound(_) => logger::log_debug(&err.to_string()),
            _ => logger::log_warning(&format!(
                "{} {} rejected ({}): {err}",
                parts.method,
                parts.uri,
                err.status().as_u16()
            )),
        }
        err.to_response(&state.config)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::handler::body::test_bodies::{BrokenBody, ChunkedBody, StalledBody};
    use http_body_util::BodyExt;
    use hyper::StatusCode;
    use serde_json::{json, Value};

    const MESSAGES: &str = "/classes/messages";

    fn new_state() -> Arc<AppState> {
        Arc::new(AppState::with_empty_store(Config::default()))
    }

    fn request(method: Method, uri: &str, body: &str) -> Request<Full<Bytes>> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Full::new(Bytes::from(body.to_string())))
            .unwrap()
    }

    async fn send(state: &Arc<AppState>, method: Method, uri: &str, body: &str) -> (StatusCode, Bytes) {
        let resp = handle_request(request(method, uri, body), Arc::clone(state))
            .await
            .unwrap();
        assert_eq!(resp.headers()["access-control-allow-origin"], "*");
        assert_eq!(resp.headers()["access-control-max-age"], "10");
        let status = resp.status();
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        (status, body)
    }

    async fn post(state: &Arc<AppState>, body: Value) -> StatusCode {
        send(state, Method::POST, MESSAGES, &body.to_string()).await.0
    }

    async fn get_results(state: &Arc<AppState>, uri: &str) -> Vec<Value> {
        let (status, body) = send(state, Method::GET, uri, "").await;
        assert_eq!(status, StatusCode::OK);
        let parsed: Value = serde_json::from_slice(&body).expect("body is JSON");
        parsed["results"].as_array().expect("results is an array").clone()
    }

    #[test]
    fn test_resolve() {
        let board = BoardConfig::default();
        assert_eq!(resolve(&Method::GET, MESSAGES, &board), Route::List);
        assert_eq!(resolve(&Method::POST, MESSAGES, &board), Route::Create);
        assert_eq!(resolve(&Method::OPTIONS, MESSAGES, &board), Route::Preflight);
        assert_eq!(resolve(&Method::PUT, MESSAGES, &board), Route::MethodNotAllowed);
        assert_eq!(resolve(&Method::HEAD, MESSAGES, &board), Route::MethodNotAllowed);
        for method in [Method::GET, Method::POST, Method::OPTIONS, Method::DELETE] {
            assert_eq!(resolve(&method, "/arglebargle", &board), Route::NotFound);
            assert_eq!(resolve(&method, "/classes/messages/1", &board), Route::NotFound);
        }
    }

    #[test]
    fn test_prefix_matching() {
        let board = BoardConfig {
            match_mode: MatchMode::Prefix,
            ..BoardConfig::default()
        };
        assert!(matches_resource(MESSAGES, &board));
        assert!(matches_resource("/classes/messages/", &board));
        assert!(matches_resource("/classes/messages/lobby", &board));
        assert!(!matches_resource("/classes/messagesX", &board));
        assert!(!matches_resource("/classes", &board));
    }

    #[tokio::test]
    async fn test_get_returns_results_array() {
        let state = new_state();
        let (status, body) = send(&state, Method::GET, MESSAGES, "").await;
        assert_eq!(status, StatusCode::OK);
        let parsed: Value = serde_json::from_slice(&body).unwrap();
        assert!(parsed.is_object());
        assert_eq!(parsed["results"], json!([]));
    }

    #[tokio::test]
    async fn test_get_content_type_is_json() {
        let state = new_state();
        let resp = handle_request(request(Method::GET, MESSAGES, ""), state)
            .await
            .unwrap();
        assert_eq!(resp.headers()["content-type"], "application/json");
    }

    #[tokio::test]
    async fn test_post_then_get() {
        let state = new_state();
        let (status, body) = send(
            &state,
            Method::POST,
            MESSAGES,
            r#"{"username":"Jono","message":"Do my bidding!"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(body.is_empty());

        let results = get_results(&state, MESSAGES).await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0]["username"], "Jono");
        assert_eq!(results[0]["message"], "Do my bidding!");
        assert!(results[0]["createdAt"].is_string());
    }

    #[tokio::test]
    async fn test_each_post_adds_exactly_one() {
        let state = new_state();
        for i in 0..3 {
            assert_eq!(post(&state, json!({ "n": i })).await, StatusCode::CREATED);
            assert_eq!(get_results(&state, MESSAGES).await.len(), i + 1);
        }
    }

    #[tokio::test]
    async fn test_order_and_limit_scenario() {
        let state = new_state();
        for (username, message) in [
            ("Jono", "Do my bidding!"),
            ("Jono", "Do my bidding!"),
            ("Douglas", "Douglas!"),
            ("Bort", "eat my shorts"),
            ("hoomoor", "donuts"),
        ] {
            let body = json!({ "username": username, "message": message });
            assert_eq!(post(&state, body).await, StatusCode::CREATED);
        }

        let newest_first = get_results(&state, "/classes/messages?order=-createdAt").await;
        assert_eq!(newest_first.len(), 5);
        assert_eq!(newest_first[0]["username"], "hoomoor");
        assert_eq!(newest_first[1]["username"], "Bort");
        assert_eq!(newest_first[2]["username"], "Douglas");

        let again = get_results(&state, "/classes/messages?order=-createdAt").await;
        assert_eq!(newest_first, again);

        let oldest_first = get_results(&state, "/classes/messages?order=%2BcreatedAt").await;
        assert_eq!(oldest_first[4]["username"], "hoomoor");

        assert_eq!(get_results(&state, "/classes/messages?limit=2").await.len(), 2);
        assert_eq!(get_results(&state, "/classes/messages?limit=50").await.len(), 5);

        let top_two = get_results(&state, "/classes/messages?order=-createdAt&limit=2").await;
        assert_eq!(top_two.len(), 2);
        assert_eq!(top_two[0]["username"], "hoomoor");

        // stored order is untouched by sorted reads
        let stored = get_results(&state, MESSAGES).await;
        assert_eq!(stored[0]["username"], "Jono");
        assert_eq!(stored[4]["username"], "hoomoor");
    }

    #[tokio::test]
    async fn test_invalid_queries_are_bad_request() {
        let state = new_state();
        post(&state, json!({ "username": "Douglas", "message": "Douglas!" })).await;

        for (uri, kind) in [
            ("/classes/messages?order=-createdAt&limit=two", "invalid_limit"),
            ("/classes/messages?order=-createdBy&limit=2", "invalid_order"),
            ("/classes/messages?limit=-1", "invalid_limit"),
            ("/classes/messages?order=-createdAt&limit=2&name=dog", "unsupported_query"),
        ] {
            let (status, body) = send(&state, Method::GET, uri, "").await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            let parsed: Value = serde_json::from_slice(&body).unwrap();
            assert_eq!(parsed["error_detail"]["kind"], kind, "{uri}");
            assert!(parsed.get("results").is_none());
        }
    }

    #[tokio::test]
    async fn test_malformed_post_is_bad_request() {
        let state = new_state();
        for body in ["{not json", "", "[1,2,3]", "\"hello\""] {
            let (status, _) = send(&state, Method::POST, MESSAGES, body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        }
        assert_eq!(state.store.len().await, 0);
    }

    #[tokio::test]
    async fn test_options_preflight() {
        let state = new_state();
        let (status, body) = send(&state, Method::OPTIONS, MESSAGES, "").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_path_is_not_found_for_every_method() {
        let state = new_state();
        for method in [Method::GET, Method::POST, Method::OPTIONS, Method::PUT, Method::DELETE] {
            let (status, body) = send(&state, method.clone(), "/arglebargle", "{}").await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{method}");
            assert!(body.is_empty());
        }
        assert_eq!(state.store.len().await, 0);
    }

    #[tokio::test]
    async fn test_unsupported_method_is_405() {
        let state = new_state();
        let resp = handle_request(request(Method::DELETE, MESSAGES, ""), Arc::clone(&state))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(resp.headers()["allow"], ALLOWED_METHODS);
    }

    #[tokio::test]
    async fn test_chunked_post_is_reassembled() {
        let state = new_state();
        let req = Request::builder()
            .method(Method::POST)
            .uri(MESSAGES)
            .body(ChunkedBody::new(&["{\"username\":", "\"Bort\",", "\"message\":\"eat my shorts\"}"]))
            .unwrap();
        let resp = handle_request(req, Arc::clone(&state)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);

        let results = get_results(&state, MESSAGES).await;
        assert_eq!(results[0]["username"], "Bort");
    }

    #[tokio::test]
    async fn test_body_limits() {
        let mut config = Config::default();
        config.http.max_body_size = 16;
        config.http.body_read_timeout_ms = 20;
        let state = Arc::new(AppState::with_empty_store(config));

        let (status, _) = send(&state, Method::POST, MESSAGES, r#"{"message":"far too long for the limit"}"#).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);

        let req = Request::builder()
            .method(Method::POST)
            .uri(MESSAGES)
            .body(StalledBody)
            .unwrap();
        let resp = handle_request(req, Arc::clone(&state)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::REQUEST_TIMEOUT);

        let req = Request::builder()
            .method(Method::POST)
            .uri(MESSAGES)
            .body(BrokenBody)
            .unwrap();
        let resp = handle_request(req, Arc::clone(&state)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        assert_eq!(state.store.len().await, 0);
    }

    #[tokio::test]
    async fn test_injected_store_is_shared() {
        let store = Arc::new(crate::store::MessageStore::new());
        let first = Arc::new(AppState::new(Config::default(), Arc::clone(&store)));
        let second = Arc::new(AppState::new(Config::default(), Arc::clone(&store)));

        post(&first, json!({ "username": "a" })).await;
        assert_eq!(get_results(&second, MESSAGES).await.len(), 1);
        assert_eq!(store.len().await, 1);
    }
}
