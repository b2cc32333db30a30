//! Message operations
//!
//! List and create on the single message resource.

use std::time::Duration;

use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::HeaderMap;
use hyper::{Response, StatusCode};
use serde::Serialize;

use super::body;
use super::error::BoardError;
use super::query::ListQuery;
use crate::config::AppState;
use crate::http;
use crate::logger;
use crate::store::Record;

/// `GET` response body
#[derive(Debug, Serialize)]
pub struct ResultsPage {
    pub results: Vec<Record>,
}

/// Validate the query, then order and limit a copy of the store.
pub async fn list(
    query: Option<&str>,
    state: &AppState,
) -> Result<Response<Full<Bytes>>, BoardError> {
    let query = ListQuery::parse(query)?;
    let results = query.apply(state.store.snapshot().await);
    logger::log_debug(&format!("Listing {} record(s)", results.len()));

    Ok(http::build_json_response(
        StatusCode::OK,
        &ResultsPage { results },
        &state.config,
    ))
}

/// Collect and decode the body, then append it to the store.
pub async fn create<B>(
    headers: &HeaderMap,
    body: B,
    state: &AppState,
) -> Result<Response<Full<Bytes>>, BoardError>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let http_config = &state.config.http;
    body::check_declared_length(headers, http_config.max_body_size)?;

    let bytes = body::collect_body(
        body,
        http_config.max_body_size,
        Duration::from_millis(http_config.body_read_timeout_ms),
    )
    .await?;
    let fields = body::parse_object(&bytes)?;

    let record = state.store.append(fields).await;
    logger::log_debug(&format!(
        "Stored record #{} ({} bytes)",
        record.seq(),
        bytes.len()
    ));

    Ok(http::build_empty_response(StatusCode::CREATED, &state.config))
}
