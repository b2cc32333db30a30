//! List query module
//!
//! Parses and validates the query string of a list request, then applies the
//! requested ordering and limit to a copy of the stored records.
//!
//! Supported keys:
//! - `order=-createdAt` - newest first
//! - `order=+createdAt` - oldest first
//! - `limit=N` - at most `N` records, applied after ordering

use std::cmp::Reverse;

use url::form_urlencoded;

use super::error::BoardError;
use crate::store::Record;

/// Sort direction on `createdAt`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Ascending,
    Descending,
}

impl Order {
    fn parse(value: &str) -> Result<Self, BoardError> {
        match value {
            "-createdAt" => Ok(Self::Descending),
            // An unescaped `+` is form-decoded to a space
            "+createdAt" | " createdAt" => Ok(Self::Ascending),
            other => Err(BoardError::InvalidOrder(other.to_string())),
        }
    }
}

/// Validated list query
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ListQuery {
    pub order: Option<Order>,
    pub limit: Option<usize>,
}

impl ListQuery {
    /// Parse a raw query string (without the leading `?`).
    ///
    /// Pairs are checked in the order they appear and the first invalid one
    /// decides the error.
    pub fn parse(query: Option<&str>) -> Result<Self, BoardError> {
        let mut parsed = Self::default();
        let Some(query) = query else {
            return Ok(parsed);
        };

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "order" => {
                    if parsed.order.is_some() {
                        return Err(BoardError::InvalidOrder(value.into_owned()));
                    }
                    parsed.order = Some(Order::parse(&value)?);
                }
                "limit" => {
                    if parsed.limit.is_some() {
                        return Err(BoardError::InvalidLimit(value.into_owned()));
                    }
                    parsed.limit = Some(parse_limit(&value)?);
                }
                other => return Err(BoardError::UnsupportedQuery(other.to_string())),
            }
        }

        Ok(parsed)
    }

    /// Order and truncate `records`.
    ///
    /// Equal timestamps keep acceptance order; descending reverses it too.
    pub fn apply(&self, mut records: Vec<Record>) -> Vec<Record> {
        match self.order {
            Some(Order::Ascending) => records.sort_by_key(|r| (r.created_at(), r.seq())),
            Some(Order::Descending) => records.sort_by_key(|r| Reverse((r.created_at(), r.seq()))),
            None => {}
        }

        if let Some(limit) = self.limit {
            records.truncate(limit);
        }
        records
    }
}

/// Digits only; values past `usize::MAX` saturate
fn parse_limit(value: &str) -> Result<usize, BoardError> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(BoardError::InvalidLimit(value.to_string()));
    }
    Ok(value.parse().unwrap_or(usize::MAX))
}
