//! Backend trait and implementations for the book REST API.

pub mod http;
pub mod mock;

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

use crate::payload::{BookPayload, IsbnLookup};
use crate::{Book, BookId, BookPage};

pub use http::HttpCatalog;

/// Header carrying the number of matches irrespective of `limit`.
pub const TOTAL_COUNT_HEADER: &str = "X-Total-Count";

/// Boxed future returned by every [`CatalogBackend`] call.
pub type BackendFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, BackendError>> + Send + 'a>>;

/// Error type for backend calls, distinguishing HTTP status failures from
/// transport and decoding problems.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// Server answered with a non-success status. `detail` is the
    /// backend-provided message, when the body carried one.
    #[error("HTTP {code}{}", .detail.as_deref().map(|d| format!(": {d}")).unwrap_or_default())]
    Status { code: u16, detail: Option<String> },
    #[error("request failed: {0}")]
    Transport(String),
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl BackendError {
    pub fn detail(&self) -> Option<&str> {
        match self {
            BackendError::Status { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, BackendError::Status { code: 404, .. })
    }
}

/// A store of books reachable over some transport.
pub trait CatalogBackend: Send + Sync {
    /// Short name used in logs (e.g., "http", "mock").
    fn name(&self) -> &str;

    /// Search the collection. `query` is an already encoded query string.
    fn list<'a>(&'a self, query: &'a str) -> BackendFuture<'a, BookPage>;

    fn get<'a>(&'a self, id: &'a BookId) -> BackendFuture<'a, Book>;

    fn create<'a>(&'a self, payload: &'a BookPayload) -> BackendFuture<'a, Book>;

    fn update<'a>(&'a self, id: &'a BookId, payload: &'a BookPayload) -> BackendFuture<'a, Book>;

    fn delete<'a>(&'a self, id: &'a BookId) -> BackendFuture<'a, ()>;

    /// Fetch bibliographic metadata for an ISBN from the backend's upstream.
    fn lookup<'a>(&'a self, isbn: &'a str) -> BackendFuture<'a, IsbnLookup>;
}

/// Total from the count header, falling back to the number of rows when the
/// header is missing or not a number.
pub fn parse_total(header: Option<&str>, rows: usize) -> u64 {
    header
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(rows as u64)
}

/// Pull a human-readable `detail` out of an error body.
///
/// Validation errors from the backend carry a list of objects instead of a
/// string; those are summarised by their first `msg`.
pub fn error_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match &value["detail"] {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        serde_json::Value::Array(items) => items
            .first()
            .and_then(|i| i["msg"].as_str())
            .map(String::from),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_header_parsed() {
        assert_eq!(parse_total(Some("120"), 20), 120);
        assert_eq!(parse_total(Some(" 7 "), 3), 7);
    }

    #[test]
    fn total_falls_back_to_row_count() {
        assert_eq!(parse_total(None, 3), 3);
        assert_eq!(parse_total(Some("many"), 5), 5);
        assert_eq!(parse_total(Some(""), 0), 0);
    }

    #[test]
    fn detail_from_string_body() {
        assert_eq!(
            error_detail(r#"{"detail": "ISBN already exists"}"#).as_deref(),
            Some("ISBN already exists")
        );
    }

    #[test]
    fn detail_from_validation_list() {
        let body = r#"{"detail": [{"loc": ["body", "year"], "msg": "Input should be less than or equal to 2100"}]}"#;
        assert_eq!(
            error_detail(body).as_deref(),
            Some("Input should be less than or equal to 2100")
        );
    }

    #[test]
    fn status_display_includes_detail() {
        let err = BackendError::Status {
            code: 400,
            detail: Some("ISBN already exists".into()),
        };
        assert_eq!(err.to_string(), "HTTP 400: ISBN already exists");
        let err = BackendError::Status {
            code: 500,
            detail: None,
        };
        assert_eq!(err.to_string(), "HTTP 500");
    }

    #[test]
    fn no_detail_for_non_json_or_blank() {
        assert_eq!(error_detail("Internal Server Error"), None);
        assert_eq!(error_detail(r#"{"detail": ""}"#), None);
        assert_eq!(error_detail(""), None);
    }
}
