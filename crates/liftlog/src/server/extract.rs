//! Request extractors with liftlog's error bodies.

use axum::extract::{FromRequest, FromRequestParts};

use super::ApiError;

/// JSON request body whose rejection is answered as `400 invalid body`.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

/// Query string whose rejection is answered as `400 invalid query`.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct QueryParams<T>(pub T);

/// Parse a path segment as a positive database id.
pub(crate) fn parse_id(raw: &str) -> Option<i64> {
    raw.parse::<i64>().ok().filter(|id| *id > 0)
}

/// Parse a path id, answering `400 <message>` when it is not a positive integer.
pub(crate) fn require_id(raw: &str, message: &str) -> Result<i64, ApiError> {
    parse_id(raw).ok_or_else(|| ApiError::bad_request(message))
}

/// Presence check for a required string field: present and not blank.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}
