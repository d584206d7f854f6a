//! Caller identity
//!
//! Every todo route requires a `User-ID` header. The value is an opaque,
//! non-blank string; it scopes every read and write and becomes the
//! performed-by value of audited changes.

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use std::fmt;

use crate::audit::PerformedBy;
use crate::error::AppError;

/// Header carrying the caller identity, in its normalized lowercase form
pub const USER_ID_HEADER: &str = "user-id";

/// Non-blank owner identifier taken from the `User-ID` header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserId(String);

impl UserId {
    /// Surrounding whitespace is trimmed; blank and non-UTF-8 values are rejected
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.is_empty() {
            None
        } else {
            Some(Self(value.to_string()))
        }
    }

    pub fn from_headers(headers: &HeaderMap) -> Result<Self, AppError> {
        headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(Self::parse)
            .ok_or_else(|| AppError::Unauthorized("User-ID header is required".to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn performed_by(&self) -> PerformedBy {
        PerformedBy::from(self)
    }
}

impl From<&UserId> for PerformedBy {
    fn from(user: &UserId) -> Self {
        PerformedBy::from_non_blank(user.0.clone())
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reads the identity stored by the `require_user_id` middleware, falling
/// back to the header on routes without it
#[axum::async_trait]
impl<S> FromRequestParts<S> for UserId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<UserId>() {
            return Ok(user.clone());
        }
        Self::from_headers(&parts.headers)
    }
}
