//! Caller identity extractor.
//!
//! Authentication happens in front of this service; the authenticating layer
//! forwards the learner's id in the `x-owner-id` header. Every card operation
//! is scoped to that id.

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, request::Parts},
};
use uuid::Uuid;

use crate::error::ApiError;

pub const OWNER_HEADER: &str = "x-owner-id";

/// The authenticated learner making the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Owner(pub Uuid);

/// Read the owner id directly from headers.
pub fn owner_from_headers(headers: &HeaderMap) -> Result<Uuid, ApiError> {
  let raw = headers
    .get(OWNER_HEADER)
    .ok_or_else(|| ApiError::Unauthorized(format!("missing {OWNER_HEADER} header")))?;

  raw
    .to_str()
    .ok()
    .and_then(|s| Uuid::parse_str(s.trim()).ok())
    .ok_or_else(|| {
      ApiError::Unauthorized(format!("{OWNER_HEADER} must be a UUID"))
    })
}

impl<S> FromRequestParts<S> for Owner
where
  S: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    _state: &S,
  ) -> Result<Self, Self::Rejection> {
    owner_from_headers(&parts.headers).map(Owner)
  }
}
