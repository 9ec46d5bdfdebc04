//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("unauthorized: {0}")]
  Unauthorized(String),

  #[error("not found: {0}")]
  NotFound(String),

  #[error("invalid {field}: {message}")]
  Validation {
    field:   &'static str,
    message: String,
  },

  /// The request could not be decoded (bad JSON, missing field, bad path or
  /// query parameter). Carries the extractor's own status code.
  #[error("{message}")]
  Rejected {
    status:  StatusCode,
    message: String,
  },

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<leitner_core::Error> for ApiError {
  fn from(err: leitner_core::Error) -> Self {
    use leitner_core::Error as E;
    match err {
      E::Validation { field, message } => Self::Validation { field, message },
      E::CardNotFound(id) => Self::NotFound(format!("card {id} not found")),
      E::Conflict(id) => {
        Self::Conflict(format!("card {id} was modified concurrently; retry"))
      }
      E::Store(e) => Self::Store(e),
      other @ E::InvalidIntervals(_) => Self::Store(Box::new(other)),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, body) = match &self {
      ApiError::Unauthorized(m) => {
        (StatusCode::UNAUTHORIZED, json!({ "error": m }))
      }
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, json!({ "error": m })),
      ApiError::Validation { field, message } => (
        StatusCode::UNPROCESSABLE_ENTITY,
        json!({ "error": message, "field": field }),
      ),
      ApiError::Rejected { status, message } => {
        (*status, json!({ "error": message }))
      }
      ApiError::Conflict(m) => (StatusCode::CONFLICT, json!({ "error": m })),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store failure");
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          json!({ "error": e.to_string() }),
        )
      }
    };
    (status, Json(body)).into_response()
  }
}
