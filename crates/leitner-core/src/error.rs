//! Error types for `leitner-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  /// Caller input that failed normalisation or parsing. `field` names the
  /// offending input so the HTTP layer can echo it back.
  #[error("invalid {field}: {message}")]
  Validation {
    field:   &'static str,
    message: String,
  },

  /// The card does not exist, or exists but belongs to another owner.
  #[error("card not found: {0}")]
  CardNotFound(Uuid),

  /// The card changed between read and write; the caller may retry.
  #[error("card {0} was modified concurrently")]
  Conflict(Uuid),

  #[error("invalid interval table: {0}")]
  InvalidIntervals(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub(crate) fn validation(
    field: &'static str,
    message: impl Into<String>,
  ) -> Self {
    Self::Validation { field, message: message.into() }
  }

  pub(crate) fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(err))
  }

  /// Whether the failed operation can be retried as-is.
  pub fn is_retryable(&self) -> bool { matches!(self, Self::Conflict(_)) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
