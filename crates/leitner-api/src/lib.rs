//! JSON REST API for the Leitner review engine.
//!
//! Exposes an axum [`Router`] backed by a [`ReviewService`] over any
//! [`leitner_core::store::CardStore`]. Authentication, TLS, and transport
//! concerns are the caller's responsibility; the authenticated learner is
//! identified by the [`owner::OWNER_HEADER`] header.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", leitner_api::api_router(service.clone()))
//! ```

pub mod cards;
pub mod error;
pub mod extract;
pub mod owner;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use leitner_core::{service::ReviewService, store::CardStore};

pub use error::ApiError;

/// Build a fully-materialised API router for `service`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(service: Arc<ReviewService<S>>) -> Router<()>
where
  S: CardStore + 'static,
{
  Router::new()
    .route("/cards", get(cards::list::<S>).post(cards::create::<S>))
    .route("/cards/summary", get(cards::summary::<S>))
    .route("/cards/queue", get(cards::queue::<S>))
    .route(
      "/cards/{id}",
      get(cards::get_one::<S>).delete(cards::delete_one::<S>),
    )
    .route("/cards/{id}/review", post(cards::review::<S>))
    .route("/cards/{id}/reset", post(cards::reset::<S>))
    .route("/cards/{id}/archive", post(cards::archive::<S>))
    .with_state(service)
}

#[cfg(test)]
mod tests;
