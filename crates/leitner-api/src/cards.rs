//! Handlers for `/cards` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/cards` | Active cards in queue order, plus summary |
//! | `POST`   | `/cards` | Body: [`CreateBody`]; 201 if created, 200 if merged |
//! | `GET`    | `/cards/summary` | Summary only |
//! | `GET`    | `/cards/queue` | Due cards only; optional `?limit=` |
//! | `GET`    | `/cards/{id}` | Single card, archived or not |
//! | `DELETE` | `/cards/{id}` | 204 |
//! | `POST`   | `/cards/{id}/review` | Body: `{"outcome":"success"\|"fail"}` |
//! | `POST`   | `/cards/{id}/reset` | Back to stage 1, due now |
//! | `POST`   | `/cards/{id}/archive` | Hide from listings |

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use leitner_core::{
  card::{Card, NewCard, Outcome, Word},
  service::{CardListing, MergeOutcome, ReviewService},
  store::CardStore,
  summary::Summary,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  error::ApiError,
  extract::{Json, Path, Query},
  owner::Owner,
};

type Service<S> = State<Arc<ReviewService<S>>>;

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /cards`
pub async fn list<S: CardStore>(
  State(svc): Service<S>,
  Owner(owner): Owner,
) -> Result<Json<CardListing>, ApiError> {
  Ok(Json(svc.list(owner).await?))
}

/// `GET /cards/summary`
pub async fn summary<S: CardStore>(
  State(svc): Service<S>,
  Owner(owner): Owner,
) -> Result<Json<Summary>, ApiError> {
  Ok(Json(svc.summary(owner).await?))
}

#[derive(Debug, Deserialize)]
pub struct QueueParams {
  pub limit: Option<usize>,
}

/// `GET /cards/queue[?limit=<n>]`
pub async fn queue<S: CardStore>(
  State(svc): Service<S>,
  Owner(owner): Owner,
  Query(params): Query<QueueParams>,
) -> Result<Json<Vec<Card>>, ApiError> {
  Ok(Json(svc.due_queue(owner, params.limit).await?))
}

/// `GET /cards/{id}`
pub async fn get_one<S: CardStore>(
  State(svc): Service<S>,
  Owner(owner): Owner,
  Path(id): Path<Uuid>,
) -> Result<Json<Card>, ApiError> {
  Ok(Json(svc.get(owner, id).await?))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /cards`. `word` is normalised server-side.
#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub word:             String,
  pub meaning:          Option<String>,
  pub notes:            Option<String>,
  pub source_word_ref:  Option<String>,
  pub source_level_ref: Option<String>,
}

impl TryFrom<CreateBody> for NewCard {
  type Error = ApiError;

  fn try_from(b: CreateBody) -> Result<Self, Self::Error> {
    Ok(NewCard {
      word:             Word::parse(&b.word)?,
      meaning:          b.meaning,
      notes:            b.notes,
      source_word_ref:  b.source_word_ref,
      source_level_ref: b.source_level_ref,
    })
  }
}

#[derive(Debug, Serialize)]
pub struct SavedCard {
  pub card:    Card,
  /// `false` when the word was already saved and this call merged into it.
  pub created: bool,
}

/// `POST /cards`
pub async fn create<S: CardStore>(
  State(svc): Service<S>,
  Owner(owner): Owner,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError> {
  let (card, outcome) = svc
    .create_or_merge(owner, NewCard::try_from(body)?)
    .await?;
  let status = match outcome {
    MergeOutcome::Created => StatusCode::CREATED,
    MergeOutcome::Merged => StatusCode::OK,
  };
  let created = outcome == MergeOutcome::Created;
  Ok((status, Json(SavedCard { card, created })))
}

// ─── Review ───────────────────────────────────────────────────────────────────

/// Body of `POST /cards/{id}/review`. The outcome is kept as a raw string so
/// unknown tokens produce a field-level validation error.
#[derive(Debug, Deserialize)]
pub struct ReviewBody {
  pub outcome: String,
}

/// `POST /cards/{id}/review`
pub async fn review<S: CardStore>(
  State(svc): Service<S>,
  Owner(owner): Owner,
  Path(id): Path<Uuid>,
  Json(body): Json<ReviewBody>,
) -> Result<Json<Card>, ApiError> {
  let outcome: Outcome = body.outcome.parse()?;
  Ok(Json(svc.review(owner, id, outcome).await?))
}

// ─── Administrative ───────────────────────────────────────────────────────────

/// `POST /cards/{id}/reset`
pub async fn reset<S: CardStore>(
  State(svc): Service<S>,
  Owner(owner): Owner,
  Path(id): Path<Uuid>,
) -> Result<Json<Card>, ApiError> {
  Ok(Json(svc.reset(owner, id).await?))
}

/// `POST /cards/{id}/archive`
pub async fn archive<S: CardStore>(
  State(svc): Service<S>,
  Owner(owner): Owner,
  Path(id): Path<Uuid>,
) -> Result<Json<Card>, ApiError> {
  Ok(Json(svc.archive(owner, id).await?))
}

/// `DELETE /cards/{id}`
pub async fn delete_one<S: CardStore>(
  State(svc): Service<S>,
  Owner(owner): Owner,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  svc.delete(owner, id).await?;
  Ok(StatusCode::NO_CONTENT)
}
