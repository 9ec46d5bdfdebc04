//! [`SqliteStore`] — the SQLite implementation of [`CardStore`].

use std::{path::Path, time::Duration};

use rusqlite::OptionalExtension as _;
use tracing::warn;
use uuid::Uuid;

use leitner_core::{
  card::{Card, Word},
  store::CardStore,
};

use crate::{
  encode::{CARD_COLUMNS, CardParams, RawCard, encode_uuid},
  schema::SCHEMA,
  Result,
};

/// Attempts per call before a busy/locked database error is surfaced.
const MAX_ATTEMPTS: u32 = 4;
const INITIAL_BACKOFF: Duration = Duration::from_millis(10);

// ─── Store ───────────────────────────────────────────────────────────────────

/// A card store backed by a single SQLite file.
///
/// Clones share the same connection thread.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open a private in-memory store.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// How long SQLite itself waits on a locked database before reporting
  /// busy. The schema sets five seconds; past it, [`SqliteStore`] retries on
  /// its own with backoff.
  pub async fn set_busy_timeout(&self, timeout: Duration) -> Result<()> {
    self
      .call("set_busy_timeout", move |conn| {
        conn.busy_timeout(timeout)?;
        Ok(())
      })
      .await
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .call("init_schema", |conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await
  }

  /// Run `f` on the connection thread, retrying with exponential backoff
  /// while SQLite reports the database as busy or locked.
  async fn call<F, R>(&self, op: &'static str, f: F) -> Result<R>
  where
    F: Fn(&mut rusqlite::Connection) -> tokio_rusqlite::Result<R>
      + Clone
      + Send
      + 'static,
    R: Send + 'static,
  {
    let mut delay = INITIAL_BACKOFF;
    let mut attempt = 1;
    loop {
      match self.conn.call(f.clone()).await {
        Err(e) if attempt < MAX_ATTEMPTS && is_busy(&e) => {
          warn!(op, attempt, ?delay, "database busy, retrying");
          tokio::time::sleep(delay).await;
          delay *= 2;
          attempt += 1;
        }
        other => return Ok(other?),
      }
    }
  }

  /// Fetch at most one card matching `filter` (a WHERE clause over `?1`,
  /// `?2`).
  async fn fetch_one(
    &self,
    op: &'static str,
    filter: &'static str,
    a: String,
    b: String,
  ) -> Result<Option<Card>> {
    let sql = format!("SELECT {CARD_COLUMNS} FROM cards WHERE {filter}");
    let raw: Option<RawCard> = self
      .call(op, move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![a, b], RawCard::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawCard::into_card).transpose()
  }
}

pub(crate) fn is_busy(err: &tokio_rusqlite::Error) -> bool {
  matches!(
    err,
    tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(e, _))
      if matches!(
        e.code,
        rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
      )
  )
}

// ─── CardStore impl ──────────────────────────────────────────────────────────

impl CardStore for SqliteStore {
  type Error = crate::Error;

  async fn insert(&self, card: Card) -> Result<bool> {
    let p = CardParams::from(&card);
    let sql = format!(
      "INSERT INTO cards ({CARD_COLUMNS})
       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10,
               ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)
       ON CONFLICT DO NOTHING"
    );

    let inserted = self
      .call("insert", move |conn| {
        let rows = conn.execute(
          &sql,
          rusqlite::params![
            p.card_id,
            p.owner_id,
            p.word,
            p.meaning,
            p.notes,
            p.source_word_ref,
            p.source_level_ref,
            p.stage,
            p.next_review_at,
            p.last_reviewed_at,
            p.last_result,
            p.repetitions,
            p.successful_reviews,
            p.failed_reviews,
            p.created_at,
            p.updated_at,
            p.archived_at,
            p.version,
          ],
        )?;
        Ok(rows == 1)
      })
      .await?;

    Ok(inserted)
  }

  async fn get(&self, owner_id: Uuid, card_id: Uuid) -> Result<Option<Card>> {
    self
      .fetch_one(
        "get",
        "card_id = ?1 AND owner_id = ?2",
        encode_uuid(card_id),
        encode_uuid(owner_id),
      )
      .await
  }

  async fn find_by_word(&self, owner_id: Uuid, word: Word) -> Result<Option<Card>> {
    self
      .fetch_one(
        "find_by_word",
        "owner_id = ?1 AND word = ?2",
        encode_uuid(owner_id),
        word.as_str().to_owned(),
      )
      .await
  }

  async fn list_for_owner(&self, owner_id: Uuid) -> Result<Vec<Card>> {
    let owner_str = encode_uuid(owner_id);
    let sql = format!("SELECT {CARD_COLUMNS} FROM cards WHERE owner_id = ?1");

    let raws: Vec<RawCard> = self
      .call("list_for_owner", move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![owner_str], RawCard::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCard::into_card).collect()
  }

  async fn update(&self, card: Card, expected_version: u64) -> Result<bool> {
    let p = CardParams::from(&card);
    let expected = expected_version as i64;

    self
      .call("update", move |conn| {
        // `word`, `owner_id` and `created_at` are immutable.
        let rows = conn.execute(
          "UPDATE cards SET
             meaning            = ?3,
             notes              = ?4,
             source_word_ref    = ?5,
             source_level_ref   = ?6,
             stage              = ?7,
             next_review_at     = ?8,
             last_reviewed_at   = ?9,
             last_result        = ?10,
             repetitions        = ?11,
             successful_reviews = ?12,
             failed_reviews     = ?13,
             updated_at         = ?14,
             archived_at        = ?15,
             version            = ?16
           WHERE card_id = ?1 AND owner_id = ?2 AND version = ?17",
          rusqlite::params![
            p.card_id,
            p.owner_id,
            p.meaning,
            p.notes,
            p.source_word_ref,
            p.source_level_ref,
            p.stage,
            p.next_review_at,
            p.last_reviewed_at,
            p.last_result,
            p.repetitions,
            p.successful_reviews,
            p.failed_reviews,
            p.updated_at,
            p.archived_at,
            p.version,
            expected,
          ],
        )?;
        Ok(rows == 1)
      })
      .await
  }

  async fn delete(&self, owner_id: Uuid, card_id: Uuid) -> Result<bool> {
    let card_str = encode_uuid(card_id);
    let owner_str = encode_uuid(owner_id);

    self
      .call("delete", move |conn| {
        let rows = conn.execute(
          "DELETE FROM cards WHERE card_id = ?1 AND owner_id = ?2",
          rusqlite::params![card_str, owner_str],
        )?;
        Ok(rows == 1)
      })
      .await
  }
}
