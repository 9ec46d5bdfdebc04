//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. UUIDs are stored as
//! hyphenated lowercase strings. Counters and the stage are plain integers.

use chrono::{DateTime, Utc};
use leitner_core::card::{Card, LastResult, ReviewStats, Stage, Word};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

fn decode_opt_dt(s: Option<String>) -> Result<Option<DateTime<Utc>>> {
  s.as_deref().map(decode_dt).transpose()
}

// ─── LastResult ──────────────────────────────────────────────────────────────

pub fn encode_last_result(r: LastResult) -> &'static str {
  match r {
    LastResult::None => "none",
    LastResult::Success => "success",
    LastResult::Fail => "fail",
  }
}

pub fn decode_last_result(s: &str) -> Result<LastResult> {
  match s {
    "none" => Ok(LastResult::None),
    "success" => Ok(LastResult::Success),
    "fail" => Ok(LastResult::Fail),
    other => Err(Error::Corrupt {
      column: "last_result",
      value:  other.to_owned(),
    }),
  }
}

// ─── Counters ────────────────────────────────────────────────────────────────

fn decode_count(column: &'static str, value: i64) -> Result<u32> {
  u32::try_from(value).map_err(|_| Error::Corrupt {
    column,
    value: value.to_string(),
  })
}

fn decode_version(value: i64) -> Result<u64> {
  u64::try_from(value).map_err(|_| Error::Corrupt {
    column: "version",
    value:  value.to_string(),
  })
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching the field order of [`RawCard`].
pub const CARD_COLUMNS: &str = "card_id, owner_id, word, meaning, notes,
  source_word_ref, source_level_ref, stage, next_review_at, last_reviewed_at,
  last_result, repetitions, successful_reviews, failed_reviews,
  created_at, updated_at, archived_at, version";

/// Raw values read directly from a `cards` row.
pub struct RawCard {
  pub card_id:            String,
  pub owner_id:           String,
  pub word:               String,
  pub meaning:            Option<String>,
  pub notes:              Option<String>,
  pub source_word_ref:    Option<String>,
  pub source_level_ref:   Option<String>,
  pub stage:              i64,
  pub next_review_at:     String,
  pub last_reviewed_at:   Option<String>,
  pub last_result:        String,
  pub repetitions:        i64,
  pub successful_reviews: i64,
  pub failed_reviews:     i64,
  pub created_at:         String,
  pub updated_at:         String,
  pub archived_at:        Option<String>,
  pub version:            i64,
}

impl RawCard {
  /// Read a row selected with [`CARD_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      card_id:            row.get(0)?,
      owner_id:           row.get(1)?,
      word:               row.get(2)?,
      meaning:            row.get(3)?,
      notes:              row.get(4)?,
      source_word_ref:    row.get(5)?,
      source_level_ref:   row.get(6)?,
      stage:              row.get(7)?,
      next_review_at:     row.get(8)?,
      last_reviewed_at:   row.get(9)?,
      last_result:        row.get(10)?,
      repetitions:        row.get(11)?,
      successful_reviews: row.get(12)?,
      failed_reviews:     row.get(13)?,
      created_at:         row.get(14)?,
      updated_at:         row.get(15)?,
      archived_at:        row.get(16)?,
      version:            row.get(17)?,
    })
  }

  /// Stage values outside `1..=5` are clamped rather than rejected.
  pub fn into_card(self) -> Result<Card> {
    Ok(Card {
      card_id:          decode_uuid(&self.card_id)?,
      owner_id:         decode_uuid(&self.owner_id)?,
      word:             Word::from_normalized(self.word),
      meaning:          self.meaning,
      notes:            self.notes,
      source_word_ref:  self.source_word_ref,
      source_level_ref: self.source_level_ref,
      stage:            Stage::clamped(self.stage),
      next_review_at:   decode_dt(&self.next_review_at)?,
      last_reviewed_at: decode_opt_dt(self.last_reviewed_at)?,
      last_result:      decode_last_result(&self.last_result)?,
      stats:            ReviewStats {
        repetitions:        decode_count("repetitions", self.repetitions)?,
        successful_reviews: decode_count(
          "successful_reviews",
          self.successful_reviews,
        )?,
        failed_reviews:     decode_count("failed_reviews", self.failed_reviews)?,
      },
      created_at:       decode_dt(&self.created_at)?,
      updated_at:       decode_dt(&self.updated_at)?,
      archived_at:      decode_opt_dt(self.archived_at)?,
      version:          decode_version(self.version)?,
    })
  }
}

/// Owned column values for an INSERT or UPDATE, ready to move into a
/// `tokio_rusqlite` closure.
#[derive(Clone)]
pub struct CardParams {
  pub card_id:            String,
  pub owner_id:           String,
  pub word:               String,
  pub meaning:            Option<String>,
  pub notes:              Option<String>,
  pub source_word_ref:    Option<String>,
  pub source_level_ref:   Option<String>,
  pub stage:              i64,
  pub next_review_at:     String,
  pub last_reviewed_at:   Option<String>,
  pub last_result:        &'static str,
  pub repetitions:        i64,
  pub successful_reviews: i64,
  pub failed_reviews:     i64,
  pub created_at:         String,
  pub updated_at:         String,
  pub archived_at:        Option<String>,
  pub version:            i64,
}

impl From<&Card> for CardParams {
  fn from(card: &Card) -> Self {
    Self {
      card_id:            encode_uuid(card.card_id),
      owner_id:           encode_uuid(card.owner_id),
      word:               card.word.as_str().to_owned(),
      meaning:            card.meaning.clone(),
      notes:              card.notes.clone(),
      source_word_ref:    card.source_word_ref.clone(),
      source_level_ref:   card.source_level_ref.clone(),
      stage:              i64::from(card.stage.get()),
      next_review_at:     encode_dt(card.next_review_at),
      last_reviewed_at:   card.last_reviewed_at.map(encode_dt),
      last_result:        encode_last_result(card.last_result),
      repetitions:        i64::from(card.stats.repetitions),
      successful_reviews: i64::from(card.stats.successful_reviews),
      failed_reviews:     i64::from(card.stats.failed_reviews),
      created_at:         encode_dt(card.created_at),
      updated_at:         encode_dt(card.updated_at),
      archived_at:        card.archived_at.map(encode_dt),
      version:            card.version as i64,
    }
  }
}
