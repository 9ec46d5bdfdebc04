//! Card types — one card tracks one word for one learner.
//!
//! The scheduling state of a card is its [`Stage`] plus `next_review_at`.
//! Everything else is bookkeeping (counters, timestamps) or learner-supplied
//! metadata that the engine stores but never interprets.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Word ────────────────────────────────────────────────────────────────────

/// A normalised word: uppercase letters only, between
/// [`Word::MIN_LEN`] and [`Word::MAX_LEN`] characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Word(String);

impl Word {
  pub const MIN_LEN: usize = 2;
  pub const MAX_LEN: usize = 32;

  /// Normalise raw input: trim, uppercase, and drop every character that is
  /// not a letter. Fails if the result is shorter than `MIN_LEN` or longer
  /// than `MAX_LEN`.
  pub fn parse(raw: &str) -> Result<Self> {
    let normalized: String = raw
      .trim()
      .chars()
      .flat_map(char::to_uppercase)
      .filter(|c| c.is_alphabetic())
      .collect();

    let len = normalized.chars().count();
    if len < Self::MIN_LEN || len > Self::MAX_LEN {
      return Err(Error::validation(
        "word",
        format!(
          "must be {}-{} letters after normalisation, got {len}",
          Self::MIN_LEN,
          Self::MAX_LEN
        ),
      ));
    }
    Ok(Self(normalized))
  }

  /// Wrap an already-normalised value read back from storage.
  pub fn from_normalized(s: String) -> Self { Self(s) }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for Word {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

// ─── Stage ───────────────────────────────────────────────────────────────────

/// Leitner box number, always within `1..=Stage::MAX`.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub struct Stage(u8);

impl Stage {
  pub const MAX_VALUE: u8 = 5;
  pub const FIRST: Stage = Stage(1);
  pub const MAX: Stage = Stage(Self::MAX_VALUE);

  pub fn new(value: u8) -> Option<Self> {
    (1..=Self::MAX_VALUE).contains(&value).then_some(Self(value))
  }

  /// Force an arbitrary stored value into range.
  pub fn clamped(value: i64) -> Self {
    Self(value.clamp(1, i64::from(Self::MAX_VALUE)) as u8)
  }

  /// The stage reached after a successful review.
  pub fn promoted(self) -> Self { Self((self.0 + 1).min(Self::MAX_VALUE)) }

  pub fn is_mastered(self) -> bool { self == Self::MAX }

  pub fn get(self) -> u8 { self.0 }

  /// All stages in ascending order.
  pub fn all() -> impl Iterator<Item = Stage> {
    (1..=Self::MAX_VALUE).map(Stage)
  }
}

impl TryFrom<u8> for Stage {
  type Error = String;

  fn try_from(value: u8) -> Result<Self, Self::Error> {
    Self::new(value)
      .ok_or_else(|| format!("stage must be 1-{}, got {value}", Self::MAX_VALUE))
  }
}

impl From<Stage> for u8 {
  fn from(stage: Stage) -> Self { stage.0 }
}

impl fmt::Display for Stage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

// ─── Outcome ─────────────────────────────────────────────────────────────────

/// The result of a single review attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
  Success,
  Fail,
}

impl Outcome {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Success => "success",
      Self::Fail => "fail",
    }
  }
}

impl FromStr for Outcome {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "success" => Ok(Self::Success),
      "fail" => Ok(Self::Fail),
      other => Err(Error::validation(
        "outcome",
        format!("expected \"success\" or \"fail\", got {other:?}"),
      )),
    }
  }
}

/// The outcome of the most recent review, or `None` if never reviewed.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum LastResult {
  #[default]
  None,
  Success,
  Fail,
}

impl From<Outcome> for LastResult {
  fn from(outcome: Outcome) -> Self {
    match outcome {
      Outcome::Success => Self::Success,
      Outcome::Fail => Self::Fail,
    }
  }
}

// ─── Stats ───────────────────────────────────────────────────────────────────

/// Review counters. `repetitions` always equals the sum of the other two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReviewStats {
  pub repetitions:        u32,
  pub successful_reviews: u32,
  pub failed_reviews:     u32,
}

impl ReviewStats {
  pub fn record(&mut self, outcome: Outcome) {
    self.repetitions += 1;
    match outcome {
      Outcome::Success => self.successful_reviews += 1,
      Outcome::Fail => self.failed_reviews += 1,
    }
  }
}

// ─── Card ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
  pub card_id:          Uuid,
  pub owner_id:         Uuid,
  pub word:             Word,
  pub meaning:          Option<String>,
  pub notes:            Option<String>,
  /// Lookup-only reference into the content catalogue; never validated.
  pub source_word_ref:  Option<String>,
  pub source_level_ref: Option<String>,
  pub stage:            Stage,
  pub next_review_at:   DateTime<Utc>,
  pub last_reviewed_at: Option<DateTime<Utc>>,
  pub last_result:      LastResult,
  pub stats:            ReviewStats,
  pub created_at:       DateTime<Utc>,
  pub updated_at:       DateTime<Utc>,
  /// Archived cards are kept but hidden from listings and statistics.
  pub archived_at:      Option<DateTime<Utc>>,
  /// Incremented on every persisted mutation; used to reject stale writes.
  pub version:          u64,
}

impl Card {
  /// A fresh stage-1 card that is due immediately.
  pub fn new(owner_id: Uuid, input: NewCard, now: DateTime<Utc>) -> Self {
    Self {
      card_id: Uuid::new_v4(),
      owner_id,
      word: input.word,
      meaning: input.meaning,
      notes: input.notes,
      source_word_ref: input.source_word_ref,
      source_level_ref: input.source_level_ref,
      stage: Stage::FIRST,
      next_review_at: now,
      last_reviewed_at: None,
      last_result: LastResult::None,
      stats: ReviewStats::default(),
      created_at: now,
      updated_at: now,
      archived_at: None,
      version: 0,
    }
  }

  pub fn is_due(&self, now: DateTime<Utc>) -> bool { self.next_review_at <= now }

  pub fn is_archived(&self) -> bool { self.archived_at.is_some() }
}

// ─── NewCard ─────────────────────────────────────────────────────────────────

/// Validated input to [`crate::service::ReviewService::create_or_merge`].
#[derive(Debug, Clone)]
pub struct NewCard {
  pub word:             Word,
  pub meaning:          Option<String>,
  pub notes:            Option<String>,
  pub source_word_ref:  Option<String>,
  pub source_level_ref: Option<String>,
}

impl NewCard {
  pub const MAX_MEANING_LEN: usize = 500;
  pub const MAX_NOTES_LEN: usize = 2000;

  /// Convenience constructor with all optional fields empty.
  pub fn new(word: Word) -> Self {
    Self {
      word,
      meaning: None,
      notes: None,
      source_word_ref: None,
      source_level_ref: None,
    }
  }

  pub fn with_meaning(mut self, meaning: impl Into<String>) -> Self {
    self.meaning = Some(meaning.into());
    self
  }

  pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
    self.notes = Some(notes.into());
    self
  }

  /// Trim free-text fields, drop empty ones, and enforce length bounds.
  pub fn validated(self) -> Result<Self> {
    Ok(Self {
      meaning: bounded_text("meaning", self.meaning, Self::MAX_MEANING_LEN)?,
      notes: bounded_text("notes", self.notes, Self::MAX_NOTES_LEN)?,
      source_word_ref: non_empty(self.source_word_ref),
      source_level_ref: non_empty(self.source_level_ref),
      ..self
    })
  }
}

fn non_empty(value: Option<String>) -> Option<String> {
  value
    .map(|v| v.trim().to_owned())
    .filter(|v| !v.is_empty())
}

fn bounded_text(
  field: &'static str,
  value: Option<String>,
  max: usize,
) -> Result<Option<String>> {
  match non_empty(value) {
    Some(v) if v.chars().count() > max => Err(Error::validation(
      field,
      format!("must be at most {max} characters"),
    )),
    other => Ok(other),
  }
}
