//! Read-side statistics over an owner's card set.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::card::{Card, Stage};

/// Aggregate figures for one owner at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
  pub total:            usize,
  pub due_count:        usize,
  pub upcoming_count:   usize,
  pub mastered_count:   usize,
  /// Cards per stage; every stage from 1 to 5 is always present. Stored
  /// stages are clamped into range when decoded, so none are dropped here.
  pub stage_counts:     BTreeMap<u8, usize>,
  pub reviewed_today:   usize,
  pub new_today:        usize,
  pub last_review_at:   Option<DateTime<Utc>>,
  /// Share of cards that are due, as a rounded percentage.
  pub ready_percentage: u8,
}

/// Compute a [`Summary`] in a single pass.
///
/// "Today" is the calendar date of `now` in `zone`; the same zone is used for
/// every date comparison.
pub fn summarize<'a>(
  cards: impl IntoIterator<Item = &'a Card>,
  now: DateTime<Utc>,
  zone: FixedOffset,
) -> Summary {
  let today = local_date(now, zone);
  let mut stage_counts: BTreeMap<u8, usize> =
    Stage::all().map(|s| (s.get(), 0)).collect();

  let mut total = 0;
  let mut due_count = 0;
  let mut mastered_count = 0;
  let mut reviewed_today = 0;
  let mut new_today = 0;
  let mut last_review_at: Option<DateTime<Utc>> = None;

  for card in cards {
    total += 1;
    if card.is_due(now) {
      due_count += 1;
    }
    if card.stage.is_mastered() {
      mastered_count += 1;
    }
    *stage_counts.entry(card.stage.get()).or_default() += 1;

    if let Some(reviewed) = card.last_reviewed_at {
      if local_date(reviewed, zone) == today {
        reviewed_today += 1;
      }
      last_review_at = last_review_at.max(Some(reviewed));
    }
    if local_date(card.created_at, zone) == today {
      new_today += 1;
    }
  }

  Summary {
    total,
    due_count,
    upcoming_count: total - due_count,
    mastered_count,
    stage_counts,
    reviewed_today,
    new_today,
    last_review_at,
    ready_percentage: ready_percentage(due_count, total),
  }
}

fn local_date(at: DateTime<Utc>, zone: FixedOffset) -> NaiveDate {
  at.with_timezone(&zone).date_naive()
}

fn ready_percentage(due: usize, total: usize) -> u8 {
  if total == 0 {
    return 0;
  }
  (due as f64 / total as f64 * 100.0).round() as u8
}
