//! Interval table and the pure stage-transition function.
//!
//! | Stage | Success interval |
//! |-------|------------------|
//! | 1     | 1 day            |
//! | 2     | 3 days           |
//! | 3     | 7 days           |
//! | 4     | 14 days          |
//! | 5     | 30 days          |
//!
//! Any failure sends the card back to stage 1 and schedules it 12 hours out.

use chrono::{DateTime, Duration, Utc};

use crate::{
  Error, Result,
  card::{Outcome, Stage},
};

// ─── Interval table ──────────────────────────────────────────────────────────

pub const DEFAULT_SUCCESS_DAYS: [u32; Stage::MAX_VALUE as usize] =
  [1, 3, 7, 14, 30];
pub const DEFAULT_FAILURE_HOURS: u32 = 12;

/// Stage → success interval, plus one stage-independent failure interval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalTable {
  success_days:  Vec<u32>,
  failure_hours: u32,
}

impl Default for IntervalTable {
  fn default() -> Self {
    Self {
      success_days:  DEFAULT_SUCCESS_DAYS.to_vec(),
      failure_hours: DEFAULT_FAILURE_HOURS,
    }
  }
}

impl IntervalTable {
  /// Build a custom table. There must be exactly one success interval per
  /// stage and every interval must be positive.
  pub fn new(success_days: Vec<u32>, failure_hours: u32) -> Result<Self> {
    if success_days.len() != usize::from(Stage::MAX_VALUE) {
      return Err(Error::InvalidIntervals(format!(
        "expected {} success intervals, got {}",
        Stage::MAX_VALUE,
        success_days.len()
      )));
    }
    if success_days.contains(&0) {
      return Err(Error::InvalidIntervals(
        "success intervals must be at least one day".into(),
      ));
    }
    if failure_hours == 0 {
      return Err(Error::InvalidIntervals(
        "failure interval must be at least one hour".into(),
      ));
    }
    Ok(Self { success_days, failure_hours })
  }

  /// Success interval for a raw stage number. Values outside the table fall
  /// back to the stage-1 interval.
  pub fn success_days(&self, stage: u8) -> u32 {
    usize::from(stage)
      .checked_sub(1)
      .and_then(|idx| self.success_days.get(idx))
      .or_else(|| self.success_days.first())
      .copied()
      .unwrap_or(1)
  }

  pub fn success_interval(&self, stage: Stage) -> Duration {
    Duration::days(i64::from(self.success_days(stage.get())))
  }

  pub fn failure_interval(&self) -> Duration {
    Duration::hours(i64::from(self.failure_hours))
  }
}

// ─── Scheduler ───────────────────────────────────────────────────────────────

/// The result of applying one review outcome to a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
  pub stage:          Stage,
  pub next_review_at: DateTime<Utc>,
}

/// Compute the next stage and review instant. Deterministic in `now`.
pub fn decide(
  table: &IntervalTable,
  current: Stage,
  outcome: Outcome,
  now: DateTime<Utc>,
) -> Decision {
  match outcome {
    Outcome::Success => {
      let stage = current.promoted();
      Decision { stage, next_review_at: now + table.success_interval(stage) }
    }
    Outcome::Fail => Decision {
      stage:          Stage::FIRST,
      next_review_at: now + table.failure_interval(),
    },
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  fn new_year() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
  }

  fn stage(n: u8) -> Stage { Stage::new(n).unwrap() }

  #[test]
  fn success_advances_by_one_until_capped() {
    let table = IntervalTable::default();
    for s in Stage::all() {
      let d = decide(&table, s, Outcome::Success, new_year());
      let expected = if s.is_mastered() { s } else { stage(s.get() + 1) };
      assert_eq!(d.stage, expected, "from stage {s}");
      assert_eq!(
        d.next_review_at,
        new_year() + Duration::days(i64::from(table.success_days(expected.get())))
      );
    }
  }

  #[test]
  fn failure_always_resets_to_first_stage() {
    let table = IntervalTable::default();
    for s in Stage::all() {
      let d = decide(&table, s, Outcome::Fail, new_year());
      assert_eq!(d.stage, Stage::FIRST);
      assert_eq!(d.next_review_at, new_year() + Duration::hours(12));
    }
  }

  #[test]
  fn first_stage_success_lands_three_days_out() {
    let d = decide(
      &IntervalTable::default(),
      Stage::FIRST,
      Outcome::Success,
      new_year(),
    );
    assert_eq!(d.stage, stage(2));
    assert_eq!(
      d.next_review_at,
      Utc.with_ymd_and_hms(2024, 1, 4, 0, 0, 0).unwrap()
    );
  }

  #[test]
  fn third_stage_failure_lands_at_noon() {
    let d =
      decide(&IntervalTable::default(), stage(3), Outcome::Fail, new_year());
    assert_eq!(d.stage, Stage::FIRST);
    assert_eq!(
      d.next_review_at,
      Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    );
  }

  #[test]
  fn mastered_success_waits_thirty_days() {
    let d =
      decide(&IntervalTable::default(), Stage::MAX, Outcome::Success, new_year());
    assert_eq!(d.stage, Stage::MAX);
    assert_eq!(d.next_review_at, new_year() + Duration::days(30));
  }

  #[test]
  fn out_of_table_lookup_falls_back_to_first_interval() {
    let table = IntervalTable::default();
    assert_eq!(table.success_days(0), 1);
    assert_eq!(table.success_days(9), 1);
    assert_eq!(table.success_days(5), 30);
  }

  #[test]
  fn custom_tables_are_validated() {
    assert!(IntervalTable::new(vec![1, 2, 4, 8, 16], 6).is_ok());
    assert!(matches!(
      IntervalTable::new(vec![1, 2, 3], 12),
      Err(Error::InvalidIntervals(_))
    ));
    assert!(IntervalTable::new(vec![0, 2, 4, 8, 16], 12).is_err());
    assert!(IntervalTable::new(vec![1, 2, 4, 8, 16], 0).is_err());
  }
}
