//! [`ReviewService`] — the only component that talks to a [`CardStore`].
//!
//! Each public method reads the clock once, loads what it needs scoped to the
//! calling owner, applies the pure scheduling and aggregation functions, and
//! persists with a version check.

use std::sync::Arc;

use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
  Error, Result,
  card::{Card, NewCard, Outcome, Stage},
  clock::{Clock, SystemClock},
  queue,
  schedule::{IntervalTable, decide},
  store::CardStore,
  summary::{Summary, summarize},
};

// ─── Result types ────────────────────────────────────────────────────────────

/// Whether [`ReviewService::create_or_merge`] inserted a new card or folded
/// the input into an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeOutcome {
  Created,
  Merged,
}

/// A card annotated with its due flag at listing time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListedCard {
  #[serde(flatten)]
  pub card: Card,
  pub due:  bool,
}

/// An owner's active cards in queue order, plus their summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardListing {
  pub cards:   Vec<ListedCard>,
  pub summary: Summary,
}

// ─── Service ─────────────────────────────────────────────────────────────────

pub struct ReviewService<S> {
  store:     S,
  clock:     Arc<dyn Clock>,
  intervals: IntervalTable,
  zone:      FixedOffset,
}

impl<S: CardStore> ReviewService<S> {
  /// A service on the system clock with the default interval table and UTC
  /// calendar days.
  pub fn new(store: S) -> Self {
    Self {
      store,
      clock: Arc::new(SystemClock),
      intervals: IntervalTable::default(),
      zone: Utc.fix(),
    }
  }

  pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
    self.clock = clock;
    self
  }

  pub fn with_intervals(mut self, intervals: IntervalTable) -> Self {
    self.intervals = intervals;
    self
  }

  /// The zone whose calendar days define "today" in summaries.
  pub fn with_zone(mut self, zone: FixedOffset) -> Self {
    self.zone = zone;
    self
  }

  pub fn store(&self) -> &S { &self.store }

  pub fn intervals(&self) -> &IntervalTable { &self.intervals }

  // ── Writes ────────────────────────────────────────────────────────────────

  /// Save a word for `owner_id`, or merge into the card that already tracks
  /// it.
  ///
  /// On merge, supplied metadata replaces the stored values, the card is
  /// un-archived, and a review scheduled further out than one failure
  /// interval is pulled forward to now. Stage and counters are untouched.
  pub async fn create_or_merge(
    &self,
    owner_id: Uuid,
    input: NewCard,
  ) -> Result<(Card, MergeOutcome)> {
    let input = input.validated()?;
    let now = self.clock.now();

    let existing = self
      .store
      .find_by_word(owner_id, input.word.clone())
      .await
      .map_err(Error::store)?;

    let Some(mut card) = existing else {
      let card = Card::new(owner_id, input, now);
      let inserted = self
        .store
        .insert(card.clone())
        .await
        .map_err(Error::store)?;
      if !inserted {
        warn!(owner = %owner_id, word = %card.word, "concurrent create lost the race");
        return Err(Error::Conflict(card.card_id));
      }
      info!(owner = %owner_id, card_id = %card.card_id, word = %card.word, "created card");
      return Ok((card, MergeOutcome::Created));
    };

    let expected = card.version;
    merge_metadata(&mut card, input);
    card.archived_at = None;
    if card.next_review_at > now + self.intervals.failure_interval() {
      card.next_review_at = now;
    }
    card.updated_at = now;
    card.version += 1;

    let card = self.commit(card, expected).await?;
    info!(
      owner = %owner_id,
      card_id = %card.card_id,
      word = %card.word,
      next_review_at = %card.next_review_at,
      "merged card"
    );
    Ok((card, MergeOutcome::Merged))
  }

  /// Apply one review outcome to an active card.
  pub async fn review(
    &self,
    owner_id: Uuid,
    card_id: Uuid,
    outcome: Outcome,
  ) -> Result<Card> {
    let now = self.clock.now();
    let mut card = self.load(owner_id, card_id).await?;
    if card.is_archived() {
      return Err(Error::CardNotFound(card_id));
    }

    let expected = card.version;
    let from = card.stage;
    let decision = decide(&self.intervals, card.stage, outcome, now);

    card.stats.record(outcome);
    card.stage = decision.stage;
    card.next_review_at = decision.next_review_at;
    card.last_reviewed_at = Some(now);
    card.last_result = outcome.into();
    card.updated_at = now;
    card.version += 1;

    let card = self.commit(card, expected).await?;
    info!(
      owner = %owner_id,
      card_id = %card_id,
      outcome = outcome.as_str(),
      from = %from,
      to = %card.stage,
      "reviewed card"
    );
    Ok(card)
  }

  /// Send a card back to stage 1 and make it due now. Counters are kept.
  pub async fn reset(&self, owner_id: Uuid, card_id: Uuid) -> Result<Card> {
    let now = self.clock.now();
    let mut card = self.load(owner_id, card_id).await?;
    let expected = card.version;

    card.stage = Stage::FIRST;
    card.next_review_at = now;
    card.updated_at = now;
    card.version += 1;

    let card = self.commit(card, expected).await?;
    info!(owner = %owner_id, card_id = %card_id, "reset card");
    Ok(card)
  }

  /// Hide a card from listings and statistics. Archiving twice is a no-op.
  pub async fn archive(&self, owner_id: Uuid, card_id: Uuid) -> Result<Card> {
    let now = self.clock.now();
    let mut card = self.load(owner_id, card_id).await?;
    if card.is_archived() {
      return Ok(card);
    }
    let expected = card.version;

    card.archived_at = Some(now);
    card.updated_at = now;
    card.version += 1;

    let card = self.commit(card, expected).await?;
    info!(owner = %owner_id, card_id = %card_id, "archived card");
    Ok(card)
  }

  pub async fn delete(&self, owner_id: Uuid, card_id: Uuid) -> Result<()> {
    let deleted = self
      .store
      .delete(owner_id, card_id)
      .await
      .map_err(Error::store)?;
    if !deleted {
      return Err(Error::CardNotFound(card_id));
    }
    info!(owner = %owner_id, card_id = %card_id, "deleted card");
    Ok(())
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  /// Fetch a single card, archived or not.
  pub async fn get(&self, owner_id: Uuid, card_id: Uuid) -> Result<Card> {
    self.load(owner_id, card_id).await
  }

  /// All active cards in queue order, each flagged due or not, with the
  /// summary computed at the same instant.
  pub async fn list(&self, owner_id: Uuid) -> Result<CardListing> {
    let now = self.clock.now();
    let mut cards = self.active_cards(owner_id).await?;
    queue::order(&mut cards);

    let summary = summarize(&cards, now, self.zone);
    let cards = cards
      .into_iter()
      .map(|card| ListedCard { due: card.is_due(now), card })
      .collect();
    Ok(CardListing { cards, summary })
  }

  pub async fn summary(&self, owner_id: Uuid) -> Result<Summary> {
    let now = self.clock.now();
    let cards = self.active_cards(owner_id).await?;
    Ok(summarize(&cards, now, self.zone))
  }

  /// Due cards only, most urgent first.
  pub async fn due_queue(
    &self,
    owner_id: Uuid,
    limit: Option<usize>,
  ) -> Result<Vec<Card>> {
    let now = self.clock.now();
    let cards = self.active_cards(owner_id).await?;
    Ok(queue::due_queue(cards, now, limit))
  }

  // ── Helpers ───────────────────────────────────────────────────────────────

  async fn load(&self, owner_id: Uuid, card_id: Uuid) -> Result<Card> {
    self
      .store
      .get(owner_id, card_id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::CardNotFound(card_id))
  }

  async fn active_cards(&self, owner_id: Uuid) -> Result<Vec<Card>> {
    let mut cards = self
      .store
      .list_for_owner(owner_id)
      .await
      .map_err(Error::store)?;
    cards.retain(|c| !c.is_archived());
    Ok(cards)
  }

  async fn commit(&self, card: Card, expected_version: u64) -> Result<Card> {
    let applied = self
      .store
      .update(card.clone(), expected_version)
      .await
      .map_err(Error::store)?;
    if !applied {
      // A card deleted since it was loaded cannot be fixed by retrying.
      let still_there = self
        .store
        .get(card.owner_id, card.card_id)
        .await
        .map_err(Error::store)?
        .is_some();
      if !still_there {
        return Err(Error::CardNotFound(card.card_id));
      }
      warn!(
        owner = %card.owner_id,
        card_id = %card.card_id,
        expected_version,
        "stale write rejected"
      );
      return Err(Error::Conflict(card.card_id));
    }
    Ok(card)
  }
}

fn merge_metadata(card: &mut Card, input: NewCard) {
  if input.meaning.is_some() {
    card.meaning = input.meaning;
  }
  if input.notes.is_some() {
    card.notes = input.notes;
  }
  if input.source_word_ref.is_some() {
    card.source_word_ref = input.source_word_ref;
  }
  if input.source_level_ref.is_some() {
    card.source_level_ref = input.source_level_ref;
  }
}
