//! Presentation order for review queues.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use crate::card::Card;

/// Most overdue first; among equally-due cards, the most recently touched
/// one first. Card id breaks any remaining tie so the order is total.
pub fn queue_order(a: &Card, b: &Card) -> Ordering {
  a.next_review_at
    .cmp(&b.next_review_at)
    .then_with(|| b.updated_at.cmp(&a.updated_at))
    .then_with(|| a.card_id.cmp(&b.card_id))
}

/// Sort cards in place into queue order.
pub fn order(cards: &mut [Card]) { cards.sort_by(queue_order) }

/// The due subset of `cards` in queue order, truncated to `limit`.
pub fn due_queue(
  cards: Vec<Card>,
  now: DateTime<Utc>,
  limit: Option<usize>,
) -> Vec<Card> {
  let mut due: Vec<Card> =
    cards.into_iter().filter(|c| c.is_due(now)).collect();
  order(&mut due);
  if let Some(limit) = limit {
    due.truncate(limit);
  }
  due
}
