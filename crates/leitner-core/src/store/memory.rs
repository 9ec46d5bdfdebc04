//! [`MemoryStore`] — a process-local [`CardStore`].
//!
//! Backs tests and embedders that do not need durability. All mutations run
//! under one lock, which gives the same per-card atomicity as the version
//! check in the SQLite backend.

use std::{
  collections::HashMap,
  convert::Infallible,
  sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use uuid::Uuid;

use crate::{
  card::{Card, Word},
  store::CardStore,
};

/// Cloning is cheap and clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
  cards: Arc<Mutex<HashMap<Uuid, Card>>>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, Card>> {
    self.cards.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

impl CardStore for MemoryStore {
  type Error = Infallible;

  async fn insert(&self, card: Card) -> Result<bool, Infallible> {
    let mut cards = self.lock();
    let taken = cards
      .values()
      .any(|c| c.owner_id == card.owner_id && c.word == card.word);
    if taken || cards.contains_key(&card.card_id) {
      return Ok(false);
    }
    cards.insert(card.card_id, card);
    Ok(true)
  }

  async fn get(
    &self,
    owner_id: Uuid,
    card_id: Uuid,
  ) -> Result<Option<Card>, Infallible> {
    Ok(
      self
        .lock()
        .get(&card_id)
        .filter(|c| c.owner_id == owner_id)
        .cloned(),
    )
  }

  async fn find_by_word(
    &self,
    owner_id: Uuid,
    word: Word,
  ) -> Result<Option<Card>, Infallible> {
    Ok(
      self
        .lock()
        .values()
        .find(|c| c.owner_id == owner_id && c.word == word)
        .cloned(),
    )
  }

  async fn list_for_owner(&self, owner_id: Uuid) -> Result<Vec<Card>, Infallible> {
    Ok(
      self
        .lock()
        .values()
        .filter(|c| c.owner_id == owner_id)
        .cloned()
        .collect(),
    )
  }

  async fn update(
    &self,
    card: Card,
    expected_version: u64,
  ) -> Result<bool, Infallible> {
    let mut cards = self.lock();
    match cards.get_mut(&card.card_id) {
      Some(stored)
        if stored.owner_id == card.owner_id
          && stored.version == expected_version =>
      {
        *stored = card;
        Ok(true)
      }
      _ => Ok(false),
    }
  }

  async fn delete(&self, owner_id: Uuid, card_id: Uuid) -> Result<bool, Infallible> {
    let mut cards = self.lock();
    if cards.get(&card_id).is_some_and(|c| c.owner_id == owner_id) {
      cards.remove(&card_id);
      return Ok(true);
    }
    Ok(false)
  }
}
