//! The `CardStore` trait.
//!
//! Implemented by storage backends (e.g. `leitner-store-sqlite`, or the
//! in-process [`memory::MemoryStore`]). The review service depends on this
//! abstraction, not on any concrete backend.

pub mod memory;

use std::future::Future;

use uuid::Uuid;

use crate::card::{Card, Word};

/// Abstraction over a card persistence backend.
///
/// Every lookup is scoped by owner: there is deliberately no way to fetch a
/// card by id alone.
///
/// Writes that can lose a race report it through their boolean result rather
/// than through `Self::Error`, so callers can tell a conflict from a failure.
pub trait CardStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist a new card. Returns `false` without writing anything if the
  /// owner already has a card for the same word.
  fn insert(
    &self,
    card: Card,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Retrieve a card by id. Returns `None` if it does not exist or belongs to
  /// a different owner.
  fn get(
    &self,
    owner_id: Uuid,
    card_id: Uuid,
  ) -> impl Future<Output = Result<Option<Card>, Self::Error>> + Send + '_;

  /// Retrieve the owner's card for a normalised word.
  fn find_by_word(
    &self,
    owner_id: Uuid,
    word: Word,
  ) -> impl Future<Output = Result<Option<Card>, Self::Error>> + Send + '_;

  /// All of an owner's cards, archived ones included, in no particular order.
  fn list_for_owner(
    &self,
    owner_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Card>, Self::Error>> + Send + '_;

  /// Overwrite a card if, and only if, the stored version still equals
  /// `expected_version`. The caller is responsible for having bumped
  /// `card.version`. Returns `false` when the version check fails or the card
  /// is gone.
  fn update(
    &self,
    card: Card,
    expected_version: u64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Hard-delete a card. Returns `false` if there was nothing to delete.
  fn delete(
    &self,
    owner_id: Uuid,
    card_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}
