//! SQL schema for the Leitner SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA busy_timeout = 5000;

CREATE TABLE IF NOT EXISTS cards (
    card_id            TEXT PRIMARY KEY,
    owner_id           TEXT NOT NULL,
    word               TEXT NOT NULL,   -- normalised uppercase letters
    meaning            TEXT,
    notes              TEXT,
    source_word_ref    TEXT,
    source_level_ref   TEXT,
    stage              INTEGER NOT NULL DEFAULT 1,
    next_review_at     TEXT NOT NULL,   -- ISO 8601 UTC
    last_reviewed_at   TEXT,
    last_result        TEXT NOT NULL DEFAULT 'none',  -- 'none' | 'success' | 'fail'
    repetitions        INTEGER NOT NULL DEFAULT 0,
    successful_reviews INTEGER NOT NULL DEFAULT 0,
    failed_reviews     INTEGER NOT NULL DEFAULT 0,
    created_at         TEXT NOT NULL,
    updated_at         TEXT NOT NULL,
    archived_at        TEXT,
    version            INTEGER NOT NULL DEFAULT 0,
    UNIQUE (owner_id, word),
    CHECK  (repetitions = successful_reviews + failed_reviews)
);

CREATE INDEX IF NOT EXISTS cards_owner_due_idx ON cards(owner_id, next_review_at);

PRAGMA user_version = 1;
";
