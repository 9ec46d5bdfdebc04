//! Core types and scheduling logic for the Leitner review engine.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Scheduling ([`schedule`]), aggregation ([`summary`]) and ordering
//! ([`queue`]) are pure functions of their inputs and an explicit `now`;
//! [`service::ReviewService`] wires them to a [`store::CardStore`].

pub mod card;
pub mod clock;
pub mod error;
pub mod queue;
pub mod schedule;
pub mod service;
pub mod store;
pub mod summary;

pub use error::{Error, Result};
