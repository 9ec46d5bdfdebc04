//! Configuration and application assembly for the Leitner review server.

use std::{path::PathBuf, sync::Arc};

use axum::Router;
use chrono::FixedOffset;
use config::ConfigError;
use leitner_core::{
  schedule::{DEFAULT_FAILURE_HOURS, DEFAULT_SUCCESS_DAYS, IntervalTable},
  service::ReviewService,
  store::CardStore,
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

/// Prefix for environment overrides, e.g. `LEITNER_PORT=9000` or
/// `LEITNER_SCHEDULE__FAILURE_HOURS=6`.
pub const ENV_PREFIX: &str = "LEITNER";

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and the
/// environment. Every key is optional.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
  pub host:               String,
  pub port:               u16,
  pub store_path:         PathBuf,
  /// Offset used to decide what "today" means for the summary counters.
  pub utc_offset_minutes: i32,
  pub schedule:           ScheduleConfig,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:               "127.0.0.1".to_string(),
      port:               8080,
      store_path:         PathBuf::from("leitner.db"),
      utc_offset_minutes: 0,
      schedule:           ScheduleConfig::default(),
    }
  }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ScheduleConfig {
  pub success_days:  Vec<u32>,
  pub failure_hours: u32,
}

impl Default for ScheduleConfig {
  fn default() -> Self {
    Self {
      success_days:  DEFAULT_SUCCESS_DAYS.to_vec(),
      failure_hours: DEFAULT_FAILURE_HOURS,
    }
  }
}

impl ServerConfig {
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  /// `None` when the offset is outside ±24h.
  pub fn zone(&self) -> Option<FixedOffset> {
    FixedOffset::east_opt(self.utc_offset_minutes.checked_mul(60)?)
  }

  pub fn intervals(&self) -> leitner_core::Result<IntervalTable> {
    IntervalTable::new(
      self.schedule.success_days.clone(),
      self.schedule.failure_hours,
    )
  }
}

/// Load configuration from `path` (missing file is fine) with environment
/// overrides layered on top.
pub fn load_config(path: impl Into<PathBuf>) -> Result<ServerConfig, ConfigError> {
  read_config(config::File::from(path.into()).required(false), environment())
}

/// `LEITNER_` before the key, `__` between nested keys, and a comma-separated
/// list for `schedule.success_days`.
fn environment() -> config::Environment {
  config::Environment::with_prefix(ENV_PREFIX)
    .prefix_separator("_")
    .separator("__")
    .list_separator(",")
    .with_list_parse_key("schedule.success_days")
    .try_parsing(true)
}

fn read_config<F>(
  file: F,
  env: config::Environment,
) -> Result<ServerConfig, ConfigError>
where
  F: config::Source + Send + Sync + 'static,
{
  config::Config::builder()
    .add_source(file)
    .add_source(env)
    .build()?
    .try_deserialize()
}

// ─── Application ──────────────────────────────────────────────────────────────

/// The API router with request tracing attached.
pub fn app<S>(service: Arc<ReviewService<S>>) -> Router
where
  S: CardStore + 'static,
{
  leitner_api::api_router(service).layer(TraceLayer::new_for_http())
}
