//! HTTP server assembly for subtrack.
//!
//! Loads [`ServerConfig`] and mounts the JSON API from [`subtrack_api`] under
//! `/api/v1` next to a `/health` probe.

use std::{path::{Path, PathBuf}, sync::Arc};

use axum::{Json, Router, routing::get};
use serde::Deserialize;
use serde_json::{Value, json};
use subtrack_core::{service::SubscriptionService, store::SubscriptionStore};
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration.
///
/// Sources, lowest precedence first: built-in defaults, the TOML file given
/// to [`ServerConfig::load`], then `SUBTRACK_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
}

impl ServerConfig {
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .set_default("host", "127.0.0.1")?
      .set_default("port", 8080)?
      .set_default("store_path", "subscriptions.db")?
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("SUBTRACK").try_parsing(true))
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router for `service`.
pub fn router<S>(service: Arc<SubscriptionService<S>>) -> Router
where
  S: SubscriptionStore + 'static,
{
  Router::new()
    .route("/health", get(health))
    .nest("/api/v1", subtrack_api::api_router(service))
    .layer(TraceLayer::new_for_http())
}

async fn health() -> Json<Value> { Json(json!({ "status": "ok" })) }
