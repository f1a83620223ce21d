//! HTTP server wiring for tarea.
//!
//! Mounts the [`tarea_api`] router under `/api` with request tracing, and
//! holds the server configuration and the import path used by the binary.

pub mod error;
pub mod import;

pub use error::{Error, Result};

use std::{path::PathBuf, sync::Arc};

use axum::Router;
use serde::Deserialize;
use tarea_api::{ApiState, api_router};
use tarea_chat::{ChatBackend, ChatConfig};
use tarea_core::store::RecordStore;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `TAREA_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
  pub chat:       ChatConfig,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:       "127.0.0.1".to_owned(),
      port:       8080,
      store_path: PathBuf::from("~/.local/share/tarea/tarea.db"),
      chat:       ChatConfig::default(),
    }
  }
}

impl ServerConfig {
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the application [`Router`].
pub fn router<S, B>(state: Arc<ApiState<S, B>>) -> Router
where
  S: RecordStore + 'static,
  B: ChatBackend + 'static,
{
  Router::new()
    .nest("/api", api_router(state))
    .layer(TraceLayer::new_for_http())
}
