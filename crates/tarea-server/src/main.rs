//! tarea server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens an
//! in-process SQLite store, and serves the JSON API over HTTP.
//!
//! # Seeding the store
//!
//! ```
//! cargo run -p tarea-server -- --import export.json
//! ```
//!
//! # Password hash generation
//!
//! To generate an argon2 PHC string for a `contrasena` field in an import
//! file:
//!
//! ```
//! cargo run -p tarea-server -- --hash-password
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;
use tarea_api::ApiState;
use tarea_chat::{Chatbot, GeminiBackend};
use tarea_server::{ServerConfig, import::import_blobs};
use tarea_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "tarea study-planner server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Load blobs from a JSON export into the store and exit.
  #[arg(long, value_name = "FILE")]
  import: Option<PathBuf>,

  /// Print the argon2 hash for a password entered on stdin and exit.
  #[arg(long)]
  hash_password: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Helper mode: hash a password and exit.
  if cli.hash_password {
    let password = read_password()?;
    let hash = tarea_core::password::hash_password(&password)?;
    println!("{hash}");
    return Ok(());
  }

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("TAREA").separator("__"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  // Expand `~` in store path.
  let store_path = expand_tilde(&server_cfg.store_path);
  if let Some(parent) = store_path.parent().filter(|p| !p.as_os_str().is_empty()) {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {parent:?}"))?;
  }

  // Open SQLite store.
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  // Import mode: seed the store and exit.
  if let Some(path) = cli.import {
    let text = std::fs::read_to_string(&path)
      .with_context(|| format!("failed to read {path:?}"))?;
    let document: serde_json::Value = serde_json::from_str(&text)
      .with_context(|| format!("{path:?} is not valid JSON"))?;
    let written = import_blobs(&store, &document)
      .await
      .context("import failed")?;
    tracing::info!(blobs = written.len(), store = ?store_path, "import finished");
    return Ok(());
  }

  for (key, updated_at) in store.list_records().await.context("failed to list records")? {
    tracing::info!(key = key.as_str(), %updated_at, "stored blob");
  }

  // Build application state.
  let chat = Chatbot::from_config(&server_cfg.chat, GeminiBackend::new)
    .context("failed to build chat backend")?;
  if chat.is_mock() {
    tracing::info!("chat running in mock mode");
  }
  let state = Arc::new(ApiState::new(store, chat));

  let app = tarea_server::router(state);
  let address = server_cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Read a password from stdin.
fn read_password() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  let stdin = io::stdin();
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  stdin.lock().read_line(&mut line)?;
  Ok(
    line
      .trim_end_matches('\n')
      .trim_end_matches('\r')
      .to_string(),
  )
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
