//! [`SqliteStore`], the SQLite implementation of [`RecordStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;
use tarea_core::store::{RecordKey, RecordStore};

use crate::{
  Result,
  encode::{RawRecordInfo, encode_dt, encode_key},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A tarea record store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Every stored key with the time it was last written, ordered by key.
  pub async fn list_records(&self) -> Result<Vec<(RecordKey, DateTime<Utc>)>> {
    let raws: Vec<RawRecordInfo> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT key, updated_at FROM records ORDER BY key")?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawRecordInfo { key: row.get(0)?, updated_at: row.get(1)? })
          })?
          .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRecordInfo::decode).collect()
  }
}

// ─── RecordStore impl ────────────────────────────────────────────────────────

impl RecordStore for SqliteStore {
  type Error = crate::Error;

  async fn get(&self, key: RecordKey) -> Result<Option<String>> {
    let key_str = encode_key(key);

    let value = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT value FROM records WHERE key = ?1",
              rusqlite::params![key_str],
              |row| row.get::<_, String>(0),
            )
            .optional()?,
        )
      })
      .await?;

    Ok(value)
  }

  async fn set(&self, key: RecordKey, value: String) -> Result<()> {
    let key_str = encode_key(key);
    let at_str = encode_dt(Utc::now());
    let len = value.len();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO records (key, value, updated_at) VALUES (?1, ?2, ?3)
           ON CONFLICT(key) DO UPDATE SET value = excluded.value,
                                          updated_at = excluded.updated_at",
          rusqlite::params![key_str, value, at_str],
        )?;
        Ok(())
      })
      .await?;

    tracing::debug!(key = key_str, bytes = len, "record written");
    Ok(())
  }

  async fn remove(&self, key: RecordKey) -> Result<()> {
    let key_str = encode_key(key);

    self
      .conn
      .call(move |conn| {
        conn.execute("DELETE FROM records WHERE key = ?1", rusqlite::params![key_str])?;
        Ok(())
      })
      .await?;

    tracing::debug!(key = key_str, "record removed");
    Ok(())
  }
}
