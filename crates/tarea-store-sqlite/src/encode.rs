//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings; keys as their wire names.

use chrono::{DateTime, Utc};
use tarea_core::store::RecordKey;

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── RecordKey ───────────────────────────────────────────────────────────────

pub fn encode_key(key: RecordKey) -> &'static str { key.as_str() }

pub fn decode_key(s: &str) -> Result<RecordKey> {
  RecordKey::ALL
    .into_iter()
    .find(|k| k.as_str() == s)
    .ok_or_else(|| Error::UnknownKey(s.to_owned()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `records` row, without the value.
pub struct RawRecordInfo {
  pub key:        String,
  pub updated_at: String,
}

impl RawRecordInfo {
  pub fn decode(self) -> Result<(RecordKey, DateTime<Utc>)> {
    Ok((decode_key(&self.key)?, decode_dt(&self.updated_at)?))
  }
}
