//! The `RecordStore` trait and the typed snapshot read on top of it.
//!
//! The store itself is an opaque key-value store of JSON strings, keyed by
//! [`RecordKey`]. Backends implement [`RecordStore`] (e.g.
//! `tarea-store-sqlite`, or [`MemoryStore`] here). Everything above the
//! backend works on a [`Snapshot`] passed in explicitly.

use std::{
  collections::HashMap,
  convert::Infallible,
  future::Future,
  sync::{PoisonError, RwLock},
};

use chrono::NaiveDateTime;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use thiserror::Error;

use crate::{
  Result,
  derive::{DerivedTask, derive_all},
  identity::{MatchMode, find_user, find_user_by_any},
  record::{RawTask, Session, SubjectRecord, UserRecord},
};

// ─── Keys ────────────────────────────────────────────────────────────────────

/// The named blobs held by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKey {
  Users,
  Session,
  Subjects,
}

impl RecordKey {
  pub const ALL: [Self; 3] = [Self::Users, Self::Session, Self::Subjects];

  /// Key under which the blob is stored.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Users => "users",
      Self::Session => "session",
      Self::Subjects => "subjects",
    }
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the external key-value store.
///
/// Values are opaque strings; decoding happens in [`load_snapshot`]. All
/// methods return `Send` futures so the trait can sit behind an axum router.
pub trait RecordStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Read a blob. `None` if it was never written.
  fn get(
    &self,
    key: RecordKey,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + '_;

  /// Replace a blob.
  fn set(
    &self,
    key: RecordKey,
    value: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Delete a blob. Deleting a missing blob is not an error.
  fn remove(&self, key: RecordKey) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}

/// Failure reading or writing the store.
#[derive(Debug, Error)]
pub enum StoreError<E: std::error::Error + 'static> {
  #[error("store backend error: {0}")]
  Backend(#[source] E),

  #[error("could not encode {key} blob: {source}")]
  Encode {
    key:    &'static str,
    #[source]
    source: serde_json::Error,
  },
}

// ─── Snapshot ────────────────────────────────────────────────────────────────

/// All three blobs, decoded, as read at one moment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
  pub users:    Vec<UserRecord>,
  pub session:  Option<Session>,
  pub subjects: Vec<SubjectRecord>,
}

impl Snapshot {
  /// Identifier of the signed-in user, if there is a session.
  pub fn active_identifier(&self) -> Option<&str> {
    self.session.as_ref().and_then(Session::identifier)
  }

  /// The signed-in user's record.
  ///
  /// [`MatchMode::Exact`] is the task screens' lookup: the session's `email`
  /// and `correo` compared as stored, ignoring `usuario`.
  /// [`MatchMode::CaseInsensitive`] is the profile lookup, keyed on
  /// [`Snapshot::active_identifier`].
  pub fn active_user(&self, mode: MatchMode) -> Result<&UserRecord> {
    match mode {
      MatchMode::Exact => {
        let wanted = self
          .session
          .as_ref()
          .map(Session::contact_identifiers)
          .unwrap_or_default();
        find_user_by_any(&self.users, &wanted, mode)
      }
      MatchMode::CaseInsensitive => {
        let identifier = self.active_identifier().unwrap_or_default();
        find_user(&self.users, identifier, mode)
      }
    }
  }

  /// The signed-in user's raw tasks; empty when there is no session or the
  /// user is unknown.
  pub fn active_tasks(&self, mode: MatchMode) -> Vec<RawTask> {
    match self.active_user(mode) {
      Ok(user) => user.tasks(),
      Err(e) => {
        tracing::debug!(error = %e, "no tasks for active session");
        Vec::new()
      }
    }
  }

  /// The signed-in user's tasks, derived and ordered by priority.
  pub fn derived_tasks(&self, mode: MatchMode, now: NaiveDateTime) -> Vec<DerivedTask> {
    derive_all(&self.active_tasks(mode), &self.subjects, now)
  }
}

/// Decode a blob. Missing blobs and decoding failures both yield the
/// default; failures are logged.
pub fn decode_blob<T: DeserializeOwned + Default>(key: RecordKey, raw: Option<&str>) -> T {
  let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
    return T::default();
  };
  match serde_json::from_str::<Option<T>>(raw) {
    Ok(value) => value.unwrap_or_default(),
    Err(error) => {
      tracing::warn!(key = key.as_str(), %error, "malformed blob, treating as empty");
      T::default()
    }
  }
}

/// Decode a blob holding a JSON array element by element. Elements that do
/// not decode are logged and dropped; the rest survive.
pub fn decode_list<T: DeserializeOwned>(key: RecordKey, raw: Option<&str>) -> Vec<T> {
  decode_blob::<Vec<Value>>(key, raw)
    .into_iter()
    .enumerate()
    .filter_map(|(index, value)| match serde_json::from_value(value) {
      Ok(item) => Some(item),
      Err(error) => {
        tracing::warn!(key = key.as_str(), index, %error, "skipping unreadable entry");
        None
      }
    })
    .collect()
}

/// Encode `value` and write it under `key`.
pub async fn save_blob<S: RecordStore, T: Serialize + ?Sized>(
  store: &S,
  key: RecordKey,
  value: &T,
) -> Result<(), StoreError<S::Error>> {
  let raw = serde_json::to_string(value)
    .map_err(|source| StoreError::Encode { key: key.as_str(), source })?;
  store.set(key, raw).await.map_err(StoreError::Backend)
}

/// Read and decode every blob.
pub async fn load_snapshot<S: RecordStore>(store: &S) -> Result<Snapshot, StoreError<S::Error>> {
  let users = store.get(RecordKey::Users).await.map_err(StoreError::Backend)?;
  let session = store.get(RecordKey::Session).await.map_err(StoreError::Backend)?;
  let subjects = store.get(RecordKey::Subjects).await.map_err(StoreError::Backend)?;

  let snapshot = Snapshot {
    users:    decode_list(RecordKey::Users, users.as_deref()),
    session:  decode_blob(RecordKey::Session, session.as_deref()),
    subjects: decode_list(RecordKey::Subjects, subjects.as_deref()),
  };
  tracing::debug!(
    users = snapshot.users.len(),
    subjects = snapshot.subjects.len(),
    session = snapshot.session.is_some(),
    "loaded snapshot"
  );
  Ok(snapshot)
}

/// Write the users collection back.
pub async fn save_users<S: RecordStore>(
  store: &S,
  users: &[UserRecord],
) -> Result<(), StoreError<S::Error>> {
  save_blob(store, RecordKey::Users, users).await
}

/// Write the session back, or clear it.
pub async fn save_session<S: RecordStore>(
  store: &S,
  session: Option<&Session>,
) -> Result<(), StoreError<S::Error>> {
  match session {
    Some(session) => save_blob(store, RecordKey::Session, session).await,
    None => store.remove(RecordKey::Session).await.map_err(StoreError::Backend),
  }
}

// ─── In-memory backend ───────────────────────────────────────────────────────

/// A [`RecordStore`] held in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
  blobs: RwLock<HashMap<RecordKey, String>>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  /// Builder-style seed for a blob.
  pub fn with(self, key: RecordKey, value: impl Into<String>) -> Self {
    self
      .blobs
      .write()
      .unwrap_or_else(PoisonError::into_inner)
      .insert(key, value.into());
    self
  }
}

impl RecordStore for MemoryStore {
  type Error = Infallible;

  async fn get(&self, key: RecordKey) -> Result<Option<String>, Infallible> {
    let blobs = self.blobs.read().unwrap_or_else(PoisonError::into_inner);
    Ok(blobs.get(&key).cloned())
  }

  async fn set(&self, key: RecordKey, value: String) -> Result<(), Infallible> {
    let mut blobs = self.blobs.write().unwrap_or_else(PoisonError::into_inner);
    blobs.insert(key, value);
    Ok(())
  }

  async fn remove(&self, key: RecordKey) -> Result<(), Infallible> {
    let mut blobs = self.blobs.write().unwrap_or_else(PoisonError::into_inner);
    blobs.remove(&key);
    Ok(())
  }
}
