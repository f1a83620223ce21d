//! Seeding the store from a JSON export.
//!
//! The file is one JSON object mapping blob names to blobs. Both the store's
//! own key names and the legacy browser-storage names are accepted:
//!
//! | Store key  | Also accepted   |
//! |------------|-----------------|
//! | `users`    | `usuarios`      |
//! | `session`  | `usuarioActivo` |
//! | `subjects` | `materias`      |
//!
//! A string value is stored verbatim as the raw blob; any other value is
//! serialised first. `null` clears the blob.

use serde_json::{Map, Value};
use tarea_core::store::{RecordKey, RecordStore};

use crate::{Error, Result};

/// Legacy name for each key.
pub fn legacy_name(key: RecordKey) -> &'static str {
  match key {
    RecordKey::Users => "usuarios",
    RecordKey::Session => "usuarioActivo",
    RecordKey::Subjects => "materias",
  }
}

fn kind_of(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "a boolean",
    Value::Number(_) => "a number",
    Value::String(_) => "a string",
    Value::Array(_) => "an array",
    Value::Object(_) => "an object",
  }
}

fn pick<'a>(object: &'a Map<String, Value>, key: RecordKey) -> Option<&'a Value> {
  let current = object.get(key.as_str());
  let legacy = object.get(legacy_name(key));
  if current.is_some() && legacy.is_some() {
    tracing::warn!(
      key = key.as_str(),
      legacy = legacy_name(key),
      "both names present, using the current one"
    );
  }
  current.or(legacy)
}

/// Write every blob found in `document`. Returns the keys written or
/// cleared, in [`RecordKey::ALL`] order.
pub async fn import_blobs<S: RecordStore>(store: &S, document: &Value) -> Result<Vec<RecordKey>> {
  let Value::Object(object) = document else {
    return Err(Error::NotAnObject(kind_of(document)));
  };

  for name in object.keys() {
    let known = RecordKey::ALL
      .iter()
      .any(|k| k.as_str() == name || legacy_name(*k) == name);
    if !known {
      tracing::warn!(name = %name, "ignoring unknown blob in import file");
    }
  }

  let mut written = Vec::new();
  for key in RecordKey::ALL {
    let Some(value) = pick(object, key) else {
      continue;
    };

    match value {
      Value::Null => {
        store.remove(key).await.map_err(|e| Error::Store(Box::new(e)))?;
      }
      Value::String(raw) => {
        if serde_json::from_str::<Value>(raw).is_err() {
          tracing::warn!(key = key.as_str(), "raw blob is not valid JSON; it will load as empty");
        }
        store.set(key, raw.clone()).await.map_err(|e| Error::Store(Box::new(e)))?;
      }
      other => {
        let raw = serde_json::to_string(other)
          .map_err(|source| Error::Encode { key: key.as_str(), source })?;
        store.set(key, raw).await.map_err(|e| Error::Store(Box::new(e)))?;
      }
    }
    tracing::info!(key = key.as_str(), "imported blob");
    written.push(key);
  }

  Ok(written)
}
