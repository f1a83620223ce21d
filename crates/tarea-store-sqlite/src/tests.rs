//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::NaiveDate;
use serde_json::json;
use tarea_core::{
  derive::TaskStatus,
  identity::MatchMode,
  store::{RecordKey, RecordStore, load_snapshot, save_session, save_users},
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

// ─── Raw blobs ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn missing_key_reads_none() {
  let s = store().await;
  assert_eq!(s.get(RecordKey::Users).await.unwrap(), None);
}

#[tokio::test]
async fn set_then_get() {
  let s = store().await;
  s.set(RecordKey::Subjects, "[]".into()).await.unwrap();
  assert_eq!(s.get(RecordKey::Subjects).await.unwrap().as_deref(), Some("[]"));
}

#[tokio::test]
async fn set_overwrites() {
  let s = store().await;
  s.set(RecordKey::Session, "{\"email\":\"a@x\"}".into()).await.unwrap();
  s.set(RecordKey::Session, "{\"email\":\"b@x\"}".into()).await.unwrap();

  assert_eq!(
    s.get(RecordKey::Session).await.unwrap().as_deref(),
    Some("{\"email\":\"b@x\"}")
  );
  assert_eq!(s.list_records().await.unwrap().len(), 1);
}

#[tokio::test]
async fn remove_is_idempotent() {
  let s = store().await;
  s.set(RecordKey::Session, "{}".into()).await.unwrap();
  s.remove(RecordKey::Session).await.unwrap();
  s.remove(RecordKey::Session).await.unwrap();
  assert_eq!(s.get(RecordKey::Session).await.unwrap(), None);
}

#[tokio::test]
async fn keys_are_independent() {
  let s = store().await;
  s.set(RecordKey::Users, "[1]".into()).await.unwrap();
  s.set(RecordKey::Subjects, "[2]".into()).await.unwrap();
  s.remove(RecordKey::Users).await.unwrap();
  assert_eq!(s.get(RecordKey::Subjects).await.unwrap().as_deref(), Some("[2]"));
}

#[tokio::test]
async fn list_records_orders_by_key() {
  let s = store().await;
  s.set(RecordKey::Users, "[]".into()).await.unwrap();
  s.set(RecordKey::Session, "{}".into()).await.unwrap();
  s.set(RecordKey::Subjects, "[]".into()).await.unwrap();

  let keys: Vec<_> = s.list_records().await.unwrap().into_iter().map(|(k, _)| k).collect();
  assert_eq!(keys, [RecordKey::Session, RecordKey::Subjects, RecordKey::Users]);
}

// ─── Snapshot round trip ─────────────────────────────────────────────────────

#[tokio::test]
async fn snapshot_survives_reopen() {
  let dir = std::env::temp_dir().join(format!("tarea-store-{}", std::process::id()));
  std::fs::create_dir_all(&dir).unwrap();
  let path = dir.join("store.db");
  let _ = std::fs::remove_file(&path);

  {
    let s = SqliteStore::open(&path).await.unwrap();
    s.set(
      RecordKey::Users,
      json!([{ "email": "ana@example.com", "tareas": [
        { "id": 1, "titulo": "Informe", "fechaEntrega": "2025-01-01", "completada": false }
      ]}])
      .to_string(),
    )
    .await
    .unwrap();
    s.set(RecordKey::Session, json!({ "email": "ana@example.com" }).to_string())
      .await
      .unwrap();
  }

  let s = SqliteStore::open(&path).await.unwrap();
  let mut snapshot = load_snapshot(&s).await.unwrap();
  snapshot.users[0].tasks[0]["completada"] = json!(true);
  save_users(&s, &snapshot.users).await.unwrap();

  let now = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap().and_hms_opt(8, 0, 0).unwrap();
  let reread = load_snapshot(&s).await.unwrap();
  let derived = reread.derived_tasks(MatchMode::Exact, now);
  assert_eq!(derived[0].status, TaskStatus::Completed);

  save_session(&s, None).await.unwrap();
  assert!(load_snapshot(&s).await.unwrap().session.is_none());

  drop(s);
  let _ = std::fs::remove_dir_all(&dir);
}
