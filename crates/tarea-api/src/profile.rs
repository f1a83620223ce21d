//! Handlers for `/profile` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/profile` | Optional `?as_of=` for the statistics |
//! | `PUT`  | `/profile` | Body: [`ProfileUpdate`]; returns the new profile |
//! | `POST` | `/profile/password` | Body: [`PasswordChange`]; 204 on success |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
  http::StatusCode,
};
use tarea_core::{
  profile::{
    PasswordChange, ProfileUpdate, ProfileView, apply_profile_update, change_active_password,
    profile_view,
  },
  store::{RecordStore, load_snapshot, save_session, save_users},
};

use crate::{ApiState, Clock, error::ApiError};

/// `GET /profile`
pub async fn show<S, B>(
  State(state): State<Arc<ApiState<S, B>>>,
  Query(clock): Query<Clock>,
) -> Result<Json<ProfileView>, ApiError>
where
  S: RecordStore,
{
  let snapshot = load_snapshot(&state.store).await.map_err(ApiError::store)?;
  Ok(Json(profile_view(&snapshot, clock.now())))
}

/// `PUT /profile`
pub async fn update<S, B>(
  State(state): State<Arc<ApiState<S, B>>>,
  Query(clock): Query<Clock>,
  Json(body): Json<ProfileUpdate>,
) -> Result<Json<ProfileView>, ApiError>
where
  S: RecordStore,
{
  let mut snapshot = load_snapshot(&state.store).await.map_err(ApiError::store)?;
  let user_updated = apply_profile_update(&mut snapshot, &body)?;

  if user_updated {
    save_users(&state.store, &snapshot.users).await.map_err(ApiError::store)?;
  }
  save_session(&state.store, snapshot.session.as_ref())
    .await
    .map_err(ApiError::store)?;

  tracing::info!(user_updated, "profile updated");
  Ok(Json(profile_view(&snapshot, clock.now())))
}

/// `POST /profile/password`
pub async fn change_password<S, B>(
  State(state): State<Arc<ApiState<S, B>>>,
  Json(body): Json<PasswordChange>,
) -> Result<StatusCode, ApiError>
where
  S: RecordStore,
{
  let mut snapshot = load_snapshot(&state.store).await.map_err(ApiError::store)?;
  change_active_password(&mut snapshot, &body)?;
  save_users(&state.store, &snapshot.users).await.map_err(ApiError::store)?;

  tracing::info!("password changed");
  Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
  use axum::http::StatusCode;
  use serde_json::json;
  use tarea_core::{
    password::verify_password,
    store::{MemoryStore, RecordKey, RecordStore as _, load_snapshot},
  };

  use crate::test_support::{seeded_store, send, state};

  #[tokio::test]
  async fn shows_profile_with_stats() {
    let (status, body) =
      send(state(seeded_store()), "GET", "/profile?as_of=2025-06-10T12:00:00", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], json!("Ana"));
    assert_eq!(body["email"], json!("ana@example.com"));
    assert_eq!(
      body["stats"],
      json!({ "active_subjects": 2, "completed": 1, "completion_pct": 25, "study_hours": 2 })
    );
  }

  #[tokio::test]
  async fn no_session_is_an_empty_profile() {
    let (status, body) = send(state(MemoryStore::new()), "GET", "/profile", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], json!(null));
    assert_eq!(body["stats"]["completed"], json!(0));
  }

  #[tokio::test]
  async fn update_persists_user_and_session() {
    let st = state(seeded_store());
    let (status, body) = send(
      st.clone(),
      "PUT",
      "/profile",
      Some(json!({ "name": "Ana María", "email": "ana.m@example.com", "semester": 4 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["email"], json!("ana.m@example.com"));
    assert_eq!(body["semester"], json!(4));

    let snapshot = load_snapshot(&st.store).await.unwrap();
    assert_eq!(snapshot.users[0].name.as_deref(), Some("Ana María"));
    assert_eq!(snapshot.active_identifier(), Some("ana.m@example.com"));

    // Tasks remain reachable through the exact lookup.
    let (_, dash) = send(st, "GET", "/dashboard?as_of=2025-06-10T12:00:00", None).await;
    assert_eq!(dash["tasks"].as_array().unwrap().len(), 4);
  }

  #[tokio::test]
  async fn update_rejects_duplicate_email() {
    let st = state(seeded_store());
    let before = st.store.get(RecordKey::Users).await.unwrap();
    let (status, body) = send(
      st.clone(),
      "PUT",
      "/profile",
      Some(json!({ "name": "Ana", "email": "LUIS@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("already registered"));
    assert_eq!(st.store.get(RecordKey::Users).await.unwrap(), before);
  }

  #[tokio::test]
  async fn update_rejects_blank_name() {
    let (status, _) = send(
      state(seeded_store()),
      "PUT",
      "/profile",
      Some(json!({ "name": " ", "email": "ana@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn password_change_stores_a_hash() {
    let st = state(seeded_store());
    let (status, _) = send(
      st.clone(),
      "POST",
      "/profile/password",
      Some(json!({ "current": "viejo123", "new": "nuevo123", "confirm": "nuevo123" })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let snapshot = load_snapshot(&st.store).await.unwrap();
    let stored = snapshot.users[0].password.clone().unwrap();
    assert!(stored.starts_with("$argon2"));
    assert!(verify_password(&stored, "nuevo123"));
  }

  #[tokio::test]
  async fn password_change_validation_errors() {
    let st = state(seeded_store());
    for body in [
      json!({ "current": "viejo123", "new": "nuevo123", "confirm": "otro1234" }),
      json!({ "current": "viejo123", "new": "abc", "confirm": "abc" }),
      json!({ "current": "mal", "new": "nuevo123", "confirm": "nuevo123" }),
    ] {
      let (status, resp) = send(st.clone(), "POST", "/profile/password", Some(body)).await;
      assert_eq!(status, StatusCode::BAD_REQUEST, "{resp}");
    }
  }

  #[tokio::test]
  async fn password_change_without_user_is_not_found() {
    let store = MemoryStore::new()
      .with(RecordKey::Session, json!({ "usuario": "ghost@example.com" }).to_string());
    let (status, _) = send(
      state(store),
      "POST",
      "/profile/password",
      Some(json!({ "current": "", "new": "nuevo123", "confirm": "nuevo123" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }
}
