//! Handler for `GET /search`.
//!
//! Lateness here is judged by date only; see [`tarea_core::query`].

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
};
use chrono::NaiveDateTime;
use serde::Deserialize;
use tarea_core::{
  identity::MatchMode,
  query::{EnrichedTask, StatusFilter, enrich, search},
  store::{RecordStore, load_snapshot},
};

use crate::{ApiState, Clock, error::ApiError};

#[derive(Debug, Deserialize, Default)]
pub struct SearchParams {
  /// `todas`, `pendiente`, `completada` or `atrasada`. Defaults to `todas`.
  pub filter: Option<String>,
  /// Free-text term over title, subject name and description.
  pub term:   Option<String>,
  pub as_of:  Option<NaiveDateTime>,
}

/// `GET /search[?filter=...][&term=...][&as_of=...]`
pub async fn handler<S, B>(
  State(state): State<Arc<ApiState<S, B>>>,
  Query(params): Query<SearchParams>,
) -> Result<Json<Vec<EnrichedTask>>, ApiError>
where
  S: RecordStore,
{
  let filter = match params.filter.as_deref().map(str::trim) {
    None | Some("") => StatusFilter::default(),
    Some(s) => s.parse().map_err(|e| ApiError::BadRequest(format!("{e}")))?,
  };
  let today = Clock { as_of: params.as_of }.now().date();

  let snapshot = load_snapshot(&state.store).await.map_err(ApiError::store)?;
  let tasks = enrich(&snapshot.active_tasks(MatchMode::Exact), &snapshot.subjects, today);
  let found = search(&tasks, filter, params.term.as_deref().unwrap_or_default(), today);
  Ok(Json(found))
}

#[cfg(test)]
mod tests {
  use axum::http::StatusCode;
  use serde_json::{Value, json};

  use crate::test_support::{seeded_store, send, state};

  async fn ids(query: &str) -> Vec<Value> {
    let uri = format!("/search?as_of=2025-06-10T12:00:00&{query}");
    let (status, body) = send(state(seeded_store()), "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body.as_array().unwrap().iter().map(|t| t["task"]["id"].clone()).collect()
  }

  #[tokio::test]
  async fn late_filter_is_date_only() {
    // Task 2 is due today at 08:00: late on the dashboard, not here.
    assert_eq!(ids("filter=atrasada").await, [json!(1)]);
    assert_eq!(ids("filter=pendiente").await, [json!(2), json!(4)]);
    assert_eq!(ids("filter=completada").await, [json!(3)]);
  }

  #[tokio::test]
  async fn term_matches_title_and_subject() {
    assert_eq!(ids("term=ALGEBRA").await, [json!(1)]);
    assert_eq!(ids("term=historia").await, [json!(2), json!(4)]);
    assert_eq!(ids("filter=pendiente&term=historia").await, [json!(2), json!(4)]);
    assert_eq!(ids("filter=todas&term=").await.len(), 4);
  }

  #[tokio::test]
  async fn results_carry_subject_and_status() {
    let (_, body) = send(
      state(seeded_store()),
      "GET",
      "/search?as_of=2025-06-10T12:00:00&term=ensayo",
      None,
    )
    .await;
    assert_eq!(body[0]["subject_name"], json!("Historia"));
    assert_eq!(body[0]["subject_color"], json!("#f00"));
    assert_eq!(body[0]["status"], json!("pendiente"));
  }

  #[tokio::test]
  async fn unknown_filter_is_rejected() {
    let (status, body) =
      send(state(seeded_store()), "GET", "/search?filter=overdue", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("overdue"));
  }
}
