//! Handler for `GET /subjects`.

use std::sync::Arc;

use axum::{Json, extract::State};
use tarea_core::{
  record::SubjectRecord,
  store::{RecordStore, load_snapshot},
};

use crate::{ApiState, error::ApiError};

/// `GET /subjects`
pub async fn list<S, B>(
  State(state): State<Arc<ApiState<S, B>>>,
) -> Result<Json<Vec<SubjectRecord>>, ApiError>
where
  S: RecordStore,
{
  let snapshot = load_snapshot(&state.store).await.map_err(ApiError::store)?;
  Ok(Json(snapshot.subjects))
}

#[cfg(test)]
mod tests {
  use axum::http::StatusCode;
  use serde_json::json;

  use crate::test_support::{seeded_store, send, state};

  #[tokio::test]
  async fn lists_the_collection_as_stored() {
    let (status, body) = send(state(seeded_store()), "GET", "/subjects", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[1], json!({ "id": 2, "nombre": "Historia", "color": "#f00" }));
  }
}
