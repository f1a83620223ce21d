//! Handler for `POST /help`.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
};
use tarea_core::{
  help::{HelpGuidance, HelpRequest, request_help},
  store::{RecordStore, load_snapshot},
};

use crate::{ApiState, Clock, error::ApiError};

/// `POST /help[?as_of=<datetime>]`, body
/// `{"task_id": 1, "kind": "explicacion", "message": "..."}`.
pub async fn handler<S, B>(
  State(state): State<Arc<ApiState<S, B>>>,
  Query(clock): Query<Clock>,
  Json(request): Json<HelpRequest>,
) -> Result<Json<HelpGuidance>, ApiError>
where
  S: RecordStore,
{
  let snapshot = load_snapshot(&state.store).await.map_err(ApiError::store)?;
  Ok(Json(request_help(&snapshot, &request, clock.now())?))
}
