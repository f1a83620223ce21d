//! Handler for `GET /dashboard`.
//!
//! The signed-in user's tasks, derived at `as_of` (time-of-day precision) and
//! ordered by priority, with the summary counters.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
};
use serde::Serialize;
use tarea_core::{
  derive::DerivedTask,
  identity::MatchMode,
  stats::{DashboardStats, aggregate},
  store::{RecordStore, load_snapshot},
};

use crate::{ApiState, Clock, error::ApiError};

#[derive(Debug, Serialize)]
pub struct Dashboard {
  pub tasks: Vec<DerivedTask>,
  pub stats: DashboardStats,
}

/// `GET /dashboard[?as_of=<datetime>]`
pub async fn handler<S, B>(
  State(state): State<Arc<ApiState<S, B>>>,
  Query(clock): Query<Clock>,
) -> Result<Json<Dashboard>, ApiError>
where
  S: RecordStore,
{
  let snapshot = load_snapshot(&state.store).await.map_err(ApiError::store)?;
  let tasks = snapshot.derived_tasks(MatchMode::Exact, clock.now());
  let stats = aggregate(&tasks);
  Ok(Json(Dashboard { tasks, stats }))
}
