//! JSON REST API for tarea.
//!
//! Exposes an axum [`Router`] backed by any [`RecordStore`] and any
//! [`ChatBackend`]. Auth, TLS, and transport concerns are the caller's
//! responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", tarea_api::api_router(state.clone()))
//! ```

pub mod chat;
pub mod dashboard;
pub mod error;
pub mod help;
pub mod profile;
pub mod search;
pub mod subjects;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use chrono::{Local, NaiveDateTime};
use serde::Deserialize;
use tarea_chat::{ChatBackend, Chatbot};
use tarea_core::store::RecordStore;

pub use error::ApiError;

/// Shared handler state.
pub struct ApiState<S, B> {
  pub store: S,
  pub chat:  Chatbot<B>,
}

impl<S, B> ApiState<S, B> {
  pub fn new(store: S, chat: Chatbot<B>) -> Self { Self { store, chat } }
}

/// Optional `?as_of=` override of the current time, e.g.
/// `as_of=2025-06-01T09:00:00`. Defaults to local now.
#[derive(Debug, Deserialize)]
pub struct Clock {
  pub as_of: Option<NaiveDateTime>,
}

impl Clock {
  pub fn now(&self) -> NaiveDateTime {
    self.as_of.unwrap_or_else(|| Local::now().naive_local())
  }
}

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, B>(state: Arc<ApiState<S, B>>) -> Router<()>
where
  S: RecordStore + 'static,
  B: ChatBackend + 'static,
{
  Router::new()
    .route("/dashboard", get(dashboard::handler::<S, B>))
    .route("/search", get(search::handler::<S, B>))
    .route("/subjects", get(subjects::list::<S, B>))
    .route("/profile", get(profile::show::<S, B>).put(profile::update::<S, B>))
    .route("/profile/password", post(profile::change_password::<S, B>))
    .route("/chat", post(chat::handler::<S, B>))
    .route("/help", post(help::handler::<S, B>))
    .with_state(state)
}
