//! Handler for `POST /chat`.

use std::sync::Arc;

use axum::{Json, extract::State};
use serde::Deserialize;
use tarea_chat::{ChatBackend, ChatReply};

use crate::{ApiState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct ChatBody {
  pub message: String,
}

/// `POST /chat`, body `{"message": "..."}`. Always answers; backend failures
/// end in the local responder.
pub async fn handler<S, B>(
  State(state): State<Arc<ApiState<S, B>>>,
  Json(body): Json<ChatBody>,
) -> Result<Json<ChatReply>, ApiError>
where
  B: ChatBackend,
{
  let message = body.message.trim();
  if message.is_empty() {
    return Err(ApiError::BadRequest("message is required".into()));
  }
  Ok(Json(state.chat.reply(message).await))
}

#[cfg(test)]
mod tests {
  use std::{sync::Arc, time::Duration};

  use axum::http::StatusCode;
  use serde_json::json;
  use tarea_chat::Chatbot;
  use tarea_core::store::MemoryStore;

  use crate::{
    ApiState,
    test_support::{Offline, send, state},
  };

  #[tokio::test]
  async fn mock_answers_by_keyword() {
    let (status, body) = send(
      state(MemoryStore::new()),
      "POST",
      "/chat",
      Some(json!({ "message": "¿Cómo organizo mi plan de estudio?" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["resources"].as_array().unwrap().len(), 2);
    assert_eq!(body["resources"][0]["type"], json!("video"));
  }

  #[tokio::test]
  async fn failing_backend_still_answers() {
    let st = Arc::new(ApiState::new(
      MemoryStore::new(),
      Chatbot::new(Offline, Duration::from_secs(1)),
    ));
    let (status, body) =
      send(st.clone(), "POST", "/chat", Some(json!({ "message": "examen" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["text"].as_str().unwrap().contains("cuestionario"));
    assert_eq!(st.chat.fallback_count(), 1);
  }

  #[tokio::test]
  async fn blank_message_is_rejected() {
    let (status, _) =
      send(state(MemoryStore::new()), "POST", "/chat", Some(json!({ "message": "  " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }
}
