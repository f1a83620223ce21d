//! [`GeminiBackend`], a [`ChatBackend`] over Google's `generateContent` API.

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use crate::{ChatBackend, ChatConfig, ChatError, Result};

/// Answer used when the backend returns no candidates.
pub const NO_ANSWER: &str = "No pude entender eso.";

#[derive(Serialize)]
struct GenerateRequest<'a> {
  contents: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
  parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
  text: &'a str,
}

impl<'a> GenerateRequest<'a> {
  fn new(text: &'a str) -> Self {
    Self { contents: [Content { parts: [Part { text }] }] }
  }
}

/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct GeminiBackend {
  client:  Client,
  api_url: String,
  api_key: String,
}

impl GeminiBackend {
  /// Deadlines are enforced by [`crate::Chatbot`], not by the client.
  pub fn new(config: &ChatConfig) -> Result<Self> {
    let client = Client::builder().build()?;
    Ok(Self {
      client,
      api_url: config.api_url.clone(),
      api_key: config.api_key.clone(),
    })
  }
}

impl std::fmt::Debug for GeminiBackend {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("GeminiBackend")
      .field("api_url", &self.api_url)
      .finish_non_exhaustive()
  }
}

impl ChatBackend for GeminiBackend {
  fn name(&self) -> &str { "gemini" }

  async fn generate(&self, prompt: &str) -> Result<String> {
    let resp = self
      .client
      .post(&self.api_url)
      .query(&[("key", self.api_key.as_str())])
      .json(&GenerateRequest::new(prompt))
      .send()
      .await?;

    let status = resp.status();
    if !status.is_success() {
      let body = resp.text().await.unwrap_or_default();
      return Err(ChatError::Status { status, body });
    }

    let body: Value = resp.json().await?;
    extract_text(&body)
  }
}

/// Pull the first candidate's text out of a `generateContent` response.
pub fn extract_text(body: &Value) -> Result<String> {
  let candidates = match body.get("candidates") {
    None | Some(Value::Null) => return Ok(NO_ANSWER.to_owned()),
    Some(Value::Array(c)) if c.is_empty() => return Ok(NO_ANSWER.to_owned()),
    Some(Value::Array(c)) => c,
    Some(other) => {
      return Err(ChatError::MalformedResponse(format!("candidates is not a list: {other}")));
    }
  };

  candidates[0]
    .pointer("/content/parts/0/text")
    .and_then(Value::as_str)
    .map(str::to_owned)
    .ok_or_else(|| ChatError::MalformedResponse("first candidate has no text part".into()))
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn request_body_shape() {
    let body = serde_json::to_value(GenerateRequest::new("hola")).unwrap();
    assert_eq!(body, json!({ "contents": [{ "parts": [{ "text": "hola" }] }] }));
  }

  #[test]
  fn reads_first_candidate() {
    let body = json!({
      "candidates": [
        { "content": { "parts": [{ "text": "primera" }, { "text": "segunda" }] } },
        { "content": { "parts": [{ "text": "otra" }] } }
      ]
    });
    assert_eq!(extract_text(&body).unwrap(), "primera");
  }

  #[test]
  fn no_candidates_is_a_canned_answer() {
    assert_eq!(extract_text(&json!({})).unwrap(), NO_ANSWER);
    assert_eq!(extract_text(&json!({ "candidates": [] })).unwrap(), NO_ANSWER);
  }

  #[test]
  fn other_shapes_are_malformed() {
    let err = extract_text(&json!({ "candidates": [{ "content": {} }] })).unwrap_err();
    assert!(matches!(err, ChatError::MalformedResponse(_)));
    assert!(!err.is_retryable());
    assert!(extract_text(&json!({ "candidates": "x" })).is_err());
  }
}
