//! The [`ChatBackend`] seam and the [`Chatbot`] that wraps it with a
//! deadline, one retry and the local fallback.

use std::{
  future::Future,
  sync::atomic::{AtomicU32, Ordering},
  time::Duration,
};

use crate::{ChatConfig, ChatError, ChatReply, Result, fallback_reply};

/// Attempts made against the backend before falling back.
pub const MAX_ATTEMPTS: u32 = 2;

/// A remote text generator.
pub trait ChatBackend: Send + Sync {
  fn name(&self) -> &str;

  /// Generate a reply to `prompt`.
  fn generate(&self, prompt: &str) -> impl Future<Output = Result<String>> + Send;
}

pub struct Chatbot<B> {
  /// `None` in mock mode.
  backend:        Option<B>,
  timeout:        Duration,
  fallback_count: AtomicU32,
}

impl<B: ChatBackend> Chatbot<B> {
  pub fn new(backend: B, timeout: Duration) -> Self {
    Self { backend: Some(backend), timeout, fallback_count: AtomicU32::new(0) }
  }

  /// A chatbot that only ever answers from the local responder.
  pub fn mock() -> Self {
    Self { backend: None, timeout: Duration::ZERO, fallback_count: AtomicU32::new(0) }
  }

  /// Build from config, constructing the backend only outside mock mode.
  pub fn from_config(
    config: &ChatConfig,
    make_backend: impl FnOnce(&ChatConfig) -> Result<B>,
  ) -> Result<Self> {
    if config.is_mock() {
      return Ok(Self::mock());
    }
    Ok(Self::new(make_backend(config)?, config.timeout()))
  }

  pub fn is_mock(&self) -> bool { self.backend.is_none() }

  /// Number of replies that had to come from the local responder after the
  /// backend failed.
  pub fn fallback_count(&self) -> u32 { self.fallback_count.load(Ordering::Relaxed) }

  async fn attempt(&self, backend: &B, message: &str) -> Result<String> {
    match tokio::time::timeout(self.timeout, backend.generate(message)).await {
      Ok(result) => result,
      Err(_) => Err(ChatError::Timeout(self.timeout)),
    }
  }

  /// Answer `message`. Never fails: backend errors end in the local reply.
  pub async fn reply(&self, message: &str) -> ChatReply {
    let Some(backend) = &self.backend else {
      return fallback_reply(message);
    };

    for attempt in 1..=MAX_ATTEMPTS {
      match self.attempt(backend, message).await {
        Ok(text) => return ChatReply::text(text),
        Err(e) => {
          tracing::warn!(backend = backend.name(), attempt, error = %e, "chat request failed");
          if !e.is_retryable() {
            break;
          }
        }
      }
    }

    self.fallback_count.fetch_add(1, Ordering::Relaxed);
    tracing::warn!(backend = backend.name(), "falling back to local chat responder");
    fallback_reply(message)
  }
}

impl<B: ChatBackend> std::fmt::Debug for Chatbot<B> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Chatbot")
      .field("backend", &self.backend.as_ref().map(ChatBackend::name))
      .field("timeout", &self.timeout)
      .field("fallback_count", &self.fallback_count())
      .finish()
  }
}
