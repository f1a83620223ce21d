//! Chat settings, as read from the `[chat]` table of the server config.

use std::time::Duration;

use serde::Deserialize;

pub const DEFAULT_API_URL: &str =
  "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent";

pub const DEFAULT_TIMEOUT_SECS: u64 = 45;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
  pub api_url:      String,
  pub api_key:      String,
  /// Deadline for a single attempt.
  pub timeout_secs: u64,
  /// Answer from the local responder without calling the backend.
  pub use_mock:     bool,
}

impl Default for ChatConfig {
  fn default() -> Self {
    Self {
      api_url:      DEFAULT_API_URL.to_owned(),
      api_key:      String::new(),
      timeout_secs: DEFAULT_TIMEOUT_SECS,
      use_mock:     false,
    }
  }
}

impl ChatConfig {
  pub fn timeout(&self) -> Duration { Duration::from_secs(self.timeout_secs) }

  /// Mock mode is forced when no API key is configured.
  pub fn is_mock(&self) -> bool { self.use_mock || self.api_key.trim().is_empty() }
}
