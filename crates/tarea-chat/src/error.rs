//! Error type for `tarea-chat`.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChatError {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("chat backend answered {status}: {body}")]
  Status {
    status: reqwest::StatusCode,
    body:   String,
  },

  #[error("chat backend did not answer within {0:?}")]
  Timeout(Duration),

  #[error("malformed chat response: {0}")]
  MalformedResponse(String),
}

impl ChatError {
  /// Transport-level failures worth a second attempt. A response that
  /// arrived but could not be read is not retried.
  pub fn is_retryable(&self) -> bool {
    !matches!(self, Self::MalformedResponse(_))
  }
}

pub type Result<T, E = ChatError> = std::result::Result<T, E>;
