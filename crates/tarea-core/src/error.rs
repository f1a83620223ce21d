//! Error types for `tarea-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("no user registered under {0:?}")]
  UserNotFound(String),

  #[error("{0}")]
  Rejected(#[from] Rejection),

  #[error("task {0} not found")]
  TaskNotFound(i64),

  #[error("password hashing failed: {0}")]
  PasswordHash(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

/// A validation failure on user-entered data. The message is shown to the
/// user as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
  #[error("name is required")]
  MissingName,

  #[error("email is required")]
  MissingEmail,

  #[error("email {0:?} is already registered to another user")]
  EmailTaken(String),

  #[error("new password and confirmation do not match")]
  PasswordMismatch,

  #[error("password must be at least {min} characters long")]
  PasswordTooShort { min: usize },

  #[error("current password is incorrect")]
  WrongPassword,

  #[error("describe your question or problem")]
  MissingMessage,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
