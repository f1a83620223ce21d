//! Error type for the import path.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("import file must hold a JSON object, found {0}")]
  NotAnObject(&'static str),

  #[error("could not encode {key} blob: {source}")]
  Encode {
    key:    &'static str,
    #[source]
    source: serde_json::Error,
  },

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
