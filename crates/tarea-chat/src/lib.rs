//! Study-assistant chat.
//!
//! A [`Chatbot`] forwards the student's message to a remote
//! [`ChatBackend`] (Gemini in production), bounds each attempt by a deadline,
//! retries once, and answers from a local keyword responder when the remote
//! side cannot. It never fails.

pub mod chatbot;
pub mod config;
pub mod error;
pub mod fallback;
pub mod gemini;

pub use chatbot::{ChatBackend, Chatbot};
pub use config::ChatConfig;
pub use error::{ChatError, Result};
pub use fallback::{ChatReply, Resource, ResourceKind, fallback_reply};
pub use gemini::GeminiBackend;
