//! Core types and engines for the Tarea task tracker.
//!
//! Raw records are read from an opaque key-value store (see [`store`]) and
//! turned into view models on every read: [`derive`] computes task status and
//! urgency, [`stats`] reduces derived tasks into per-user statistics, and
//! [`query`] filters tasks for the search screen. Derived values are never
//! written back; [`profile`] edits are the only writes.
//!
//! This crate has no HTTP or database dependencies.

pub mod derive;
pub mod error;
pub mod help;
pub mod identity;
pub mod password;
pub mod profile;
pub mod query;
pub mod record;
pub mod stats;
pub mod store;

pub use error::{Error, Rejection, Result};
