//! SQL schema for the tarea SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per named blob. The value is the JSON text exactly as written.
CREATE TABLE IF NOT EXISTS records (
    key         TEXT PRIMARY KEY,  -- 'users' | 'session' | 'subjects'
    value       TEXT NOT NULL,
    updated_at  TEXT NOT NULL      -- ISO 8601 UTC
);

PRAGMA user_version = 1;
";
