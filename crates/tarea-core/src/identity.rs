//! Resolving users by identifier.
//!
//! A user's identifier may be stored under `email` or `correo`. Screens that
//! read the signed-in user's tasks match the identifier exactly as stored;
//! profile screens match case-insensitively, since a profile edit may have
//! changed the casing. Profile updates additionally accept the login field.

use crate::{Error, Result, record::UserRecord};

/// Fields holding a user's identifier.
pub const IDENTIFIER_ALIASES: [&str; 2] = ["email", "correo"];

/// Fields consulted when locating the record a profile edit applies to.
pub const UPDATE_ALIASES: [&str; 3] = ["email", "correo", "usuario"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
  Exact,
  CaseInsensitive,
}

impl MatchMode {
  fn matches(self, stored: &str, wanted: &str) -> bool {
    match self {
      Self::Exact => stored == wanted,
      Self::CaseInsensitive => stored.to_lowercase() == wanted.to_lowercase(),
    }
  }
}

fn position_by(
  users: &[UserRecord],
  identifier: &str,
  aliases: &[&str],
  mode: MatchMode,
) -> Result<usize> {
  if identifier.is_empty() {
    return Err(Error::UserNotFound(identifier.to_owned()));
  }
  users
    .iter()
    .position(|u| {
      aliases
        .iter()
        .filter_map(|alias| u.field(alias))
        .any(|stored| mode.matches(stored, identifier))
    })
    .ok_or_else(|| Error::UserNotFound(identifier.to_owned()))
}

/// Index of the user whose `email` or `correo` matches `identifier`.
pub fn position_user(users: &[UserRecord], identifier: &str, mode: MatchMode) -> Result<usize> {
  position_by(users, identifier, &IDENTIFIER_ALIASES, mode)
}

/// The user whose `email` or `correo` matches `identifier`.
pub fn find_user<'a>(
  users: &'a [UserRecord],
  identifier: &str,
  mode: MatchMode,
) -> Result<&'a UserRecord> {
  position_user(users, identifier, mode).map(|i| &users[i])
}

/// The first user whose `email` or `correo` matches any of `identifiers`.
pub fn find_user_by_any<'a>(
  users: &'a [UserRecord],
  identifiers: &[&str],
  mode: MatchMode,
) -> Result<&'a UserRecord> {
  users
    .iter()
    .find(|u| {
      IDENTIFIER_ALIASES
        .iter()
        .filter_map(|alias| u.field(alias))
        .any(|stored| identifiers.iter().any(|wanted| mode.matches(stored, wanted)))
    })
    .ok_or_else(|| Error::UserNotFound(identifiers.join(", ")))
}

/// Index of the record a profile edit applies to: `email`, `correo` or
/// `usuario`, compared case-insensitively.
pub fn find_user_for_update(users: &[UserRecord], identifier: &str) -> Result<usize> {
  position_by(users, identifier, &UPDATE_ALIASES, MatchMode::CaseInsensitive)
}

/// True when some user other than `except` already holds `identifier`
/// (case-insensitive).
pub fn identifier_taken(users: &[UserRecord], identifier: &str, except: Option<usize>) -> bool {
  users.iter().enumerate().any(|(i, u)| {
    Some(i) != except
      && IDENTIFIER_ALIASES
        .iter()
        .filter_map(|alias| u.field(alias))
        .any(|stored| MatchMode::CaseInsensitive.matches(stored, identifier))
  })
}
