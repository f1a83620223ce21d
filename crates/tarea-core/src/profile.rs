//! Profile screen: the profile view model, profile edits, password changes.
//!
//! Profile lookups compare identifiers case-insensitively. Edits mutate a
//! [`Snapshot`] in place; writing it back is the caller's job.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::{
  Rejection, Result,
  derive::derive_all,
  identity::{MatchMode, find_user_for_update, identifier_taken, position_user},
  password::{hash_password, verify_password},
  record::{Session, UserRecord},
  stats::{ProfileStats, profile_stats},
  store::Snapshot,
};

/// Shortest accepted password, in characters.
pub const MIN_PASSWORD_LEN: usize = 6;

// ─── View ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProfileView {
  pub email:      Option<String>,
  pub name:       Option<String>,
  pub surname:    Option<String>,
  pub phone:      Option<String>,
  pub address:    Option<String>,
  pub birth_date: Option<String>,
  pub career:     Option<String>,
  pub semester:   Option<u32>,
  pub avatar:     Option<String>,
  pub bio:        Option<String>,
  pub stats:      ProfileStats,
}

impl ProfileView {
  fn from_user(user: &UserRecord, stats: ProfileStats) -> Self {
    Self {
      email: user.identifier().map(str::to_owned),
      name: user.name.clone(),
      surname: user.surname.clone(),
      phone: user.phone.clone(),
      address: user.address.clone(),
      birth_date: user.birth_date.clone(),
      career: user.career.clone(),
      semester: user.semester,
      avatar: user.avatar.clone(),
      bio: user.bio.clone(),
      stats,
    }
  }

  fn from_session(session: &Session) -> Self {
    Self {
      email: session.identifier().map(str::to_owned),
      name: session.name.clone(),
      career: session.career.clone(),
      semester: session.semester,
      bio: session.bio.clone(),
      ..Self::default()
    }
  }
}

/// Build the profile for the signed-in user.
///
/// When the session's user has no stored record, the session's own fields
/// are shown with zero statistics. Without a session the view is empty.
pub fn profile_view(snapshot: &Snapshot, now: NaiveDateTime) -> ProfileView {
  match snapshot.active_user(MatchMode::CaseInsensitive) {
    Ok(user) => {
      let derived = derive_all(&user.tasks(), &snapshot.subjects, now);
      ProfileView::from_user(user, profile_stats(&derived))
    }
    Err(e) => match &snapshot.session {
      Some(session) => {
        tracing::warn!(error = %e, "profile user not registered, using session data");
        ProfileView::from_session(session)
      }
      None => ProfileView::default(),
    },
  }
}

/// The identifier the profile screen is showing.
fn profile_identifier(snapshot: &Snapshot) -> Option<String> {
  match snapshot.active_user(MatchMode::CaseInsensitive) {
    Ok(user) => user.identifier().map(str::to_owned),
    Err(_) => snapshot.active_identifier().map(str::to_owned),
  }
}

// ─── Edit ────────────────────────────────────────────────────────────────────

/// Editable profile fields. Every field is replaced; `None` clears it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
  pub name:     String,
  pub email:    String,
  #[serde(default)]
  pub surname:  Option<String>,
  #[serde(default)]
  pub phone:    Option<String>,
  #[serde(default)]
  pub address:  Option<String>,
  #[serde(default)]
  pub career:   Option<String>,
  #[serde(default)]
  pub semester: Option<u32>,
  #[serde(default)]
  pub bio:      Option<String>,
}

/// Apply a profile edit to the session and to the stored user.
///
/// Returns `true` when a stored user record was updated. A session whose
/// user is not registered still gets updated, and `false` is returned.
pub fn apply_profile_update(snapshot: &mut Snapshot, update: &ProfileUpdate) -> Result<bool> {
  let name = update.name.trim();
  if name.is_empty() {
    return Err(Rejection::MissingName.into());
  }
  let email = update.email.trim();
  if email.is_empty() {
    return Err(Rejection::MissingEmail.into());
  }

  let previous = profile_identifier(snapshot);
  let index = previous
    .as_deref()
    .and_then(|p| find_user_for_update(&snapshot.users, p).ok());

  if identifier_taken(&snapshot.users, email, index) {
    return Err(Rejection::EmailTaken(email.to_owned()).into());
  }

  let session = snapshot.session.get_or_insert_with(Session::default);
  session.name = Some(name.to_owned());
  session.email = Some(email.to_owned());
  session.correo = Some(email.to_owned());
  session.career = update.career.clone();
  session.semester = update.semester;
  session.bio = update.bio.clone();
  let login_was_email = match (session.login.as_deref(), previous.as_deref()) {
    (None | Some(""), _) => true,
    (Some(login), Some(previous)) => login.to_lowercase() == previous.to_lowercase(),
    (Some(_), None) => false,
  };
  if login_was_email {
    session.login = Some(email.to_owned());
  }

  let Some(index) = index else {
    tracing::warn!(previous = ?previous, "no stored user for profile edit, session updated only");
    return Ok(false);
  };

  let user = &mut snapshot.users[index];
  user.name = Some(name.to_owned());
  user.surname = update.surname.clone();
  user.login = Some(email.to_owned());
  user.email = Some(email.to_owned());
  user.correo = Some(email.to_owned());
  user.career = update.career.clone();
  user.semester = update.semester;
  user.bio = update.bio.clone();
  user.phone = update.phone.clone();
  user.address = update.address.clone();
  Ok(true)
}

// ─── Password ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PasswordChange {
  /// May be empty when the user has no stored password.
  #[serde(default)]
  pub current: String,
  pub new:     String,
  pub confirm: String,
}

/// Change the password of the user registered under `identifier`.
pub fn change_password(
  users: &mut [UserRecord],
  identifier: &str,
  change: &PasswordChange,
) -> Result<()> {
  if change.new != change.confirm {
    return Err(Rejection::PasswordMismatch.into());
  }
  if change.new.chars().count() < MIN_PASSWORD_LEN {
    return Err(Rejection::PasswordTooShort { min: MIN_PASSWORD_LEN }.into());
  }

  let index = position_user(users, identifier, MatchMode::CaseInsensitive)?;
  let user = &mut users[index];
  if let Some(stored) = user.password.as_deref().filter(|p| !p.is_empty())
    && !verify_password(stored, &change.current)
  {
    return Err(Rejection::WrongPassword.into());
  }

  user.password = Some(hash_password(&change.new)?);
  Ok(())
}

/// Change the signed-in user's password.
pub fn change_active_password(snapshot: &mut Snapshot, change: &PasswordChange) -> Result<()> {
  let identifier = profile_identifier(snapshot).unwrap_or_default();
  change_password(&mut snapshot.users, &identifier, change)
}
