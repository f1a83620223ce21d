//! Stored-password hashing and verification.
//!
//! New passwords are stored as argon2 PHC strings. Records written before
//! hashing was introduced hold the password in plaintext; those are still
//! verified by direct comparison.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use rand_core::OsRng;

use crate::{Error, Result};

/// Hash `password` into an argon2 PHC string.
pub fn hash_password(password: &str) -> Result<String> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| Error::PasswordHash(e.to_string()))
}

/// Check `candidate` against a stored password, hashed or legacy plaintext.
pub fn verify_password(stored: &str, candidate: &str) -> bool {
  if !stored.starts_with("$argon2") {
    return stored == candidate;
  }
  let Ok(parsed) = PasswordHash::new(stored) else {
    return false;
  };
  Argon2::default()
    .verify_password(candidate.as_bytes(), &parsed)
    .is_ok()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn hashed_roundtrip() {
    let hash = hash_password("secreto").unwrap();
    assert!(hash.starts_with("$argon2"));
    assert!(verify_password(&hash, "secreto"));
    assert!(!verify_password(&hash, "otro"));
  }

  #[test]
  fn legacy_plaintext() {
    assert!(verify_password("123456", "123456"));
    assert!(!verify_password("123456", "1234567"));
  }

  #[test]
  fn corrupt_hash_rejects() {
    assert!(!verify_password("$argon2id$garbage", "anything"));
  }
}
