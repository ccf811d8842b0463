// core/src/auth.rs

//! Password hashing/verification and referral code generation.

use crate::error::MarketplaceError;
use argon2::{
  password_hash::{
    rand_core::OsRng, // For generating random salts
    PasswordHash,
    PasswordHasher,
    PasswordVerifier,
    SaltString,
  },
  Argon2,
};
use rand_core::RngCore;
use tracing::{debug, error, instrument};

/// Random bytes behind a referral code; rendered as twice as many hex digits.
const REFERRAL_CODE_BYTES: usize = 4;

/// Hashes a plain-text password using Argon2 with a fresh random salt.
#[instrument(name = "auth::hash_password", skip(password), err(Display))]
pub fn hash_password(password: &str) -> Result<String, MarketplaceError> {
  if password.is_empty() {
    return Err(MarketplaceError::validation("Password cannot be empty."));
  }

  let salt = SaltString::generate(&mut OsRng);
  match Argon2::default().hash_password(password.as_bytes(), &salt) {
    Ok(hash) => {
      debug!("Password hashed successfully.");
      Ok(hash.to_string())
    }
    Err(argon_err) => {
      error!(error = %argon_err, "Argon2 password hashing failed.");
      Err(MarketplaceError::PasswordHash(argon_err.to_string()))
    }
  }
}

/// Verifies a plain-text password against a stored Argon2 hash.
///
/// Returns `Ok(false)` on a mismatch; an unparseable stored hash is an error.
#[instrument(name = "auth::verify_password", skip(stored_hash, provided_password), err(Display))]
pub fn verify_password(stored_hash: &str, provided_password: &str) -> Result<bool, MarketplaceError> {
  if provided_password.is_empty() {
    return Ok(false);
  }

  let parsed_hash = PasswordHash::new(stored_hash).map_err(|parse_err| {
    error!(error = %parse_err, "Failed to parse stored password hash string.");
    MarketplaceError::PasswordHash(format!("Invalid stored password hash format: {}", parse_err))
  })?;

  match Argon2::default().verify_password(provided_password.as_bytes(), &parsed_hash) {
    Ok(()) => Ok(true),
    Err(argon2::password_hash::Error::Password) => {
      debug!("Password verification failed: passwords do not match.");
      Ok(false)
    }
    Err(other) => {
      error!(error = %other, "Argon2 password verification process encountered an error.");
      Err(MarketplaceError::PasswordHash(other.to_string()))
    }
  }
}

/// A fresh referral code: 8 lowercase hex characters.
pub fn generate_referral_code() -> String {
  let mut bytes = [0u8; REFERRAL_CODE_BYTES];
  OsRng.fill_bytes(&mut bytes);
  bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn hash_then_verify() {
    let hash = hash_password("password123").unwrap();
    assert_ne!(hash, "password123");
    assert!(verify_password(&hash, "password123").unwrap());
    assert!(!verify_password(&hash, "password124").unwrap());
    assert!(!verify_password(&hash, "").unwrap());
  }

  #[test]
  fn empty_password_is_rejected() {
    assert!(matches!(hash_password(""), Err(MarketplaceError::Validation(_))));
  }

  #[test]
  fn garbage_hash_is_an_error_not_a_mismatch() {
    assert!(matches!(
      verify_password("not-a-phc-string", "secret"),
      Err(MarketplaceError::PasswordHash(_))
    ));
  }

  #[test]
  fn referral_codes_are_eight_hex_chars() {
    let code = generate_referral_code();
    assert_eq!(code.len(), 8);
    assert!(code.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    assert_ne!(code, generate_referral_code());
  }
}
