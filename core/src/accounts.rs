// core/src/accounts.rs

//! Registration (with the referral reward) and login.

use crate::auth;
use crate::error::{MarketplaceError, MarketplaceResult};
use crate::models::{NewUser, Role, User};
use crate::store::MarketplaceStore;
use tracing::{info, instrument, warn};

/// Fresh referral codes tried before giving up on a registration.
const REFERRAL_CODE_ATTEMPTS: usize = 3;

/// Sign-up form input, as typed by the user.
#[derive(Debug, Clone, Default)]
pub struct Registration {
  pub role: String,
  pub name: String,
  pub email: String,
  pub password: String,
  pub referral_code: Option<String>,
}

/// Validates the form, hashes the password and creates the user. Returns the
/// new user's id.
#[instrument(name = "accounts::register", skip(store, registration), fields(email = %registration.email), err(Display))]
pub async fn register(store: &dyn MarketplaceStore, registration: Registration) -> MarketplaceResult<i64> {
  let role: Role = registration
    .role
    .parse()
    .map_err(|_| MarketplaceError::validation("Please choose a role"))?;

  let name = registration.name.trim();
  let email = registration.email.trim();
  if name.is_empty() || email.is_empty() || registration.password.is_empty() {
    return Err(MarketplaceError::validation("All fields are required"));
  }
  if !email.contains('@') {
    return Err(MarketplaceError::validation("Valid email is required"));
  }

  // Checked up front so a taken email never pays for an argon2 hash; the
  // insert re-checks inside its transaction.
  if store.get_user_by_email(email).await?.is_some() {
    warn!("Registration rejected: email already in use.");
    return Err(MarketplaceError::DuplicateEmail {
      email: email.to_string(),
    });
  }

  let password_hash = auth::hash_password(&registration.password)?;
  let referred_by_code = registration
    .referral_code
    .map(|code| code.trim().to_string())
    .filter(|code| !code.is_empty());

  let mut attempt = 0;
  loop {
    attempt += 1;
    let new_user = NewUser {
      role,
      name: name.to_string(),
      email: email.to_string(),
      password_hash: password_hash.clone(),
      referral_code: auth::generate_referral_code(),
      referred_by_code: referred_by_code.clone(),
    };

    match store.create_user(&new_user).await {
      Ok(user_id) => {
        info!(user_id, role = %role, "Registration complete.");
        return Ok(user_id);
      }
      Err(MarketplaceError::ReferralCodeCollision { code }) if attempt < REFERRAL_CODE_ATTEMPTS => {
        warn!(%code, attempt, "Generated referral code already taken; retrying.");
      }
      Err(err) => return Err(err),
    }
  }
}

/// Returns the user when `password` matches the stored hash. An unknown
/// email and a wrong password fail identically.
#[instrument(name = "accounts::authenticate", skip(store, password), err(Display))]
pub async fn authenticate(store: &dyn MarketplaceStore, email: &str, password: &str) -> MarketplaceResult<User> {
  let user = match store.get_user_by_email(email.trim()).await? {
    Some(user) => user,
    None => {
      warn!("Login attempt for unknown email.");
      return Err(MarketplaceError::InvalidCredentials);
    }
  };

  if auth::verify_password(&user.password_hash, password)? {
    info!(user_id = user.id, "Login successful.");
    Ok(user)
  } else {
    warn!(user_id = user.id, "Login attempt with wrong password.");
    Err(MarketplaceError::InvalidCredentials)
  }
}
