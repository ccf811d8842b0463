// core/src/models/user.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, Type as SqlxType};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, SqlxType)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Role {
  Provider,
  Client,
}

impl Role {
  pub fn as_str(&self) -> &'static str {
    match self {
      Role::Provider => "provider",
      Role::Client => "client",
    }
  }
}

impl fmt::Display for Role {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Role {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "provider" => Ok(Role::Provider),
      "client" => Ok(Role::Client),
      other => Err(format!("unknown role '{}'", other)),
    }
  }
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
  pub id: i64,
  pub role: Role,
  pub name: String,
  pub email: String,
  #[serde(skip_serializing)] // Never send password hash to client
  pub password_hash: String,
  pub referral_code: String,
  pub referred_by: Option<i64>,
  pub points: i64,
  pub created_at: DateTime<Utc>,
}

/// A user row ready for insertion. The password is already hashed and the
/// referral code already generated.
#[derive(Debug, Clone)]
pub struct NewUser {
  pub role: Role,
  pub name: String,
  pub email: String,
  pub password_hash: String,
  pub referral_code: String,
  /// Code typed by the new user at sign-up, resolved inside the insert transaction.
  pub referred_by_code: Option<String>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn role_round_trips_through_its_text_form() {
    assert_eq!("provider".parse::<Role>().unwrap(), Role::Provider);
    assert_eq!(Role::Client.to_string(), "client");
    assert!("admin".parse::<Role>().is_err());
  }
}
