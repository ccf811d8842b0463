// core/src/error.rs
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MarketplaceError {
  #[error("{0}")]
  Validation(String),

  #[error("{entity} {id} not found")]
  NotFound { entity: &'static str, id: i64 },

  #[error("Email already in use")]
  DuplicateEmail { email: String },

  #[error("Invalid credentials")]
  InvalidCredentials,

  #[error("Referral code {code} is already assigned")]
  ReferralCodeCollision { code: String },

  #[error("Password hashing failed: {0}")]
  PasswordHash(String),

  #[error("Database error: {0}")]
  Database(#[from] sqlx::Error),

  #[error("Schema migration failed: {0}")]
  Migration(#[from] sqlx::migrate::MigrateError),

  #[error("Storage I/O error: {0}")]
  Io(#[from] std::io::Error),
}

impl MarketplaceError {
  pub fn validation(message: impl Into<String>) -> Self {
    MarketplaceError::Validation(message.into())
  }

  pub fn not_found(entity: &'static str, id: i64) -> Self {
    MarketplaceError::NotFound { entity, id }
  }
}

pub type MarketplaceResult<T, E = MarketplaceError> = std::result::Result<T, E>;
