// server/src/errors.rs

use actix_web::http::{header, StatusCode};
use actix_web::{HttpResponse, ResponseError};
use marketplace_core::MarketplaceError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Authentication Failed: {0}")]
  Auth(String),

  /// A guarded route was hit without a live session.
  #[error("Login required")]
  Unauthenticated,

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Conflict: {0}")]
  Conflict(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Storage Error: {source}")]
  Store { source: MarketplaceError },

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl From<MarketplaceError> for AppError {
  fn from(err: MarketplaceError) -> Self {
    match err {
      MarketplaceError::Validation(message) => AppError::Validation(message),
      MarketplaceError::NotFound { .. } => AppError::NotFound(err.to_string()),
      MarketplaceError::DuplicateEmail { .. } => AppError::Conflict(err.to_string()),
      MarketplaceError::InvalidCredentials => AppError::Auth(err.to_string()),
      source => AppError::Store { source },
    }
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation(_) => StatusCode::BAD_REQUEST,
      AppError::Auth(_) => StatusCode::UNAUTHORIZED,
      AppError::Unauthenticated => StatusCode::SEE_OTHER,
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::Conflict(_) => StatusCode::CONFLICT,
      AppError::Config(_) | AppError::Store { .. } | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    match self {
      AppError::Unauthenticated => {
        tracing::warn!("Unauthenticated request; redirecting to /login");
        HttpResponse::SeeOther()
          .insert_header((header::LOCATION, "/login"))
          .json(json!({"error": "Please log in"}))
      }
      AppError::Validation(m) | AppError::Auth(m) | AppError::NotFound(m) | AppError::Conflict(m) => {
        tracing::warn!(application_error = %self, "Responding with client error");
        HttpResponse::build(self.status_code()).json(json!({"error": m}))
      }
      AppError::Config(m) => {
        tracing::error!(application_error = %self, "Responding with error");
        HttpResponse::InternalServerError().json(json!({"error": "Configuration issue", "detail": m}))
      }
      AppError::Store { source } => {
        tracing::error!(store_error = ?source, "Storage failure while handling request");
        HttpResponse::InternalServerError().json(json!({"error": "Database operation failed"}))
      }
      AppError::Internal(m) => {
        tracing::error!(application_error = %self, "Responding with error");
        HttpResponse::InternalServerError().json(json!({"error": "An internal error occurred", "detail": m}))
      }
    }
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn domain_errors_map_to_http_statuses() {
    let cases = [
      (MarketplaceError::validation("bad"), StatusCode::BAD_REQUEST),
      (MarketplaceError::not_found("service", 4), StatusCode::NOT_FOUND),
      (
        MarketplaceError::DuplicateEmail { email: "a@b.c".into() },
        StatusCode::CONFLICT,
      ),
      (MarketplaceError::InvalidCredentials, StatusCode::UNAUTHORIZED),
      (MarketplaceError::PasswordHash("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
    ];
    for (err, status) in cases {
      assert_eq!(AppError::from(err).status_code(), status);
    }
  }

  #[test]
  fn unauthenticated_redirects_to_login() {
    let response = AppError::Unauthenticated.error_response();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/login");
  }
}
