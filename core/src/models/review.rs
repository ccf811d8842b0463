// core/src/models/review.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Review {
  pub id: i64,
  pub engagement_id: i64,
  pub rating: i64,
  pub comment: Option<String>,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewReview {
  pub engagement_id: i64,
  pub rating: i64,
  pub comment: Option<String>,
}
