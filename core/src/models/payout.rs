// core/src/models/payout.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, Type as SqlxType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, SqlxType)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum PayoutType {
  Milestone,
  Bonus,
  Referral,
}

/// Append-only record of money owed to a provider.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Payout {
  pub id: i64,
  pub provider_id: i64,
  pub engagement_id: Option<i64>,
  pub amount: f64,
  #[sqlx(rename = "type")]
  #[serde(rename = "type")]
  pub payout_type: PayoutType,
  pub created_at: DateTime<Utc>,
}
