// core/src/models/service.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, Type as SqlxType};
use std::str::FromStr;

/// How a provider advertises extra compensation. Only stored and displayed;
/// no payout logic depends on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, SqlxType)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum IncentiveType {
  Milestone,
  Referral,
  Performance,
}

impl FromStr for IncentiveType {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "milestone" => Ok(IncentiveType::Milestone),
      "referral" => Ok(IncentiveType::Referral),
      "performance" => Ok(IncentiveType::Performance),
      other => Err(format!("unknown incentive type '{}'", other)),
    }
  }
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Service {
  pub id: i64,
  pub provider_id: i64,
  pub title: String,
  pub description: String,
  pub base_rate: f64,
  pub incentive_type: IncentiveType,
  pub incentive_details: Option<String>,
  pub created_at: DateTime<Utc>,
}

/// A service joined with its provider's display name.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ServiceListing {
  #[sqlx(flatten)]
  #[serde(flatten)]
  pub service: Service,
  pub provider_name: String,
}

#[derive(Debug, Clone)]
pub struct NewService {
  pub provider_id: i64,
  pub title: String,
  pub description: String,
  pub base_rate: f64,
  pub incentive_type: IncentiveType,
  pub incentive_details: Option<String>,
}
