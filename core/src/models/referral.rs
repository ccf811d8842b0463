// core/src/models/referral.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Points granted to the owner of the referral code used at sign-up.
pub const REFERRER_REWARD_POINTS: i64 = 50;
/// Points granted to the newly registered user who supplied a valid code.
pub const REFEREE_REWARD_POINTS: i64 = 10;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Referral {
  pub id: i64,
  pub referrer_id: i64,
  pub referee_id: i64,
  pub reward_points: i64,
  pub created_at: DateTime<Utc>,
}
