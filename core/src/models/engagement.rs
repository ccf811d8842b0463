// core/src/models/engagement.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, Type as SqlxType};

use super::payout::Payout;

/// Upper bound on milestones accepted for one engagement.
pub const MAX_MILESTONES_PER_ENGAGEMENT: usize = 5;

/// Declared lifecycle of an engagement. Only `Active` is ever assigned;
/// `Completed` and `Cancelled` are kept so stored rows stay readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, SqlxType)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum EngagementStatus {
  Active,
  Completed,
  Cancelled,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Engagement {
  pub id: i64,
  pub client_id: i64,
  pub service_id: i64,
  pub status: EngagementStatus,
  pub created_at: DateTime<Utc>,
}

/// An engagement as listed for one side of the relationship. `counterpart_name`
/// is the provider for a client's list and the client for a provider's list.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EngagementSummary {
  #[sqlx(flatten)]
  #[serde(flatten)]
  pub engagement: Engagement,
  pub service_title: String,
  pub counterpart_name: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EngagementDetail {
  #[sqlx(flatten)]
  #[serde(flatten)]
  pub engagement: Engagement,
  pub service_title: String,
  pub provider_id: i64,
  pub client_name: String,
  pub provider_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EngagementWithMilestones {
  pub engagement: EngagementDetail,
  pub milestones: Vec<Milestone>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
  pub id: i64,
  pub engagement_id: i64,
  pub title: String,
  pub amount: f64,
  pub is_completed: bool,
  pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MilestoneSpec {
  pub title: String,
  pub amount: f64,
}

impl MilestoneSpec {
  pub fn new(title: impl Into<String>, amount: f64) -> Self {
    Self {
      title: title.into(),
      amount,
    }
  }
}

#[derive(Debug, Clone)]
pub struct NewEngagement {
  pub client_id: i64,
  pub service_id: i64,
  pub milestones: Vec<MilestoneSpec>,
}

/// Outcome of asking for a milestone to be completed.
#[derive(Debug, Clone)]
pub enum MilestoneCompletion {
  /// The milestone flipped to completed and this payout was recorded.
  Completed(Payout),
  /// The milestone was already completed; nothing was written.
  AlreadyCompleted,
}

impl MilestoneCompletion {
  pub fn payout(&self) -> Option<&Payout> {
    match self {
      MilestoneCompletion::Completed(payout) => Some(payout),
      MilestoneCompletion::AlreadyCompleted => None,
    }
  }
}
