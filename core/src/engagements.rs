// core/src/engagements.rs

//! Engagement lifecycle: opening an engagement with its milestones,
//! completing milestones (which issues payouts), and reviews.

use crate::error::{MarketplaceError, MarketplaceResult};
use crate::models::{
  MilestoneCompletion, MilestoneSpec, NewEngagement, NewReview, Role, User, MAX_MILESTONES_PER_ENGAGEMENT,
};
use crate::store::MarketplaceStore;
use tracing::{info, instrument};

fn validate_milestones(milestones: &[MilestoneSpec]) -> MarketplaceResult<()> {
  if milestones.is_empty() {
    return Err(MarketplaceError::validation("Please add at least one milestone"));
  }
  if milestones.len() > MAX_MILESTONES_PER_ENGAGEMENT {
    return Err(MarketplaceError::validation(format!(
      "An engagement can have at most {} milestones",
      MAX_MILESTONES_PER_ENGAGEMENT
    )));
  }
  for spec in milestones {
    if spec.title.trim().is_empty() {
      return Err(MarketplaceError::validation("Every milestone needs a title"));
    }
    if !spec.amount.is_finite() || spec.amount < 0.0 {
      return Err(MarketplaceError::validation("Milestone amounts must be non-negative numbers"));
    }
  }
  Ok(())
}

/// Opens an engagement between `client` and the service, with the milestones
/// in the given order. Nothing is written unless every milestone is valid.
#[instrument(
  name = "engagements::open_engagement",
  skip(store, client, milestones),
  fields(client_id = client.id, milestones = milestones.len()),
  err(Display)
)]
pub async fn open_engagement(
  store: &dyn MarketplaceStore,
  client: &User,
  service_id: i64,
  milestones: Vec<MilestoneSpec>,
) -> MarketplaceResult<i64> {
  if client.role != Role::Client {
    return Err(MarketplaceError::validation("Only clients can start engagements"));
  }
  validate_milestones(&milestones)?;

  if store.get_service(service_id).await?.is_none() {
    return Err(MarketplaceError::not_found("service", service_id));
  }

  let milestones = milestones
    .into_iter()
    .map(|spec| MilestoneSpec {
      title: spec.title.trim().to_string(),
      amount: spec.amount,
    })
    .collect();

  let engagement_id = store
    .create_engagement(&NewEngagement {
      client_id: client.id,
      service_id,
      milestones,
    })
    .await?;
  info!(engagement_id, "Engagement opened.");
  Ok(engagement_id)
}

/// Completes a milestone once and pays its amount to the service's provider.
/// Completing it again is a no-op.
#[instrument(name = "engagements::complete_milestone", skip(store), err(Display))]
pub async fn complete_milestone(store: &dyn MarketplaceStore, milestone_id: i64) -> MarketplaceResult<MilestoneCompletion> {
  let outcome = store.complete_milestone(milestone_id).await?;
  match &outcome {
    MilestoneCompletion::Completed(payout) => {
      info!(payout_id = payout.id, amount = payout.amount, "Payout issued for milestone.")
    }
    MilestoneCompletion::AlreadyCompleted => info!("Milestone was already completed."),
  }
  Ok(outcome)
}

/// Records a 1–5 star review against an existing engagement.
#[instrument(name = "engagements::leave_review", skip(store, comment), err(Display))]
pub async fn leave_review(
  store: &dyn MarketplaceStore,
  engagement_id: i64,
  rating: i64,
  comment: Option<String>,
) -> MarketplaceResult<i64> {
  if !(1..=5).contains(&rating) {
    return Err(MarketplaceError::validation("Rating must be between 1 and 5"));
  }
  if store.get_engagement_with_milestones(engagement_id).await?.is_none() {
    return Err(MarketplaceError::not_found("engagement", engagement_id));
  }

  let comment = comment.map(|c| c.trim().to_string()).filter(|c| !c.is_empty());
  let review_id = store
    .create_review(&NewReview {
      engagement_id,
      rating,
      comment,
    })
    .await?;
  Ok(review_id)
}
