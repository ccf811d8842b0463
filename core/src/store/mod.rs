// core/src/store/mod.rs

//! Repository traits over the marketplace tables and the SQLite-backed
//! implementation.
//!
//! Every method is one unit of work: it either commits completely or leaves
//! the database untouched. Operations that touch several tables
//! (`create_user`, `create_engagement`, `complete_milestone`) run inside a
//! single transaction.

pub mod sqlite;

use crate::error::MarketplaceResult;
use crate::models::{
  EngagementSummary, EngagementWithMilestones, Milestone, MilestoneCompletion, NewEngagement, NewReview,
  NewService, NewUser, Payout, Referral, Review, Service, ServiceListing, User,
};
use async_trait::async_trait;

pub use sqlite::SqliteStore;

#[async_trait]
pub trait UserRepo: Send + Sync {
  /// Inserts the user and, when `referred_by_code` names an existing user,
  /// records the referral and grants both reward amounts.
  async fn create_user(&self, user: &NewUser) -> MarketplaceResult<i64>;

  async fn get_user(&self, id: i64) -> MarketplaceResult<Option<User>>;

  async fn get_user_by_email(&self, email: &str) -> MarketplaceResult<Option<User>>;

  async fn get_user_by_referral_code(&self, code: &str) -> MarketplaceResult<Option<User>>;

  async fn list_referrals_by_referrer(&self, referrer_id: i64) -> MarketplaceResult<Vec<Referral>>;
}

#[async_trait]
pub trait ServiceRepo: Send + Sync {
  async fn create_service(&self, service: &NewService) -> MarketplaceResult<i64>;

  /// All services, newest first.
  async fn list_services(&self) -> MarketplaceResult<Vec<ServiceListing>>;

  async fn get_service(&self, id: i64) -> MarketplaceResult<Option<ServiceListing>>;

  /// Services owned by one provider, newest first.
  async fn list_services_by_provider(&self, provider_id: i64) -> MarketplaceResult<Vec<Service>>;

  async fn count_services(&self) -> MarketplaceResult<i64>;
}

#[async_trait]
pub trait EngagementRepo: Send + Sync {
  /// Inserts the engagement and its milestones, in the given order.
  async fn create_engagement(&self, engagement: &NewEngagement) -> MarketplaceResult<i64>;

  async fn get_engagement_with_milestones(&self, id: i64) -> MarketplaceResult<Option<EngagementWithMilestones>>;

  async fn list_engagements_for_client(&self, client_id: i64) -> MarketplaceResult<Vec<EngagementSummary>>;

  async fn list_engagements_for_provider(&self, provider_id: i64) -> MarketplaceResult<Vec<EngagementSummary>>;

  async fn list_milestones(&self, engagement_id: i64) -> MarketplaceResult<Vec<Milestone>>;

  /// Marks the milestone completed and records the matching payout. A
  /// milestone that is already completed yields `AlreadyCompleted` and no
  /// write.
  async fn complete_milestone(&self, milestone_id: i64) -> MarketplaceResult<MilestoneCompletion>;
}

#[async_trait]
pub trait PayoutRepo: Send + Sync {
  /// Sum of every payout recorded for the provider; 0 when there are none.
  async fn provider_earnings(&self, provider_id: i64) -> MarketplaceResult<f64>;

  /// Payouts for the provider, newest first.
  async fn provider_payouts(&self, provider_id: i64) -> MarketplaceResult<Vec<Payout>>;
}

#[async_trait]
pub trait ReviewRepo: Send + Sync {
  async fn create_review(&self, review: &NewReview) -> MarketplaceResult<i64>;

  async fn list_reviews(&self, engagement_id: i64) -> MarketplaceResult<Vec<Review>>;
}

/// Combined storage handle injected into the application.
#[async_trait]
pub trait MarketplaceStore: UserRepo + ServiceRepo + EngagementRepo + PayoutRepo + ReviewRepo + Send + Sync {
  /// Applies pending schema migrations.
  async fn migrate(&self) -> MarketplaceResult<()>;

  /// Flushes and closes the underlying database. Further calls fail.
  async fn close(&self);
}
