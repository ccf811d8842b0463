// core/src/models/mod.rs

//! Row types for every marketplace table, plus the joined read models the
//! HTTP layer hands out.

pub mod engagement;
pub mod payout;
pub mod referral;
pub mod review;
pub mod service;
pub mod user;

pub use engagement::{
  Engagement, EngagementDetail, EngagementStatus, EngagementSummary, EngagementWithMilestones, Milestone,
  MilestoneCompletion, MilestoneSpec, NewEngagement, MAX_MILESTONES_PER_ENGAGEMENT,
};
pub use payout::{Payout, PayoutType};
pub use referral::{Referral, REFEREE_REWARD_POINTS, REFERRER_REWARD_POINTS};
pub use review::{NewReview, Review};
pub use service::{IncentiveType, NewService, Service, ServiceListing};
pub use user::{NewUser, Role, User};
