// src/lib.rs

//! Domain core of a small services marketplace.
//!
//! Providers list services, clients open engagements on them with a fixed
//! set of milestones, and completing a milestone records a payout to the
//! provider. New users may sign up with another user's referral code, which
//! rewards both sides with points.
//!
//!  - `store`: repository traits and the SQLite implementation (one file,
//!    one transaction per operation).
//!  - `accounts`, `catalog`, `engagements`: validated operations the HTTP
//!    layer calls.
//!  - `seed`: demo data for a fresh database.

pub mod accounts;
pub mod auth;
pub mod catalog;
pub mod engagements;
pub mod error;
pub mod models;
pub mod seed;
pub mod store;

pub use crate::error::{MarketplaceError, MarketplaceResult};
pub use crate::store::{
  EngagementRepo, MarketplaceStore, PayoutRepo, ReviewRepo, ServiceRepo, SqliteStore, UserRepo,
};
