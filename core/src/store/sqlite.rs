// core/src/store/sqlite.rs

//! SQLite-backed `MarketplaceStore`.
//!
//! The whole marketplace lives in one database file. Every mutation is a
//! transaction committed with `synchronous = FULL`, so a method that returns
//! `Ok` has reached durable storage.

use super::{EngagementRepo, MarketplaceStore, PayoutRepo, ReviewRepo, ServiceRepo, UserRepo};
use crate::error::{MarketplaceError, MarketplaceResult};
use crate::models::{
  EngagementDetail, EngagementStatus, EngagementSummary, EngagementWithMilestones, Milestone, MilestoneCompletion,
  NewEngagement, NewReview, NewService, NewUser, Payout, PayoutType, Referral, Review, Service, ServiceListing, User,
  REFEREE_REWARD_POINTS, REFERRER_REWARD_POINTS,
};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

const ENGAGEMENT_DETAIL_SQL: &str = "
  SELECT e.*, s.title AS service_title, s.provider_id AS provider_id,
         c.name AS client_name, p.name AS provider_name
  FROM engagements e
  JOIN services s ON s.id = e.service_id
  JOIN users c ON c.id = e.client_id
  JOIN users p ON p.id = s.provider_id
  WHERE e.id = ?";

/// The single storage handle of the process.
pub struct SqliteStore {
  pool: Pool<Sqlite>,
}

impl SqliteStore {
  /// Opens (creating if absent) the database file at `path` and applies the
  /// schema.
  #[instrument(name = "SqliteStore::open", skip(path), fields(path = %path.as_ref().display()), err(Display))]
  pub async fn open(path: impl AsRef<Path>) -> MarketplaceResult<Self> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
      if !parent.as_os_str().is_empty() {
        std::fs::create_dir_all(parent)?;
      }
    }

    let opts = SqliteConnectOptions::new()
      .filename(path)
      .create_if_missing(true)
      .journal_mode(SqliteJournalMode::Wal)
      .synchronous(SqliteSynchronous::Full)
      .foreign_keys(true)
      .busy_timeout(Duration::from_secs(5));

    let store = Self::connect(opts).await?;
    info!("Marketplace database opened.");
    Ok(store)
  }

  /// A private database that disappears when the store is dropped.
  pub async fn in_memory() -> MarketplaceResult<Self> {
    let opts = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
    Self::connect(opts).await
  }

  async fn connect(opts: SqliteConnectOptions) -> MarketplaceResult<Self> {
    // One connection: writers are serialized, and an in-memory database
    // lives exactly as long as that connection.
    let pool = SqlitePoolOptions::new()
      .max_connections(1)
      .min_connections(1)
      .idle_timeout(None)
      .max_lifetime(None)
      .connect_with(opts)
      .await?;

    let store = Self { pool };
    store.migrate().await?;
    Ok(store)
  }

  pub fn pool(&self) -> &Pool<Sqlite> {
    &self.pool
  }
}

/// Maps a failed user insert onto the domain error for whichever UNIQUE
/// constraint fired.
fn map_user_insert_error(err: sqlx::Error, user: &NewUser) -> MarketplaceError {
  if let sqlx::Error::Database(db_err) = &err {
    if db_err.is_unique_violation() {
      if db_err.message().contains("users.email") {
        return MarketplaceError::DuplicateEmail {
          email: user.email.clone(),
        };
      }
      if db_err.message().contains("users.referral_code") {
        return MarketplaceError::ReferralCodeCollision {
          code: user.referral_code.clone(),
        };
      }
    }
  }
  MarketplaceError::Database(err)
}

#[async_trait]
impl MarketplaceStore for SqliteStore {
  async fn migrate(&self) -> MarketplaceResult<()> {
    sqlx::migrate!("./migrations").run(&self.pool).await?;
    debug!("Schema migrations applied.");
    Ok(())
  }

  async fn close(&self) {
    self.pool.close().await;
    info!("Marketplace database closed.");
  }
}

#[async_trait]
impl UserRepo for SqliteStore {
  #[instrument(name = "SqliteStore::create_user", skip(self, user), fields(email = %user.email, role = %user.role), err(Display))]
  async fn create_user(&self, user: &NewUser) -> MarketplaceResult<i64> {
    let mut tx = self.pool.begin().await?;

    let existing = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE email = ?")
      .bind(&user.email)
      .fetch_optional(&mut *tx)
      .await?;
    if existing.is_some() {
      warn!("Attempt to register an email that is already in use.");
      return Err(MarketplaceError::DuplicateEmail {
        email: user.email.clone(),
      });
    }

    // Unknown codes are ignored: registration proceeds without a reward.
    let referrer_id: Option<i64> = match user.referred_by_code.as_deref().filter(|code| !code.is_empty()) {
      Some(code) => {
        let found = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE referral_code = ?")
          .bind(code)
          .fetch_optional(&mut *tx)
          .await?;
        if found.is_none() {
          debug!(referral_code = %code, "Referral code did not match any user; ignoring it.");
        }
        found
      }
      None => None,
    };

    let user_id = sqlx::query(
      "INSERT INTO users (role, name, email, password_hash, referral_code, referred_by, created_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(user.role)
    .bind(&user.name)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(&user.referral_code)
    .bind(referrer_id)
    .bind(Utc::now())
    .execute(&mut *tx)
    .await
    .map_err(|e| map_user_insert_error(e, user))?
    .last_insert_rowid();

    if let Some(referrer_id) = referrer_id {
      sqlx::query("INSERT INTO referrals (referrer_id, referee_id, reward_points, created_at) VALUES (?, ?, ?, ?)")
        .bind(referrer_id)
        .bind(user_id)
        .bind(REFERRER_REWARD_POINTS)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;
      sqlx::query("UPDATE users SET points = points + ? WHERE id = ?")
        .bind(REFERRER_REWARD_POINTS)
        .bind(referrer_id)
        .execute(&mut *tx)
        .await?;
      sqlx::query("UPDATE users SET points = points + ? WHERE id = ?")
        .bind(REFEREE_REWARD_POINTS)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
      info!(referrer_id, referee_id = user_id, "Referral reward granted.");
    }

    tx.commit().await?;
    info!(user_id, "User created.");
    Ok(user_id)
  }

  async fn get_user(&self, id: i64) -> MarketplaceResult<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
      .bind(id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(user)
  }

  async fn get_user_by_email(&self, email: &str) -> MarketplaceResult<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
      .bind(email)
      .fetch_optional(&self.pool)
      .await?;
    Ok(user)
  }

  async fn get_user_by_referral_code(&self, code: &str) -> MarketplaceResult<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE referral_code = ?")
      .bind(code)
      .fetch_optional(&self.pool)
      .await?;
    Ok(user)
  }

  async fn list_referrals_by_referrer(&self, referrer_id: i64) -> MarketplaceResult<Vec<Referral>> {
    let referrals =
      sqlx::query_as::<_, Referral>("SELECT * FROM referrals WHERE referrer_id = ? ORDER BY created_at DESC, id DESC")
        .bind(referrer_id)
        .fetch_all(&self.pool)
        .await?;
    Ok(referrals)
  }
}

#[async_trait]
impl ServiceRepo for SqliteStore {
  #[instrument(name = "SqliteStore::create_service", skip(self, service), fields(provider_id = service.provider_id), err(Display))]
  async fn create_service(&self, service: &NewService) -> MarketplaceResult<i64> {
    let service_id = sqlx::query(
      "INSERT INTO services (provider_id, title, description, base_rate, incentive_type, incentive_details, created_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(service.provider_id)
    .bind(&service.title)
    .bind(&service.description)
    .bind(service.base_rate)
    .bind(service.incentive_type)
    .bind(&service.incentive_details)
    .bind(Utc::now())
    .execute(&self.pool)
    .await?
    .last_insert_rowid();

    info!(service_id, "Service created.");
    Ok(service_id)
  }

  async fn list_services(&self) -> MarketplaceResult<Vec<ServiceListing>> {
    let services = sqlx::query_as::<_, ServiceListing>(
      "SELECT s.*, u.name AS provider_name FROM services s
       JOIN users u ON u.id = s.provider_id
       ORDER BY s.created_at DESC, s.id DESC",
    )
    .fetch_all(&self.pool)
    .await?;
    Ok(services)
  }

  async fn get_service(&self, id: i64) -> MarketplaceResult<Option<ServiceListing>> {
    let service = sqlx::query_as::<_, ServiceListing>(
      "SELECT s.*, u.name AS provider_name FROM services s
       JOIN users u ON u.id = s.provider_id
       WHERE s.id = ?",
    )
    .bind(id)
    .fetch_optional(&self.pool)
    .await?;
    Ok(service)
  }

  async fn list_services_by_provider(&self, provider_id: i64) -> MarketplaceResult<Vec<Service>> {
    let services =
      sqlx::query_as::<_, Service>("SELECT * FROM services WHERE provider_id = ? ORDER BY created_at DESC, id DESC")
        .bind(provider_id)
        .fetch_all(&self.pool)
        .await?;
    Ok(services)
  }

  async fn count_services(&self) -> MarketplaceResult<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM services")
      .fetch_one(&self.pool)
      .await?;
    Ok(count)
  }
}

#[async_trait]
impl EngagementRepo for SqliteStore {
  #[instrument(
    name = "SqliteStore::create_engagement",
    skip(self, engagement),
    fields(client_id = engagement.client_id, service_id = engagement.service_id, milestones = engagement.milestones.len()),
    err(Display)
  )]
  async fn create_engagement(&self, engagement: &NewEngagement) -> MarketplaceResult<i64> {
    let mut tx = self.pool.begin().await?;

    let engagement_id =
      sqlx::query("INSERT INTO engagements (client_id, service_id, status, created_at) VALUES (?, ?, ?, ?)")
        .bind(engagement.client_id)
        .bind(engagement.service_id)
        .bind(EngagementStatus::Active)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

    for spec in &engagement.milestones {
      sqlx::query("INSERT INTO milestones (engagement_id, title, amount) VALUES (?, ?, ?)")
        .bind(engagement_id)
        .bind(&spec.title)
        .bind(spec.amount)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    info!(engagement_id, "Engagement created with its milestones.");
    Ok(engagement_id)
  }

  async fn get_engagement_with_milestones(&self, id: i64) -> MarketplaceResult<Option<EngagementWithMilestones>> {
    let engagement = sqlx::query_as::<_, EngagementDetail>(ENGAGEMENT_DETAIL_SQL)
      .bind(id)
      .fetch_optional(&self.pool)
      .await?;

    match engagement {
      Some(engagement) => {
        let milestones = self.list_milestones(id).await?;
        Ok(Some(EngagementWithMilestones { engagement, milestones }))
      }
      None => Ok(None),
    }
  }

  async fn list_engagements_for_client(&self, client_id: i64) -> MarketplaceResult<Vec<EngagementSummary>> {
    let engagements = sqlx::query_as::<_, EngagementSummary>(
      "SELECT e.*, s.title AS service_title, u.name AS counterpart_name
       FROM engagements e
       JOIN services s ON s.id = e.service_id
       JOIN users u ON u.id = s.provider_id
       WHERE e.client_id = ?
       ORDER BY e.created_at DESC, e.id DESC",
    )
    .bind(client_id)
    .fetch_all(&self.pool)
    .await?;
    Ok(engagements)
  }

  async fn list_engagements_for_provider(&self, provider_id: i64) -> MarketplaceResult<Vec<EngagementSummary>> {
    let engagements = sqlx::query_as::<_, EngagementSummary>(
      "SELECT e.*, s.title AS service_title, u.name AS counterpart_name
       FROM engagements e
       JOIN services s ON s.id = e.service_id
       JOIN users u ON u.id = e.client_id
       WHERE s.provider_id = ?
       ORDER BY e.created_at DESC, e.id DESC",
    )
    .bind(provider_id)
    .fetch_all(&self.pool)
    .await?;
    Ok(engagements)
  }

  async fn list_milestones(&self, engagement_id: i64) -> MarketplaceResult<Vec<Milestone>> {
    let milestones = sqlx::query_as::<_, Milestone>("SELECT * FROM milestones WHERE engagement_id = ? ORDER BY id")
      .bind(engagement_id)
      .fetch_all(&self.pool)
      .await?;
    Ok(milestones)
  }

  #[instrument(name = "SqliteStore::complete_milestone", skip(self), err(Display))]
  async fn complete_milestone(&self, milestone_id: i64) -> MarketplaceResult<MilestoneCompletion> {
    let mut tx = self.pool.begin().await?;

    let milestone = sqlx::query_as::<_, Milestone>("SELECT * FROM milestones WHERE id = ?")
      .bind(milestone_id)
      .fetch_optional(&mut *tx)
      .await?
      .ok_or_else(|| MarketplaceError::not_found("milestone", milestone_id))?;

    if milestone.is_completed {
      debug!("Milestone already completed; nothing to do.");
      return Ok(MilestoneCompletion::AlreadyCompleted);
    }

    let completed_at = Utc::now();
    // The is_completed guard makes the flip happen at most once even if two
    // requests read the milestone as open.
    let flipped = sqlx::query("UPDATE milestones SET is_completed = 1, completed_at = ? WHERE id = ? AND is_completed = 0")
      .bind(completed_at)
      .bind(milestone_id)
      .execute(&mut *tx)
      .await?
      .rows_affected();
    if flipped == 0 {
      debug!("Milestone was completed concurrently; no payout issued.");
      return Ok(MilestoneCompletion::AlreadyCompleted);
    }

    let provider_id = sqlx::query_scalar::<_, i64>(
      "SELECT s.provider_id FROM engagements e JOIN services s ON s.id = e.service_id WHERE e.id = ?",
    )
    .bind(milestone.engagement_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| MarketplaceError::not_found("engagement", milestone.engagement_id))?;

    let payout_id =
      sqlx::query("INSERT INTO payouts (provider_id, engagement_id, amount, type, created_at) VALUES (?, ?, ?, ?, ?)")
        .bind(provider_id)
        .bind(milestone.engagement_id)
        .bind(milestone.amount)
        .bind(PayoutType::Milestone)
        .bind(completed_at)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

    tx.commit().await?;
    info!(
      payout_id,
      provider_id,
      engagement_id = milestone.engagement_id,
      amount = milestone.amount,
      "Milestone completed and payout recorded."
    );

    Ok(MilestoneCompletion::Completed(Payout {
      id: payout_id,
      provider_id,
      engagement_id: Some(milestone.engagement_id),
      amount: milestone.amount,
      payout_type: PayoutType::Milestone,
      created_at: completed_at,
    }))
  }
}

#[async_trait]
impl PayoutRepo for SqliteStore {
  async fn provider_earnings(&self, provider_id: i64) -> MarketplaceResult<f64> {
    let total = sqlx::query_scalar::<_, f64>("SELECT COALESCE(SUM(amount), 0.0) FROM payouts WHERE provider_id = ?")
      .bind(provider_id)
      .fetch_one(&self.pool)
      .await?;
    Ok(total)
  }

  async fn provider_payouts(&self, provider_id: i64) -> MarketplaceResult<Vec<Payout>> {
    let payouts =
      sqlx::query_as::<_, Payout>("SELECT * FROM payouts WHERE provider_id = ? ORDER BY created_at DESC, id DESC")
        .bind(provider_id)
        .fetch_all(&self.pool)
        .await?;
    Ok(payouts)
  }
}

#[async_trait]
impl ReviewRepo for SqliteStore {
  #[instrument(name = "SqliteStore::create_review", skip(self, review), fields(engagement_id = review.engagement_id), err(Display))]
  async fn create_review(&self, review: &NewReview) -> MarketplaceResult<i64> {
    let review_id =
      sqlx::query("INSERT INTO reviews (engagement_id, rating, comment, created_at) VALUES (?, ?, ?, ?)")
        .bind(review.engagement_id)
        .bind(review.rating)
        .bind(&review.comment)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?
        .last_insert_rowid();
    Ok(review_id)
  }

  async fn list_reviews(&self, engagement_id: i64) -> MarketplaceResult<Vec<Review>> {
    let reviews = sqlx::query_as::<_, Review>("SELECT * FROM reviews WHERE engagement_id = ? ORDER BY id")
      .bind(engagement_id)
      .fetch_all(&self.pool)
      .await?;
    Ok(reviews)
  }
}
