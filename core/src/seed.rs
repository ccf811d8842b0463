// core/src/seed.rs

//! Demo data for a fresh database.

use crate::accounts::{self, Registration};
use crate::error::{MarketplaceError, MarketplaceResult};
use crate::models::{IncentiveType, MilestoneSpec, NewEngagement, NewService, User};
use crate::store::MarketplaceStore;
use tracing::{info, instrument};

pub const DEMO_PROVIDER_EMAIL: &str = "provider@example.com";
pub const DEMO_CLIENT_EMAIL: &str = "client@example.com";
pub const DEMO_PASSWORD: &str = "password123";

async fn ensure_user(store: &dyn MarketplaceStore, role: &str, name: &str, email: &str) -> MarketplaceResult<User> {
  if let Some(user) = store.get_user_by_email(email).await? {
    return Ok(user);
  }
  let user_id = accounts::register(
    store,
    Registration {
      role: role.to_string(),
      name: name.to_string(),
      email: email.to_string(),
      password: DEMO_PASSWORD.to_string(),
      referral_code: None,
    },
  )
  .await?;
  store
    .get_user(user_id)
    .await?
    .ok_or_else(|| MarketplaceError::not_found("user", user_id))
}

/// Populates demo users, services and one engagement. Does nothing once any
/// service exists. Returns whether data was written.
#[instrument(name = "seed::seed_demo_data", skip(store), err(Display))]
pub async fn seed_demo_data(store: &dyn MarketplaceStore) -> MarketplaceResult<bool> {
  if store.count_services().await? > 0 {
    info!("Services already present; skipping demo seed.");
    return Ok(false);
  }

  let provider = ensure_user(store, "provider", "Demo Provider LLP", DEMO_PROVIDER_EMAIL).await?;
  let client = ensure_user(store, "client", "Demo Client", DEMO_CLIENT_EMAIL).await?;

  store
    .create_service(&NewService {
      provider_id: provider.id,
      title: "Contract Drafting & Review".to_string(),
      description: "Comprehensive drafting and review of commercial contracts with negotiated terms and compliance checks."
        .to_string(),
      base_rate: 500.0,
      incentive_type: IncentiveType::Milestone,
      incentive_details: Some("Milestone payouts for draft, revisions, and final sign-off".to_string()),
    })
    .await?;
  store
    .create_service(&NewService {
      provider_id: provider.id,
      title: "IP Trademark Filing".to_string(),
      description: "End-to-end trademark search, filing, and office action responses.".to_string(),
      base_rate: 700.0,
      incentive_type: IncentiveType::Performance,
      incentive_details: Some("10% bonus on first-pass acceptance".to_string()),
    })
    .await?;
  let compliance_id = store
    .create_service(&NewService {
      provider_id: provider.id,
      title: "Startup Compliance Package".to_string(),
      description: "Entity setup, founders agreements, ESOP policy, and ROC filings for early-stage startups.".to_string(),
      base_rate: 1200.0,
      incentive_type: IncentiveType::Referral,
      incentive_details: Some("Earn 50 points for each successful referral".to_string()),
    })
    .await?;

  store
    .create_engagement(&NewEngagement {
      client_id: client.id,
      service_id: compliance_id,
      milestones: vec![
        MilestoneSpec::new("Entity Incorporation", 400.0),
        MilestoneSpec::new("Founders Agreement", 400.0),
        MilestoneSpec::new("ESOP Policy + Filings", 400.0),
      ],
    })
    .await?;

  info!("Demo data seeded.");
  Ok(true)
}
