// tests/common/mod.rs
#![allow(dead_code)] // Not every test file uses every helper

use marketplace_core::accounts::{self, Registration};
use marketplace_core::models::{MilestoneSpec, User};
use marketplace_core::{catalog, engagements, MarketplaceStore, SqliteStore};
use once_cell::sync::Lazy;
use std::path::PathBuf;
use tracing::Level;

// --- Helper for Tracing Setup ---
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer() // Important for tests to capture output
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

pub async fn fresh_store() -> SqliteStore {
  setup_tracing();
  SqliteStore::in_memory().await.expect("open in-memory store")
}

/// A database path nobody else uses, under the OS temp directory.
pub fn temp_db_path() -> PathBuf {
  std::env::temp_dir()
    .join(format!("marketplace-test-{}", uuid::Uuid::new_v4()))
    .join("app.sqlite")
}

pub fn registration(role: &str, name: &str, email: &str) -> Registration {
  Registration {
    role: role.to_string(),
    name: name.to_string(),
    email: email.to_string(),
    password: "password123".to_string(),
    referral_code: None,
  }
}

pub async fn register(store: &dyn MarketplaceStore, role: &str, name: &str, email: &str) -> User {
  let id = accounts::register(store, registration(role, name, email))
    .await
    .expect("registration succeeds");
  store.get_user(id).await.expect("query user").expect("user exists")
}

pub async fn provider_with_service(store: &dyn MarketplaceStore, rate: &str) -> (User, i64) {
  let provider = register(store, "provider", "Pat Provider", "pat@example.com").await;
  let service_id = catalog::create_service(
    store,
    &provider,
    catalog::ServiceDraft {
      title: "Contract Drafting".to_string(),
      description: "Drafting of commercial contracts".to_string(),
      base_rate: rate.to_string(),
      incentive_type: "milestone".to_string(),
      incentive_details: None,
    },
  )
  .await
  .expect("service created");
  (provider, service_id)
}

pub async fn engagement_with(
  store: &dyn MarketplaceStore,
  client: &User,
  service_id: i64,
  milestones: &[(&str, f64)],
) -> i64 {
  let specs = milestones
    .iter()
    .map(|(title, amount)| MilestoneSpec::new(*title, *amount))
    .collect();
  engagements::open_engagement(store, client, service_id, specs)
    .await
    .expect("engagement created")
}
