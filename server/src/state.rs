// server/src/state.rs
use crate::config::AppConfig;
use crate::errors::Result;
use crate::services::SessionStore;
use marketplace_core::MarketplaceStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
  pub store: Arc<dyn MarketplaceStore>,
  pub sessions: Arc<SessionStore>,
  pub config: Arc<AppConfig>,
}

impl AppState {
  /// Fails only when the configured session lifetime is out of range.
  pub fn new(store: Arc<dyn MarketplaceStore>, config: AppConfig) -> Result<Self> {
    let ttl = config.session_ttl()?;
    Ok(Self {
      store,
      sessions: Arc::new(SessionStore::new(ttl)),
      config: Arc::new(config),
    })
  }
}
