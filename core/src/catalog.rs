// core/src/catalog.rs

//! Service listings offered by providers.

use crate::error::{MarketplaceError, MarketplaceResult};
use crate::models::{IncentiveType, NewService, Role, User};
use crate::store::MarketplaceStore;
use tracing::{info, instrument};

/// Service form input, as typed by the provider.
#[derive(Debug, Clone, Default)]
pub struct ServiceDraft {
  pub title: String,
  pub description: String,
  pub base_rate: String,
  pub incentive_type: String,
  pub incentive_details: Option<String>,
}

impl ServiceDraft {
  fn validate(self, provider_id: i64) -> MarketplaceResult<NewService> {
    let title = self.title.trim();
    let description = self.description.trim();
    let base_rate = self.base_rate.trim();
    let incentive_type = self.incentive_type.trim();
    if title.is_empty() || description.is_empty() || base_rate.is_empty() || incentive_type.is_empty() {
      return Err(MarketplaceError::validation("All fields are required"));
    }

    let base_rate: f64 = base_rate
      .parse()
      .ok()
      .filter(|rate: &f64| rate.is_finite() && *rate >= 0.0)
      .ok_or_else(|| MarketplaceError::validation("Base rate must be a non-negative number"))?;
    let incentive_type: IncentiveType = incentive_type
      .parse()
      .map_err(|_| MarketplaceError::validation("Incentive type must be milestone, referral or performance"))?;

    Ok(NewService {
      provider_id,
      title: title.to_string(),
      description: description.to_string(),
      base_rate,
      incentive_type,
      incentive_details: self
        .incentive_details
        .map(|details| details.trim().to_string())
        .filter(|details| !details.is_empty()),
    })
  }
}

/// Creates a service owned by `provider`. Only providers may offer services.
#[instrument(name = "catalog::create_service", skip(store, provider, draft), fields(provider_id = provider.id), err(Display))]
pub async fn create_service(store: &dyn MarketplaceStore, provider: &User, draft: ServiceDraft) -> MarketplaceResult<i64> {
  if provider.role != Role::Provider {
    return Err(MarketplaceError::validation("Only providers can create services"));
  }
  let service = draft.validate(provider.id)?;
  let service_id = store.create_service(&service).await?;
  info!(service_id, "Service listed.");
  Ok(service_id)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn draft() -> ServiceDraft {
    ServiceDraft {
      title: "Contract Review".into(),
      description: "Review of commercial contracts".into(),
      base_rate: "500".into(),
      incentive_type: "milestone".into(),
      incentive_details: Some("  ".into()),
    }
  }

  #[test]
  fn valid_draft_is_normalised() {
    let service = draft().validate(3).unwrap();
    assert_eq!(service.provider_id, 3);
    assert_eq!(service.base_rate, 500.0);
    assert_eq!(service.incentive_type, IncentiveType::Milestone);
    assert_eq!(service.incentive_details, None);
  }

  #[test]
  fn missing_fields_are_rejected() {
    let mut d = draft();
    d.description = String::new();
    assert!(matches!(d.validate(1), Err(MarketplaceError::Validation(m)) if m == "All fields are required"));
  }

  #[test]
  fn bad_rate_and_incentive_are_rejected() {
    let mut d = draft();
    d.base_rate = "lots".into();
    assert!(d.validate(1).is_err());

    let mut d = draft();
    d.base_rate = "-5".into();
    assert!(d.validate(1).is_err());

    let mut d = draft();
    d.incentive_type = "bonus".into();
    assert!(d.validate(1).is_err());
  }
}
