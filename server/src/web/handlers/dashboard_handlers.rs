// server/src/web/handlers/dashboard_handlers.rs

use actix_web::{web, HttpResponse};
use marketplace_core::models::Role;
use serde_json::json;
use tracing::instrument;

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::CurrentUser;

/// Providers see what they earned and offer; clients see their engagements.
/// Both see their referral standing.
#[instrument(name = "handler::dashboard", skip(app_state, user), fields(user_id = user.0.id), err(Display))]
pub async fn dashboard_handler(app_state: web::Data<AppState>, user: CurrentUser) -> Result<HttpResponse, AppError> {
  let user = user.0;
  let store = app_state.store.as_ref();
  let referrals = store.list_referrals_by_referrer(user.id).await?;

  let body = match user.role {
    Role::Provider => json!({
        "user": user,
        "earnings": store.provider_earnings(user.id).await?,
        "payouts": store.provider_payouts(user.id).await?,
        "services": store.list_services_by_provider(user.id).await?,
        "clientEngagements": [],
        "points": user.points,
        "referralCode": user.referral_code,
        "referrals": referrals,
    }),
    Role::Client => json!({
        "user": user,
        "earnings": 0.0,
        "payouts": [],
        "services": [],
        "clientEngagements": store.list_engagements_for_client(user.id).await?,
        "points": user.points,
        "referralCode": user.referral_code,
        "referrals": referrals,
    }),
  };
  Ok(HttpResponse::Ok().json(body))
}
