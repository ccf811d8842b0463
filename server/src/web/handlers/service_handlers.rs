// server/src/web/handlers/service_handlers.rs

use actix_web::{web, HttpResponse};
use marketplace_core::catalog::{self, ServiceDraft};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};

use super::see_other;
use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::CurrentUser;

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ServiceForm {
  #[serde(default)]
  pub title: String,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub base_rate: String,
  #[serde(default)]
  pub incentive_type: String,
  pub incentive_details: Option<String>,
}

#[instrument(name = "handler::list_services", skip(app_state), err(Display))]
pub async fn list_services_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let services = app_state.store.list_services().await?;
  info!("Fetched {} services.", services.len());
  Ok(HttpResponse::Ok().json(json!({ "services": services })))
}

#[instrument(name = "handler::new_service_page", skip(user), fields(user_id = user.0.id))]
pub async fn new_service_page_handler(user: CurrentUser) -> HttpResponse {
  HttpResponse::Ok().json(json!({
      "title": "New Service",
      "incentiveTypes": ["milestone", "referral", "performance"],
  }))
}

#[instrument(
    name = "handler::create_service",
    skip(app_state, user, form),
    fields(user_id = user.0.id, title = %form.title),
    err(Display)
)]
pub async fn create_service_handler(
  app_state: web::Data<AppState>,
  user: CurrentUser,
  form: web::Form<ServiceForm>,
) -> Result<HttpResponse, AppError> {
  let form = form.into_inner();
  let service_id = catalog::create_service(
    app_state.store.as_ref(),
    &user.0,
    ServiceDraft {
      title: form.title,
      description: form.description,
      base_rate: form.base_rate,
      incentive_type: form.incentive_type,
      incentive_details: form.incentive_details,
    },
  )
  .await?;

  Ok(see_other("/services").json(json!({
      "message": "Service created",
      "serviceId": service_id,
  })))
}

#[instrument(name = "handler::my_services", skip(app_state, user), fields(user_id = user.0.id), err(Display))]
pub async fn my_services_handler(app_state: web::Data<AppState>, user: CurrentUser) -> Result<HttpResponse, AppError> {
  let services = app_state.store.list_services_by_provider(user.0.id).await?;
  Ok(HttpResponse::Ok().json(json!({ "services": services })))
}

#[instrument(name = "handler::get_service", skip(app_state, path), fields(service_id = %path.as_ref()), err(Display))]
pub async fn get_service_handler(app_state: web::Data<AppState>, path: web::Path<i64>) -> Result<HttpResponse, AppError> {
  let service_id = path.into_inner();
  let service = app_state
    .store
    .get_service(service_id)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("service {} not found", service_id)))?;
  Ok(HttpResponse::Ok().json(json!({ "service": service })))
}
