// server/src/web/handlers/auth_handlers.rs

use actix_web::{web, HttpRequest, HttpResponse};
use marketplace_core::accounts::{self, Registration};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};

use super::see_other;
use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::{expired_session_cookie, session_cookie, session_token, MaybeUser};

#[derive(Deserialize, Debug)]
pub struct LoginForm {
  #[serde(default)]
  pub email: String,
  #[serde(default)]
  pub password: String,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RegisterForm {
  #[serde(default)]
  pub role: String,
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub email: String,
  #[serde(default)]
  pub password: String,
  pub referral_code: Option<String>,
}

#[instrument(name = "handler::home", skip(user))]
pub async fn home_handler(user: MaybeUser) -> HttpResponse {
  HttpResponse::Ok().json(json!({
      "title": "Home",
      "currentUser": user.0,
  }))
}

#[instrument(name = "handler::login_page", skip(user))]
pub async fn login_page_handler(user: MaybeUser) -> HttpResponse {
  if user.0.is_some() {
    return see_other("/dashboard").finish();
  }
  HttpResponse::Ok().json(json!({
      "title": "Login",
      "fields": ["email", "password"],
  }))
}

#[instrument(
    name = "handler::login",
    skip(app_state, form),
    fields(req_email = %form.email),
    err(Display)
)]
pub async fn login_handler(app_state: web::Data<AppState>, form: web::Form<LoginForm>) -> Result<HttpResponse, AppError> {
  let user = accounts::authenticate(app_state.store.as_ref(), &form.email, &form.password).await?;
  let token = app_state.sessions.issue(user.id);
  info!(user_id = user.id, "User logged in.");

  Ok(see_other("/dashboard").cookie(session_cookie(token, &app_state)).json(json!({
      "message": "Welcome back!",
      "userId": user.id,
  })))
}

#[instrument(name = "handler::logout", skip(app_state, req))]
pub async fn logout_handler(app_state: web::Data<AppState>, req: HttpRequest) -> HttpResponse {
  if let Some(token) = session_token(&req) {
    if app_state.sessions.revoke(&token) {
      info!("Session ended.");
    }
  }
  see_other("/").cookie(expired_session_cookie()).finish()
}

#[instrument(name = "handler::register_page", skip(user))]
pub async fn register_page_handler(user: MaybeUser) -> HttpResponse {
  if user.0.is_some() {
    return see_other("/dashboard").finish();
  }
  HttpResponse::Ok().json(json!({
      "title": "Register",
      "roles": ["provider", "client"],
      "fields": ["role", "name", "email", "password", "referralCode"],
  }))
}

#[instrument(
    name = "handler::register",
    skip(app_state, form),
    fields(req_email = %form.email, role = %form.role),
    err(Display)
)]
pub async fn register_handler(
  app_state: web::Data<AppState>,
  form: web::Form<RegisterForm>,
) -> Result<HttpResponse, AppError> {
  let form = form.into_inner();
  let user_id = accounts::register(
    app_state.store.as_ref(),
    Registration {
      role: form.role,
      name: form.name,
      email: form.email,
      password: form.password,
      referral_code: form.referral_code,
    },
  )
  .await?;

  let token = app_state.sessions.issue(user_id);
  info!(user_id, "Registered user logged in.");

  Ok(see_other("/dashboard").cookie(session_cookie(token, &app_state)).json(json!({
      "message": "Welcome to the platform!",
      "userId": user_id,
  })))
}
