// server/src/web/extractors.rs

//! Session-backed request guards.

use actix_web::cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;
use marketplace_core::models::User;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::services::SESSION_COOKIE;
use crate::state::AppState;

/// Session token carried by the request's cookie, if it parses.
pub fn session_token(req: &HttpRequest) -> Option<Uuid> {
  req
    .cookie(SESSION_COOKIE)
    .and_then(|cookie| Uuid::parse_str(cookie.value()).ok())
}

pub fn session_cookie(token: Uuid, state: &AppState) -> Cookie<'static> {
  Cookie::build(SESSION_COOKIE, token.to_string())
    .path("/")
    .http_only(true)
    .same_site(SameSite::Lax)
    .max_age(CookieDuration::seconds(state.sessions.ttl().num_seconds()))
    .finish()
}

pub fn expired_session_cookie() -> Cookie<'static> {
  let mut cookie = Cookie::build(SESSION_COOKIE, "").path("/").http_only(true).finish();
  cookie.make_removal();
  cookie
}

fn app_state(req: &HttpRequest) -> Result<web::Data<AppState>, AppError> {
  req
    .app_data::<web::Data<AppState>>()
    .cloned()
    .ok_or_else(|| AppError::Internal("Application state is not configured.".to_string()))
}

async fn user_for_session(state: &AppState, token: Option<Uuid>) -> Result<Option<User>, AppError> {
  let Some(user_id) = token.and_then(|t| state.sessions.resolve(&t)) else {
    return Ok(None);
  };
  let user = state.store.get_user(user_id).await?;
  if user.is_none() {
    warn!(user_id, "Session refers to a user that no longer exists.");
  }
  Ok(user)
}

/// The logged-in user. Rejects with a redirect to `/login` when there is no
/// live session.
#[derive(Debug)]
pub struct CurrentUser(pub User);

impl FromRequest for CurrentUser {
  type Error = AppError;
  type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let state = app_state(req);
    let token = session_token(req);
    Box::pin(async move {
      let state = state?;
      match user_for_session(&state, token).await? {
        Some(user) => {
          debug!(user_id = user.id, "Request authenticated by session.");
          Ok(CurrentUser(user))
        }
        None => Err(AppError::Unauthenticated),
      }
    })
  }
}

/// The logged-in user when there is one; never rejects for a missing session.
#[derive(Debug)]
pub struct MaybeUser(pub Option<User>);

impl FromRequest for MaybeUser {
  type Error = AppError;
  type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let state = app_state(req);
    let token = session_token(req);
    Box::pin(async move {
      let state = state?;
      Ok(MaybeUser(user_for_session(&state, token).await?))
    })
  }
}
