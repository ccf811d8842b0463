// tests/common/mod.rs
#![allow(dead_code)] // Not every test file uses every helper

use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use actix_web::http::header;
use actix_web::test::TestRequest;
use marketplace::config::AppConfig;
use marketplace::services::SESSION_COOKIE;
use marketplace::state::AppState;
use marketplace_core::SqliteStore;
use once_cell::sync::Lazy;
use std::sync::Arc;
use tracing::Level;

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

/// Application state over a private in-memory database, without demo data.
pub async fn test_state() -> AppState {
  setup_tracing();
  let store = SqliteStore::in_memory().await.expect("open in-memory store");
  AppState::new(
    Arc::new(store),
    AppConfig {
      seed_db: false,
      ..AppConfig::default()
    },
  )
  .expect("default configuration is valid")
}

pub fn register_request(role: &str, name: &str, email: &str, referral_code: Option<&str>) -> TestRequest {
  TestRequest::post().uri("/register").set_form([
    ("role", role),
    ("name", name),
    ("email", email),
    ("password", "password123"),
    ("referralCode", referral_code.unwrap_or("")),
  ])
}

pub fn login_request(email: &str, password: &str) -> TestRequest {
  TestRequest::post()
    .uri("/login")
    .set_form([("email", email), ("password", password)])
}

pub fn location<B>(resp: &ServiceResponse<B>) -> String {
  resp
    .headers()
    .get(header::LOCATION)
    .expect("redirect has a location")
    .to_str()
    .expect("ascii location")
    .to_string()
}

pub fn session_cookie<B>(resp: &ServiceResponse<B>) -> Cookie<'static> {
  resp
    .response()
    .cookies()
    .find(|c| c.name() == SESSION_COOKIE)
    .map(|c| c.into_owned())
    .expect("response sets the session cookie")
}
