// server/src/services/session_store.rs

//! Server-side login sessions keyed by an opaque cookie token.

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::{debug, instrument};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "marketplace_session";

#[derive(Debug, Clone, Copy)]
struct Session {
  user_id: i64,
  issued_at: DateTime<Utc>,
}

/// In-memory session table. Sessions do not survive a restart.
#[derive(Debug)]
pub struct SessionStore {
  ttl: Duration,
  sessions: RwLock<HashMap<Uuid, Session>>,
}

impl SessionStore {
  pub fn new(ttl: Duration) -> Self {
    Self {
      ttl,
      sessions: RwLock::new(HashMap::new()),
    }
  }

  pub fn ttl(&self) -> Duration {
    self.ttl
  }

  #[instrument(name = "sessions::issue", skip(self))]
  pub fn issue(&self, user_id: i64) -> Uuid {
    self.issue_at(user_id, Utc::now())
  }

  fn issue_at(&self, user_id: i64, issued_at: DateTime<Utc>) -> Uuid {
    let token = Uuid::new_v4();
    let mut sessions = self.sessions.write();
    // Expired entries are dropped whenever a new session is issued.
    let ttl = self.ttl;
    sessions.retain(|_, s| issued_at - s.issued_at < ttl);
    sessions.insert(token, Session { user_id, issued_at });
    debug!(active_sessions = sessions.len(), "Session issued.");
    token
  }

  /// The user behind a token, if the session exists and has not expired.
  pub fn resolve(&self, token: &Uuid) -> Option<i64> {
    self.resolve_at(token, Utc::now())
  }

  fn resolve_at(&self, token: &Uuid, now: DateTime<Utc>) -> Option<i64> {
    let session = *self.sessions.read().get(token)?;
    if now - session.issued_at < self.ttl {
      Some(session.user_id)
    } else {
      self.sessions.write().remove(token);
      debug!("Expired session discarded.");
      None
    }
  }

  pub fn revoke(&self, token: &Uuid) -> bool {
    self.sessions.write().remove(token).is_some()
  }
}
