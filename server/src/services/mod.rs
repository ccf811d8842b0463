// server/src/services/mod.rs

pub mod session_store;

pub use session_store::{SessionStore, SESSION_COOKIE};
