// server/src/listener.rs

//! Port selection at startup: when the configured port is taken, the next
//! ports are tried in turn.

use std::io::{self, ErrorKind};
use std::time::Duration;
use tracing::{error, warn};

/// Pause between bind attempts.
pub const PORT_RETRY_DELAY: Duration = Duration::from_millis(200);

/// Calls `bind` on `first_port`, then on `first_port + 1`, ... while it fails
/// with "address in use", at most `retries` extra times. Returns the bound
/// value with the port it got. Any other error is returned at once.
pub async fn bind_with_retry<T>(
  first_port: u16,
  retries: u16,
  delay: Duration,
  mut bind: impl FnMut(u16) -> io::Result<T>,
) -> io::Result<(T, u16)> {
  let mut port = first_port;
  let mut retries_left = retries;

  loop {
    match bind(port) {
      Ok(bound) => return Ok((bound, port)),
      Err(e) if e.kind() == ErrorKind::AddrInUse && retries_left > 0 => {
        let Some(next_port) = port.checked_add(1) else {
          error!(port, "Port in use and no higher port to try.");
          return Err(e);
        };
        warn!("Port {} in use, retrying on {}...", port, next_port);
        retries_left -= 1;
        port = next_port;
        actix_rt::time::sleep(delay).await;
      }
      Err(e) => {
        error!(error = %e, port, "Failed to bind.");
        return Err(e);
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::net::TcpListener;

  const NO_DELAY: Duration = Duration::from_millis(1);

  fn listen(port: u16) -> io::Result<TcpListener> {
    TcpListener::bind(("127.0.0.1", port))
  }

  #[actix_web::test]
  async fn free_port_binds_first_time() {
    let mut attempts = 0;
    let (_listener, port) = bind_with_retry(0, 5, NO_DELAY, |port| {
      attempts += 1;
      listen(port)
    })
    .await
    .unwrap();
    assert_eq!(port, 0);
    assert_eq!(attempts, 1);
  }

  #[actix_web::test]
  async fn occupied_port_moves_to_a_later_one() {
    let taken = listen(0).unwrap();
    let taken_port = taken.local_addr().unwrap().port();

    let (listener, port) = bind_with_retry(taken_port, 5, NO_DELAY, listen).await.unwrap();
    assert!(port > taken_port && port <= taken_port.saturating_add(5));
    assert_eq!(listener.local_addr().unwrap().port(), port);
  }

  #[actix_web::test]
  async fn retries_run_out() {
    let taken = listen(0).unwrap();
    let taken_port = taken.local_addr().unwrap().port();

    let err = bind_with_retry(taken_port, 0, NO_DELAY, listen).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AddrInUse);

    let mut attempts = 0;
    let err = bind_with_retry(1000, 3, NO_DELAY, |_| {
      attempts += 1;
      Err::<(), _>(io::Error::from(ErrorKind::AddrInUse))
    })
    .await
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AddrInUse);
    assert_eq!(attempts, 4);
  }

  #[actix_web::test]
  async fn other_bind_errors_are_not_retried() {
    let mut attempts = 0;
    let err = bind_with_retry(3000, 5, NO_DELAY, |_| {
      attempts += 1;
      Err::<(), _>(io::Error::from(ErrorKind::PermissionDenied))
    })
    .await
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PermissionDenied);
    assert_eq!(attempts, 1);
  }
}
