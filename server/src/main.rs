// server/src/main.rs

use anyhow::Context;
use marketplace::config::{AppConfig, LogFormat};
use marketplace::listener::{bind_with_retry, PORT_RETRY_DELAY};
use marketplace::state::AppState;
use marketplace_core::{seed, MarketplaceStore, SqliteStore};
use std::sync::Arc;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

fn init_tracing(format: LogFormat) {
  let builder = tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))) // RUST_LOG override
    .with_span_events(FmtSpan::CLOSE); // Log when spans close, showing duration
  match format {
    LogFormat::Json => builder.json().init(),
    LogFormat::Text => builder.init(),
  }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
  let app_config = AppConfig::from_env().context("Failed to load application configuration")?;
  init_tracing(app_config.log_format);
  tracing::info!(
    database = %app_config.database_path.display(),
    seed_db = app_config.seed_db,
    "Starting marketplace server..."
  );

  let store = match SqliteStore::open(&app_config.database_path).await {
    Ok(store) => Arc::new(store),
    Err(e) => {
      tracing::error!(error = %e, "Failed to open the database.");
      return Err(e).context("Database initialisation failed");
    }
  };

  if app_config.seed_db {
    seed::seed_demo_data(store.as_ref())
      .await
      .context("Failed to seed demo data")?;
  }

  let served = match AppState::new(store.clone(), app_config.clone()) {
    Ok(app_state) => serve(app_state, &app_config).await,
    Err(e) => Err(e).context("Invalid application state"),
  };

  store.close().await;
  served
}

/// Binds the first free port starting at the configured one, then runs the
/// server until shutdown.
async fn serve(app_state: AppState, config: &AppConfig) -> anyhow::Result<()> {
  let factory = move || marketplace::build_app(app_state.clone()).wrap(tracing_actix_web::TracingLogger::default());
  let host = config.server_host.as_str();

  let (server, port) = bind_with_retry(config.server_port, config.port_retries, PORT_RETRY_DELAY, |port| {
    actix_web::HttpServer::new(factory.clone()).bind((host, port))
  })
  .await
  .with_context(|| format!("Failed to start server on {}", host))?;

  tracing::info!("Server running at http://{}:{}", host, port);
  server.run().await.context("HTTP server terminated with an error")?;
  tracing::info!("Server stopped.");
  Ok(())
}
