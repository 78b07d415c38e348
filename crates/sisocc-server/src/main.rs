//! Occurrence API server binary.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `sisocc-config.yaml`
//! 3. Connect to `PostgreSQL` and run migrations
//! 4. Build the geocoding resolver
//! 5. Assemble shared state and serve

use std::path::Path;
use std::sync::Arc;

use sisocc_db::{Db, DbConfig};
use sisocc_geocode::Geocoder;
use sisocc_server::config::ServiceConfig;
use sisocc_server::server::{start_server, ServerConfig};
use sisocc_server::state::AppState;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Default configuration file path, relative to the working directory.
const CONFIG_PATH: &str = "sisocc-config.yaml";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("sisocc-server starting");

    let config = load_config()?;
    info!(
        host = config.server.host,
        port = config.server.port,
        geocode_policy = ?config.geocoding.policy,
        upload_dir = config.uploads.directory,
        "Configuration loaded"
    );

    let db = Db::connect(
        &DbConfig::new(&config.database.url)
            .with_max_connections(config.database.max_connections),
    )
    .await?;
    db.run_migrations().await?;
    info!("Database connected, migrations applied");

    let geocoder = Geocoder::new(config.geocoding.to_geocode_config())?;
    if config.geocoding.api_key.is_none() {
        tracing::warn!("no geocoding API key configured; address resolution will not succeed");
    }

    let state = Arc::new(AppState::new(
        db.pool().clone(),
        geocoder,
        config.uploads.clone(),
    ));

    let server_config = ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
    };
    start_server(&server_config, state).await?;

    Ok(())
}

/// Load the service configuration, falling back to defaults when the
/// file does not exist.
fn load_config() -> Result<ServiceConfig, Box<dyn std::error::Error>> {
    let path = Path::new(CONFIG_PATH);
    if path.exists() {
        Ok(ServiceConfig::from_file(path)?)
    } else {
        info!(path = CONFIG_PATH, "config file not found, using defaults");
        Ok(ServiceConfig::parse("{}")?)
    }
}
