//! Backend entry-point: loads configuration, prepares storage and serves the
//! booking REST API with OpenAPI docs.

mod server;

use color_eyre::eyre::{Context, Result, eyre};
use mockable::DefaultEnv;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use booking::inbound::http::health::HealthState;
use booking::inbound::http::session_config::{BuildMode, session_settings_from_env};
use booking::outbound::persistence::{DbPool, PoolConfig, run_migrations};
use booking::settings::AppSettings;
use ortho_config::OrthoConfig;
use server::{ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().map_err(|err| eyre!("failed to load settings: {err}"))?;
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .wrap_err("invalid session configuration")?;
    info!(fingerprint = %session.key_fingerprint(), "session key loaded");

    let bind_addr = settings.bind_addr().wrap_err("invalid bind address")?;
    let mut config = ServerConfig::new(session, settings.account_policy(), bind_addr);

    if let Some(database_url) = settings.database_url.as_deref() {
        run_migrations(database_url)
            .await
            .wrap_err("failed to apply database migrations")?;
        let pool = DbPool::new(PoolConfig::new(database_url).with_max_size(settings.db_pool_size))
            .await
            .wrap_err("failed to create database pool")?;
        config = config.with_db_pool(pool);
        info!("connected to PostgreSQL");
    }

    let health_state = actix_web::web::Data::new(HealthState::new());
    let server = create_server(health_state, config)?;
    info!(%bind_addr, "listening");
    server.await?;
    Ok(())
}
