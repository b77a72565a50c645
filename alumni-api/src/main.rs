//! alumni-api - Alumni Directory administrative service
//!
//! Search, save, and bulk-import alumni contact records; manage staff
//! accounts; authenticate via password or Google sign-in.

use alumni_api::{build_router, AppState};
use alumni_common::config::Config;
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "alumni-api", about = "Alumni Directory administrative service")]
struct Args {
    /// Path to a TOML configuration file
    #[arg(long, env = "ALUMNI_CONFIG")]
    config: Option<PathBuf>,

    /// Listen address override, e.g. 0.0.0.0:8000
    #[arg(long)]
    bind: Option<String>,

    /// Database file override
    #[arg(long)]
    database: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Build identification before any database delays
    info!(
        "Starting Alumni Directory API v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();

    let mut config = Config::resolve(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if let Some(database) = args.database {
        config.database_path = database;
    }
    info!("Database path: {}", config.database_path.display());

    let pool = alumni_common::db::init_database(&config.database_path).await?;

    let bind_addr = config.bind_addr.clone();
    let state = AppState::new(pool, config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("alumni-api listening on http://{}", bind_addr);
    info!("Health check: http://{}/health", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
