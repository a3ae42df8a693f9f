mod config;
mod errors;
mod layout;
mod routes;
mod settings;
mod state;
mod teams;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::routes::build_router;
use crate::settings::store::load_seed_file;
use crate::state::AppState;
use crate::teams::binding::binder_from_name;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting seatplan v{}", env!("CARGO_PKG_VERSION"));

    // Seed settings (optional JSON file)
    let seeds = match &config.seed_file {
        Some(path) => load_seed_file(path)?,
        None => Vec::new(),
    };

    // Team binder (index by default, swap via SEATPLAN_BINDER)
    let binder = binder_from_name(&config.binder)?;
    info!("Team binder: {}", binder.name());

    let state = AppState::new(seeds, binder)?;

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
