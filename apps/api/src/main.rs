mod auth;
mod config;
mod db;
mod errors;
mod interview;
mod jobs;
mod models;
mod performance;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::auth::directory::PgUserDirectory;
use crate::config::Config;
use crate::db::{create_pool, run_migrations};
use crate::interview::store::PgCandidateStore;
use crate::jobs::store::PgResumeStore;
use crate::routes::{build_cors_layer, build_router};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "recruitment_api={level},tower_http={level}",
                level = &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Recruitment API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url, config.database_max_connections).await?;
    run_migrations(&db).await?;

    let state = AppState {
        db: db.clone(),
        config: config.clone(),
        candidates: Arc::new(PgCandidateStore::new(db.clone())),
        resumes: Arc::new(PgResumeStore::new(db.clone())),
        users: Arc::new(PgUserDirectory::new(db)),
    };

    // Build router
    let cors = build_cors_layer(&config.cors_origins);
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
