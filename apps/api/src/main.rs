mod auth;
mod config;
mod documents;
mod embedding;
mod errors;
mod matching;
mod models;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::auth::{InMemoryUserRepository, SessionStore};
use crate::config::Config;
use crate::embedding::create_provider;
use crate::matching::engine::MatchEngine;
use crate::matching::extractor::SkillExtractor;
use crate::matching::vocabulary::SkillVocabulary;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting SkillGap API v{}", env!("CARGO_PKG_VERSION"));

    // Skill vocabulary: built-in list unless a file is configured
    let vocabulary = match &config.skill_vocabulary_path {
        Some(path) => SkillVocabulary::from_file(path)?,
        None => SkillVocabulary::default(),
    };
    info!(
        "Skill vocabulary loaded ({} phrases, match mode: {:?})",
        vocabulary.len(),
        config.skill_match_mode
    );

    // Embedding provider is loaded once and shared read-only by all requests
    let provider = create_provider(&config)?;

    let extractor = SkillExtractor::new(Arc::new(vocabulary), config.skill_match_mode);
    let engine = Arc::new(MatchEngine::new(extractor, provider));

    // Build app state
    let state = AppState {
        config: config.clone(),
        engine,
        users: Arc::new(InMemoryUserRepository::default()),
        sessions: Arc::new(SessionStore::new(Duration::from_secs(
            config.session_idle_ttl_secs,
        ))),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the dashboard has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
