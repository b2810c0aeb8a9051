//! Web UI and JSON API for editing the catalog and previewing tool choice.
//!
//! Routes:
//!   GET  /                  Tool tester page
//!   GET  /api/tools         Current catalog
//!   POST /api/test          Propose-only round trip for `{query}`
//!   POST /api/update-tools  Replace the catalog with `{tools}`

pub mod error;
pub mod handlers;

pub use error::ApiError;

use crate::agent::Orchestrator;
use crate::catalog::{SessionCatalogs, ToolCatalog};
use crate::config::{CatalogScope, TesterConfig};
use anyhow::{Context, Result};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::info;

pub const SESSION_COOKIE: &str = "tool_tester_session";

/// Where request handlers get their catalog from.
#[derive(Clone)]
pub enum CatalogSource {
    Global(Arc<ToolCatalog>),
    Session(Arc<SessionCatalogs>),
}

impl CatalogSource {
    pub fn from_config(config: &TesterConfig) -> Self {
        match config.catalog_scope {
            CatalogScope::Global => Self::Global(Arc::new(ToolCatalog::default())),
            CatalogScope::Session => Self::Session(Arc::new(SessionCatalogs::new(
                Duration::from_secs(config.session_ttl_secs),
            ))),
        }
    }
}

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub catalogs: CatalogSource,
}

impl AppState {
    pub fn new(orchestrator: Arc<Orchestrator>, catalogs: CatalogSource) -> Self {
        Self {
            orchestrator,
            catalogs,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/tools", get(handlers::list_tools))
        .route("/api/test", post(handlers::test_query))
        .route("/api/update-tools", post(handlers::update_tools))
        .fallback(handlers::not_found)
        .with_state(state)
}

/// Bind and serve until `cancel` fires.
pub async fn serve(config: &TesterConfig, state: AppState, cancel: CancellationToken) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;

    info!(
        "Tool tester listening on {} (model: {}, catalog scope: {:?})",
        config.bind_addr,
        state.orchestrator.model(),
        config.catalog_scope
    );
    info!("Open {} in a browser", config.public_url());

    if let CatalogSource::Session(store) = &state.catalogs {
        let period = Duration::from_secs(config.session_ttl_secs.max(2) / 2);
        tokio::spawn(sweep_sessions(store.clone(), period, cancel.clone()));
    }

    let shutdown = cancel.clone();
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .context("Server error")?;

    info!("Tool tester stopped");
    Ok(())
}

async fn sweep_sessions(store: Arc<SessionCatalogs>, period: Duration, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval(period);
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                store.evict_expired(Instant::now()).await;
            }
        }
    }
}
