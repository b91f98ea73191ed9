pub mod errors;
pub mod handlers;

pub use errors::ApiError;

use anyhow::{Context, Result};
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::analysis::Analyzer;
use crate::config::ServerConfig;

#[derive(Clone)]
pub struct AppState {
    pub(crate) analyzer: Arc<Analyzer>,
}

/// Build the HTTP surface around an analyzer.
pub fn build_router(analyzer: Arc<Analyzer>) -> Router {
    let state = AppState { analyzer };

    Router::new()
        .route("/analyze", get(handlers::analyze))
        .route("/retrieve_analysis", get(handlers::retrieve_analysis))
        .route("/download/:image_id", get(handlers::download_image))
        .route("/algorithms", get(handlers::list_algorithms))
        .route("/health", get(handlers::health_check))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub struct AnalyzerServer {
    config: ServerConfig,
    analyzer: Arc<Analyzer>,
}

impl AnalyzerServer {
    pub fn new(config: ServerConfig, analyzer: Arc<Analyzer>) -> Self {
        Self { config, analyzer }
    }

    pub fn from_config(config: ServerConfig) -> Result<Self> {
        let analyzer = Analyzer::from_config(&config).context("Failed to initialize analyzer")?;
        Ok(Self::new(config, Arc::new(analyzer)))
    }

    pub fn analyzer(&self) -> Arc<Analyzer> {
        Arc::clone(&self.analyzer)
    }

    pub fn router(&self) -> Router {
        build_router(self.analyzer())
    }

    pub async fn run(&self) -> Result<()> {
        let cleanup = self.start_background_tasks();

        let address = self.config.bind_address();
        let listener = tokio::net::TcpListener::bind(&address)
            .await
            .with_context(|| format!("Failed to bind {}", address))?;
        info!("✅ Complexity analyzer listening on http://{}", address);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("HTTP server error")?;

        cleanup.abort();
        info!("Server stopped");
        Ok(())
    }

    /// Periodically drop expired cache entries.
    fn start_background_tasks(&self) -> JoinHandle<()> {
        let analyzer = self.analyzer();
        let period = self.config.cache.cleanup_interval();

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.tick().await;
            loop {
                interval.tick().await;
                let removed = analyzer.cache().purge_expired();
                debug!(
                    "Cache cleanup removed {} entries ({} remain)",
                    removed,
                    analyzer.cache().len()
                );
            }
        })
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
