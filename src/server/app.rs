//! API server implementation
//!
//! Wires configuration into the fetcher, sources, aggregator, cache and
//! stats client, then serves the router.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::aggregator::Aggregator;
use crate::cache::ContestCache;
use crate::config::{CacheScope, Config};
use crate::crawler::{default_sources, HttpFetcher};
use crate::service::ContestService;
use crate::stats::StatsClient;

use super::api::create_router;

// ============================================================================
// App State
// ============================================================================

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Cache-fronted upcoming contests
    pub contests: Arc<ContestService>,

    /// Per-user submission and stats lookups
    pub stats: Arc<StatsClient>,

    /// Server start time
    pub start_time: Instant,
}

impl AppState {
    pub fn new(contests: ContestService, stats: StatsClient) -> Self {
        Self {
            contests: Arc::new(contests),
            stats: Arc::new(stats),
            start_time: Instant::now(),
        }
    }

    /// Build the production state from configuration
    ///
    /// # Errors
    ///
    /// Returns `ServerError::InitError` if the HTTP client cannot be built.
    pub fn from_config(config: &Config) -> Result<Self, ServerError> {
        let fetcher = Arc::new(
            HttpFetcher::from_config(&config.fetcher)
                .map_err(|e| ServerError::InitError(e.to_string()))?,
        );

        let aggregator = Aggregator::new(
            default_sources(Arc::clone(&fetcher)),
            config.fetcher.source_timeout(),
        );
        let cache = ContestCache::new(config.cache_ttl());
        let contests = ContestService::new(aggregator, cache, config.cache.scope);

        Ok(Self::new(contests, StatsClient::new(fetcher)))
    }
}

// ============================================================================
// API Server
// ============================================================================

/// Main API server
pub struct ApiServer {
    config: Config,
    state: AppState,
}

impl ApiServer {
    /// Create a new server from configuration
    pub fn new(config: Config) -> Result<Self, ServerError> {
        config
            .validate()
            .map_err(|e| ServerError::ConfigError(e.to_string()))?;

        let state = AppState::from_config(&config)?;
        Ok(Self { config, state })
    }

    /// Build the router with all routes and layers
    pub fn build_router(&self) -> Router {
        let mut router = create_router(self.state.clone());

        if self.config.server.enable_cors {
            router = router.layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            );
        }

        if self.config.server.enable_request_logging {
            router = router.layer(TraceLayer::new_for_http());
        }

        router
    }

    /// Start with graceful shutdown
    pub async fn start_with_shutdown(
        &self,
        shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> Result<(), ServerError> {
        let router = self.build_router();
        let addr = self.config.bind_address();

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::BindError(format!("{addr}: {e}")))?;

        tracing::info!(%addr, "CP Tracker API listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal)
            .await
            .map_err(|e| ServerError::ServeError(e.to_string()))?;

        tracing::info!("API server shutdown complete");
        Ok(())
    }

    /// Get server info
    pub fn info(&self) -> ServerInfo {
        ServerInfo {
            bind_address: self.config.bind_address(),
            cache_ttl_secs: self.config.cache.ttl_secs,
            cache_scope: self.config.cache.scope,
            source_timeout_secs: self.config.fetcher.source_timeout_secs,
            cors_enabled: self.config.server.enable_cors,
            request_logging_enabled: self.config.server.enable_request_logging,
        }
    }
}

/// Server information
#[derive(Debug, Clone)]
pub struct ServerInfo {
    pub bind_address: SocketAddr,
    pub cache_ttl_secs: u64,
    pub cache_scope: CacheScope,
    pub source_timeout_secs: u64,
    pub cors_enabled: bool,
    pub request_logging_enabled: bool,
}

impl ServerInfo {
    /// Format as display string
    pub fn display(&self) -> String {
        format!(
            "CP Tracker API\n\
             {:-<40}\n\
             Bind Address: {}\n\
             Cache TTL: {}s ({:?})\n\
             Source Timeout: {}s\n\
             CORS: {}\n\
             Request Logging: {}",
            "",
            self.bind_address,
            self.cache_ttl_secs,
            self.cache_scope,
            self.source_timeout_secs,
            if self.cors_enabled { "enabled" } else { "disabled" },
            if self.request_logging_enabled { "enabled" } else { "disabled" }
        )
    }
}

/// Resolves on Ctrl+C (and SIGTERM on unix)
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to wait for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

// ============================================================================
// Server Errors
// ============================================================================

/// Server errors
#[derive(Debug, Clone, Error)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Initialization error
    #[error("Initialization error: {0}")]
    InitError(String),

    /// Failed to bind to address
    #[error("Failed to bind: {0}")]
    BindError(String),

    /// Server error
    #[error("Server error: {0}")]
    ServeError(String),
}

// ============================================================================
// Tests
// ============================================================================
