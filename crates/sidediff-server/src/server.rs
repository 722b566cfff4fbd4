use std::future::Future;
use std::sync::Arc;

use sidediff_sdk::{DiffCoordinator, Reaper, StagingArea};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::handler::AppState;
use crate::router::build_router;

/// sidediff HTTP server.
///
/// Owns the coordinator for its whole life: serving stops first, then the
/// reaper, then every remaining comparison is evicted and its files removed.
pub struct SideDiffServer {
    config: ServerConfig,
    coordinator: Arc<DiffCoordinator>,
}

impl SideDiffServer {
    /// Validate `config` and prepare the staging directory.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        config.validate()?;
        let staging = StagingArea::create(config.staging_dir.clone())?;
        let coordinator = Arc::new(DiffCoordinator::new(staging, config.ttl()));
        Ok(Self {
            config,
            coordinator,
        })
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn coordinator(&self) -> Arc<DiffCoordinator> {
        Arc::clone(&self.coordinator)
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(
            AppState::new(Arc::clone(&self.coordinator)),
            self.config.max_body_bytes,
        )
    }

    /// Serve until Ctrl-C.
    pub async fn serve(self) -> ServerResult<()> {
        self.serve_with_shutdown(shutdown_signal()).await
    }

    /// Bind the configured address and serve until `signal` completes.
    pub async fn serve_with_shutdown<F>(self, signal: F) -> ServerResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        self.run(listener, signal).await
    }

    /// Serve on an already bound listener until `signal` completes.
    pub async fn run<F>(self, listener: TcpListener, signal: F) -> ServerResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        info!(
            %addr,
            staging_dir = %self.config.staging_dir.display(),
            ttl_secs = self.config.ttl_secs,
            "sidediff server listening"
        );

        let reaper = Reaper::spawn(self.coordinator.store(), self.config.sweep_interval());
        let served = axum::serve(listener, self.router())
            .with_graceful_shutdown(signal)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()));

        reaper.stop().await;
        self.cleanup().await;
        served
    }

    async fn cleanup(&self) {
        let coordinator = Arc::clone(&self.coordinator);
        let grace = self.config.shutdown_grace();
        let task = tokio::task::spawn_blocking(move || coordinator.shutdown());
        match tokio::time::timeout(grace, task).await {
            Ok(Ok(evicted)) => info!(evicted, "staged parts cleaned up"),
            Ok(Err(err)) => error!(error = %err, "cleanup task failed"),
            Err(_) => warn!(
                grace_secs = self.config.shutdown_grace_secs,
                "cleanup did not finish within the grace period"
            ),
        }
    }
}

/// Resolves on Ctrl-C.
pub async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
