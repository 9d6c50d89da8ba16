//! Web server for MODULIST.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use chrono::Utc;
use tokio::net::TcpListener;

use crate::auth::PasswordLinkIssuer;
use crate::config::ServerConfig;
use crate::db::PasswordLinkRepository;
use crate::{Database, ModulistError, Result};

use super::handlers::AppState;
use super::router::create_router;

/// Interval between purges of expired password links.
const LINK_PURGE_INTERVAL: Duration = Duration::from_secs(3600);

/// Web server for the API.
pub struct WebServer {
    /// Server address.
    addr: SocketAddr,
    /// Application state.
    app_state: Arc<AppState>,
}

impl WebServer {
    /// Create a new web server.
    pub fn new(config: &ServerConfig, app_state: AppState) -> Result<Self> {
        let addr = format!("{}:{}", config.host, config.port)
            .parse()
            .map_err(|e| ModulistError::Config(format!("invalid server address: {e}")))?;

        Ok(Self {
            addr,
            app_state: Arc::new(app_state),
        })
    }

    /// Get the configured server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Start the password link purge task.
    ///
    /// Expired links are already rejected on use; this only keeps the
    /// table small.
    fn start_link_purge_task(db: Database) {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(LINK_PURGE_INTERVAL);

            // Skip the first immediate tick
            interval.tick().await;

            loop {
                interval.tick().await;

                let store = PasswordLinkRepository::new(db.pool());
                match PasswordLinkIssuer::new(&store).purge_expired(Utc::now()).await {
                    Ok(0) => tracing::debug!("No expired password links to clean up"),
                    Ok(_) => {}
                    Err(e) => tracing::warn!(error = %e, "Failed to purge password links"),
                }
            }
        });
    }

    async fn bind(self) -> Result<(TcpListener, Router)> {
        let db = self.app_state.db.clone();
        let router = create_router(self.app_state);

        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;

        Self::start_link_purge_task(db);
        tracing::info!("Web server listening on http://{}", local_addr);

        Ok((listener, router))
    }

    /// Run the web server until Ctrl-C.
    pub async fn run(self) -> Result<()> {
        let (listener, router) = self.bind().await?;

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Web server stopped");
        Ok(())
    }

    /// Run the server in the background and return the bound address.
    ///
    /// Useful for tests binding to port 0.
    pub async fn run_with_addr(self) -> Result<SocketAddr> {
        let (listener, router) = self.bind().await?;
        let local_addr = listener.local_addr()?;

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!("Web server error: {}", e);
            }
        });

        Ok(local_addr)
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received");
}
