//! Main sync server.

use crate::config::ServerConfig;
use crate::error::ServerResult;
use crate::handler::RequestHandler;
use crate::http;
use crate::store::{ExclusiveStore, SerializedStore};
use axum::Router;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// The sync server.
///
/// Holds the authoritative copy of every document and serves the `/sync`
/// endpoint.
///
/// # Example
///
/// ```no_run
/// use hsync_server::{ServerConfig, SyncServer};
///
/// # async fn run() -> hsync_server::ServerResult<()> {
/// let config = ServerConfig::new("127.0.0.1:8080".parse().unwrap(), "/srv/notes");
/// let server = SyncServer::new(config)?;
/// server.serve(async { let _ = tokio::signal::ctrl_c().await; }).await
/// # }
/// ```
pub struct SyncServer {
    handler: Arc<RequestHandler>,
}

impl SyncServer {
    /// Creates a server storing documents under `config.data_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be created.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let store = SerializedStore::open_dir(&config.data_dir, &config.document_suffix)?;
        Ok(Self::with_store(config, Arc::new(store)))
    }

    /// Creates a server over an existing store.
    pub fn with_store(config: ServerConfig, store: Arc<dyn ExclusiveStore>) -> Self {
        Self {
            handler: Arc::new(RequestHandler::new(config, store)),
        }
    }

    /// Returns the request handler.
    pub fn handler(&self) -> Arc<RequestHandler> {
        Arc::clone(&self.handler)
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ServerConfig {
        self.handler.config()
    }

    /// Builds the HTTP router.
    pub fn router(&self) -> Router {
        http::router(self.handler())
    }

    /// Binds the configured address and serves until `shutdown` completes.
    ///
    /// In-flight requests finish before this returns.
    pub async fn serve<F>(self, shutdown: F) -> ServerResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(self.config().bind_addr).await?;
        self.serve_on(listener, shutdown).await
    }

    /// Serves on an already-bound listener.
    pub async fn serve_on<F>(self, listener: TcpListener, shutdown: F) -> ServerResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        info!(
            addr = %listener.local_addr()?,
            data_dir = %self.config().data_dir.display(),
            "sync server listening"
        );

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("sync server stopped");
        Ok(())
    }
}
