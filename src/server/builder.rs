//! ServerBuilder for fluent API to build the HTTP server

use super::handlers::AppState;
use super::router::build_order_routes;
use crate::board::OrderBoard;
use crate::config::DeskConfig;
use crate::core::store::OrderStore;
use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Builder for the order-board HTTP server
///
/// # Example
///
/// ```ignore
/// ServerBuilder::new()
///     .with_store(InMemoryOrderStore::new())
///     .with_config(DeskConfig::default_config())
///     .serve()
///     .await?;
/// ```
pub struct ServerBuilder {
    store: Option<Arc<dyn OrderStore>>,
    config: DeskConfig,
    custom_routes: Vec<Router>,
}

impl ServerBuilder {
    pub fn new() -> Self {
        Self {
            store: None,
            config: DeskConfig::default_config(),
            custom_routes: Vec::new(),
        }
    }

    /// Set the order store (required)
    pub fn with_store(mut self, store: impl OrderStore + 'static) -> Self {
        self.store = Some(Arc::new(store));
        self
    }

    /// Set an already shared order store
    pub fn with_shared_store(mut self, store: Arc<dyn OrderStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_config(mut self, config: DeskConfig) -> Self {
        self.config = config;
        self
    }

    /// Merge extra routes next to the order routes
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Build the router
    pub fn build(self) -> Result<Router> {
        let store = self
            .store
            .ok_or_else(|| anyhow::anyhow!("OrderStore is required. Call .with_store()"))?;

        let state = AppState::new(OrderBoard::new(store), self.config);
        let router = self
            .custom_routes
            .into_iter()
            .fold(build_order_routes(state), |app, routes| app.merge(routes));
        Ok(router)
    }

    /// Serve on the configured address with graceful shutdown
    ///
    /// Handles SIGTERM and SIGINT (Ctrl+C).
    pub async fn serve(self) -> Result<()> {
        let addr = self.config.server.addr.clone();
        let app = self.build()?;
        let listener = TcpListener::bind(&addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves on Ctrl+C or SIGTERM
///
/// A handler that fails to install never resolves, so the other signal
/// still works.
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryOrderStore;

    #[test]
    fn test_build_requires_store() {
        let err = ServerBuilder::new().build().unwrap_err();
        assert!(err.to_string().contains("OrderStore is required"));
    }

    #[test]
    fn test_build_with_store() {
        assert!(
            ServerBuilder::default()
                .with_store(InMemoryOrderStore::new())
                .build()
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_custom_routes_are_merged() {
        let extra = Router::new().route("/ping", axum::routing::get(|| async { "pong" }));
        let app = ServerBuilder::new()
            .with_store(InMemoryOrderStore::new())
            .with_custom_routes(extra)
            .build()
            .unwrap();

        let server = axum_test::TestServer::try_new(app).unwrap();
        server.get("/ping").await.assert_text("pong");
        server.get("/health").await.assert_status_ok();
    }
}
