#![allow(clippy::must_use_candidate)]

mod health;
mod preflight;

use std::net::SocketAddr;

use axum::Router;
use chatbridge_config::Config;
use chatbridge_proxy::ProxyState;
use tower_http::trace::TraceLayer;

/// Assembled server with all routes and middleware
pub struct Server {
    router: Router,
    listen_address: SocketAddr,
}

impl Server {
    /// Build the server from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the upstream client cannot be constructed
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let listen_address = config.server.listen_address();

        let proxy_state = ProxyState::from_config(config)?;

        let mut app = Router::new();

        // Health check
        if config.server.health.enabled {
            app = app.route(&config.server.health.path, axum::routing::get(health::health_handler));
        }

        // Proxy routes, including the JSON 404 fallback
        app = app.merge(chatbridge_proxy::proxy_router(proxy_state));

        // Apply middleware layers (innermost first)

        // Pre-flight short-circuit
        app = app.layer(axum::middleware::from_fn(preflight::preflight_middleware));

        // Tracing
        app = app.layer(TraceLayer::new_for_http());

        Ok(Self {
            router: app,
            listen_address,
        })
    }

    /// Get the configured listen address
    #[must_use]
    pub const fn listen_address(&self) -> SocketAddr {
        self.listen_address
    }

    /// Override the listen address
    #[must_use]
    pub fn with_listen_address(mut self, listen_address: SocketAddr) -> Self {
        self.listen_address = listen_address;
        self
    }

    /// Consume the server and return the inner router
    ///
    /// Useful for testing when the caller manages the listener
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Start serving requests
    ///
    /// Blocks until the cancellation token is triggered.
    ///
    /// # Errors
    ///
    /// Returns an error if binding the TCP listener or serving fails
    pub async fn serve(self, shutdown: tokio_util::sync::CancellationToken) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.listen_address).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!(%local_addr, "server listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.cancelled().await;
                tracing::info!("graceful shutdown initiated");
            })
            .await?;

        Ok(())
    }
}
