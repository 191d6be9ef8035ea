//! HTTP API server for futureme.
//!
//! Exposes the conversation agent over a small REST surface:
//!
//! - `POST /api/chat`: run one conversation turn
//! - `GET /health`: liveness probe
//!
//! # Example
//!
//! ```ignore
//! use futureme_server::{Server, ServerConfig};
//!
//! let server = Server::new(agent, ServerConfig::default());
//! server.run().await?;
//! ```

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use config::ServerConfig;
pub use error::{Result, ServerError};
pub use routes::{ChatRequest, ChatResponse};
pub use state::AppState;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, routing::post};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use futureme_agent::FutureAgent;

/// The futureme HTTP server.
pub struct Server {
    state: AppState,
}

impl Server {
    /// Create a new server with the given agent and configuration.
    pub fn new(agent: Arc<FutureAgent>, config: ServerConfig) -> Self {
        Self {
            state: AppState::new(agent, config),
        }
    }

    /// Build the router with all routes and middleware.
    pub fn router(&self) -> Router {
        Router::new()
            .merge(routes::health_routes())
            .route("/api/chat", post(routes::chat_handler))
            .layer(self.cors_layer())
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    // Browser clients live on other origins; with no configured
    // origins the policy stays wide open.
    fn cors_layer(&self) -> CorsLayer {
        let origins: Vec<_> = self
            .state
            .config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse::<axum::http::HeaderValue>().ok())
            .collect();
        if origins.is_empty() {
            CorsLayer::permissive()
        } else {
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any)
        }
    }

    /// Run the server on the configured address.
    pub async fn run(self) -> Result<()> {
        let addr = self.state.config.bind_address;
        self.run_on(addr).await
    }

    /// Run the server on a specific address (useful for testing).
    pub async fn run_on(self, addr: SocketAddr) -> Result<()> {
        let router = self.router();

        info!("Starting server on {}", addr);

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Internal(format!("Failed to bind: {}", e)))?;

        axum::serve(listener, router)
            .await
            .map_err(|e| ServerError::Internal(format!("Server error: {}", e)))?;

        Ok(())
    }

    /// Get the configured bind address.
    pub fn bind_address(&self) -> SocketAddr {
        self.state.config.bind_address
    }
}
