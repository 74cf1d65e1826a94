//! HTTP API server for the vox gateway

pub mod chat;
pub mod health;

use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::Result;
use crate::config::Config;
use crate::pipeline::VoicePipeline;

/// Shared state for API handlers
pub struct ApiState {
    /// The request pipeline
    pub pipeline: VoicePipeline,
    /// Loaded configuration, for capability reporting
    pub config: Config,
}

/// The API server
pub struct ApiServer {
    state: Arc<ApiState>,
    host: String,
    port: u16,
}

impl ApiServer {
    /// Create a server from shared state and bind settings
    #[must_use]
    pub const fn new(state: Arc<ApiState>, host: String, port: u16) -> Self {
        Self { state, host, port }
    }

    /// Build the full router with CORS and request tracing
    #[must_use]
    pub fn router(&self) -> Router {
        let router = Router::new()
            .merge(health::router(self.state.clone()))
            .merge(chat::router(self.state.clone()));

        // Permissive CORS: the demo client is served from another origin
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        router.layer(cors).layer(TraceLayer::new_for_http())
    }

    /// Run the API server
    ///
    /// # Errors
    ///
    /// Returns error if the server fails to bind or run
    pub async fn run(self) -> Result<()> {
        let addr = format!("{}:{}", self.host, self.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| crate::Error::Config(format!("failed to bind API server: {e}")))?;

        tracing::info!(addr, "API server listening");

        axum::serve(listener, self.router())
            .await
            .map_err(|e| crate::Error::Config(format!("API server error: {e}")))?;

        Ok(())
    }
}
