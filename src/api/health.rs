//! Health and capability endpoints

use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use super::ApiState;

/// Root banner, kept for clients that probe `/`
#[derive(Serialize)]
pub struct RootResponse {
    pub message: &'static str,
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Which pipeline stages can currently resolve their assets
#[derive(Serialize)]
pub struct CapabilitiesResponse {
    pub stt_available: bool,
    pub llm_configured: bool,
    pub tts_available: bool,
}

async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "vox gateway is running",
    })
}

/// Liveness probe - is the service running?
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Report per-stage readiness from the configured asset paths
async fn capabilities(State(state): State<Arc<ApiState>>) -> Json<CapabilitiesResponse> {
    let config = &state.config;
    Json(CapabilitiesResponse {
        stt_available: config.stt.binary.exists() && config.stt.model.exists(),
        llm_configured: config.llm.api_key.as_deref().is_some_and(|k| !k.is_empty()),
        tts_available: config.tts.model.exists()
            && config.tts.config.exists()
            && config.tts.speakers_file.exists(),
    })
}

/// Build the health router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/capabilities", get(capabilities))
        .with_state(state)
}
