//! The voice-chat endpoint
//!
//! Accepts a multipart audio upload, runs the pipeline, and returns
//! the reply text with the spoken reply as base64 WAV. Failures come
//! back as `{"error": ...}` with a status code per failing stage.

use std::path::Path;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde::Serialize;
use serde_json::json;

use super::ApiState;
use crate::{Error, Stage};

/// Uploads above this size are rejected by the extractor
const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

/// Build the chat router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/voice-chat", post(voice_chat))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

/// Successful voice-chat response
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    /// The generated reply text
    pub response: String,
    /// The synthesized reply audio, base64-encoded WAV
    pub audio_base64: String,
}

/// Turn an uploaded clip into a spoken reply
async fn voice_chat(
    State(state): State<Arc<ApiState>>,
    mut multipart: Multipart,
) -> Result<Json<ChatResponse>, ChatError> {
    let mut upload: Option<(Vec<u8>, String)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ChatError::BadUpload(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let ext = field
            .file_name()
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .unwrap_or("wav")
            .to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| ChatError::BadUpload(e.to_string()))?;
        upload = Some((data.to_vec(), ext));
        break;
    }

    let Some((data, ext)) = upload else {
        return Err(ChatError::EmptyUpload);
    };
    if data.is_empty() {
        tracing::error!("empty file received");
        return Err(ChatError::EmptyUpload);
    }

    tracing::info!(upload_bytes = data.len(), ext, "voice-chat request received");

    let output = state.pipeline.run(&data, &ext).await?;
    Ok(Json(ChatResponse {
        response: output.reply,
        audio_base64: output.audio_base64,
    }))
}

/// Voice-chat endpoint errors
#[derive(Debug)]
pub enum ChatError {
    /// Upload absent or zero-length
    EmptyUpload,
    /// Multipart body could not be read
    BadUpload(String),
    /// A pipeline stage failed
    Pipeline(Error),
}

impl From<Error> for ChatError {
    fn from(err: Error) -> Self {
        Self::Pipeline(err)
    }
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        match self {
            Self::EmptyUpload => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Empty file" })),
            )
                .into_response(),
            Self::BadUpload(message) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": message })),
            )
                .into_response(),
            Self::Pipeline(err) => {
                let stage = err.stage();
                let status = match (stage, &err) {
                    (Stage::Io, Error::EmptyUpload(_)) => StatusCode::BAD_REQUEST,
                    (Stage::Stt, _) => StatusCode::UNPROCESSABLE_ENTITY,
                    (Stage::Llm, _) => StatusCode::BAD_GATEWAY,
                    (Stage::Io | Stage::Tts, _) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                tracing::error!(stage = %stage, error = %err, "voice-chat request failed");
                (
                    status,
                    Json(json!({
                        "error": err.to_string(),
                        "stage": stage.as_str(),
                    })),
                )
                    .into_response()
            }
        }
    }
}
