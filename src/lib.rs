//! Vox Gateway - speech in, spoken reply out
//!
//! One synchronous endpoint turns an uploaded audio clip into a spoken
//! reply: the clip is transcribed by an external recognition engine,
//! the transcript is answered by a remote completion API, and the
//! reply is synthesized back to audio by an external TTS engine.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │              POST /voice-chat (multipart)            │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │              Pipeline orchestrator                   │
//! │    STT engine  →  reply API  →  TTS engine          │
//! │        (fail-fast, per-request workspace)            │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │   {"response": text, "audio_base64": wav}            │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod llm;
pub mod pipeline;
pub mod stt;
pub mod tts;
pub mod workspace;

pub use config::Config;
pub use engine::{EngineOutput, EngineRunner, SystemRunner};
pub use error::{Error, Result, Stage};
pub use llm::{GeminiClient, ReplyGenerator};
pub use pipeline::{PipelineOutput, VoicePipeline};
pub use stt::SpeechToText;
pub use tts::TextToSpeech;
pub use workspace::{ArtifactKind, Workspace, WorkspaceScope};
