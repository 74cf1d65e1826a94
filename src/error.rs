//! Error types for the vox gateway

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for vox operations
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline stage taxonomy used to tag failures
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    /// Upload/artifact I/O faults outside any engine
    Io,
    /// Speech recognition
    Stt,
    /// Reply generation (remote completion call)
    Llm,
    /// Speech synthesis
    Tts,
}

impl Stage {
    /// Stable lowercase name, as reported to callers
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Io => "io",
            Self::Stt => "stt",
            Self::Llm => "llm",
            Self::Tts => "tts",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur in the vox gateway
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error (bad settings, missing API key)
    #[error("configuration error: {0}")]
    Config(String),

    /// Uploaded audio was empty or unreadable
    #[error("empty upload: {0}")]
    EmptyUpload(String),

    /// An expected pipeline artifact vanished from disk
    #[error("missing artifact: {}", .0.display())]
    MissingArtifact(PathBuf),

    /// Speech-to-text error
    #[error("STT error: {0}")]
    Stt(String),

    /// Reply generation error
    #[error("LLM error: {0}")]
    Llm(String),

    /// Text-to-speech error
    #[error("TTS error: {0}")]
    Tts(String),

    /// Audio container error
    #[error("audio error: {0}")]
    Audio(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Map this error onto the pipeline failure taxonomy
    #[must_use]
    pub const fn stage(&self) -> Stage {
        match self {
            Self::EmptyUpload(_) | Self::MissingArtifact(_) | Self::Io(_) => Stage::Io,
            Self::Stt(_) => Stage::Stt,
            Self::Llm(_) | Self::Http(_) | Self::Serialization(_) => Stage::Llm,
            Self::Tts(_) | Self::Audio(_) => Stage::Tts,
            Self::Config(_) | Self::Toml(_) => Stage::Io,
        }
    }
}
