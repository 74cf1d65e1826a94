//! TOML configuration file loading
//!
//! Supports `~/.config/omni/vox/config.toml` as a persistent config
//! source. All fields are optional — the file is a partial overlay on
//! top of defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct VoxConfigFile {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerFileConfig,

    /// Speech-recognition engine configuration
    #[serde(default)]
    pub stt: SttFileConfig,

    /// Reply-generation configuration
    #[serde(default)]
    pub llm: LlmFileConfig,

    /// Speech-synthesis engine configuration
    #[serde(default)]
    pub tts: TtsFileConfig,

    /// Transient workspace configuration
    #[serde(default)]
    pub workspace: WorkspaceFileConfig,
}

/// HTTP server configuration
#[derive(Debug, Default, Deserialize)]
pub struct ServerFileConfig {
    /// Bind address (e.g. "0.0.0.0")
    pub host: Option<String>,

    /// Port to listen on
    pub port: Option<u16>,
}

/// Speech-recognition engine configuration
#[derive(Debug, Default, Deserialize)]
pub struct SttFileConfig {
    /// Path to the recognition engine executable
    pub binary: Option<PathBuf>,

    /// Path to the recognition model file
    pub model: Option<PathBuf>,
}

/// Reply-generation configuration
#[derive(Debug, Default, Deserialize)]
pub struct LlmFileConfig {
    /// Completion API base URL
    pub base_url: Option<String>,

    /// API key (env `GEMINI_API_KEY` takes precedence)
    pub api_key: Option<String>,

    /// Model identifier (e.g. "gemini-2.0-flash")
    pub model: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: Option<u64>,
}

/// Speech-synthesis engine configuration
#[derive(Debug, Default, Deserialize)]
pub struct TtsFileConfig {
    /// Synthesis CLI (a bare name is resolved via PATH)
    pub binary: Option<PathBuf>,

    /// Trained voice model
    pub model: Option<PathBuf>,

    /// Voice model configuration file
    pub config: Option<PathBuf>,

    /// Speaker-embedding table
    pub speakers_file: Option<PathBuf>,

    /// Speaker identity within the table
    pub speaker: Option<String>,

    /// Where the engine expects the speaker table at runtime
    pub speakers_runtime_path: Option<PathBuf>,
}

/// Transient workspace configuration
#[derive(Debug, Default, Deserialize)]
pub struct WorkspaceFileConfig {
    /// Root directory for per-request transient files
    pub root: Option<PathBuf>,
}

/// Default config file location: `~/.config/omni/vox/config.toml`
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    directories::BaseDirs::new()
        .map(|d| d.config_dir().join("omni").join("vox").join("config.toml"))
}

/// Load the TOML overlay from `path`, or the default location
///
/// A missing file yields the empty overlay; a malformed file is logged
/// and treated as empty rather than aborting startup.
#[must_use]
pub fn load_config_file(path: Option<&Path>) -> VoxConfigFile {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => match default_config_path() {
            Some(p) => p,
            None => return VoxConfigFile::default(),
        },
    };

    if !path.exists() {
        return VoxConfigFile::default();
    }

    match std::fs::read_to_string(&path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                VoxConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            VoxConfigFile::default()
        }
    }
}
