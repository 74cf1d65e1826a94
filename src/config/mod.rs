//! Configuration management for the vox gateway
//!
//! Configuration is an explicit structure handed to each adapter at
//! construction time, never read from ambient state mid-request.
//! Precedence per field: environment variable > TOML overlay > default.

pub mod file;

use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Gateway configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server settings
    pub server: ServerConfig,

    /// Speech-recognition engine settings
    pub stt: SttConfig,

    /// Reply-generation settings
    pub llm: LlmConfig,

    /// Speech-synthesis engine settings
    pub tts: TtsConfig,

    /// Root directory for per-request transient files
    pub workspace_root: PathBuf,
}

/// HTTP server settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,

    /// Port to listen on
    pub port: u16,
}

/// Speech-recognition engine settings
#[derive(Debug, Clone)]
pub struct SttConfig {
    /// Recognition engine executable (whisper.cpp CLI)
    pub binary: PathBuf,

    /// Recognition model file
    pub model: PathBuf,
}

/// Reply-generation settings
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Completion API base URL
    pub base_url: String,

    /// API key, supplied out-of-band
    pub api_key: Option<String>,

    /// Model identifier
    pub model: String,

    /// Request timeout in seconds; the remote call is the only
    /// unbounded-latency boundary in the pipeline
    pub timeout_secs: u64,
}

/// Speech-synthesis engine settings
#[derive(Debug, Clone)]
pub struct TtsConfig {
    /// Synthesis CLI; a bare name is resolved via PATH
    pub binary: PathBuf,

    /// Trained voice model
    pub model: PathBuf,

    /// Voice model configuration file
    pub config: PathBuf,

    /// Speaker-embedding table (configured location)
    pub speakers_file: PathBuf,

    /// Speaker identity within the table
    pub speaker: String,

    /// Where the engine expects the speaker table at runtime; the
    /// table is copied here once if absent
    pub speakers_runtime_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl Default for SttConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("whisper-cli"),
            model: PathBuf::from("models/ggml-small.bin"),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key: None,
            model: "gemini-2.0-flash".to_string(),
            timeout_secs: 60,
        }
    }
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("tts"),
            model: PathBuf::from("voice-assets/model.pth"),
            config: PathBuf::from("voice-assets/config.json"),
            speakers_file: PathBuf::from("voice-assets/speakers.pth"),
            speaker: "default".to_string(),
            speakers_runtime_path: PathBuf::from("speakers.pth"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            stt: SttConfig::default(),
            llm: LlmConfig::default(),
            tts: TtsConfig::default(),
            workspace_root: std::env::temp_dir().join("vox-gateway"),
        }
    }
}

impl Config {
    /// Load configuration from the default file location
    ///
    /// # Errors
    ///
    /// Returns error if an environment override fails to parse
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration, optionally from an explicit TOML file
    ///
    /// # Errors
    ///
    /// Returns error if an environment override fails to parse
    pub fn load_from(config_path: Option<&Path>) -> Result<Self> {
        let fc = file::load_config_file(config_path);
        let default = Self::default();

        let server = ServerConfig {
            host: env_var("VOX_HOST")
                .or(fc.server.host)
                .unwrap_or(default.server.host),
            port: parse_env("VOX_PORT")?
                .or(fc.server.port)
                .unwrap_or(default.server.port),
        };

        let stt = SttConfig {
            binary: env_path("VOX_STT_BINARY")
                .or(fc.stt.binary)
                .unwrap_or(default.stt.binary),
            model: env_path("VOX_STT_MODEL")
                .or(fc.stt.model)
                .unwrap_or(default.stt.model),
        };

        let llm = LlmConfig {
            base_url: env_var("VOX_LLM_URL")
                .or(fc.llm.base_url)
                .unwrap_or(default.llm.base_url),
            api_key: env_var("GEMINI_API_KEY").or(fc.llm.api_key),
            model: env_var("VOX_LLM_MODEL")
                .or(fc.llm.model)
                .unwrap_or(default.llm.model),
            timeout_secs: parse_env("VOX_LLM_TIMEOUT_SECS")?
                .or(fc.llm.timeout_secs)
                .unwrap_or(default.llm.timeout_secs),
        };

        let tts = TtsConfig {
            binary: env_path("VOX_TTS_BINARY")
                .or(fc.tts.binary)
                .unwrap_or(default.tts.binary),
            model: env_path("VOX_TTS_MODEL")
                .or(fc.tts.model)
                .unwrap_or(default.tts.model),
            config: env_path("VOX_TTS_CONFIG")
                .or(fc.tts.config)
                .unwrap_or(default.tts.config),
            speakers_file: env_path("VOX_TTS_SPEAKERS_FILE")
                .or(fc.tts.speakers_file)
                .unwrap_or(default.tts.speakers_file),
            speaker: env_var("VOX_TTS_SPEAKER")
                .or(fc.tts.speaker)
                .unwrap_or(default.tts.speaker),
            speakers_runtime_path: env_path("VOX_TTS_SPEAKERS_RUNTIME_PATH")
                .or(fc.tts.speakers_runtime_path)
                .unwrap_or(default.tts.speakers_runtime_path),
        };

        let workspace_root = env_path("VOX_WORKSPACE_DIR")
            .or(fc.workspace.root)
            .unwrap_or(default.workspace_root);

        Ok(Self {
            server,
            stt,
            llm,
            tts,
            workspace_root,
        })
    }

    /// The filesystem assets the engines need, for eager validation
    ///
    /// A bare synthesis binary name is omitted — it is resolved via
    /// PATH at invocation time, not from a configured location.
    #[must_use]
    pub fn required_assets(&self) -> Vec<(&'static str, &Path)> {
        let mut assets: Vec<(&'static str, &Path)> = vec![
            ("stt.binary", &self.stt.binary),
            ("stt.model", &self.stt.model),
            ("tts.model", &self.tts.model),
            ("tts.config", &self.tts.config),
            ("tts.speakers_file", &self.tts.speakers_file),
        ];
        if self.tts.binary.components().count() > 1 {
            assets.insert(2, ("tts.binary", &self.tts.binary));
        }
        assets
    }

    /// Validate engine and asset paths once, at startup
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` naming every missing path
    pub fn validate(&self) -> Result<()> {
        let missing: Vec<String> = self
            .required_assets()
            .into_iter()
            .filter(|(_, path)| !path.exists())
            .map(|(name, path)| format!("{name} not found: {}", path.display()))
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::Config(missing.join("; ")))
        }
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn env_path(name: &str) -> Option<PathBuf> {
    env_var(name).map(PathBuf::from)
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match env_var(name) {
        None => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| Error::Config(format!("{name} has invalid value: {raw}"))),
    }
}
