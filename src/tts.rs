//! Text-to-speech (TTS) adapter
//!
//! Wraps the Coqui `tts` CLI. Most of the pipeline's validation lives
//! here: the engine's output is only trusted after its exit status,
//! the output file's presence and size, and the WAV header have all
//! been checked.

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::TtsConfig;
use crate::engine::EngineRunner;
use crate::workspace::{ArtifactKind, WorkspaceScope};
use crate::{Error, Result};

/// Below this frame count the output is suspicious but still served.
/// Degenerate-but-valid audio is logged, not rejected.
const MIN_AUDIO_FRAMES: u32 = 100;

/// Parsed WAV header fields of a synthesized file
#[derive(Debug, Clone, Copy)]
pub struct WaveformInfo {
    /// Channel count
    pub channels: u16,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Total frames in the file
    pub frames: u32,
}

/// Synthesizes speech from reply text via the external engine
pub struct TextToSpeech {
    config: TtsConfig,
    runner: Arc<dyn EngineRunner>,
}

impl TextToSpeech {
    /// Create a new TTS adapter
    #[must_use]
    pub fn new(config: TtsConfig, runner: Arc<dyn EngineRunner>) -> Self {
        Self { config, runner }
    }

    /// Synthesize `text` to a WAV file inside the request scope
    ///
    /// Returns the path of the validated output file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Tts` if a voice asset is missing, the engine
    /// exits non-zero, or the output file is absent, empty, or not a
    /// well-formed WAV
    pub async fn synthesize(&self, scope: &mut WorkspaceScope, text: &str) -> Result<PathBuf> {
        tracing::debug!(text_chars = text.len(), "starting synthesis");

        for (name, path) in [
            ("voice model", &self.config.model),
            ("voice config", &self.config.config),
        ] {
            if !path.is_file() {
                return Err(Error::Tts(format!("{name} not found: {}", path.display())));
            }
        }

        self.ensure_speakers_file()?;

        let output_path = scope.allocate(ArtifactKind::TtsOutput, "wav")?;
        let args = self.build_args(text, &output_path);
        let output = self
            .runner
            .run(&self.config.binary, &args)
            .await
            .map_err(|e| Error::Tts(format!("failed to launch synthesis engine: {e}")))?;

        if !output.stdout.is_empty() {
            tracing::debug!(stdout = %output.stdout, "synthesis engine output");
        }
        if !output.success {
            let code = output.code.unwrap_or(-1);
            tracing::error!(code, stderr = %output.stderr, "synthesis engine failed");
            return Err(Error::Tts(format!(
                "synthesis engine exited with code {code}: {}",
                output.stderr.trim()
            )));
        }

        if !output_path.is_file() {
            return Err(Error::Tts(format!(
                "engine did not create output file: {}",
                output_path.display()
            )));
        }
        let size = tokio::fs::metadata(&output_path).await?.len();
        if size == 0 {
            return Err(Error::Tts(format!(
                "engine created empty output file: {}",
                output_path.display()
            )));
        }

        let info = validate_waveform(&output_path)?;
        if info.frames < MIN_AUDIO_FRAMES {
            tracing::warn!(
                frames = info.frames,
                path = %output_path.display(),
                "synthesized WAV has very few frames"
            );
        }

        tracing::info!(
            channels = info.channels,
            sample_rate = info.sample_rate,
            frames = info.frames,
            path = %output_path.display(),
            "synthesis complete"
        );
        Ok(output_path)
    }

    /// Copy the speaker table to the engine's expected runtime location
    /// if it is not already there
    ///
    /// Idempotent: a second call finds the file in place and does
    /// nothing. Two first-time requests may race on the copy; both
    /// write the same bytes to the same destination.
    fn ensure_speakers_file(&self) -> Result<()> {
        let destination = &self.config.speakers_runtime_path;
        if destination.exists() {
            return Ok(());
        }

        let source = &self.config.speakers_file;
        if !source.is_file() {
            return Err(Error::Tts(format!(
                "speaker table not found: {}",
                source.display()
            )));
        }

        std::fs::copy(source, destination).map_err(|e| {
            Error::Tts(format!(
                "failed to copy speaker table to {}: {e}",
                destination.display()
            ))
        })?;
        tracing::info!(
            source = %source.display(),
            destination = %destination.display(),
            "copied speaker table into place"
        );
        Ok(())
    }

    fn build_args(&self, text: &str, output_path: &Path) -> Vec<String> {
        vec![
            "--text".to_string(),
            text.to_string(),
            "--model_path".to_string(),
            self.config.model.display().to_string(),
            "--config_path".to_string(),
            self.config.config.display().to_string(),
            "--speaker_idx".to_string(),
            self.config.speaker.clone(),
            "--speakers_file_path".to_string(),
            self.config.speakers_runtime_path.display().to_string(),
            "--out_path".to_string(),
            output_path.display().to_string(),
        ]
    }
}

/// Parse the WAV container at `path` and confirm its header fields
///
/// # Errors
///
/// Returns `Error::Tts` if the file does not parse as a WAV or its
/// channel count or sample rate is zero
pub fn validate_waveform(path: &Path) -> Result<WaveformInfo> {
    let reader = hound::WavReader::open(path)
        .map_err(|e| Error::Tts(format!("invalid WAV file {}: {e}", path.display())))?;
    let spec = reader.spec();

    if spec.channels == 0 || spec.sample_rate == 0 {
        return Err(Error::Tts(format!(
            "degenerate WAV header in {}: {} channels at {} Hz",
            path.display(),
            spec.channels,
            spec.sample_rate
        )));
    }

    Ok(WaveformInfo {
        channels: spec.channels,
        sample_rate: spec.sample_rate,
        frames: reader.duration(),
    })
}
