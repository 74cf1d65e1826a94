//! Speech-to-text (STT) adapter
//!
//! Wraps the whisper.cpp CLI: the upload is written to a transient
//! file, the engine is invoked as a child process, and the transcript
//! is read back from the path the engine derives from its `-of`
//! prefix argument.

use std::path::Path;
use std::sync::Arc;

use crate::config::SttConfig;
use crate::engine::EngineRunner;
use crate::workspace::{ArtifactKind, WorkspaceScope};
use crate::{Error, Result};

/// Transcribes uploaded audio via the external recognition engine
pub struct SpeechToText {
    config: SttConfig,
    runner: Arc<dyn EngineRunner>,
}

impl SpeechToText {
    /// Create a new STT adapter
    #[must_use]
    pub fn new(config: SttConfig, runner: Arc<dyn EngineRunner>) -> Self {
        Self { config, runner }
    }

    /// Transcribe audio bytes to text
    ///
    /// `ext` is the caller-declared extension hint for the upload.
    /// The caller must reject empty uploads before this point; an
    /// upload that vanishes or truncates after writing is an I/O fault
    /// of this stage.
    ///
    /// # Errors
    ///
    /// Returns `Error::Stt` if the engine or model is missing, the
    /// engine exits non-zero, the transcript file is absent after a
    /// clean exit, or the transcript is empty after trimming
    pub async fn transcribe(
        &self,
        scope: &mut WorkspaceScope,
        audio: &[u8],
        ext: &str,
    ) -> Result<String> {
        tracing::debug!(audio_bytes = audio.len(), ext, "starting transcription");

        // Configuration faults surface before any file is written
        if !self.config.binary.is_file() {
            return Err(Error::Stt(format!(
                "recognition engine not found: {}",
                self.config.binary.display()
            )));
        }
        if !self.config.model.is_file() {
            return Err(Error::Stt(format!(
                "recognition model not found: {}",
                self.config.model.display()
            )));
        }

        let audio_path = scope.allocate(ArtifactKind::InputAudio, ext)?;
        tokio::fs::write(&audio_path, audio).await?;

        let written = tokio::fs::metadata(&audio_path).await;
        if !written.is_ok_and(|m| m.len() > 0) {
            return Err(Error::Stt(format!(
                "input audio missing or empty after write: {}",
                audio_path.display()
            )));
        }

        let result_prefix = scope.allocate_prefix(ArtifactKind::SttOutput)?;
        let result_path = result_prefix.with_extension("txt");
        scope.adopt(result_path.clone());

        let args = self.build_args(&audio_path, &result_prefix);
        let output = self
            .runner
            .run(&self.config.binary, &args)
            .await
            .map_err(|e| Error::Stt(format!("failed to launch recognition engine: {e}")))?;

        if !output.stdout.is_empty() {
            tracing::debug!(stdout = %output.stdout, "recognition engine output");
        }
        if !output.success {
            let code = output.code.unwrap_or(-1);
            tracing::error!(code, stderr = %output.stderr, "recognition engine failed");
            return Err(Error::Stt(format!(
                "recognition engine exited with code {code}: {}",
                output.stderr.trim()
            )));
        }

        if !result_path.is_file() {
            return Err(Error::Stt(format!(
                "transcript file not generated at: {}",
                result_path.display()
            )));
        }

        let transcript = tokio::fs::read_to_string(&result_path)
            .await
            .map_err(|e| Error::Stt(format!("failed to read transcript: {e}")))?;
        let transcript = transcript.trim();
        if transcript.is_empty() {
            return Err(Error::Stt("empty transcript generated".to_string()));
        }

        tracing::info!(transcript, "transcription complete");
        Ok(transcript.to_string())
    }

    /// whisper.cpp CLI arguments: model, input file, plain-text output
    /// at the derived `<prefix>.txt` path
    fn build_args(&self, audio_path: &Path, result_prefix: &Path) -> Vec<String> {
        vec![
            "-m".to_string(),
            self.config.model.display().to_string(),
            "-f".to_string(),
            audio_path.display().to_string(),
            "-otxt".to_string(),
            "-of".to_string(),
            result_prefix.display().to_string(),
        ]
    }
}
