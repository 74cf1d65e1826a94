//! Pipeline orchestrator
//!
//! Sequences the three adapters — transcribe, reply, synthesize —
//! with fail-fast short-circuiting, then base64-encodes the
//! synthesized audio for the response payload. Each run owns one
//! workspace scope, reclaimed on every exit path.

use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use crate::config::Config;
use crate::engine::EngineRunner;
use crate::llm::{GeminiClient, ReplyGenerator};
use crate::stt::SpeechToText;
use crate::tts::TextToSpeech;
use crate::workspace::Workspace;
use crate::{Error, Result};

/// Successful pipeline result: the reply text and its spoken form
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// The generated reply text
    pub reply: String,
    /// The synthesized WAV, base64-encoded
    pub audio_base64: String,
}

/// The audio-in, audio-out request pipeline
pub struct VoicePipeline {
    stt: SpeechToText,
    llm: Arc<dyn ReplyGenerator>,
    tts: TextToSpeech,
    workspace: Workspace,
}

impl VoicePipeline {
    /// Assemble a pipeline from explicit adapters
    #[must_use]
    pub const fn new(
        stt: SpeechToText,
        llm: Arc<dyn ReplyGenerator>,
        tts: TextToSpeech,
        workspace: Workspace,
    ) -> Self {
        Self {
            stt,
            llm,
            tts,
            workspace,
        }
    }

    /// Assemble the production pipeline from configuration
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the reply-generation client cannot
    /// be constructed (missing API key)
    pub fn from_config(config: &Config, runner: Arc<dyn EngineRunner>) -> Result<Self> {
        Ok(Self::new(
            SpeechToText::new(config.stt.clone(), Arc::clone(&runner)),
            Arc::new(GeminiClient::new(&config.llm)?),
            TextToSpeech::new(config.tts.clone(), runner),
            Workspace::new(config.workspace_root.clone()),
        ))
    }

    /// Run the full pipeline for one uploaded clip
    ///
    /// `ext` is the caller-declared extension hint for the upload.
    /// Stages execute strictly in order; the first failure is
    /// returned and later stages never run.
    ///
    /// # Errors
    ///
    /// Returns the failing stage's error: `EmptyUpload` before any
    /// engine work, `Stt`/`Llm`/`Tts` from the adapters, or
    /// `MissingArtifact`/`Io` if the synthesized file cannot be read
    /// back for encoding
    pub async fn run(&self, audio: &[u8], ext: &str) -> Result<PipelineOutput> {
        if audio.is_empty() {
            return Err(Error::EmptyUpload("no audio bytes in upload".to_string()));
        }

        tracing::debug!(audio_bytes = audio.len(), ext, "pipeline started");
        let mut scope = self.workspace.scope();

        let transcript = self.stt.transcribe(&mut scope, audio, ext).await?;
        let reply = self.llm.generate(&transcript).await?.trim().to_string();
        if reply.is_empty() {
            return Err(Error::Llm("empty reply generated".to_string()));
        }
        let wav_path = self.tts.synthesize(&mut scope, &reply).await?;

        if !wav_path.is_file() {
            return Err(Error::MissingArtifact(wav_path));
        }
        let wav_bytes = tokio::fs::read(&wav_path).await?;
        let audio_base64 = BASE64.encode(&wav_bytes);

        tracing::info!(
            reply_chars = reply.len(),
            audio_bytes = wav_bytes.len(),
            "pipeline complete"
        );
        Ok(PipelineOutput {
            reply,
            audio_base64,
        })
    }
}
