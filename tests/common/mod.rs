//! Shared test utilities
//!
//! Deterministic fakes for the two subprocess engines and the remote
//! reply generator, plus WAV fixture helpers. The engine fake keys off
//! the invocation arguments the same way the real engines do.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use vox_gateway::config::{SttConfig, TtsConfig};
use vox_gateway::{
    EngineOutput, EngineRunner, Error, ReplyGenerator, Result, SpeechToText, TextToSpeech,
    VoicePipeline, Workspace,
};

/// Scripted recognition-engine behavior
pub enum SttScript {
    /// Exit zero and write this transcript at the derived path
    Transcript(&'static str),
    /// Exit non-zero with this stderr
    Fail(&'static str),
}

/// Scripted synthesis-engine behavior
pub enum TtsScript {
    /// Exit zero and write a valid mono 16-bit WAV at `--out_path`
    Wav { sample_rate: u32, frames: u32 },
    /// Exit zero but leave a zero-byte file
    #[allow(dead_code)]
    EmptyFile,
    /// Exit zero but write bytes that are not a WAV
    Garbage,
}

/// Fake for both engines, dispatching on the argument shape
pub struct FakeEngines {
    pub stt: SttScript,
    pub tts: TtsScript,
    pub stt_calls: AtomicUsize,
    pub tts_calls: AtomicUsize,
}

impl FakeEngines {
    #[must_use]
    pub fn new(stt: SttScript, tts: TtsScript) -> Arc<Self> {
        Arc::new(Self {
            stt,
            tts,
            stt_calls: AtomicUsize::new(0),
            tts_calls: AtomicUsize::new(0),
        })
    }

    pub fn stt_invocations(&self) -> usize {
        self.stt_calls.load(Ordering::SeqCst)
    }

    pub fn tts_invocations(&self) -> usize {
        self.tts_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EngineRunner for FakeEngines {
    async fn run(&self, _program: &Path, args: &[String]) -> Result<EngineOutput> {
        if args.iter().any(|a| a == "--out_path") {
            self.tts_calls.fetch_add(1, Ordering::SeqCst);
            let out_path = PathBuf::from(args.last().unwrap());
            match self.tts {
                TtsScript::Wav {
                    sample_rate,
                    frames,
                } => std::fs::write(&out_path, wav_bytes(sample_rate, frames)).unwrap(),
                TtsScript::EmptyFile => std::fs::write(&out_path, b"").unwrap(),
                TtsScript::Garbage => std::fs::write(&out_path, b"not a wav").unwrap(),
            }
            return Ok(exit(0, ""));
        }

        self.stt_calls.fetch_add(1, Ordering::SeqCst);
        match self.stt {
            SttScript::Transcript(text) => {
                let prefix = args.last().unwrap();
                std::fs::write(format!("{prefix}.txt"), text).unwrap();
                Ok(exit(0, ""))
            }
            SttScript::Fail(stderr) => Ok(exit(1, stderr)),
        }
    }
}

fn exit(code: i32, stderr: &str) -> EngineOutput {
    EngineOutput {
        success: code == 0,
        code: Some(code),
        stdout: String::new(),
        stderr: stderr.to_string(),
    }
}

/// Reply generator returning a fixed reply
pub struct FixedReply(pub &'static str);

#[async_trait]
impl ReplyGenerator for FixedReply {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        Ok(self.0.to_string())
    }
}

/// Reply generator that always errors
pub struct FailingReply(pub &'static str);

#[async_trait]
impl ReplyGenerator for FailingReply {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        Err(Error::Llm(self.0.to_string()))
    }
}

/// Encode a mono 16-bit WAV with `frames` samples as bytes
#[must_use]
pub fn wav_bytes(sample_rate: u32, frames: u32) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for i in 0..frames {
            #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
            writer.write_sample((i % 128) as i16).unwrap();
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}

/// Build a pipeline over fakes, with engine assets present in `dir`
#[must_use]
pub fn build_pipeline(
    dir: &Path,
    engines: Arc<FakeEngines>,
    reply: Arc<dyn ReplyGenerator>,
) -> VoicePipeline {
    let stt_config = SttConfig {
        binary: dir.join("whisper-cli"),
        model: dir.join("ggml-small.bin"),
    };
    let tts_config = TtsConfig {
        binary: PathBuf::from("tts"),
        model: dir.join("model.pth"),
        config: dir.join("config.json"),
        speakers_file: dir.join("speakers.pth"),
        speaker: "default".to_string(),
        speakers_runtime_path: dir.join("runtime-speakers.pth"),
    };
    std::fs::write(&stt_config.binary, b"elf").unwrap();
    std::fs::write(&stt_config.model, b"weights").unwrap();
    std::fs::write(&tts_config.model, b"weights").unwrap();
    std::fs::write(&tts_config.config, b"{}").unwrap();
    std::fs::write(&tts_config.speakers_file, b"table").unwrap();

    let runner: Arc<dyn EngineRunner> = engines;
    VoicePipeline::new(
        SpeechToText::new(stt_config, Arc::clone(&runner)),
        reply,
        TextToSpeech::new(tts_config, runner),
        Workspace::new(dir.join("ws")),
    )
}
