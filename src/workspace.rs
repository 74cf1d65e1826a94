//! Transient per-request file workspace
//!
//! Every request exchanges data with the external engines through
//! freshly named files. Paths are unique per allocation (UUID v4), so
//! concurrent requests never collide, and each request's artifacts are
//! reclaimed when its [`WorkspaceScope`] is dropped.

use std::path::PathBuf;

use crate::Result;

/// The kinds of transient artifacts a request produces
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArtifactKind {
    /// The uploaded audio, as handed to the recognition engine
    InputAudio,
    /// The transcript emitted by the recognition engine
    SttOutput,
    /// The waveform emitted by the synthesis engine
    TtsOutput,
}

impl ArtifactKind {
    /// Subdirectory under the workspace root for this kind
    #[must_use]
    pub const fn dir_name(self) -> &'static str {
        match self {
            Self::InputAudio => "input-audio",
            Self::SttOutput => "stt-output",
            Self::TtsOutput => "tts-output",
        }
    }
}

/// Root of the transient file area shared by all requests
#[derive(Clone, Debug)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    /// Create a workspace rooted at `root`
    ///
    /// Directories are created lazily on first allocation.
    #[must_use]
    pub const fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Workspace rooted in the OS temp directory
    #[must_use]
    pub fn in_temp_dir() -> Self {
        Self::new(std::env::temp_dir().join("vox-gateway"))
    }

    /// Begin a per-request scope; artifacts allocated through it are
    /// removed when the scope is dropped
    #[must_use]
    pub fn scope(&self) -> WorkspaceScope {
        WorkspaceScope {
            workspace: self.clone(),
            artifacts: Vec::new(),
        }
    }

    /// Resolve (and lazily create) the subdirectory for `kind`
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created
    fn kind_dir(&self, kind: ArtifactKind) -> Result<PathBuf> {
        let dir = self.root.join(kind.dir_name());
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}

/// Tracks the artifacts of one request and reclaims them on drop
///
/// Cleanup is best-effort per file (a file that is already gone is
/// fine) but runs on every exit path, success and failure alike.
pub struct WorkspaceScope {
    workspace: Workspace,
    artifacts: Vec<PathBuf>,
}

impl WorkspaceScope {
    /// Allocate a unique path `<root>/<kind-dir>/<uuid>.<ext>`
    ///
    /// The file itself is not created; the caller writes it. A leading
    /// dot on `ext` is tolerated (extension hints arrive as `.wav`).
    ///
    /// # Errors
    ///
    /// Returns error if the kind subdirectory cannot be created
    pub fn allocate(&mut self, kind: ArtifactKind, ext: &str) -> Result<PathBuf> {
        let ext = ext.trim_start_matches('.');
        let ext = if ext.is_empty() { "bin" } else { ext };
        let path = self
            .workspace
            .kind_dir(kind)?
            .join(format!("{}.{ext}", uuid::Uuid::new_v4()));
        self.artifacts.push(path.clone());
        Ok(path)
    }

    /// Allocate a unique extension-less prefix path for engines that
    /// derive their output name from a prefix
    ///
    /// # Errors
    ///
    /// Returns error if the kind subdirectory cannot be created
    pub fn allocate_prefix(&mut self, kind: ArtifactKind) -> Result<PathBuf> {
        let path = self
            .workspace
            .kind_dir(kind)?
            .join(uuid::Uuid::new_v4().to_string());
        self.artifacts.push(path.clone());
        Ok(path)
    }

    /// Register an engine-derived path so it is reclaimed with the rest
    pub fn adopt(&mut self, path: PathBuf) {
        self.artifacts.push(path);
    }
}

impl Drop for WorkspaceScope {
    fn drop(&mut self) {
        for path in self.artifacts.drain(..) {
            match std::fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::debug!(
                        path = %path.display(),
                        error = %e,
                        "failed to reclaim workspace artifact"
                    );
                }
            }
        }
    }
}
