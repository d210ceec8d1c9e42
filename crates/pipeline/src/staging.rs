//! Media Staging
//!
//! Uploaded payloads (audio, images) are written to a scratch directory for
//! the duration of one request. Synthesized audio is published to a separate
//! output directory and served on demand.
//!
//! Names are random UUIDs opened with `create_new`, so concurrent requests
//! never clobber each other's files.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

use agrosaathi_config::StagingConfig;

use crate::PipelineError;

/// Attempts at finding a free name before giving up
const MAX_NAME_ATTEMPTS: usize = 3;

/// Longest extension kept from a client-supplied filename
const MAX_EXTENSION_LEN: usize = 8;

/// Scratch and output directories for one server instance
#[derive(Debug, Clone)]
pub struct MediaStaging {
    upload_dir: PathBuf,
    output_dir: PathBuf,
}

/// A request-scoped file on disk
///
/// Deleted by [`StagedFile::release`] or, failing that, on drop.
#[derive(Debug)]
pub struct StagedFile {
    path: PathBuf,
    released: bool,
}

/// Synthesized audio written to the output directory
#[derive(Debug, Clone, PartialEq)]
pub struct PublishedAudio {
    /// Bare file name, as used in `/api/audio/<filename>`
    pub filename: String,
    pub path: PathBuf,
}

/// Lower-case ASCII alphanumeric extension, `bin` when nothing usable remains
pub fn sanitize_extension(extension: &str) -> String {
    let cleaned: String = extension
        .trim_start_matches('.')
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(MAX_EXTENSION_LEN)
        .collect::<String>()
        .to_ascii_lowercase();

    if cleaned.is_empty() {
        "bin".to_string()
    } else {
        cleaned
    }
}

/// Extension of a client-supplied filename, sanitized
pub fn extension_of(filename: &str) -> String {
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");
    sanitize_extension(ext)
}

impl MediaStaging {
    pub fn new(upload_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            output_dir: output_dir.into(),
        }
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Create both directories if missing
    pub async fn ensure_dirs(&self) -> Result<(), PipelineError> {
        for dir in [&self.upload_dir, &self.output_dir] {
            tokio::fs::create_dir_all(dir).await.map_err(|e| {
                PipelineError::Staging(format!("Failed to create {}: {}", dir.display(), e))
            })?;
        }
        Ok(())
    }

    /// Write an input payload under a fresh name
    pub async fn stage(
        &self,
        payload: &[u8],
        suggested_extension: &str,
    ) -> Result<StagedFile, PipelineError> {
        let extension = sanitize_extension(suggested_extension);
        let path = write_unique(&self.upload_dir, "", &extension, payload).await?;
        tracing::debug!(path = %path.display(), bytes = payload.len(), "Staged input file");
        Ok(StagedFile {
            path,
            released: false,
        })
    }

    /// Write synthesized audio to the output directory
    ///
    /// Published files outlive the request and are never removed here.
    pub async fn publish(
        &self,
        payload: &[u8],
        extension: &str,
    ) -> Result<PublishedAudio, PipelineError> {
        let extension = sanitize_extension(extension);
        let path = write_unique(&self.output_dir, "tts_", &extension, payload).await?;
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .ok_or_else(|| PipelineError::Staging("Published file has no name".to_string()))?;
        Ok(PublishedAudio { filename, path })
    }

    /// Path of a published file, if the name is a plain file name that exists
    pub fn resolve_output(&self, filename: &str) -> Option<PathBuf> {
        let plain = !filename.is_empty()
            && !filename.starts_with('.')
            && !filename.contains(['/', '\\', '\0'])
            && !filename.contains("..");
        if !plain {
            return None;
        }

        let path = self.output_dir.join(filename);
        path.is_file().then_some(path)
    }
}

async fn write_unique(
    dir: &Path,
    prefix: &str,
    extension: &str,
    payload: &[u8],
) -> Result<PathBuf, PipelineError> {
    for _ in 0..MAX_NAME_ATTEMPTS {
        let path = dir.join(format!("{}{}.{}", prefix, uuid::Uuid::new_v4(), extension));
        let file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await;

        let mut file = match file {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => {
                return Err(PipelineError::Staging(format!(
                    "Failed to create {}: {}",
                    path.display(),
                    e
                )))
            },
        };

        if let Err(e) = write_all(&mut file, payload).await {
            drop(file);
            let _ = tokio::fs::remove_file(&path).await;
            return Err(PipelineError::Staging(format!(
                "Failed to write {}: {}",
                path.display(),
                e
            )));
        }
        return Ok(path);
    }

    Err(PipelineError::Staging(format!(
        "No free file name in {} after {} attempts",
        dir.display(),
        MAX_NAME_ATTEMPTS
    )))
}

async fn write_all(file: &mut tokio::fs::File, payload: &[u8]) -> std::io::Result<()> {
    file.write_all(payload).await?;
    file.flush().await
}

impl From<&StagingConfig> for MediaStaging {
    fn from(config: &StagingConfig) -> Self {
        Self::new(&config.upload_dir, &config.output_dir)
    }
}

impl StagedFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the staged bytes back
    pub async fn read(&self) -> Result<Vec<u8>, PipelineError> {
        Ok(tokio::fs::read(&self.path).await?)
    }

    /// Delete the file; calling it again is a no-op
    pub fn release(&mut self) -> Result<(), PipelineError> {
        if self.released {
            return Ok(());
        }
        self.released = true;
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PipelineError::Staging(format!(
                "Failed to remove {}: {}",
                self.path.display(),
                e
            ))),
        }
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            tracing::warn!(error = %e, "Failed to clean up staged file");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn staging(root: &Path) -> MediaStaging {
        MediaStaging::new(root.join("uploads"), root.join("outputs"))
    }

    #[test]
    fn test_sanitize_extension() {
        assert_eq!(sanitize_extension("WAV"), "wav");
        assert_eq!(sanitize_extension(".webm"), "webm");
        assert_eq!(sanitize_extension("../../etc"), "etc");
        assert_eq!(sanitize_extension(""), "bin");
        assert_eq!(sanitize_extension("verylongextension"), "verylong");
        assert_eq!(extension_of("leaf photo.JPG"), "jpg");
        assert_eq!(extension_of("recording"), "bin");
    }

    #[tokio::test]
    async fn test_stage_read_back() {
        let dir = tempdir().unwrap();
        let staging = staging(dir.path());
        staging.ensure_dirs().await.unwrap();

        let staged = staging.stage(b"RIFF....WAVE", "wav").await.unwrap();
        assert!(staged.path().starts_with(staging.upload_dir()));
        assert_eq!(staged.path().extension().unwrap(), "wav");
        assert_eq!(staged.read().await.unwrap(), b"RIFF....WAVE");
    }

    #[tokio::test]
    async fn test_release_is_idempotent() {
        let dir = tempdir().unwrap();
        let staging = staging(dir.path());
        staging.ensure_dirs().await.unwrap();

        let mut staged = staging.stage(b"jpeg", "jpg").await.unwrap();
        let path = staged.path().to_path_buf();
        staged.release().unwrap();
        assert!(!path.exists());
        staged.release().unwrap();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_release_after_external_delete() {
        let dir = tempdir().unwrap();
        let staging = staging(dir.path());
        staging.ensure_dirs().await.unwrap();

        let mut staged = staging.stage(b"x", "png").await.unwrap();
        std::fs::remove_file(staged.path()).unwrap();
        assert!(staged.release().is_ok());
    }

    #[tokio::test]
    async fn test_drop_removes_file() {
        let dir = tempdir().unwrap();
        let staging = staging(dir.path());
        staging.ensure_dirs().await.unwrap();

        let path = {
            let staged = staging.stage(b"audio", "webm").await.unwrap();
            staged.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_concurrent_stages_get_distinct_names() {
        let dir = tempdir().unwrap();
        let staging = staging(dir.path());
        staging.ensure_dirs().await.unwrap();

        let (a, b) = tokio::join!(staging.stage(b"first", "wav"), staging.stage(b"second", "wav"));
        let (a, b) = (a.unwrap(), b.unwrap());
        assert_ne!(a.path(), b.path());
        assert_eq!(a.read().await.unwrap(), b"first");
        assert_eq!(b.read().await.unwrap(), b"second");
    }

    #[tokio::test]
    async fn test_publish_and_resolve() {
        let dir = tempdir().unwrap();
        let staging = staging(dir.path());
        staging.ensure_dirs().await.unwrap();

        let published = staging.publish(b"ID3", "mp3").await.unwrap();
        assert!(published.filename.starts_with("tts_"));
        assert!(published.filename.ends_with(".mp3"));
        assert_eq!(
            staging.resolve_output(&published.filename),
            Some(published.path.clone())
        );

        assert!(staging.resolve_output("missing.mp3").is_none());
        assert!(staging.resolve_output("../uploads/x.wav").is_none());
        assert!(staging.resolve_output("").is_none());
    }

    #[tokio::test]
    async fn test_stage_without_directory_fails() {
        let dir = tempdir().unwrap();
        let staging = staging(&dir.path().join("missing"));
        let err = staging.stage(b"x", "wav").await.unwrap_err();
        assert!(matches!(err, PipelineError::Staging(_)));
    }
}
