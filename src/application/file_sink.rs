use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use super::capabilities::{Artifact, ArtifactSink};
use crate::domain::DownloadError;

/// Writes artifacts into a directory on disk, the way a browser drops files
/// into its download folder.
#[derive(Clone)]
pub struct FileSink {
    directory: Arc<RwLock<PathBuf>>,
}

impl FileSink {
    pub fn new(directory: PathBuf) -> Self {
        Self {
            directory: Arc::new(RwLock::new(directory)),
        }
    }

    pub fn directory(&self) -> PathBuf {
        match self.directory.read() {
            Ok(dir) => dir.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Applies to artifacts saved from now on.
    pub fn set_directory(&self, directory: PathBuf) {
        match self.directory.write() {
            Ok(mut dir) => *dir = directory,
            Err(poisoned) => *poisoned.into_inner() = directory,
        }
    }
}

/// `name.ext`, `name (1).ext`, `name (2).ext`, ...
fn candidate_name(filename: &str, attempt: u32) -> String {
    if attempt == 0 {
        return filename.to_string();
    }
    match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{} ({}).{}", stem, attempt, ext),
        _ => format!("{} ({})", filename, attempt),
    }
}

async fn create_unique(
    directory: &Path,
    filename: &str,
) -> std::io::Result<(tokio::fs::File, PathBuf)> {
    let mut attempt = 0;
    loop {
        let path = directory.join(candidate_name(filename, attempt));
        match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => return Ok((file, path)),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => attempt += 1,
            Err(e) => return Err(e),
        }
    }
}

/// Remove a partially written file so a failed save leaves nothing behind.
async fn discard_on_error<T>(
    path: &Path,
    result: Result<T, DownloadError>,
) -> Result<T, DownloadError> {
    if result.is_err() {
        if let Err(e) = tokio::fs::remove_file(path).await {
            warn!("Could not remove partial file {}: {}", path.display(), e);
        }
    }
    result
}

#[async_trait]
impl ArtifactSink for FileSink {
    async fn save(&self, artifact: Artifact) -> Result<PathBuf, DownloadError> {
        let directory = self.directory();
        tokio::fs::create_dir_all(&directory)
            .await
            .map_err(|e| DownloadError::SaveFailed(format!("{}: {}", directory.display(), e)))?;

        let (mut file, path) = create_unique(&directory, &artifact.filename)
            .await
            .map_err(|e| DownloadError::SaveFailed(format!("Failed to create file: {}", e)))?;

        let written = async {
            file.write_all(&artifact.bytes)
                .await
                .map_err(|e| DownloadError::SaveFailed(format!("Write error: {}", e)))?;
            file.sync_all()
                .await
                .map_err(|e| DownloadError::SaveFailed(format!("Failed to sync file: {}", e)))
        }
        .await;
        drop(file);
        discard_on_error(&path, written).await?;

        debug!(
            "Wrote {} bytes of {} to {}",
            artifact.bytes.len(),
            artifact.content_type,
            path.display()
        );
        Ok(path)
    }
}
