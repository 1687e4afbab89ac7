//! External capabilities the orchestrator drives. Each one is a seam so the
//! lifecycle can run against real services or in-process fakes.

use std::path::PathBuf;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;

use crate::domain::{DownloadError, MediaFormat, MediaQuality, Metadata, Platform};

/// Response body of a successful media request.
pub struct MediaStream {
    /// Content-Length when the backend sent one
    pub total_size: Option<u64>,
    pub chunks: BoxStream<'static, Result<Bytes, DownloadError>>,
}

/// Fully assembled payload ready to be handed to the user.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub bytes: Bytes,
    pub filename: String,
    pub content_type: &'static str,
}

#[async_trait]
pub trait MetadataResolver: Send + Sync {
    /// Total: implementations recover from every failure with fallback metadata.
    async fn resolve_metadata(&self, url: &str, platform: Platform) -> Metadata;
}

#[async_trait]
pub trait MediaFetcher: Send + Sync {
    async fn fetch_media(
        &self,
        url: &str,
        format: MediaFormat,
        quality: MediaQuality,
    ) -> Result<MediaStream, DownloadError>;
}

#[async_trait]
pub trait ArtifactSink: Send + Sync {
    /// Deliver the artifact, returning where it ended up.
    async fn save(&self, artifact: Artifact) -> Result<PathBuf, DownloadError>;
}
