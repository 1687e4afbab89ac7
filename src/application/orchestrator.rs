use std::sync::Arc;

use bytes::BytesMut;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::capabilities::{Artifact, ArtifactSink, MediaFetcher, MetadataResolver};
use super::progress::{ProgressEstimator, TRANSFER_BASELINE};
use super::registry::DownloadRegistry;
use crate::domain::{
    DownloadError, DownloadId, DownloadRecord, DownloadRequest, RecordPatch, RegistryError,
};
use crate::utils::artifact_filename;

/// Upper bound on the buffer reserved from a Content-Length hint; the
/// buffer grows past it as chunks arrive.
const MAX_PREALLOCATED_BYTES: u64 = 8 * 1024 * 1024;

/// Drives each submitted request through
/// `pending -> downloading -> completed | error`, reporting every change
/// through the registry.
///
/// Each submission runs as its own task with its own buffer; the registry is
/// the only state shared between them. Removing a record does not stop its
/// task, later updates for it are simply dropped by the registry.
#[derive(Clone)]
pub struct DownloadOrchestrator {
    registry: DownloadRegistry,
    metadata: Arc<dyn MetadataResolver>,
    media: Arc<dyn MediaFetcher>,
    sink: Arc<dyn ArtifactSink>,
}

impl DownloadOrchestrator {
    pub fn new(
        registry: DownloadRegistry,
        metadata: Arc<dyn MetadataResolver>,
        media: Arc<dyn MediaFetcher>,
        sink: Arc<dyn ArtifactSink>,
    ) -> Self {
        Self {
            registry,
            metadata,
            media,
            sink,
        }
    }

    pub fn registry(&self) -> &DownloadRegistry {
        &self.registry
    }

    /// Register a pending record and start its lifecycle in the background.
    /// Returns as soon as the record is visible; must be called from within a
    /// tokio runtime.
    pub fn submit(&self, request: DownloadRequest) -> Result<DownloadId, RegistryError> {
        self.start(request).map(|(id, _)| id)
    }

    /// Like [`submit`](Self::submit), also handing back the task driving the
    /// record.
    pub fn start(
        &self,
        request: DownloadRequest,
    ) -> Result<(DownloadId, JoinHandle<()>), RegistryError> {
        let id = DownloadId::generate();
        self.registry
            .insert(DownloadRecord::pending(id, &request))?;
        info!(
            "Queued {} for {} ({} {}, {})",
            id, request.source_url, request.platform, request.format, request.quality
        );

        let this = self.clone();
        let handle = tokio::spawn(async move { this.run(id, request).await });
        Ok((id, handle))
    }

    async fn run(&self, id: DownloadId, request: DownloadRequest) {
        match self.execute(id, &request).await {
            Ok(()) => {
                self.registry.update(id, RecordPatch::completed());
            }
            Err(e) => {
                error!("{} failed: {}", id, e);
                self.registry.update(id, RecordPatch::failed(e.to_string()));
            }
        }
    }

    async fn execute(&self, id: DownloadId, request: &DownloadRequest) -> Result<(), DownloadError> {
        // Nothing has touched the network yet; a bad URL fails straight from pending.
        url::Url::parse(&request.source_url).map_err(|_| DownloadError::InvalidSource)?;

        let metadata = self
            .metadata
            .resolve_metadata(&request.source_url, request.platform)
            .await;
        let title = metadata.title.clone();
        self.registry
            .update(id, RecordPatch::downloading(metadata, TRANSFER_BASELINE));

        let media = self
            .media
            .fetch_media(&request.source_url, request.format, request.quality)
            .await?;
        debug!("{} transfer started, size hint {:?}", id, media.total_size);

        let mut estimator = ProgressEstimator::new(media.total_size);
        let mut buffer = BytesMut::with_capacity(
            media
                .total_size
                .map_or(0, |t| t.min(MAX_PREALLOCATED_BYTES) as usize),
        );
        let mut chunks = media.chunks;
        while let Some(chunk) = chunks.next().await {
            let chunk = chunk?;
            buffer.extend_from_slice(&chunk);

            let before = estimator.current();
            let progress = estimator.on_chunk(chunk.len());
            if progress != before {
                self.registry.update(id, RecordPatch::progress(progress));
            }
        }

        if buffer.is_empty() {
            return Err(DownloadError::EmptyArtifact);
        }

        let artifact = Artifact {
            bytes: buffer.freeze(),
            filename: artifact_filename(&title, request.format.extension()),
            content_type: request.format.content_type(),
        };
        let path = self.sink.save(artifact).await?;

        if self.registry.get(id).is_none() {
            warn!("{} was removed before it finished; saved anyway", id);
        }
        info!(
            "{} completed: {} bytes saved to {}",
            id,
            estimator.received(),
            path.display()
        );
        Ok(())
    }
}
