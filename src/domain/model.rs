use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::utils::normalize_url;

pub const PLACEHOLDER_TITLE: &str = "Fetching metadata...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DownloadId(Uuid);

impl DownloadId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for DownloadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "download-{}", self.0.simple())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    YouTube,
    Spotify,
}

impl Platform {
    pub const ALL: [Platform; 2] = [Platform::YouTube, Platform::Spotify];

    pub fn fallback_title(self) -> &'static str {
        match self {
            Platform::YouTube => "YouTube Video",
            Platform::Spotify => "Spotify Track",
        }
    }

    pub fn supports(self, format: MediaFormat) -> bool {
        !matches!((self, format), (Platform::Spotify, MediaFormat::Video))
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Platform::YouTube => "YouTube",
            Platform::Spotify => "Spotify",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaFormat {
    Audio,
    Video,
}

impl MediaFormat {
    pub const ALL: [MediaFormat; 2] = [MediaFormat::Audio, MediaFormat::Video];

    pub fn content_type(self) -> &'static str {
        match self {
            MediaFormat::Audio => "audio/mpeg",
            MediaFormat::Video => "video/mp4",
        }
    }

    /// File extension, also the format name the backend expects.
    pub fn extension(self) -> &'static str {
        match self {
            MediaFormat::Audio => "mp3",
            MediaFormat::Video => "mp4",
        }
    }
}

impl fmt::Display for MediaFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MediaFormat::Audio => "Audio",
            MediaFormat::Video => "Video",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaQuality {
    Low,
    Medium,
    High,
}

impl MediaQuality {
    pub const ALL: [MediaQuality; 3] = [MediaQuality::Low, MediaQuality::Medium, MediaQuality::High];

    pub fn as_str(self) -> &'static str {
        match self {
            MediaQuality::Low => "low",
            MediaQuality::Medium => "medium",
            MediaQuality::High => "high",
        }
    }
}

impl fmt::Display for MediaQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MediaQuality::Low => "Low",
            MediaQuality::Medium => "Medium",
            MediaQuality::High => "High",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadStatus {
    Pending,
    Downloading,
    Completed,
    Error,
}

impl DownloadStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, DownloadStatus::Completed | DownloadStatus::Error)
    }

    /// pending -> downloading -> {completed | error}, or pending -> error.
    pub fn can_transition_to(self, next: DownloadStatus) -> bool {
        use DownloadStatus::*;
        match (self, next) {
            (a, b) if a == b => !a.is_terminal(),
            (Pending, Downloading) | (Pending, Error) => true,
            (Downloading, Completed) | (Downloading, Error) => true,
            _ => false,
        }
    }
}

impl fmt::Display for DownloadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DownloadStatus::Pending => "Pending",
            DownloadStatus::Downloading => "Downloading",
            DownloadStatus::Completed => "Completed",
            DownloadStatus::Error => "Error",
        })
    }
}

/// A user request, already past URL validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub source_url: String,
    pub platform: Platform,
    pub format: MediaFormat,
    pub quality: MediaQuality,
}

impl DownloadRequest {
    pub fn new(
        source_url: &str,
        platform: Platform,
        format: MediaFormat,
        quality: MediaQuality,
    ) -> Self {
        // Spotify only offers audio
        let format = if platform.supports(format) {
            format
        } else {
            MediaFormat::Audio
        };

        Self {
            source_url: normalize_url(source_url),
            platform,
            format,
            quality,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    pub title: String,
    pub thumbnail_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DownloadRecord {
    pub id: DownloadId,
    pub source_url: String,
    pub platform: Platform,
    pub format: MediaFormat,
    pub quality: MediaQuality,
    pub title: String,
    pub thumbnail_url: Option<String>,
    pub status: DownloadStatus,
    pub progress: u8,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl DownloadRecord {
    pub fn pending(id: DownloadId, request: &DownloadRequest) -> Self {
        Self {
            id,
            source_url: request.source_url.clone(),
            platform: request.platform,
            format: request.format,
            quality: request.quality,
            title: PLACEHOLDER_TITLE.to_string(),
            thumbnail_url: None,
            status: DownloadStatus::Pending,
            progress: 0,
            error_message: None,
            created_at: Utc::now(),
        }
    }

    /// Applies a patch, returning whether anything changed.
    ///
    /// Patches that would leave a terminal state or move progress backwards
    /// while downloading are rejected as a whole.
    pub fn apply(&mut self, patch: RecordPatch) -> bool {
        let next_status = patch.status.unwrap_or(self.status);
        if !self.status.can_transition_to(next_status) {
            return false;
        }
        if let Some(progress) = patch.progress {
            if self.status == DownloadStatus::Downloading
                && next_status == DownloadStatus::Downloading
                && progress < self.progress
            {
                return false;
            }
        }

        let before = self.clone();

        if let Some(metadata) = patch.metadata {
            self.title = metadata.title;
            self.thumbnail_url = metadata.thumbnail_url;
        }
        self.status = next_status;
        match next_status {
            DownloadStatus::Completed => {
                self.progress = 100;
                self.error_message = None;
            }
            DownloadStatus::Error => {
                self.progress = 0;
                self.error_message = Some(
                    patch
                        .error_message
                        .filter(|m| !m.trim().is_empty())
                        .unwrap_or_else(|| "Download failed".to_string()),
                );
            }
            DownloadStatus::Pending => self.progress = 0,
            DownloadStatus::Downloading => {
                if let Some(progress) = patch.progress {
                    self.progress = progress.min(100);
                }
            }
        }

        *self != before
    }
}

/// Partial update of the mutable fields of a [`DownloadRecord`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordPatch {
    pub metadata: Option<Metadata>,
    pub status: Option<DownloadStatus>,
    pub progress: Option<u8>,
    pub error_message: Option<String>,
}

impl RecordPatch {
    pub fn downloading(metadata: Metadata, progress: u8) -> Self {
        Self {
            metadata: Some(metadata),
            status: Some(DownloadStatus::Downloading),
            progress: Some(progress),
            ..Default::default()
        }
    }

    pub fn progress(progress: u8) -> Self {
        Self {
            progress: Some(progress),
            ..Default::default()
        }
    }

    pub fn completed() -> Self {
        Self {
            status: Some(DownloadStatus::Completed),
            progress: Some(100),
            ..Default::default()
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: Some(DownloadStatus::Error),
            progress: Some(0),
            error_message: Some(message.into()),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> DownloadRecord {
        let request = DownloadRequest::new(
            "https://www.youtube.com/watch?v=abc123",
            Platform::YouTube,
            MediaFormat::Audio,
            MediaQuality::High,
        );
        DownloadRecord::pending(DownloadId::generate(), &request)
    }

    fn metadata() -> Metadata {
        Metadata {
            title: "Test Song".to_string(),
            thumbnail_url: None,
        }
    }

    #[test]
    fn test_spotify_request_forces_audio() {
        let request = DownloadRequest::new(
            "open.spotify.com/track/4uLU6hMCjMI75M1A2tKUQC",
            Platform::Spotify,
            MediaFormat::Video,
            MediaQuality::Low,
        );
        assert_eq!(request.format, MediaFormat::Audio);
        assert_eq!(
            request.source_url,
            "https://open.spotify.com/track/4uLU6hMCjMI75M1A2tKUQC"
        );
    }

    #[test]
    fn test_pending_record_defaults() {
        let record = record();
        assert_eq!(record.status, DownloadStatus::Pending);
        assert_eq!(record.progress, 0);
        assert_eq!(record.title, PLACEHOLDER_TITLE);
        assert!(record.error_message.is_none());
    }

    #[test]
    fn test_full_lifecycle() {
        let mut record = record();
        assert!(record.apply(RecordPatch::downloading(metadata(), 10)));
        assert_eq!(record.title, "Test Song");
        assert!(record.apply(RecordPatch::progress(50)));
        assert!(record.apply(RecordPatch::completed()));
        assert_eq!(record.status, DownloadStatus::Completed);
        assert_eq!(record.progress, 100);
    }

    #[test]
    fn test_progress_never_regresses_while_downloading() {
        let mut record = record();
        record.apply(RecordPatch::downloading(metadata(), 10));
        record.apply(RecordPatch::progress(60));
        assert!(!record.apply(RecordPatch::progress(40)));
        assert_eq!(record.progress, 60);
    }

    #[test]
    fn test_terminal_states_are_final() {
        let mut record = record();
        assert!(record.apply(RecordPatch::failed("boom")));
        assert_eq!(record.progress, 0);
        assert_eq!(record.error_message.as_deref(), Some("boom"));

        assert!(!record.apply(RecordPatch::completed()));
        assert!(!record.apply(RecordPatch::progress(30)));
        assert_eq!(record.status, DownloadStatus::Error);
    }

    #[test]
    fn test_pending_cannot_complete_directly() {
        let mut record = record();
        assert!(!record.apply(RecordPatch::completed()));
        assert_eq!(record.status, DownloadStatus::Pending);
    }

    #[test]
    fn test_failure_without_message_uses_generic_text() {
        let mut record = record();
        record.apply(RecordPatch::failed(""));
        assert_eq!(record.error_message.as_deref(), Some("Download failed"));
    }

    #[test]
    fn test_ids_are_unique() {
        let ids: std::collections::HashSet<_> = (0..1000).map(|_| DownloadId::generate()).collect();
        assert_eq!(ids.len(), 1000);
    }
}
