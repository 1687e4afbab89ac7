use thiserror::Error;

use super::model::DownloadId;

/// Rejections from the pre-submission gate. A request that fails here never
/// becomes a record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("URL is required")]
    UrlRequired,

    #[error("Please enter a valid YouTube URL")]
    InvalidYouTubeUrl,

    #[error("Please enter a valid Spotify URL")]
    InvalidSpotifyUrl,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Download id {0} is already registered")]
    DuplicateId(DownloadId),
}

/// Failures that end a record in the error state. The display text is what
/// the user sees.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DownloadError {
    #[error("Invalid URL provided")]
    InvalidSource,

    #[error("{0}")]
    TransferFailed(String),

    #[error("Downloaded file is empty")]
    EmptyArtifact,

    #[error("Failed to save file: {0}")]
    SaveFailed(String),
}

#[derive(Debug, Clone, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}
