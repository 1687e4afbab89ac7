pub mod error;
pub mod model;
pub mod validation;

pub use error::{AppError, DownloadError, RegistryError, ValidationError};
pub use model::{
    DownloadId, DownloadRecord, DownloadRequest, DownloadStatus, MediaFormat, MediaQuality,
    Metadata, Platform, RecordPatch,
};
pub use validation::validate_url;
