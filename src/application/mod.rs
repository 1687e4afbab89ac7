pub mod capabilities;
pub mod file_sink;
pub mod orchestrator;
pub mod progress;
pub mod registry;

pub use capabilities::{MediaFetcher, MediaStream, MetadataResolver};
pub use file_sink::FileSink;
pub use orchestrator::DownloadOrchestrator;
pub use registry::{DownloadRegistry, Snapshot};
