use std::path::PathBuf;
use std::sync::Arc;

use futures::Stream;
use iced::Task;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::api::ApiClient;
use crate::application::{DownloadOrchestrator, DownloadRegistry, FileSink, Snapshot};
use crate::config::AppConfig;
use crate::domain::{validate_url, AppError, DownloadId, DownloadRequest};
use crate::ui::{DownloadMessage, DownloadView};

pub struct DownloadApp {
    view: DownloadView,
    orchestrator: DownloadOrchestrator,
    sink: FileSink,
    // Latest registry snapshot, rendered as the history
    records: Snapshot,
}

impl DownloadApp {
    pub fn new(config: AppConfig) -> Self {
        let api_client = Arc::new(ApiClient::new(config.api));
        let sink = FileSink::new(config.output_dir);
        let registry = DownloadRegistry::new();
        let records = registry.list();
        let orchestrator = DownloadOrchestrator::new(
            registry,
            api_client.clone(),
            api_client,
            Arc::new(sink.clone()),
        );

        Self {
            view: DownloadView::default(),
            orchestrator,
            sink,
            records,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    UiMessage(DownloadMessage),
    /// Outcome of handing a request to the orchestrator
    Submitted(Result<DownloadId, AppError>),
    /// A registry mutation happened
    RecordsChanged(Snapshot),
    FolderSelected(Option<PathBuf>),
}

/// Stream of every snapshot the registry publishes from now on
fn registry_updates(rx: watch::Receiver<Snapshot>) -> impl Stream<Item = Message> {
    futures::stream::unfold(rx, |mut rx| async move {
        rx.changed().await.ok()?;
        let snapshot = rx.borrow_and_update().clone();
        Some((Message::RecordsChanged(snapshot), rx))
    })
}

pub fn boot() -> (DownloadApp, Task<Message>) {
    let config = AppConfig::from_env();
    info!(
        "Backend {}, saving to {}",
        config.api.backend_url,
        config.output_dir.display()
    );

    let app = DownloadApp::new(config);
    let updates = Task::stream(registry_updates(app.orchestrator.registry().subscribe()));
    (app, updates)
}

pub fn update(app: &mut DownloadApp, message: Message) -> Task<Message> {
    match message {
        Message::UiMessage(ui_msg) => {
            app.view.update(ui_msg.clone());

            match ui_msg {
                DownloadMessage::DownloadPressed if !app.view.is_submitting => {
                    if let Some(e) = validate_url(&app.view.url, app.view.platform) {
                        app.view.error = Some(e.into());
                        return Task::none();
                    }

                    let request = DownloadRequest::new(
                        &app.view.url,
                        app.view.platform,
                        app.view.format,
                        app.view.quality,
                    );
                    let orchestrator = app.orchestrator.clone();
                    app.view.is_submitting = true;
                    app.view.error = None;

                    // Runs on the tokio executor so the orchestrator can spawn
                    return Task::perform(
                        async move { orchestrator.submit(request).map_err(AppError::from) },
                        Message::Submitted,
                    );
                }
                DownloadMessage::ChooseFolderPressed => {
                    let current = app.sink.directory();
                    return Task::perform(
                        async move {
                            rfd::AsyncFileDialog::new()
                                .set_directory(&current)
                                .pick_folder()
                                .await
                                .map(|handle| handle.path().to_path_buf())
                        },
                        Message::FolderSelected,
                    );
                }
                DownloadMessage::RemovePressed(id) => {
                    app.records = app.orchestrator.registry().remove(id);
                }
                _ => {}
            }
        }
        Message::Submitted(result) => {
            app.view.is_submitting = false;
            match result {
                Ok(id) => {
                    info!("Submitted {}", id);
                    app.view.url.clear();
                }
                Err(e) => {
                    warn!("Submission rejected: {}", e);
                    app.view.error = Some(e);
                }
            }
        }
        Message::RecordsChanged(snapshot) => {
            app.records = snapshot;
        }
        Message::FolderSelected(Some(path)) => {
            info!("Saving downloads to {}", path.display());
            app.sink.set_directory(path);
        }
        Message::FolderSelected(None) => {}
    }
    Task::none()
}

pub fn view(app: &DownloadApp) -> iced::Element<'_, Message> {
    app.view
        .view(&app.records, &app.sink.directory())
        .map(Message::UiMessage)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiConfig;
    use crate::domain::{Platform, ValidationError};

    fn app_in(dir: &tempfile::TempDir) -> DownloadApp {
        DownloadApp::new(AppConfig {
            api: ApiConfig::default(),
            output_dir: dir.path().to_path_buf(),
        })
    }

    #[test]
    fn test_invalid_url_never_creates_a_record() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir);
        app.view.url = "https://vimeo.com/123".to_string();

        let _ = update(
            &mut app,
            Message::UiMessage(DownloadMessage::DownloadPressed),
        );

        assert!(app.orchestrator.registry().list().is_empty());
        assert!(app.records.is_empty());
        assert!(!app.view.is_submitting);
        assert!(matches!(
            app.view.error,
            Some(AppError::Validation(ValidationError::InvalidYouTubeUrl))
        ));
    }

    #[test]
    fn test_empty_spotify_url_is_required() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir);
        let _ = update(
            &mut app,
            Message::UiMessage(DownloadMessage::PlatformSelected(Platform::Spotify)),
        );

        let _ = update(
            &mut app,
            Message::UiMessage(DownloadMessage::DownloadPressed),
        );

        assert!(app.orchestrator.registry().list().is_empty());
        assert!(matches!(
            app.view.error,
            Some(AppError::Validation(ValidationError::UrlRequired))
        ));
    }
}
