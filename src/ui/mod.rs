use std::path::Path;

use iced::{
    widget::{button, column, progress_bar, row, scrollable, text, text_input, Column, Space},
    Element, Length,
};

use crate::domain::{
    AppError, DownloadId, DownloadRecord, DownloadStatus, MediaFormat, MediaQuality, Platform,
};

/// Form state. Records are owned by the registry and only passed in for
/// rendering.
pub struct DownloadView {
    pub url: String,
    pub platform: Platform,
    pub format: MediaFormat,
    pub quality: MediaQuality,
    pub error: Option<AppError>,
    pub is_submitting: bool,
}

impl Default for DownloadView {
    fn default() -> Self {
        Self {
            url: String::new(),
            platform: Platform::YouTube,
            format: MediaFormat::Audio,
            quality: MediaQuality::High,
            error: None,
            is_submitting: false,
        }
    }
}

#[derive(Debug, Clone)]
pub enum DownloadMessage {
    UrlChanged(String),
    PlatformSelected(Platform),
    FormatSelected(MediaFormat),
    QualitySelected(MediaQuality),
    DownloadPressed,
    ChooseFolderPressed,
    RemovePressed(DownloadId),
}

fn choice<'a, T: std::fmt::Display>(
    label: T,
    selected: bool,
    on_press: Option<DownloadMessage>,
) -> Element<'a, DownloadMessage> {
    let marker = if selected { "● " } else { "" };
    button(text(format!("{}{}", marker, label)))
        .on_press_maybe(on_press)
        .padding([6, 14])
        .into()
}

fn status_line(record: &DownloadRecord) -> String {
    match record.status {
        DownloadStatus::Downloading => format!("Downloading {}%", record.progress),
        DownloadStatus::Error => format!(
            "Error: {}",
            record.error_message.as_deref().unwrap_or("Download failed")
        ),
        status => status.to_string(),
    }
}

impl DownloadView {
    pub fn update(&mut self, message: DownloadMessage) {
        match message {
            DownloadMessage::UrlChanged(url) => {
                self.url = url;
                self.error = None;
            }
            DownloadMessage::PlatformSelected(platform) => {
                self.platform = platform;
                if !platform.supports(self.format) {
                    self.format = MediaFormat::Audio;
                }
                self.error = None;
            }
            DownloadMessage::FormatSelected(format) => {
                if self.platform.supports(format) {
                    self.format = format;
                }
                self.error = None;
            }
            DownloadMessage::QualitySelected(quality) => {
                self.quality = quality;
                self.error = None;
            }
            DownloadMessage::DownloadPressed
            | DownloadMessage::ChooseFolderPressed
            | DownloadMessage::RemovePressed(_) => {
                // Will be handled by the app
            }
        }
    }

    fn record_row<'a>(&self, record: &'a DownloadRecord) -> Element<'a, DownloadMessage> {
        let details = format!(
            "{} · {} · {} · {}",
            record.platform,
            record.format,
            record.quality,
            record.created_at.format("%H:%M:%S")
        );

        column![
            row![
                text(&record.title).size(16),
                Space::new().width(Length::Fill),
                button("Remove")
                    .on_press(DownloadMessage::RemovePressed(record.id))
                    .padding([4, 10]),
            ]
            .spacing(10),
            text(details).size(12),
            progress_bar(0.0..=100.0, record.progress as f32),
            text(status_line(record)).size(12),
        ]
        .spacing(4)
        .into()
    }

    pub fn view<'a>(
        &'a self,
        records: &'a [DownloadRecord],
        output_dir: &Path,
    ) -> Element<'a, DownloadMessage> {
        let platforms = Platform::ALL.iter().fold(row![].spacing(6), |r, &p| {
            r.push(choice(
                p,
                p == self.platform,
                Some(DownloadMessage::PlatformSelected(p)),
            ))
        });
        let formats = MediaFormat::ALL.iter().fold(row![].spacing(6), |r, &f| {
            r.push(choice(
                f,
                f == self.format,
                self.platform
                    .supports(f)
                    .then_some(DownloadMessage::FormatSelected(f)),
            ))
        });
        let qualities = MediaQuality::ALL.iter().fold(row![].spacing(6), |r, &q| {
            r.push(choice(
                q,
                q == self.quality,
                Some(DownloadMessage::QualitySelected(q)),
            ))
        });
        let quality_label = match self.format {
            MediaFormat::Audio => "Audio Quality",
            MediaFormat::Video => "Quality",
        };

        let error_text = self
            .error
            .as_ref()
            .map(|e| e.to_string())
            .unwrap_or_default();

        let history: Element<'a, DownloadMessage> = if records.is_empty() {
            text("No downloads yet").size(14).into()
        } else {
            scrollable(
                Column::with_children(records.iter().map(|r| self.record_row(r))).spacing(16),
            )
            .height(Length::Fill)
            .into()
        };

        let download_button = button(if self.is_submitting {
            "Submitting..."
        } else {
            "Download"
        })
        .on_press_maybe((!self.is_submitting).then_some(DownloadMessage::DownloadPressed))
        .padding([10, 20]);

        column![
            text("Media Downloader").size(32),
            platforms,
            text(format!("{} URL:", self.platform)).size(16),
            text_input("Paste a link...", &self.url)
                .on_input(DownloadMessage::UrlChanged)
                .on_submit(DownloadMessage::DownloadPressed)
                .padding(10),
            text(error_text).size(14),
            text("Format").size(14),
            formats,
            text(quality_label).size(14),
            qualities,
            row![
                download_button,
                button("Save to...")
                    .on_press(DownloadMessage::ChooseFolderPressed)
                    .padding([10, 20]),
                text(output_dir.display().to_string()).size(12),
            ]
            .spacing(10),
            Space::new().height(Length::Fixed(20.0)),
            text("Download History").size(20),
            history,
        ]
        .padding(20)
        .spacing(10)
        .into()
    }
}
