mod api;
mod app;
mod application;
mod config;
mod domain;
mod ui;
mod utils;

use iced::{window, Size};
use tracing_subscriber::EnvFilter;

fn main() -> iced::Result {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("media_downloader=info")),
        )
        .init();

    iced::application(app::boot, app::update, app::view)
        .title("Media Downloader")
        .window(window::Settings {
            size: Size::new(720.0, 820.0),
            ..Default::default()
        })
        .run()
}
