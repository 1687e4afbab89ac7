use std::time::Duration;

use serde::{Deserialize, Serialize};

/// oEmbed document returned by both YouTube and Spotify
#[derive(Debug, Clone, Deserialize)]
pub struct OEmbedResponse {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
}

/// Body posted to the media-download backend
#[derive(Debug, Clone, Serialize)]
pub struct MediaDownloadRequest<'a> {
    pub url: &'a str,
    pub format: &'a str,
    pub quality: &'a str,
}

/// Error payload of a failed backend call; either field may carry the text
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorResponse {
    pub fn into_message(self) -> Option<String> {
        self.error
            .into_iter()
            .chain(self.message)
            .find(|m| !m.trim().is_empty())
    }
}

/// Configuration for the API client
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub backend_url: String,
    pub api_key: Option<String>,
    pub youtube_oembed_url: String,
    pub spotify_oembed_url: String,
    pub connect_timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:54321/functions/v1/media-download".to_string(),
            api_key: None,
            youtube_oembed_url: "https://www.youtube.com/oembed".to_string(),
            spotify_oembed_url: "https://open.spotify.com/oembed".to_string(),
            connect_timeout: Duration::from_secs(15),
        }
    }
}

impl ApiConfig {
    /// Defaults overridden by `MEDIA_DL_*` environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            backend_url: get("MEDIA_DL_BACKEND_URL").unwrap_or(defaults.backend_url),
            api_key: get("MEDIA_DL_API_KEY").or(defaults.api_key),
            youtube_oembed_url: get("MEDIA_DL_YOUTUBE_OEMBED_URL")
                .unwrap_or(defaults.youtube_oembed_url),
            spotify_oembed_url: get("MEDIA_DL_SPOTIFY_OEMBED_URL")
                .unwrap_or(defaults.spotify_oembed_url),
            connect_timeout: get("MEDIA_DL_CONNECT_TIMEOUT_SECS")
                .and_then(|v| v.trim().parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.connect_timeout),
        }
    }
}
