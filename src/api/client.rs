use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, warn};

use super::models::{ApiConfig, ErrorResponse, MediaDownloadRequest, OEmbedResponse};
use crate::application::{MediaFetcher, MediaStream, MetadataResolver};
use crate::domain::{DownloadError, MediaFormat, MediaQuality, Metadata, Platform};
use crate::utils::{extract_track_id, extract_video_id};

const YOUTUBE_PLACEHOLDER_THUMBNAIL: &str =
    "https://images.pexels.com/photos/1190297/pexels-photo-1190297.jpeg";
const SPOTIFY_PLACEHOLDER_THUMBNAIL: &str =
    "https://images.pexels.com/photos/2479312/pexels-photo-2479312.jpeg";
const GENERIC_DOWNLOAD_ERROR: &str = "Download failed";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("{0}")]
    Backend(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

pub type Result<T> = std::result::Result<T, ApiError>;

impl From<ApiError> for DownloadError {
    fn from(e: ApiError) -> Self {
        match e {
            ApiError::Backend(message) => DownloadError::TransferFailed(message),
            other => DownloadError::TransferFailed(other.to_string()),
        }
    }
}

/// Pull a human readable message out of a failed backend response:
/// structured JSON first, then the raw text, then a generic message.
pub fn extract_error_message(body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorResponse>(body) {
        return parsed
            .into_message()
            .unwrap_or_else(|| GENERIC_DOWNLOAD_ERROR.to_string());
    }

    let raw = body.trim();
    if raw.is_empty() {
        GENERIC_DOWNLOAD_ERROR.to_string()
    } else {
        raw.to_string()
    }
}

#[derive(Clone)]
pub struct ApiClient {
    config: ApiConfig,
    http: Client,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Self {
        let http = Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .unwrap_or_else(|e| {
                warn!("Falling back to default HTTP client: {}", e);
                Client::new()
            });

        Self { config, http }
    }

    async fn fetch_oembed(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<OEmbedResponse> {
        let response = self
            .http
            .get(endpoint)
            .query(query)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| ApiError::Backend(format!("oEmbed request failed: {}", e)))?;

        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("JSON decode error: {}", e)))
    }

    /// Best-effort title and thumbnail. Never fails: any problem yields the
    /// platform's fallback metadata.
    pub async fn get_metadata(&self, url: &str, platform: Platform) -> Metadata {
        match platform {
            Platform::YouTube => self.youtube_metadata(url).await,
            Platform::Spotify => self.spotify_metadata(url).await,
        }
    }

    async fn youtube_metadata(&self, url: &str) -> Metadata {
        let fallback_title = Platform::YouTube.fallback_title();
        let Some(video_id) = extract_video_id(url) else {
            warn!("No YouTube video id in {}, using fallback metadata", url);
            return Metadata {
                title: fallback_title.to_string(),
                thumbnail_url: Some(YOUTUBE_PLACEHOLDER_THUMBNAIL.to_string()),
            };
        };

        let watch_url = format!("https://www.youtube.com/watch?v={}", video_id);
        let title = match self
            .fetch_oembed(
                &self.config.youtube_oembed_url,
                &[("url", watch_url.as_str()), ("format", "json")],
            )
            .await
        {
            Ok(oembed) => oembed.title.filter(|t| !t.trim().is_empty()),
            Err(e) => {
                warn!("oEmbed failed for {}, using fallback: {}", video_id, e);
                None
            }
        };

        Metadata {
            title: title.unwrap_or_else(|| fallback_title.to_string()),
            thumbnail_url: Some(format!(
                "https://img.youtube.com/vi/{}/maxresdefault.jpg",
                video_id
            )),
        }
    }

    async fn spotify_metadata(&self, url: &str) -> Metadata {
        let fallback = Metadata {
            title: Platform::Spotify.fallback_title().to_string(),
            thumbnail_url: Some(SPOTIFY_PLACEHOLDER_THUMBNAIL.to_string()),
        };
        let Some(track_id) = extract_track_id(url) else {
            warn!("No Spotify track id in {}, using fallback metadata", url);
            return fallback;
        };

        let track_url = format!("https://open.spotify.com/track/{}", track_id);
        match self
            .fetch_oembed(&self.config.spotify_oembed_url, &[("url", track_url.as_str())])
            .await
        {
            Ok(oembed) => Metadata {
                title: oembed
                    .title
                    .filter(|t| !t.trim().is_empty())
                    .unwrap_or(fallback.title),
                thumbnail_url: oembed.thumbnail_url.or(fallback.thumbnail_url),
            },
            Err(e) => {
                warn!("Spotify oEmbed failed for {}, using fallback: {}", track_id, e);
                fallback
            }
        }
    }

    /// Ask the backend for the media and hand back its body as a chunk stream
    /// together with the Content-Length hint.
    pub async fn download_media_stream(
        &self,
        url: &str,
        format: MediaFormat,
        quality: MediaQuality,
    ) -> Result<MediaStream> {
        let mut request = self.http.post(&self.config.backend_url).json(&MediaDownloadRequest {
            url,
            format: format.extension(),
            quality: quality.as_str(),
        });
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!("Backend answered {} with body {:?}", status, body);
            return Err(ApiError::Backend(extract_error_message(&body)));
        }

        let total_size = response.content_length();
        let chunks = response
            .bytes_stream()
            .map_err(|e| DownloadError::from(ApiError::RequestError(e)))
            .boxed();

        Ok(MediaStream { total_size, chunks })
    }
}

#[async_trait]
impl MetadataResolver for ApiClient {
    async fn resolve_metadata(&self, url: &str, platform: Platform) -> Metadata {
        self.get_metadata(url, platform).await
    }
}

#[async_trait]
impl MediaFetcher for ApiClient {
    async fn fetch_media(
        &self,
        url: &str,
        format: MediaFormat,
        quality: MediaQuality,
    ) -> std::result::Result<MediaStream, DownloadError> {
        Ok(self.download_media_stream(url, format, quality).await?)
    }
}
