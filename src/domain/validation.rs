use regex::Regex;

use super::{Platform, ValidationError};

const YOUTUBE_PATTERN: &str = r"^(https?://)?(www\.)?(youtube\.com|youtu\.be)/.+";
const SPOTIFY_PATTERN: &str = r"^(https?://)?(open\.spotify\.com)/.+";

fn matches(pattern: &str, url: &str) -> bool {
    Regex::new(pattern)
        .map(|re| re.is_match(url))
        .unwrap_or(false)
}

pub fn is_valid_youtube_url(url: &str) -> bool {
    matches(YOUTUBE_PATTERN, url)
}

pub fn is_valid_spotify_url(url: &str) -> bool {
    matches(SPOTIFY_PATTERN, url)
}

/// Gate run before `submit`; `Some` means the request must not be submitted.
pub fn validate_url(url: &str, platform: Platform) -> Option<ValidationError> {
    let url = url.trim();
    if url.is_empty() {
        return Some(ValidationError::UrlRequired);
    }

    match platform {
        Platform::YouTube if !is_valid_youtube_url(url) => Some(ValidationError::InvalidYouTubeUrl),
        Platform::Spotify if !is_valid_spotify_url(url) => Some(ValidationError::InvalidSpotifyUrl),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_url_is_required() {
        assert_eq!(
            validate_url("   ", Platform::YouTube),
            Some(ValidationError::UrlRequired)
        );
    }

    #[test]
    fn test_youtube_urls() {
        assert_eq!(
            validate_url("https://www.youtube.com/watch?v=abc123", Platform::YouTube),
            None
        );
        assert_eq!(validate_url("youtu.be/abc123", Platform::YouTube), None);
        assert_eq!(
            validate_url("https://vimeo.com/123", Platform::YouTube),
            Some(ValidationError::InvalidYouTubeUrl)
        );
    }

    #[test]
    fn test_spotify_urls() {
        assert_eq!(
            validate_url(
                "https://open.spotify.com/track/4uLU6hMCjMI75M1A2tKUQC",
                Platform::Spotify
            ),
            None
        );
        assert_eq!(
            validate_url("https://www.youtube.com/watch?v=abc123", Platform::Spotify),
            Some(ValidationError::InvalidSpotifyUrl)
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(ValidationError::UrlRequired.to_string(), "URL is required");
        assert_eq!(
            ValidationError::InvalidSpotifyUrl.to_string(),
            "Please enter a valid Spotify URL"
        );
    }
}
