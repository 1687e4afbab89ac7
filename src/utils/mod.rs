use regex::Regex;

/// Add an https scheme when the user pasted a bare host/path
pub fn normalize_url(url: &str) -> String {
    let url = url.trim();
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{}", url)
    }
}

fn first_capture(patterns: &[&str], url: &str) -> Option<String> {
    for pattern in patterns {
        let re = Regex::new(pattern).ok()?;
        if let Some(caps) = re.captures(url) {
            return Some(caps[1].to_string());
        }
    }
    None
}

/// Extract the video id from watch, youtu.be and shorts links
pub fn extract_video_id(url: &str) -> Option<String> {
    first_capture(
        &[
            r"(?:youtube\.com/watch\?v=|youtu\.be/)([^&\n?#]+)",
            r"youtube\.com/shorts/([^&\n?#]+)",
        ],
        url,
    )
}

pub fn extract_track_id(url: &str) -> Option<String> {
    first_capture(&[r"spotify\.com/track/([a-zA-Z0-9]+)"], url)
}

/// Keep alphanumerics only, any whitespace becomes a plain space
pub fn sanitize_filename(title: &str) -> String {
    title
        .chars()
        .filter_map(|c| match c {
            c if c.is_alphanumeric() => Some(c),
            c if c.is_whitespace() => Some(' '),
            _ => None,
        })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Filename for a saved artifact, falling back to `download` when nothing
/// usable is left of the title.
pub fn artifact_filename(title: &str, extension: &str) -> String {
    let stem = sanitize_filename(title);
    let stem = if stem.is_empty() { "download" } else { &stem };
    format!("{}.{}", stem, extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_url() {
        assert_eq!(normalize_url(" youtu.be/abc "), "https://youtu.be/abc");
        assert_eq!(
            normalize_url("http://youtube.com/watch?v=x"),
            "http://youtube.com/watch?v=x"
        );
    }

    #[test]
    fn test_extract_video_id() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=abc123&t=10").as_deref(),
            Some("abc123")
        );
        assert_eq!(
            extract_video_id("https://youtu.be/xyz?si=1").as_deref(),
            Some("xyz")
        );
        assert_eq!(
            extract_video_id("https://youtube.com/shorts/short1").as_deref(),
            Some("short1")
        );
        assert_eq!(extract_video_id("https://youtube.com/channel/foo"), None);
    }

    #[test]
    fn test_extract_track_id() {
        assert_eq!(
            extract_track_id("https://open.spotify.com/track/4uLU6hMCjMI75M1A2tKUQC?si=a")
                .as_deref(),
            Some("4uLU6hMCjMI75M1A2tKUQC")
        );
        assert_eq!(extract_track_id("https://open.spotify.com/album/1"), None);
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("test/file: one?"), "testfile one");
        assert_eq!(sanitize_filename("  Test - Song  "), "Test  Song");
        assert_eq!(sanitize_filename("a\nb\tc\r"), "a b c");
    }

    #[test]
    fn test_artifact_filename() {
        assert_eq!(artifact_filename("Test Song!", "mp3"), "Test Song.mp3");
        assert_eq!(artifact_filename("???", "mp4"), "download.mp4");
    }
}
