pub mod batch;
pub mod config;
pub mod error;
pub mod extract;
pub mod gemini;
pub mod normalize;
pub mod output;
pub mod pipeline;
pub mod youtube;

use std::sync::LazyLock;

use regex::Regex;

pub use error::AnalysisError;

/// One row of the result table, keyed by column name in insertion order
pub type ResultRecord = serde_json::Map<String, serde_json::Value>;

/// A single captioned segment
#[derive(Debug, Clone)]
pub struct Segment {
    pub text: String,
    pub start: f64,
    pub duration: f64,
}

static BARE_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{11}$").expect("valid regex"));

// youtube.com/watch?...v=ID
static WATCH_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:https?://)?(?:www\.|m\.)?youtube\.com/watch/?\?(?:[^#]*&)?v=([A-Za-z0-9_-]+)")
        .expect("valid regex")
});

// youtu.be/ID, youtube.com/{embed,shorts,live}/ID
static PATH_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:https?://)?(?:youtu\.be/|(?:www\.|m\.)?youtube\.com/(?:embed|shorts|live)/)([A-Za-z0-9_-]+)(?:[?#&/].*)?$",
    )
    .expect("valid regex")
});

/// Extract the video ID from a YouTube link or a bare 11-character ID
pub fn parse_link(url: &str) -> Result<String, AnalysisError> {
    let input = url.trim();

    if BARE_ID.is_match(input) {
        return Ok(input.to_string());
    }

    WATCH_URL
        .captures(input)
        .or_else(|| PATH_URL.captures(input))
        .map(|caps| caps[1].to_string())
        .ok_or_else(|| AnalysisError::InvalidLink { url: url.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(url: &str) -> String {
        parse_link(url).unwrap()
    }

    #[test]
    fn test_bare_video_id() {
        assert_eq!(id("dQw4w9WgXcQ"), "dQw4w9WgXcQ");
    }

    #[test]
    fn test_watch_url() {
        assert_eq!(id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"), "dQw4w9WgXcQ");
    }

    #[test]
    fn test_watch_url_with_extra_params() {
        assert_eq!(id("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=120"), "dQw4w9WgXcQ");
        assert_eq!(id("https://youtube.com/watch?feature=share&v=CeuqAIsrVpY"), "CeuqAIsrVpY");
    }

    #[test]
    fn test_mobile_watch_url() {
        assert_eq!(id("https://m.youtube.com/watch?v=HZvTW4hlSVQ"), "HZvTW4hlSVQ");
    }

    #[test]
    fn test_short_url() {
        assert_eq!(id("https://youtu.be/dQw4w9WgXcQ"), "dQw4w9WgXcQ");
        assert_eq!(id("https://youtu.be/dQw4w9WgXcQ?si=xyz"), "dQw4w9WgXcQ");
    }

    #[test]
    fn test_short_url_any_length_id() {
        assert_eq!(id("https://youtu.be/abc123"), "abc123");
    }

    #[test]
    fn test_embed_shorts_live_urls() {
        assert_eq!(id("https://www.youtube.com/embed/dQw4w9WgXcQ"), "dQw4w9WgXcQ");
        assert_eq!(id("https://www.youtube.com/shorts/dQw4w9WgXcQ"), "dQw4w9WgXcQ");
        assert_eq!(id("https://www.youtube.com/live/dQw4w9WgXcQ?feature=shared"), "dQw4w9WgXcQ");
    }

    #[test]
    fn test_whitespace_trimming() {
        assert_eq!(id("  https://youtu.be/dQw4w9WgXcQ \n"), "dQw4w9WgXcQ");
    }

    #[test]
    fn test_invalid_links() {
        for bad in [
            "",
            "not-a-valid-id",
            "https://vimeo.com/123456",
            "https://www.youtube.com/watch?list=PL123",
            "https://www.youtube.com/channel/UC123",
            "https://youtu.be/",
            "https://notyoutube.com/watch?v=dQw4w9WgXcQ",
        ] {
            match parse_link(bad) {
                Err(AnalysisError::InvalidLink { url }) => assert_eq!(url, bad),
                other => panic!("expected InvalidLink for {bad:?}, got {other:?}"),
            }
        }
    }
}
