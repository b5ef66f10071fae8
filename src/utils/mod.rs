use std::time::{SystemTime, UNIX_EPOCH};

use regex::Regex;
use url::Url;

/// Get current Unix timestamp in seconds
pub fn get_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_secs()
}

/// Validate a YouTube URL and strip the tracking parameters share links
/// tack on. Returns `None` for anything that isn't a video, shorts,
/// playlist, or youtu.be link.
pub fn sanitize_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let accepted = [
        r"^https?://(www\.)?youtube\.com/watch\?v=[\w-]+",
        r"^https?://youtu\.be/[\w-]+",
        r"^https?://(www\.)?youtube\.com/playlist\?list=[\w-]+",
        r"^https?://(www\.)?youtube\.com/shorts/[\w-]+",
    ];
    let matches_any = accepted.iter().any(|pattern| {
        Regex::new(pattern)
            .map(|re| re.is_match(trimmed))
            .unwrap_or(false)
    });
    if !matches_any {
        return None;
    }

    let mut url = Url::parse(trimmed).ok()?;
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !matches!(key.as_ref(), "t" | "feature"))
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    if kept.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(kept);
    }
    Some(url.to_string())
}

/// Sanitize filename to remove invalid characters
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            _ => c,
        })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Local filename for a finished MP3, derived from the video title.
pub fn suggested_filename(title: &str) -> String {
    let base = sanitize_filename(title);
    let base = base.trim_matches(|c| c == '.' || c == ' ');
    if base.is_empty() {
        "audio.mp3".to_string()
    } else {
        format!("{}.mp3", base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp() {
        let ts = get_timestamp();
        assert!(ts > 1700000000); // Sanity check
    }

    #[test]
    fn test_sanitize_url_accepts_known_forms() {
        for url in [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ",
            "https://www.youtube.com/playlist?list=PL123abc",
            "https://www.youtube.com/shorts/abc-123",
        ] {
            assert!(sanitize_url(url).is_some(), "rejected {}", url);
        }
    }

    #[test]
    fn test_sanitize_url_rejects_everything_else() {
        for url in [
            "",
            "not a url",
            "https://vimeo.com/12345",
            "https://www.youtube.com/feed/subscriptions",
            "ftp://youtube.com/watch?v=abc",
        ] {
            assert!(sanitize_url(url).is_none(), "accepted {}", url);
        }
    }

    #[test]
    fn test_sanitize_url_strips_tracking_params() {
        let cleaned = sanitize_url("https://www.youtube.com/watch?v=abc123&t=43s&feature=share");
        assert_eq!(
            cleaned.as_deref(),
            Some("https://www.youtube.com/watch?v=abc123")
        );
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("test/file.mp3"), "test_file.mp3");
        assert_eq!(sanitize_filename("normal-name.mp3"), "normal-name.mp3");
    }

    #[test]
    fn test_suggested_filename() {
        assert_eq!(suggested_filename("My Song"), "My Song.mp3");
        assert_eq!(suggested_filename("a/b: c?"), "a_b_ c_.mp3");
        assert_eq!(suggested_filename("..."), "audio.mp3");
        assert_eq!(suggested_filename(""), "audio.mp3");
    }
}
