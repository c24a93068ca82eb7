use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

// @module: Source identifier resolution for video URLs

// @const: Canonical 11-character video id
static VIDEO_ID_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_-]{11}$").unwrap()
});

/// Resolve a source identifier to a canonical video id.
///
/// Accepts watch URLs (`youtube.com/watch?v=ID`), short links (`youtu.be/ID`),
/// embed and shorts paths, and bare 11-character ids. Anything else resolves
/// to `None` and the item fails with an invalid-source error upstream.
pub fn extract_video_id(source: &str) -> Option<String> {
    let trimmed = source.trim();
    if trimmed.is_empty() {
        return None;
    }

    // Bare id, no URL machinery needed
    if VIDEO_ID_REGEX.is_match(trimmed) {
        return Some(trimmed.to_string());
    }

    let url = match Url::parse(trimmed) {
        Ok(url) => url,
        // Scheme-less input like "youtube.com/watch?v=..."
        Err(_) => Url::parse(&format!("https://{}", trimmed)).ok()?,
    };

    let host = url
        .host_str()?
        .trim_start_matches("www.")
        .trim_start_matches("m.");

    let candidate = match host {
        "youtu.be" => url.path_segments()?.next().map(str::to_string),
        "youtube.com" | "music.youtube.com" | "youtube-nocookie.com" => {
            let mut segments = url.path_segments()?;
            match segments.next() {
                Some("watch") => url
                    .query_pairs()
                    .find(|(key, _)| key == "v")
                    .map(|(_, value)| value.into_owned()),
                Some("embed") | Some("shorts") | Some("live") | Some("v") => {
                    segments.next().map(str::to_string)
                }
                _ => None,
            }
        }
        _ => None,
    }?;

    if VIDEO_ID_REGEX.is_match(&candidate) {
        Some(candidate)
    } else {
        None
    }
}

/// Canonical watch URL for a video id
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}
