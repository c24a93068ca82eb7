/*!
 * YouTube clients for video metadata and caption tracks.
 *
 * Metadata comes from the public oEmbed endpoint, captions from the
 * timedtext endpoint. Both map HTTP failures to enumerated error kinds;
 * nothing downstream ever has to inspect a message string.
 */

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::errors::ProviderError;
use crate::language_utils;
use crate::providers::{classify_transport, MetadataProvider, TranscriptSource, VideoMetadata};
use crate::transcript::{Transcript, TranscriptOrigin, TranscriptSegment};
use crate::url_utils;

/// One `<track>` element from a timedtext track listing
static TRACK_TAG_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"<track\s+[^>]*/?>").unwrap());

static LANG_CODE_ATTR: Lazy<Regex> = Lazy::new(|| Regex::new(r#"lang_code="([^"]*)""#).unwrap());
static KIND_ATTR: Lazy<Regex> = Lazy::new(|| Regex::new(r#"kind="([^"]*)""#).unwrap());
static NAME_ATTR: Lazy<Regex> = Lazy::new(|| Regex::new(r#"name="([^"]*)""#).unwrap());

/// One `<text>` element from a timedtext transcript; `dur` can be absent
static TEXT_TAG_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<text start="([^"]+)"(?: dur="([^"]+)")?[^>]*>(.*?)</text>"#).unwrap()
});

static NUMERIC_ENTITY_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"&#(\d+);").unwrap());

static INNER_TAG_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());

/// Classify a non-success HTTP response from a YouTube endpoint.
///
/// 400/404/410 mean the video id does not resolve to a watchable video,
/// 401/403 mean it exists but is not publicly accessible.
fn classify_status(status: StatusCode, body: &str) -> ProviderError {
    let message = format!("HTTP {}: {}", status.as_u16(), snippet(body));
    match status.as_u16() {
        400 | 404 | 410 => ProviderError::VideoUnavailable(message),
        401 | 403 => ProviderError::VideoPrivate(message),
        429 => ProviderError::RateLimitExceeded(message),
        code => ProviderError::ApiError {
            status_code: code,
            message,
        },
    }
}

/// First 200 characters of a response body, for error messages
fn snippet(body: &str) -> String {
    body.chars().take(200).collect()
}

/// oEmbed response for a watch URL
#[derive(Debug, Deserialize)]
struct OEmbedResponse {
    title: String,
    author_name: String,
    #[serde(default)]
    thumbnail_url: Option<String>,
}

/// Resolves video metadata through the public oEmbed endpoint.
///
/// oEmbed carries no publication date or duration, so those metadata
/// fields stay unset with this provider.
#[derive(Debug, Clone)]
pub struct YouTubeMetadataProvider {
    /// HTTP client for API requests
    client: Client,
    /// Endpoint override, empty for the public site
    endpoint: String,
}

impl YouTubeMetadataProvider {
    pub fn new() -> Self {
        Self::with_endpoint("")
    }

    /// Create a provider aimed at a different base URL
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
            endpoint: endpoint.into(),
        }
    }

    fn base_url(&self) -> String {
        if self.endpoint.is_empty() {
            "https://www.youtube.com".to_string()
        } else {
            self.endpoint.trim_end_matches('/').to_string()
        }
    }
}

impl Default for YouTubeMetadataProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MetadataProvider for YouTubeMetadataProvider {
    async fn fetch_metadata(&self, video_id: &str) -> Result<VideoMetadata, ProviderError> {
        let watch_url = url_utils::watch_url(video_id);
        let request_url = format!("{}/oembed", self.base_url());

        let response = self
            .client
            .get(&request_url)
            .query(&[("url", watch_url.as_str()), ("format", "json")])
            .send()
            .await
            .map_err(classify_transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, &body));
        }

        let oembed = response
            .json::<OEmbedResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(format!("oEmbed response: {}", e)))?;

        debug!("Resolved metadata for {}: {}", video_id, oembed.title);

        Ok(VideoMetadata {
            video_id: video_id.to_string(),
            title: oembed.title,
            channel: oembed.author_name,
            url: watch_url,
            published_at: None,
            duration_sec: None,
            thumbnail_url: oembed.thumbnail_url,
        })
    }

    fn name(&self) -> &str {
        "YouTube oEmbed"
    }
}

/// How a transcript source picks among the available caption tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackSelection {
    /// Only accept tracks in the requested languages, best match first
    Preferred,
    /// Accept any track, still preferring human-made captions
    AnyAvailable,
}

/// A caption track advertised by the timedtext listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionTrack {
    /// Language code of the track
    pub lang_code: String,
    /// Track name, needed to address named tracks
    pub name: String,
    /// Track kind; "asr" marks speech-recognition captions
    pub kind: String,
}

impl CaptionTrack {
    /// Whether this track was produced by speech recognition
    pub fn is_auto(&self) -> bool {
        self.kind == "asr"
    }
}

/// Fetches caption tracks through the timedtext endpoint.
///
/// With [`TrackSelection::Preferred`] only requested languages are
/// accepted, human-made captions before speech-recognition ones. With
/// [`TrackSelection::AnyAvailable`] the language constraint is dropped,
/// which makes the same client usable as a last-resort fallback.
#[derive(Debug, Clone)]
pub struct YouTubeTranscriptSource {
    /// HTTP client for API requests
    client: Client,
    /// Endpoint override, empty for the public site
    endpoint: String,
    /// Track selection policy
    selection: TrackSelection,
}

impl YouTubeTranscriptSource {
    pub fn new(selection: TrackSelection) -> Self {
        Self::with_endpoint(selection, "")
    }

    /// Source that honors the requested language preference order
    pub fn preferred() -> Self {
        Self::new(TrackSelection::Preferred)
    }

    /// Source that takes whatever track exists
    pub fn any_available() -> Self {
        Self::new(TrackSelection::AnyAvailable)
    }

    /// Create a source aimed at a different base URL
    pub fn with_endpoint(selection: TrackSelection, endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
            endpoint: endpoint.into(),
            selection,
        }
    }

    fn base_url(&self) -> String {
        if self.endpoint.is_empty() {
            "https://www.youtube.com".to_string()
        } else {
            self.endpoint.trim_end_matches('/').to_string()
        }
    }

    /// List the caption tracks advertised for a video
    async fn list_tracks(&self, video_id: &str) -> Result<Vec<CaptionTrack>, ProviderError> {
        let request_url = format!("{}/api/timedtext", self.base_url());

        let response = self
            .client
            .get(&request_url)
            .query(&[("type", "list"), ("v", video_id)])
            .send()
            .await
            .map_err(classify_transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, &body));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::RequestFailed(format!("track listing body: {}", e)))?;

        Ok(parse_track_list(&body))
    }

    /// Pick the track to download, or `None` when nothing acceptable exists
    fn pick_track<'a>(
        &self,
        tracks: &'a [CaptionTrack],
        languages: &[String],
    ) -> Option<&'a CaptionTrack> {
        match self.selection {
            TrackSelection::Preferred => {
                for language in languages {
                    if let Some(track) = tracks.iter().find(|t| {
                        !t.is_auto() && language_utils::language_codes_match(&t.lang_code, language)
                    }) {
                        return Some(track);
                    }
                }
                for language in languages {
                    if let Some(track) = tracks.iter().find(|t| {
                        t.is_auto() && language_utils::language_codes_match(&t.lang_code, language)
                    }) {
                        return Some(track);
                    }
                }
                None
            }
            TrackSelection::AnyAvailable => tracks
                .iter()
                .find(|t| !t.is_auto())
                .or_else(|| tracks.iter().find(|t| t.is_auto())),
        }
    }

    /// Download and parse one caption track
    async fn download_track(
        &self,
        video_id: &str,
        track: &CaptionTrack,
    ) -> Result<Vec<TranscriptSegment>, ProviderError> {
        let request_url = format!("{}/api/timedtext", self.base_url());

        let mut query = vec![
            ("v", video_id.to_string()),
            ("lang", track.lang_code.clone()),
        ];
        if track.is_auto() {
            query.push(("kind", "asr".to_string()));
        }
        if !track.name.is_empty() {
            query.push(("name", track.name.clone()));
        }

        let response = self
            .client
            .get(&request_url)
            .query(&query)
            .send()
            .await
            .map_err(classify_transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, &body));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::RequestFailed(format!("caption track body: {}", e)))?;

        Ok(parse_timedtext(&body))
    }
}

#[async_trait]
impl TranscriptSource for YouTubeTranscriptSource {
    async fn fetch_transcript(
        &self,
        video_id: &str,
        languages: &[String],
    ) -> Result<Transcript, ProviderError> {
        let tracks = self.list_tracks(video_id).await?;
        if tracks.is_empty() {
            return Err(ProviderError::TranscriptUnavailable(format!(
                "No caption tracks for video {}",
                video_id
            )));
        }

        let track = self.pick_track(&tracks, languages).ok_or_else(|| {
            let available: Vec<&str> = tracks.iter().map(|t| t.lang_code.as_str()).collect();
            ProviderError::TranscriptUnavailable(format!(
                "No captions in [{}] for video {}; available: [{}]",
                languages.join(", "),
                video_id,
                available.join(", ")
            ))
        })?;

        let segments = self.download_track(video_id, track).await?;
        if segments.is_empty() {
            return Err(ProviderError::TranscriptUnavailable(format!(
                "Caption track {} for video {} is empty",
                track.lang_code, video_id
            )));
        }

        let origin = if track.is_auto() {
            TranscriptOrigin::Auto
        } else {
            TranscriptOrigin::Manual
        };

        info!(
            "Fetched {} {} caption segments ({}) for video {}",
            segments.len(),
            track.lang_code,
            origin,
            video_id
        );

        Ok(Transcript::new(track.lang_code.clone(), origin, segments))
    }

    fn name(&self) -> &str {
        match self.selection {
            TrackSelection::Preferred => "YouTube captions",
            TrackSelection::AnyAvailable => "YouTube captions (any language)",
        }
    }
}

/// Parse a timedtext track listing into caption tracks
fn parse_track_list(body: &str) -> Vec<CaptionTrack> {
    TRACK_TAG_REGEX
        .find_iter(body)
        .map(|tag| {
            let element = tag.as_str();
            CaptionTrack {
                lang_code: attr_value(&LANG_CODE_ATTR, element),
                name: attr_value(&NAME_ATTR, element),
                kind: attr_value(&KIND_ATTR, element),
            }
        })
        .filter(|track| !track.lang_code.is_empty())
        .collect()
}

fn attr_value(attr: &Regex, element: &str) -> String {
    attr.captures(element)
        .and_then(|caps| caps.get(1))
        .map(|m| unescape_xml(m.as_str()))
        .unwrap_or_default()
}

/// Parse a timedtext transcript body into timed segments.
///
/// Segments whose text is empty after unescaping are dropped; the
/// endpoint emits them for silences.
fn parse_timedtext(body: &str) -> Vec<TranscriptSegment> {
    TEXT_TAG_REGEX
        .captures_iter(body)
        .filter_map(|caps| {
            let start = caps.get(1)?.as_str().parse::<f64>().ok()?;
            let duration = caps
                .get(2)
                .and_then(|m| m.as_str().parse::<f64>().ok())
                .unwrap_or(0.0);

            let raw = caps.get(3)?.as_str();
            let text = unescape_xml(&INNER_TAG_REGEX.replace_all(raw, " "));
            let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
            if text.is_empty() {
                return None;
            }

            Some(TranscriptSegment::new(text, start, duration))
        })
        .collect()
}

/// Resolve decimal character references and the named entities the
/// timedtext endpoint actually emits
fn unescape_xml(text: &str) -> String {
    let text = NUMERIC_ENTITY_REGEX.replace_all(text, |caps: &regex::Captures<'_>| {
        caps[1]
            .parse::<u32>()
            .ok()
            .and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_default()
    });

    text.replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
