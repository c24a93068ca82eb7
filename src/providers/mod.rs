/*!
 * Provider implementations for external collaborators.
 *
 * This module contains the trait boundaries the pipeline talks through
 * and the concrete clients behind them:
 * - YouTube: metadata via oEmbed, captions via the timedtext endpoint
 * - OpenAI: chat-completions summarization client
 * - Anthropic: messages-API summarization client
 * - Mock: scriptable in-process providers for tests
 */

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::errors::ProviderError;
use crate::summarize::SummaryPayload;
use crate::transcript::{Transcript, TranscriptChunk};

/// Classify a transport-level request failure
pub(crate) fn classify_transport(error: reqwest::Error) -> ProviderError {
    if error.is_timeout() || error.is_connect() {
        ProviderError::ConnectionError(error.to_string())
    } else {
        ProviderError::RequestFailed(error.to_string())
    }
}

/// Parse a model reply into a summary payload.
///
/// Models wrap JSON in code fences or lead-in prose often enough that the
/// parser peels both off before deserializing. Anything that still is not
/// the requested JSON shape is a parse error, not a silent empty summary.
pub(crate) fn parse_summary_payload(content: &str) -> Result<SummaryPayload, ProviderError> {
    let text = strip_code_fences(content);

    // Tolerate prose around the JSON object
    let candidate = match (text.find('{'), text.rfind('}')) {
        (Some(open), Some(close)) if open < close => &text[open..=close],
        _ => {
            return Err(ProviderError::ParseError(format!(
                "no JSON object in model reply: {}",
                reply_snippet(content)
            )));
        }
    };

    serde_json::from_str::<SummaryPayload>(candidate).map_err(|e| {
        ProviderError::ParseError(format!(
            "summary payload: {} in reply: {}",
            e,
            reply_snippet(candidate)
        ))
    })
}

/// Remove a surrounding markdown code fence, if present
fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Skip the language tag on the opening fence line
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };

    body.strip_suffix("```").unwrap_or(body).trim()
}

/// First 160 characters of a reply, for error messages
fn reply_snippet(content: &str) -> String {
    content.chars().take(160).collect()
}

pub mod anthropic;
pub mod mock;
pub mod openai;
pub mod youtube;

/// Basic information about a video, resolved before any transcript work
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoMetadata {
    /// Canonical video id
    pub video_id: String,

    /// Video title
    pub title: String,

    /// Channel or uploader name
    pub channel: String,

    /// Canonical watch URL
    pub url: String,

    /// Publication timestamp, when the source exposes one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,

    /// Duration in seconds, when the source exposes one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_sec: Option<u64>,

    /// Thumbnail URL, when the source exposes one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
}

/// One chunk-summarization call: the chunk plus everything the prompt
/// needs to situate it within the whole video
#[derive(Debug, Clone)]
pub struct SummaryRequest<'a> {
    /// The chunk to summarize
    pub chunk: &'a TranscriptChunk,

    /// 1-based position of this chunk
    pub position: usize,

    /// Total number of chunks in the transcript
    pub total_chunks: usize,

    /// Title of the video, for prompt context
    pub video_title: &'a str,

    /// Sampling temperature
    pub temperature: f32,

    /// Output token cap
    pub max_tokens: u32,
}

impl SummaryRequest<'_> {
    /// Whether this chunk closes the transcript
    pub fn is_final(&self) -> bool {
        self.position == self.total_chunks
    }
}

/// Resolves video metadata from a video id
#[async_trait]
pub trait MetadataProvider: Send + Sync + Debug {
    /// Fetch metadata for `video_id`
    async fn fetch_metadata(&self, video_id: &str) -> Result<VideoMetadata, ProviderError>;

    /// Short name for logging
    fn name(&self) -> &str;
}

/// One strategy for obtaining a transcript. The acquisition chain tries
/// sources in order; from the pipeline's view the chain is one fallible
/// call.
#[async_trait]
pub trait TranscriptSource: Send + Sync + Debug {
    /// Fetch a transcript for `video_id`, honoring `languages` preference
    /// order where the source supports it
    async fn fetch_transcript(
        &self,
        video_id: &str,
        languages: &[String],
    ) -> Result<Transcript, ProviderError>;

    /// Short name for logging
    fn name(&self) -> &str;
}

/// Produces a structured summary for one transcript chunk
#[async_trait]
pub trait Summarizer: Send + Sync + Debug {
    /// Summarize one chunk
    async fn summarize(&self, request: &SummaryRequest<'_>)
        -> Result<SummaryPayload, ProviderError>;

    /// Test the connection to the backing service
    async fn test_connection(&self) -> Result<(), ProviderError>;

    /// Short name for logging
    fn name(&self) -> &str;
}
