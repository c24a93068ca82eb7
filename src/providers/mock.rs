/*!
 * Mock provider implementations for testing.
 *
 * One mock stands in for all three provider roles and simulates
 * different behaviors:
 * - `MockProvider::working()` - Always succeeds with canned data
 * - `MockProvider::failing(kind)` - Always fails with a chosen error kind
 * - `MockProvider::intermittent(n)` - Fails every nth request
 * - `MockProvider::slow(ms)` - Succeeds after a delay (for timeout testing)
 * - `MockProvider::flaky(rate)` - Fails at random with the given probability
 * - `MockProvider::empty()` - Succeeds with empty content
 */

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::errors::ProviderError;
use crate::providers::{
    MetadataProvider, SummaryRequest, Summarizer, TranscriptSource, VideoMetadata,
};
use crate::summarize::{Framework, SummaryPayload};
use crate::transcript::{Transcript, TranscriptOrigin, TranscriptSegment};
use crate::url_utils;

/// Which error kind a failing mock produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockErrorKind {
    /// Video removed or nonexistent
    VideoUnavailable,
    /// Video exists but is not public
    VideoPrivate,
    /// Rate limit exhausted
    RateLimited,
    /// Credentials rejected
    AuthFailed,
    /// No captions in any acceptable language
    NoTranscript,
    /// Retryable 503 from the backing service
    ServerError,
    /// Transport-level connection failure
    ConnectionFailed,
}

impl MockErrorKind {
    /// Materialize the error this kind stands for
    pub fn to_error(self) -> ProviderError {
        match self {
            Self::VideoUnavailable => {
                ProviderError::VideoUnavailable("Simulated removed video".to_string())
            }
            Self::VideoPrivate => ProviderError::VideoPrivate("Simulated private video".to_string()),
            Self::RateLimited => {
                ProviderError::RateLimitExceeded("Simulated rate limit".to_string())
            }
            Self::AuthFailed => {
                ProviderError::AuthenticationError("Simulated bad credentials".to_string())
            }
            Self::NoTranscript => {
                ProviderError::TranscriptUnavailable("Simulated missing captions".to_string())
            }
            Self::ServerError => ProviderError::ApiError {
                status_code: 503,
                message: "Simulated provider failure".to_string(),
            },
            Self::ConnectionFailed => {
                ProviderError::ConnectionError("Simulated connection failure".to_string())
            }
        }
    }
}

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with canned data
    Working,
    /// Always fails with the given error kind
    Failing(MockErrorKind),
    /// Fails intermittently (every Nth request)
    Intermittent { fail_every: usize },
    /// Simulates slow response (for timeout testing)
    Slow { delay_ms: u64 },
    /// Fails at random with the given probability
    Flaky { failure_rate: f32 },
    /// Succeeds with empty content
    Empty,
}

/// Mock provider standing in for metadata, transcript, and summary roles
#[derive(Debug)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter, shared across clones
    request_count: Arc<AtomicUsize>,
    /// Transcript returned instead of the canned one
    transcript_override: Option<Transcript>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            transcript_override: None,
        }
    }

    /// Create a working mock provider that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a failing mock provider with a chosen error kind
    pub fn failing(kind: MockErrorKind) -> Self {
        Self::new(MockBehavior::Failing(kind))
    }

    /// Create an intermittently failing mock provider
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every })
    }

    /// Create a mock that succeeds after a delay
    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Create a mock that fails at random with the given probability
    pub fn flaky(failure_rate: f32) -> Self {
        Self::new(MockBehavior::Flaky { failure_rate })
    }

    /// Create a mock that returns empty content
    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Serve this transcript instead of the canned one
    pub fn with_transcript(mut self, transcript: Transcript) -> Self {
        self.transcript_override = Some(transcript);
        self
    }

    /// How many calls this mock (and its clones) have received
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Count the call and run the configured behavior gate
    async fn apply_behavior(&self) -> Result<(), ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);

        match self.behavior {
            MockBehavior::Working | MockBehavior::Empty => Ok(()),
            MockBehavior::Failing(kind) => Err(kind.to_error()),
            MockBehavior::Intermittent { fail_every } => {
                if fail_every > 0 && count % fail_every == fail_every - 1 {
                    Err(ProviderError::ApiError {
                        status_code: 503,
                        message: format!("Simulated intermittent failure (request #{})", count + 1),
                    })
                } else {
                    Ok(())
                }
            }
            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                Ok(())
            }
            MockBehavior::Flaky { failure_rate } => {
                if rand::random::<f32>() < failure_rate {
                    Err(MockErrorKind::ServerError.to_error())
                } else {
                    Ok(())
                }
            }
        }
    }

    fn canned_transcript() -> Transcript {
        Transcript::new(
            "en",
            TranscriptOrigin::Manual,
            vec![
                TranscriptSegment::new("Welcome to the mock video", 0.0, 3.0),
                TranscriptSegment::new("where captions are deterministic", 3.0, 3.0),
                TranscriptSegment::new("and nothing ever buffers", 6.0, 2.5),
            ],
        )
    }
}

impl Clone for MockProvider {
    fn clone(&self) -> Self {
        Self {
            behavior: self.behavior,
            request_count: Arc::clone(&self.request_count),
            transcript_override: self.transcript_override.clone(),
        }
    }
}

#[async_trait]
impl MetadataProvider for MockProvider {
    async fn fetch_metadata(&self, video_id: &str) -> Result<VideoMetadata, ProviderError> {
        self.apply_behavior().await?;

        Ok(VideoMetadata {
            video_id: video_id.to_string(),
            title: format!("Mock video {}", video_id),
            channel: "Mock channel".to_string(),
            url: url_utils::watch_url(video_id),
            published_at: None,
            duration_sec: Some(545),
            thumbnail_url: None,
        })
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[async_trait]
impl TranscriptSource for MockProvider {
    async fn fetch_transcript(
        &self,
        _video_id: &str,
        languages: &[String],
    ) -> Result<Transcript, ProviderError> {
        self.apply_behavior().await?;

        if matches!(self.behavior, MockBehavior::Empty) {
            return Ok(Transcript::new(
                languages.first().map(String::as_str).unwrap_or("en"),
                TranscriptOrigin::Manual,
                Vec::new(),
            ));
        }

        Ok(self
            .transcript_override
            .clone()
            .unwrap_or_else(Self::canned_transcript))
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[async_trait]
impl Summarizer for MockProvider {
    async fn summarize(
        &self,
        request: &SummaryRequest<'_>,
    ) -> Result<SummaryPayload, ProviderError> {
        self.apply_behavior().await?;

        if matches!(self.behavior, MockBehavior::Empty) {
            return Ok(SummaryPayload::default());
        }

        Ok(SummaryPayload {
            summary: format!(
                "Mock summary of section {} of {}",
                request.position, request.total_chunks
            ),
            key_insights: vec![format!("Insight from section {}", request.position)],
            frameworks: vec![Framework {
                name: "Mock Framework".to_string(),
                description: "A framework that exists only in tests".to_string(),
                steps: vec!["Observe".to_string(), "Assert".to_string()],
            }],
            key_moments: vec![format!(
                "[{}s] Section {} begins",
                request.chunk.start_time, request.position
            )],
        })
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        self.apply_behavior().await
    }

    fn name(&self) -> &str {
        "mock"
    }
}
