/*!
 * Scenario-level mock providers for the integration tests.
 *
 * The library ships a general-purpose `MockProvider` whose behavior is
 * uniform across calls. The mocks here cover what batch tests need on
 * top of that: per-video scripting and randomized latency.
 */

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng as _;

use tldw::errors::ProviderError;
use tldw::providers::mock::{MockErrorKind, MockProvider};
use tldw::providers::{MetadataProvider, SummaryRequest, Summarizer, VideoMetadata};
use tldw::summarize::SummaryPayload;

/// Metadata provider with per-video scripting: selected ids fail or
/// stall, everything else is served from canned data.
#[derive(Debug)]
pub struct ScriptedMetadataProvider {
    /// Error kind per failing video id
    failures: HashMap<String, MockErrorKind>,

    /// Delay in milliseconds per stalling video id
    delays: HashMap<String, u64>,

    /// Serves the ids with no script entry
    inner: MockProvider,
}

impl ScriptedMetadataProvider {
    pub fn new() -> Self {
        Self {
            failures: HashMap::new(),
            delays: HashMap::new(),
            inner: MockProvider::working(),
        }
    }

    /// Script `video_id` to fail with `kind`
    pub fn failing(mut self, video_id: &str, kind: MockErrorKind) -> Self {
        self.failures.insert(video_id.to_string(), kind);
        self
    }

    /// Script `video_id` to stall for `delay_ms` before answering
    pub fn stalling(mut self, video_id: &str, delay_ms: u64) -> Self {
        self.delays.insert(video_id.to_string(), delay_ms);
        self
    }
}

#[async_trait]
impl MetadataProvider for ScriptedMetadataProvider {
    async fn fetch_metadata(&self, video_id: &str) -> Result<VideoMetadata, ProviderError> {
        if let Some(delay_ms) = self.delays.get(video_id) {
            tokio::time::sleep(Duration::from_millis(*delay_ms)).await;
        }
        if let Some(kind) = self.failures.get(video_id) {
            return Err(kind.to_error());
        }
        self.inner.fetch_metadata(video_id).await
    }

    fn name(&self) -> &str {
        "scripted-mock"
    }
}

/// Summarizer that sleeps a random interval before delegating, so chunk
/// and item completion order varies run to run.
#[derive(Debug)]
pub struct JitterySummarizer {
    max_delay_ms: u64,
    inner: Arc<MockProvider>,
}

impl JitterySummarizer {
    pub fn new(max_delay_ms: u64) -> Self {
        Self {
            max_delay_ms,
            inner: Arc::new(MockProvider::working()),
        }
    }
}

#[async_trait]
impl Summarizer for JitterySummarizer {
    async fn summarize(
        &self,
        request: &SummaryRequest<'_>,
    ) -> Result<SummaryPayload, ProviderError> {
        let delay = rand::rng().random_range(0..=self.max_delay_ms);
        tokio::time::sleep(Duration::from_millis(delay)).await;
        self.inner.summarize(request).await
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        self.inner.test_connection().await
    }

    fn name(&self) -> &str {
        "jittery-mock"
    }
}
