/*!
 * Concurrent per-chunk summarization.
 *
 * Each chunk is summarized independently with bounded concurrency and
 * per-chunk retries. Chunks that still fail after their retry budget are
 * logged and excluded; whatever succeeded is merged. Summarization is
 * best-effort by design and never fails the caller outright.
 */

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use log::{info, warn};
use tokio::sync::Semaphore;

use crate::errors::{ErrorInfo, PipelineStage};
use crate::providers::{SummaryRequest, Summarizer};
use crate::retry::RetryPolicy;
use crate::summarize::{AggregatedSummary, ChunkSummary, SummaryMerger};
use crate::transcript::TranscriptChunk;

/// What came out of summarizing one transcript's chunks
#[derive(Debug, Clone, Default)]
pub struct SummarizeOutcome {
    /// The merged summary, absent when no chunk succeeded
    pub summary: Option<AggregatedSummary>,

    /// How many chunks were submitted
    pub total_chunks: usize,

    /// How many chunks still failed after retries
    pub failed_chunks: usize,

    /// The most recently observed failure, for diagnostics
    pub last_error: Option<ErrorInfo>,
}

/// Summarizes transcript chunks concurrently and merges the results
pub struct BatchSummarizer {
    /// The provider client used for each chunk
    summarizer: Arc<dyn Summarizer>,

    /// Combines per-chunk summaries deterministically
    merger: SummaryMerger,

    /// Maximum number of in-flight provider requests
    concurrent_requests: usize,

    /// Retry budget applied to each chunk independently
    retry_policy: RetryPolicy,

    /// Pause held after each request, keeping a worker off the provider
    /// for that long before its permit frees up
    rate_limit_delay: Duration,
}

impl BatchSummarizer {
    pub fn new(
        summarizer: Arc<dyn Summarizer>,
        concurrent_requests: usize,
        retry_policy: RetryPolicy,
    ) -> Self {
        Self {
            summarizer,
            merger: SummaryMerger::new(),
            concurrent_requests: concurrent_requests.max(1),
            retry_policy,
            rate_limit_delay: Duration::ZERO,
        }
    }

    /// Pace consecutive requests by `delay_ms` milliseconds
    pub fn with_rate_limit_delay(mut self, delay_ms: u64) -> Self {
        self.rate_limit_delay = Duration::from_millis(delay_ms);
        self
    }

    /// Summarize every chunk and merge what succeeded.
    ///
    /// The merged summary is in the chunks' language. Chunk failures are
    /// counted but do not abort the rest of the batch.
    pub async fn summarize(
        &self,
        chunks: &[TranscriptChunk],
        video_title: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> SummarizeOutcome {
        if chunks.is_empty() {
            return SummarizeOutcome::default();
        }

        let total_chunks = chunks.len();
        let language = chunks[0].language.clone();
        info!(
            "Summarizing {} chunks with {} (max {} concurrent)",
            total_chunks,
            self.summarizer.name(),
            self.concurrent_requests
        );

        // Limit concurrent requests to the provider
        let semaphore = Arc::new(Semaphore::new(self.concurrent_requests));

        // Each worker owns its chunk; borrowing across the fan-out would
        // pin this future to the input slice's lifetime and it could no
        // longer run on a spawned task
        let results = stream::iter(chunks.to_vec().into_iter().enumerate())
            .map(|(position_index, chunk)| {
                let summarizer = self.summarizer.clone();
                let semaphore = semaphore.clone();
                let retry_policy = self.retry_policy;
                let rate_limit_delay = self.rate_limit_delay;

                async move {
                    let _permit = semaphore.acquire().await.unwrap();

                    let request = SummaryRequest {
                        chunk: &chunk,
                        position: position_index + 1,
                        total_chunks,
                        video_title,
                        temperature,
                        max_tokens,
                    };
                    let is_final = request.is_final();

                    let label = format!("Chunk {}/{} summary", request.position, total_chunks);
                    let result = retry_policy
                        .run_provider(&label, || summarizer.summarize(&request))
                        .await;

                    if !rate_limit_delay.is_zero() {
                        tokio::time::sleep(rate_limit_delay).await;
                    }

                    (chunk, is_final, result)
                }
            })
            .buffer_unordered(self.concurrent_requests)
            .collect::<Vec<_>>()
            .await;

        let mut chunk_summaries = Vec::with_capacity(total_chunks);
        let mut failed_chunks = 0;
        let mut last_error = None;

        for (chunk, is_final, result) in results {
            match result {
                Ok(payload) => {
                    chunk_summaries.push(ChunkSummary::from_payload(payload, &chunk, is_final));
                }
                Err(error) => {
                    warn!("Chunk {} summarization failed: {}", chunk.index, error);
                    failed_chunks += 1;
                    last_error = Some(ErrorInfo::from_provider(
                        PipelineStage::Summarization,
                        &error,
                    ));
                }
            }
        }

        if failed_chunks > 0 {
            warn!(
                "{}/{} chunks failed summarization; merging the rest",
                failed_chunks, total_chunks
            );
        }

        // Completion order is arbitrary; the merger sorts by chunk index
        SummarizeOutcome {
            summary: self.merger.merge(&language, chunk_summaries),
            total_chunks,
            failed_chunks,
            last_error,
        }
    }
}
