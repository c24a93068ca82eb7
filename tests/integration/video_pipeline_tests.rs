/*!
 * Single-video pipeline tests covering multi-chunk summarization and
 * the transcript acquisition chain.
 */

use std::sync::Arc;
use std::time::Duration;

use tldw::pipeline::{AnalysisOptions, VideoPipeline, VideoTask};
use tldw::providers::mock::{MockErrorKind, MockProvider};
use tldw::retry::RetryPolicy;
use tldw::summarize::service::BatchSummarizer;
use tldw::transcript::{
    ChunkingConfig, TranscriptAcquirer, TranscriptChunker, TranscriptOrigin,
};

use crate::common::{long_transcript, VIDEO_URL};

fn pipeline_with_acquirer(acquirer: TranscriptAcquirer, chunking: ChunkingConfig) -> VideoPipeline {
    VideoPipeline::new(
        Arc::new(MockProvider::working()),
        Arc::new(acquirer),
        TranscriptChunker::new(chunking),
        BatchSummarizer::new(Arc::new(MockProvider::working()), 4, RetryPolicy::no_retry()),
    )
}

fn task() -> VideoTask {
    VideoTask::new(VIDEO_URL, AnalysisOptions::default())
}

#[tokio::test]
async fn test_process_withLongTranscript_shouldMergeMultipleChunks() {
    let transcripts =
        MockProvider::working().with_transcript(long_transcript(25, 30));
    let acquirer = TranscriptAcquirer::new(Arc::new(transcripts), None, Duration::from_secs(60));
    let pipeline = pipeline_with_acquirer(
        acquirer,
        ChunkingConfig {
            max_tokens: 120,
            max_chars: 100_000,
        },
    );

    let result = pipeline.process(&task()).await;

    assert!(result.is_ok());
    let summary = result.summary.expect("multi-chunk summary expected");
    assert!(summary.chunk_count > 1);
    assert!(summary
        .summary
        .contains(&format!("covers {} sections", summary.chunk_count)));
    // Insights from different chunks survived the merge, capped at twelve
    assert!(summary.key_insights.len() > 1);
    assert!(summary.key_insights.len() <= 12);
    // No chunk failed, so the result carries no degradation note
    assert!(result.note.is_none());

    let info = result.transcript.unwrap();
    assert_eq!(info.segment_count, 25);
    assert_eq!(info.word_count, 25 * 30);
}

#[tokio::test]
async fn test_process_withPrimaryLackingCaptions_shouldUseFallback() {
    let fallback = MockProvider::working();
    let fallback_watcher = fallback.clone();
    let acquirer = TranscriptAcquirer::new(
        Arc::new(MockProvider::failing(MockErrorKind::NoTranscript)),
        Some(Arc::new(fallback)),
        Duration::from_secs(60),
    );
    let pipeline = pipeline_with_acquirer(acquirer, ChunkingConfig::default());

    let result = pipeline.process(&task()).await;

    assert!(result.is_ok());
    assert!(result.summary.is_some());
    let info = result.transcript.unwrap();
    assert_eq!(info.origin, Some(TranscriptOrigin::Fallback));
    assert_eq!(fallback_watcher.request_count(), 1);
}

#[tokio::test]
async fn test_process_withRateLimitedTranscript_shouldNotConsultFallback() {
    let fallback = MockProvider::working();
    let fallback_watcher = fallback.clone();
    let acquirer = TranscriptAcquirer::new(
        Arc::new(MockProvider::failing(MockErrorKind::RateLimited)),
        Some(Arc::new(fallback)),
        Duration::from_secs(60),
    );
    let pipeline = pipeline_with_acquirer(acquirer, ChunkingConfig::default());

    let result = pipeline.process(&task()).await;

    // A rate limit hits every source alike; the chain gives up instead of
    // hammering the fallback, and the item degrades to metadata only
    assert!(result.is_ok());
    assert!(result.summary.is_none());
    assert_eq!(fallback_watcher.request_count(), 0);
    assert!(result.transcript.unwrap().unavailable_reason.is_some());
}

#[tokio::test]
async fn test_process_repeatedVideo_shouldServeTranscriptFromCache() {
    let transcripts = MockProvider::working();
    let transcripts_watcher = transcripts.clone();
    let acquirer = TranscriptAcquirer::new(Arc::new(transcripts), None, Duration::from_secs(60));
    let pipeline = pipeline_with_acquirer(acquirer, ChunkingConfig::default());

    let first = pipeline.process(&task()).await;
    let second = pipeline.process(&task()).await;

    assert!(first.is_ok());
    assert!(second.is_ok());
    assert!(second.summary.is_some());
    // One fetch served both invocations
    assert_eq!(transcripts_watcher.request_count(), 1);
}

#[tokio::test]
async fn test_process_withEmptyTranscript_shouldCompleteWithoutSummary() {
    let acquirer = TranscriptAcquirer::new(
        Arc::new(MockProvider::empty()),
        None,
        Duration::from_secs(60),
    );
    let pipeline = pipeline_with_acquirer(acquirer, ChunkingConfig::default());

    let result = pipeline.process(&task()).await;

    assert!(result.is_ok());
    assert!(result.summary.is_none());
    assert_eq!(
        result.note.as_deref(),
        Some("transcript produced no summarizable chunks")
    );
}
