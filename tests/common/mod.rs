/*!
 * Common test utilities for the tldw test suite
 */

use std::sync::Arc;
use std::time::Duration;

use tldw::pipeline::{
    AnalysisOptions, BatchOptions, BatchScheduler, ConfigEcho, VideoPipeline, VideoTask,
};
use tldw::providers::mock::MockProvider;
use tldw::providers::{MetadataProvider, Summarizer, TranscriptSource};
use tldw::retry::RetryPolicy;
use tldw::summarize::service::BatchSummarizer;
use tldw::transcript::{
    ChunkingConfig, Transcript, TranscriptAcquirer, TranscriptChunker, TranscriptOrigin,
    TranscriptSegment,
};

// Re-export the mock providers module
pub mod mock_providers;

/// A canonical valid watch URL for tests that only need one item
pub const VIDEO_URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

/// Build a transcript of `segments` English segments with `words_per_segment`
/// words each, timed back to back at four seconds apiece.
pub fn long_transcript(segments: usize, words_per_segment: usize) -> Transcript {
    let segment_list = (0..segments)
        .map(|i| {
            let text = (0..words_per_segment)
                .map(|w| format!("word{}x{}", i, w))
                .collect::<Vec<_>>()
                .join(" ");
            TranscriptSegment::new(text, i as f64 * 4.0, 4.0)
        })
        .collect();
    Transcript::new("en", TranscriptOrigin::Manual, segment_list)
}

/// Wire a full scheduler from explicit collaborators, the way the
/// controller does from config.
pub fn build_scheduler(
    metadata: Arc<dyn MetadataProvider>,
    transcripts: Arc<dyn TranscriptSource>,
    summarizer: Arc<dyn Summarizer>,
    chunking: ChunkingConfig,
    options: BatchOptions,
) -> Arc<BatchScheduler> {
    let acquirer = TranscriptAcquirer::new(transcripts, None, Duration::from_secs(60));
    let pipeline = VideoPipeline::new(
        metadata,
        Arc::new(acquirer),
        TranscriptChunker::new(chunking),
        BatchSummarizer::new(summarizer, 4, RetryPolicy::no_retry()),
    );
    Arc::new(BatchScheduler::new(
        Arc::new(pipeline),
        options,
        ConfigEcho::default(),
    ))
}

/// Scheduler where every collaborator is a working mock
pub fn working_scheduler(options: BatchOptions) -> Arc<BatchScheduler> {
    build_scheduler(
        Arc::new(MockProvider::working()),
        Arc::new(MockProvider::working()),
        Arc::new(MockProvider::working()),
        ChunkingConfig::default(),
        options,
    )
}

/// One task per source string, all carrying default options
pub fn tasks_for(sources: &[&str]) -> Vec<VideoTask> {
    sources
        .iter()
        .map(|s| VideoTask::new(*s, AnalysisOptions::default()))
        .collect()
}
