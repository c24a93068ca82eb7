/*!
 * Staged processing of a single video.
 *
 * Each invocation runs the stages in order: resolve id, fetch metadata,
 * acquire transcript, chunk, summarize, merge. Only the first two stages
 * are terminal on failure; a missing transcript or failed summarization
 * degrades the result instead of failing the item. Every stage failure is
 * captured as a tagged error, never an unwound panic.
 */

use std::sync::Arc;
use std::time::Instant;

use log::{debug, info, warn};

use crate::errors::{ErrorCode, ErrorInfo, PipelineStage};
use crate::pipeline::{ProcessingStats, ResultStatus, VideoResult, VideoTask};
use crate::providers::MetadataProvider;
use crate::summarize::service::BatchSummarizer;
use crate::transcript::{ChunkStats, TranscriptAcquirer, TranscriptChunker, TranscriptInfo};
use crate::url_utils;

/// Drives one item through metadata, transcript, chunking, and
/// summarization. Cheap to share: one pipeline serves every item of a
/// batch concurrently.
pub struct VideoPipeline {
    /// Metadata lookup collaborator
    metadata: Arc<dyn MetadataProvider>,

    /// Cached transcript acquisition chain
    transcripts: Arc<TranscriptAcquirer>,

    /// Budgeted transcript splitter
    chunker: TranscriptChunker,

    /// Concurrent per-chunk summarization with retries
    summarizer: BatchSummarizer,
}

impl VideoPipeline {
    pub fn new(
        metadata: Arc<dyn MetadataProvider>,
        transcripts: Arc<TranscriptAcquirer>,
        chunker: TranscriptChunker,
        summarizer: BatchSummarizer,
    ) -> Self {
        Self {
            metadata,
            transcripts,
            chunker,
            summarizer,
        }
    }

    /// Process one task to a terminal [`VideoResult`].
    ///
    /// Never returns an error: every failure mode is folded into the
    /// result. `stats.complete()` runs on all exit paths.
    pub async fn process(&self, task: &VideoTask) -> VideoResult {
        let mut stats = ProcessingStats::start();

        if let Err(error) = task.options.validate() {
            warn!("Rejecting task {}: {}", task.source, error);
            return finish(failed_result(task, None, error), &mut stats);
        }

        // Stage 1: resolve the canonical video id
        let Some(video_id) = url_utils::extract_video_id(&task.source) else {
            let error = ErrorInfo::new(
                ErrorCode::InvalidSource,
                format!("could not resolve a video id from '{}'", task.source),
            );
            warn!("{}", error);
            return finish(failed_result(task, None, error), &mut stats);
        };
        debug!("Resolved {} -> {}", task.source, video_id);

        // Stage 2: metadata, terminal on failure
        let stage_started = Instant::now();
        let metadata = match self.metadata.fetch_metadata(&video_id).await {
            Ok(metadata) => metadata,
            Err(error) => {
                let info = ErrorInfo::from_provider(PipelineStage::Metadata, &error);
                warn!("Metadata fetch for {} failed: {}", video_id, info);
                stats.metadata_fetch_ms = Some(stage_started.elapsed().as_millis() as u64);
                return finish(failed_result(task, Some(video_id), info), &mut stats);
            }
        };
        stats.metadata_fetch_ms = Some(stage_started.elapsed().as_millis() as u64);
        info!("[{}] {} by {}", video_id, metadata.title, metadata.channel);

        // Stage 3: transcript, non-terminal on failure
        let stage_started = Instant::now();
        let transcript = match self
            .transcripts
            .acquire(&video_id, &task.options.languages)
            .await
        {
            Ok(transcript) => Some(transcript),
            Err(error) => {
                let info = ErrorInfo::from_provider(PipelineStage::Transcript, &error);
                warn!(
                    "No transcript for {}, completing with metadata only: {}",
                    video_id, info
                );
                None
            }
        };
        stats.transcript_fetch_ms = Some(stage_started.elapsed().as_millis() as u64);

        let Some(transcript) = transcript else {
            let result = VideoResult {
                source: task.source.clone(),
                video_id: Some(video_id),
                status: ResultStatus::Ok,
                metadata: Some(metadata),
                transcript: Some(TranscriptInfo::unavailable(format!(
                    "no transcript in [{}]",
                    task.options.languages.join(", ")
                ))),
                summary: None,
                error: None,
                note: Some("transcript unavailable; metadata only".to_string()),
                stats: ProcessingStats::start(),
            };
            return finish(result, &mut stats);
        };

        let transcript_info = transcript.info();

        // Stage 4: chunking
        let stage_started = Instant::now();
        let chunks = self.chunker.chunk(&transcript);
        stats.chunking_ms = Some(stage_started.elapsed().as_millis() as u64);
        debug!(
            "[{}] chunk stats: {:?}",
            video_id,
            ChunkStats::from_chunks(&chunks)
        );

        // Stage 5: summarize and merge, best-effort
        let stage_started = Instant::now();
        let outcome = self
            .summarizer
            .summarize(
                &chunks,
                &metadata.title,
                task.options.temperature,
                task.options.max_summary_tokens,
            )
            .await;
        stats.summarization_ms = Some(stage_started.elapsed().as_millis() as u64);

        let note = match (&outcome.summary, outcome.failed_chunks) {
            (Some(_), 0) => None,
            (Some(_), failed) => Some(format!(
                "{}/{} chunks failed summarization; summary covers the rest",
                failed, outcome.total_chunks
            )),
            (None, _) => Some(match &outcome.last_error {
                Some(error) => format!("summarization failed: {}", error),
                None => "transcript produced no summarizable chunks".to_string(),
            }),
        };

        let result = VideoResult {
            source: task.source.clone(),
            video_id: Some(video_id),
            status: ResultStatus::Ok,
            metadata: Some(metadata),
            transcript: Some(transcript_info),
            summary: outcome.summary,
            error: None,
            note,
            stats: ProcessingStats::start(),
        };
        finish(result, &mut stats)
    }
}

fn failed_result(task: &VideoTask, video_id: Option<String>, error: ErrorInfo) -> VideoResult {
    let mut result = VideoResult::failed(task.source.clone(), error);
    result.video_id = video_id;
    result
}

/// Stamp the invocation's stats into the result on the way out
fn finish(mut result: VideoResult, stats: &mut ProcessingStats) -> VideoResult {
    stats.complete();
    result.stats = stats.clone();
    debug!(
        "Item {} finished in {}ms ({:?})",
        result.source, result.stats.total_ms, result.status
    );
    result
}
