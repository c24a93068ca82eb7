/*!
 * Batch processing and job orchestration.
 *
 * This module drives items through the summarization pipeline:
 *
 * - `video`: Staged processing of a single video
 * - `batch`: Concurrent fan-out over a batch with ordering and timeouts
 * - `jobs`: Cancellable background jobs with a pollable registry
 */

// Re-export main types for easier usage
pub use self::batch::{BatchOptions, BatchScheduler};
pub use self::jobs::{JobCounts, JobRecord, JobRegistry, JobState};
pub use self::video::VideoPipeline;

// Submodules
pub mod batch;
pub mod jobs;
pub mod video;

use std::time::Instant;

use serde::Serialize;
use uuid::Uuid;

use crate::errors::{ErrorCode, ErrorInfo};
use crate::providers::VideoMetadata;
use crate::summarize::AggregatedSummary;
use crate::transcript::TranscriptInfo;

/// First eight hex digits of an id, the form used in log lines
pub(crate) fn short_id(id: &Uuid) -> String {
    id.to_string().chars().take(8).collect()
}

/// One item submitted for processing. Immutable once built.
#[derive(Debug, Clone)]
pub struct VideoTask {
    /// URL or bare video id identifying the item
    pub source: String,

    /// Per-task processing options
    pub options: AnalysisOptions,
}

impl VideoTask {
    pub fn new(source: impl Into<String>, options: AnalysisOptions) -> Self {
        Self {
            source: source.into(),
            options,
        }
    }
}

/// Options a task carries through the pipeline. Defaults come from the
/// application config; callers may override per task.
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    /// Transcript language preference order
    pub languages: Vec<String>,

    /// Sampling temperature for summarization, 0.0 to 2.0
    pub temperature: f32,

    /// Output token cap per chunk summary
    pub max_summary_tokens: u32,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            languages: vec!["en".to_string(), "es".to_string()],
            temperature: 0.3,
            max_summary_tokens: 1500,
        }
    }
}

impl AnalysisOptions {
    /// Check option ranges before a task enters the pipeline
    pub fn validate(&self) -> Result<(), ErrorInfo> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ErrorInfo::new(
                ErrorCode::InvalidSource,
                format!("temperature {} outside 0.0..=2.0", self.temperature),
            ));
        }
        if self.languages.is_empty() {
            return Err(ErrorInfo::new(
                ErrorCode::InvalidSource,
                "at least one transcript language is required",
            ));
        }
        Ok(())
    }
}

/// Item completion status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
    Ok,
    Error,
}

/// Per-stage timing breakdown for one item.
///
/// Owned by the pipeline invocation that creates it; read-only once the
/// invocation completes. `complete()` runs on every exit path.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessingStats {
    /// Metadata fetch duration, absent if the stage never ran
    pub metadata_fetch_ms: Option<u64>,

    /// Transcript acquisition duration
    pub transcript_fetch_ms: Option<u64>,

    /// Chunking duration
    pub chunking_ms: Option<u64>,

    /// Summarization and merge duration
    pub summarization_ms: Option<u64>,

    /// Wall time from start to `complete()`
    pub total_ms: u64,

    #[serde(skip)]
    started: Instant,
}

impl ProcessingStats {
    /// Start the clock for one invocation
    pub fn start() -> Self {
        Self {
            metadata_fetch_ms: None,
            transcript_fetch_ms: None,
            chunking_ms: None,
            summarization_ms: None,
            total_ms: 0,
            started: Instant::now(),
        }
    }

    /// Elapsed milliseconds since the invocation started
    pub fn elapsed_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    /// Stamp the total; called once on every exit path
    pub fn complete(&mut self) {
        self.total_ms = self.elapsed_ms();
    }
}

impl Default for ProcessingStats {
    fn default() -> Self {
        Self::start()
    }
}

/// Terminal outcome for one item. Immutable once produced.
#[derive(Debug, Clone, Serialize)]
pub struct VideoResult {
    /// The source identifier the task was submitted with
    pub source: String,

    /// Resolved video id, absent when resolution failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,

    /// Whether the item completed
    pub status: ResultStatus,

    /// Video metadata, present when stage 2 succeeded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<VideoMetadata>,

    /// Transcript provenance or the reason none was available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript: Option<TranscriptInfo>,

    /// Merged summary; absent when no transcript or no chunk succeeded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<AggregatedSummary>,

    /// Failure details when status is `error`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,

    /// Diagnostic note for degraded-but-ok items
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,

    /// Per-stage timings
    pub stats: ProcessingStats,
}

impl VideoResult {
    /// A failed result carrying only the submission identity and the error
    pub fn failed(source: impl Into<String>, error: ErrorInfo) -> Self {
        let mut stats = ProcessingStats::start();
        stats.complete();
        Self {
            source: source.into(),
            video_id: None,
            status: ResultStatus::Error,
            metadata: None,
            transcript: None,
            summary: None,
            error: Some(error),
            note: None,
            stats,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == ResultStatus::Ok
    }

    /// The failure code, if the item failed
    pub fn error_code(&self) -> Option<ErrorCode> {
        self.error.as_ref().map(|e| e.code)
    }
}

/// Settings echoed into each batch result so consumers can tell which
/// backend produced it
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConfigEcho {
    pub provider: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Ordered results for one batch. `results[i]` corresponds to the i-th
/// submitted task, whatever order items completed in.
#[derive(Debug, Clone, Serialize)]
pub struct BatchResult {
    /// Request id, also used as the job id for async runs
    pub request_id: Uuid,

    /// Per-item results, aligned with the input order
    pub results: Vec<VideoResult>,

    /// Number of submitted items
    pub total: usize,

    /// Items that completed `ok`
    pub succeeded: usize,

    /// Items that failed
    pub failed: usize,

    /// Settings used for the run
    pub config: ConfigEcho,

    /// Wall time for the whole batch in milliseconds
    pub elapsed_ms: u64,
}

impl BatchResult {
    /// Assemble a batch result, deriving the counters from the results
    pub fn new(request_id: Uuid, results: Vec<VideoResult>, config: ConfigEcho, elapsed_ms: u64) -> Self {
        let total = results.len();
        let succeeded = results.iter().filter(|r| r.is_ok()).count();
        Self {
            request_id,
            total,
            succeeded,
            failed: total - succeeded,
            results,
            config,
            elapsed_ms,
        }
    }
}
