/*!
 * Structured summarization of chunked transcripts.
 *
 * This module turns transcript chunks into one aggregated summary:
 *
 * - `prompt`: Per-language prompt builders with chunk-position context
 * - `service`: Concurrent per-chunk summarization with retries
 * - `merge`: Deterministic combination of per-chunk summaries
 */

// Re-export main types for easier usage
pub use self::merge::SummaryMerger;
pub use self::prompt::SummaryPromptBuilder;
pub use self::service::BatchSummarizer;

// Submodules
pub mod merge;
pub mod prompt;
pub mod service;

use serde::{Deserialize, Serialize};

use crate::transcript::TranscriptChunk;

/// A named method or framework extracted from the content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Framework {
    /// Name of the framework or method
    pub name: String,

    /// What the framework does
    #[serde(default)]
    pub description: String,

    /// Step-by-step breakdown
    #[serde(default)]
    pub steps: Vec<String>,
}

/// Parsed body of a single summarization reply.
///
/// This is the JSON shape providers ask the model for; every list is
/// optional in the reply and defaults to empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SummaryPayload {
    /// Narrative summary, a few paragraphs
    #[serde(default)]
    pub summary: String,

    /// Most important insights
    #[serde(default)]
    pub key_insights: Vec<String>,

    /// Frameworks or methods mentioned
    #[serde(default)]
    pub frameworks: Vec<Framework>,

    /// Chronological sequence of notable moments
    #[serde(default)]
    pub key_moments: Vec<String>,
}

/// Summary of one transcript chunk, carrying its position so results can
/// be merged deterministically whatever order they arrive in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkSummary {
    /// Position of the source chunk within the transcript
    pub chunk_index: usize,

    /// Start of the covered time range, in seconds
    pub start_time: f64,

    /// End of the covered time range, in seconds
    pub end_time: f64,

    /// Narrative summary of this chunk
    pub summary: String,

    /// Insights from this chunk
    pub key_insights: Vec<String>,

    /// Frameworks mentioned in this chunk
    pub frameworks: Vec<Framework>,

    /// Notable moments in this chunk
    pub key_moments: Vec<String>,

    /// Whether this chunk closes the transcript
    pub is_final_chunk: bool,
}

impl ChunkSummary {
    /// Attach chunk provenance to a parsed reply
    pub fn from_payload(payload: SummaryPayload, chunk: &TranscriptChunk, is_final: bool) -> Self {
        Self {
            chunk_index: chunk.index,
            start_time: chunk.start_time,
            end_time: chunk.end_time,
            summary: payload.summary,
            key_insights: payload.key_insights,
            frameworks: payload.frameworks,
            key_moments: payload.key_moments,
            is_final_chunk: is_final,
        }
    }
}

/// Deduplicated combination of every successfully summarized chunk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatedSummary {
    /// Language the summary was generated in
    pub language: String,

    /// Narrative summary
    pub summary: String,

    /// Deduplicated insights, first occurrence order, capped
    pub key_insights: Vec<String>,

    /// Frameworks deduplicated by name, first occurrence wins
    pub frameworks: Vec<Framework>,

    /// Deduplicated chronological moments
    pub key_moments: Vec<String>,

    /// How many chunk summaries were merged
    pub chunk_count: usize,
}
