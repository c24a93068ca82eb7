/*!
 * Token-budgeted transcript chunking.
 *
 * Long transcripts are split into ordered chunks that each fit a model's
 * context budget. Segments are atomic: a chunk boundary always falls
 * between two segments, never inside one, so a single oversized segment
 * still occupies one chunk alone.
 */

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::language_utils;
use crate::transcript::{segments_to_text, Transcript, TranscriptSegment};

/// Fixed overhead added to every non-empty estimate, covering punctuation
/// and prompt framing
const TOKEN_OVERHEAD: usize = 10;

/// Estimate how many model tokens `text` costs in `language`.
///
/// Heuristic, never exact: whitespace word count times a per-language
/// multiplier (see [`language_utils::token_multiplier`]), truncated, plus
/// a fixed overhead. Empty text costs nothing.
pub fn estimate_tokens(text: &str, language: &str) -> usize {
    if text.is_empty() {
        return 0;
    }

    let words = text.split_whitespace().count();
    let multiplier = language_utils::token_multiplier(language);
    let estimated = (words as f32 * multiplier) as usize + TOKEN_OVERHEAD;

    estimated.max(1)
}

/// Sum of per-segment estimates; what the greedy accumulator works with
pub fn estimate_segment_tokens(segments: &[TranscriptSegment], language: &str) -> usize {
    segments
        .iter()
        .map(|s| estimate_tokens(s.text.trim(), language))
        .sum()
}

/// Budgets for a single chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Maximum estimated tokens per chunk
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    /// Maximum characters of joined text per chunk
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
}

fn default_max_tokens() -> usize {
    2000
}

fn default_max_chars() -> usize {
    8000
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_tokens: default_max_tokens(),
            max_chars: default_max_chars(),
        }
    }
}

impl ChunkingConfig {
    /// Larger chunks for models with roomy contexts
    pub fn coarse() -> Self {
        Self {
            max_tokens: 4000,
            max_chars: 16000,
        }
    }

    /// Smaller chunks for tight contexts
    pub fn fine() -> Self {
        Self {
            max_tokens: 1000,
            max_chars: 4000,
        }
    }
}

/// One contiguous run of segments prepared for independent summarization
#[derive(Debug, Clone)]
pub struct TranscriptChunk {
    /// 0-based position within the transcript's chunk sequence
    pub index: usize,

    /// Segment texts joined by single spaces
    pub text: String,

    /// The segments this chunk covers, in transcript order
    pub segments: Vec<TranscriptSegment>,

    /// Start time of the first segment, in seconds
    pub start_time: f64,

    /// End time of the last segment, in seconds
    pub end_time: f64,

    /// Estimated tokens of the joined text
    pub token_count: usize,

    /// Characters of the joined text
    pub char_count: usize,

    /// Language the estimate was made for
    pub language: String,
}

/// Splits transcripts into chunks within the configured budgets.
///
/// Chunks are contiguous, non-overlapping, and ordered; concatenating
/// their segment lists reproduces the input segment sequence exactly.
#[derive(Debug, Clone, Default)]
pub struct TranscriptChunker {
    config: ChunkingConfig,
}

impl TranscriptChunker {
    pub fn new(config: ChunkingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ChunkingConfig {
        &self.config
    }

    /// Split `transcript` into budget-respecting chunks.
    ///
    /// A transcript whose whole text fits `max_tokens` comes back as a
    /// single chunk; an empty transcript as no chunks at all.
    pub fn chunk(&self, transcript: &Transcript) -> Vec<TranscriptChunk> {
        if transcript.segments.is_empty() {
            return Vec::new();
        }

        let language = transcript.language.as_str();
        let full_text = transcript.full_text();
        let total_tokens = estimate_tokens(&full_text, language);
        debug!(
            "Chunking {} segments, estimated {} tokens total",
            transcript.segments.len(),
            total_tokens
        );

        if total_tokens <= self.config.max_tokens {
            return vec![build_chunk(transcript.segments.clone(), 0, language)];
        }

        let chunks = self.accumulate(transcript, language);
        info!(
            "Split transcript into {} chunks (max {} tokens each)",
            chunks.len(),
            self.config.max_tokens
        );
        chunks
    }

    /// Greedy accumulation: a segment joins the current chunk unless doing
    /// so would push it past either budget, in which case the segment
    /// starts the next chunk instead.
    fn accumulate(&self, transcript: &Transcript, language: &str) -> Vec<TranscriptChunk> {
        let mut chunks: Vec<TranscriptChunk> = Vec::new();
        let mut current: Vec<TranscriptSegment> = Vec::new();
        let mut current_tokens = 0usize;
        let mut current_chars = 0usize;
        let mut has_text = false;

        for segment in &transcript.segments {
            let text = segment.text.trim();
            if text.is_empty() {
                // Whitespace-only segments ride along without costing budget
                current.push(segment.clone());
                continue;
            }

            let segment_tokens = estimate_tokens(text, language);
            let text_chars = text.chars().count();
            let joined_chars = if has_text {
                // +1 for the joining space
                current_chars + 1 + text_chars
            } else {
                text_chars
            };

            let over_budget = current_tokens + segment_tokens > self.config.max_tokens
                || joined_chars > self.config.max_chars;

            if has_text && over_budget {
                chunks.push(build_chunk(
                    std::mem::take(&mut current),
                    chunks.len(),
                    language,
                ));
                current_tokens = segment_tokens;
                current_chars = text_chars;
            } else {
                current_tokens += segment_tokens;
                current_chars = joined_chars;
            }

            current.push(segment.clone());
            has_text = true;
        }

        if !current.is_empty() {
            chunks.push(build_chunk(current, chunks.len(), language));
        }

        chunks
    }
}

fn build_chunk(segments: Vec<TranscriptSegment>, index: usize, language: &str) -> TranscriptChunk {
    let text = segments_to_text(&segments);
    let token_count = estimate_tokens(&text, language);
    let char_count = text.chars().count();
    let start_time = segments.first().map(|s| s.start).unwrap_or(0.0);
    let end_time = segments.last().map(|s| s.end()).unwrap_or(0.0);

    TranscriptChunk {
        index,
        text,
        segments,
        start_time,
        end_time,
        token_count,
        char_count,
        language: language.to_string(),
    }
}

/// Aggregate view over a chunk sequence, used by logs and benchmarks
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChunkStats {
    pub total_chunks: usize,
    pub total_tokens: usize,
    pub total_chars: usize,
    pub avg_tokens_per_chunk: usize,
    pub avg_chars_per_chunk: usize,
    pub duration_seconds: f64,
}

impl ChunkStats {
    pub fn from_chunks(chunks: &[TranscriptChunk]) -> Self {
        let (first, last) = match (chunks.first(), chunks.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Self::default(),
        };

        let total_tokens: usize = chunks.iter().map(|c| c.token_count).sum();
        let total_chars: usize = chunks.iter().map(|c| c.char_count).sum();

        Self {
            total_chunks: chunks.len(),
            total_tokens,
            total_chars,
            avg_tokens_per_chunk: total_tokens / chunks.len(),
            avg_chars_per_chunk: total_chars / chunks.len(),
            duration_seconds: last.end_time - first.start_time,
        }
    }
}
