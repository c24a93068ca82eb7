/*!
 * Transcript acquisition and preparation.
 *
 * This module contains everything between "we have a video id" and
 * "we have summarizable chunks". It is split into several submodules:
 *
 * - `fetcher`: Cached primary/fallback transcript acquisition
 * - `chunker`: Token-budgeted splitting of transcripts into chunks
 * - `cache`: Generic TTL cache used by the fetcher
 */

// Re-export main types for easier usage
pub use self::cache::TtlCache;
pub use self::chunker::{ChunkStats, ChunkingConfig, TranscriptChunk, TranscriptChunker};
pub use self::fetcher::TranscriptAcquirer;

// Submodules
pub mod cache;
pub mod chunker;
pub mod fetcher;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::language_utils;

/// How a transcript was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptOrigin {
    /// Manually authored caption track
    Manual,

    /// Automatically generated captions
    Auto,

    /// Obtained from the fallback source after the primary failed
    Fallback,
}

impl fmt::Display for TranscriptOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranscriptOrigin::Manual => write!(f, "manual"),
            TranscriptOrigin::Auto => write!(f, "auto"),
            TranscriptOrigin::Fallback => write!(f, "fallback"),
        }
    }
}

/// Single timed caption line. Segments are atomic: the chunker never
/// splits one, whatever its size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Caption text
    pub text: String,

    /// Start time in seconds
    pub start: f64,

    /// Duration in seconds
    pub duration: f64,
}

impl TranscriptSegment {
    pub fn new(text: impl Into<String>, start: f64, duration: f64) -> Self {
        Self {
            text: text.into(),
            start,
            duration,
        }
    }

    /// End time in seconds
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

/// A full transcript in one language.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    /// ISO 639-1 language code of the caption track
    pub language: String,

    /// How the transcript was obtained
    pub origin: TranscriptOrigin,

    /// Ordered caption segments
    pub segments: Vec<TranscriptSegment>,
}

impl Transcript {
    pub fn new(
        language: impl Into<String>,
        origin: TranscriptOrigin,
        segments: Vec<TranscriptSegment>,
    ) -> Self {
        Self {
            language: language.into(),
            origin,
            segments,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Plain text of the whole transcript, segments joined by single spaces
    pub fn full_text(&self) -> String {
        segments_to_text(&self.segments)
    }

    /// Total covered time in seconds (end of the last segment)
    pub fn duration_seconds(&self) -> f64 {
        self.segments.last().map(|s| s.end()).unwrap_or(0.0)
    }

    /// Compact acquisition record for inclusion in a result
    pub fn info(&self) -> TranscriptInfo {
        let text = self.full_text();
        TranscriptInfo {
            language: Some(self.language.clone()),
            language_name: language_utils::get_language_name(&self.language).ok(),
            origin: Some(self.origin),
            segment_count: self.segments.len(),
            word_count: text.split_whitespace().count(),
            duration_seconds: self.duration_seconds(),
            unavailable_reason: None,
        }
    }
}

/// What the result reports about transcript acquisition. Either the
/// provenance of an acquired transcript, or the reason none was available.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<TranscriptOrigin>,

    pub segment_count: usize,

    pub word_count: usize,

    pub duration_seconds: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub unavailable_reason: Option<String>,
}

impl TranscriptInfo {
    /// Record for an item whose transcript could not be acquired
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            language: None,
            language_name: None,
            origin: None,
            segment_count: 0,
            word_count: 0,
            duration_seconds: 0.0,
            unavailable_reason: Some(reason.into()),
        }
    }
}

/// Join segment texts with single spaces, skipping whitespace-only segments
pub(crate) fn segments_to_text(segments: &[TranscriptSegment]) -> String {
    segments
        .iter()
        .map(|s| s.text.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
