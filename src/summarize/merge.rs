/*!
 * Deterministic merging of per-chunk summaries.
 *
 * Chunk summaries arrive in completion order, which varies run to run;
 * the merger sorts them by chunk index first so the same set of inputs
 * always produces the same output.
 */

use std::collections::HashSet;

use log::debug;

use crate::summarize::{AggregatedSummary, ChunkSummary, Framework};

/// Merged insight lists are capped at this many entries
const MAX_INSIGHTS: usize = 12;

/// Combines N chunk summaries into one aggregated summary.
#[derive(Debug, Clone, Copy, Default)]
pub struct SummaryMerger;

impl SummaryMerger {
    pub fn new() -> Self {
        Self
    }

    /// Merge chunk summaries into a single summary in `language`.
    ///
    /// A single summary passes through unchanged. With more than one, the
    /// narrative is the first chunk's summary plus a section-count note,
    /// insights are deduplicated in first-occurrence order and capped,
    /// frameworks are deduplicated by name (first occurrence wins), and
    /// moments are deduplicated without a cap. Empty input merges to
    /// nothing.
    pub fn merge(
        &self,
        language: &str,
        mut summaries: Vec<ChunkSummary>,
    ) -> Option<AggregatedSummary> {
        if summaries.is_empty() {
            return None;
        }

        // Completion order is nondeterministic; merge order must not be
        summaries.sort_by_key(|s| s.chunk_index);

        if summaries.len() == 1 {
            let only = summaries.remove(0);
            return Some(AggregatedSummary {
                language: language.to_string(),
                summary: only.summary,
                key_insights: only.key_insights,
                frameworks: only.frameworks,
                key_moments: only.key_moments,
                chunk_count: 1,
            });
        }

        let chunk_count = summaries.len();
        debug!("Merging {} chunk summaries", chunk_count);

        let narrative = format!(
            "{}\n\nNote: this analysis covers {} sections of the video.",
            summaries[0].summary.trim_end(),
            chunk_count
        );

        let mut key_insights =
            dedup_strings(summaries.iter_mut().flat_map(|s| s.key_insights.drain(..)));
        key_insights.truncate(MAX_INSIGHTS);

        let frameworks = dedup_frameworks(summaries.iter_mut().flat_map(|s| s.frameworks.drain(..)));

        let key_moments =
            dedup_strings(summaries.iter_mut().flat_map(|s| s.key_moments.drain(..)));

        Some(AggregatedSummary {
            language: language.to_string(),
            summary: narrative,
            key_insights,
            frameworks,
            key_moments,
            chunk_count,
        })
    }
}

/// Drop exact duplicates, keeping first occurrence order
fn dedup_strings(items: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut unique = Vec::new();

    for item in items {
        if seen.insert(item.clone()) {
            unique.push(item);
        }
    }

    unique
}

/// Drop frameworks whose name was already seen; the first occurrence keeps
/// its own description and steps
fn dedup_frameworks(items: impl IntoIterator<Item = Framework>) -> Vec<Framework> {
    let mut seen = HashSet::new();
    let mut unique = Vec::new();

    for framework in items {
        if seen.insert(framework.name.clone()) {
            unique.push(framework);
        }
    }

    unique
}
