/*!
 * Cached transcript acquisition with a fallback chain.
 *
 * A transcript is resolved by trying the cache, then the primary source,
 * then an optional fallback source. To callers the whole chain is one
 * fallible call; which hop produced the transcript is recorded in its
 * origin tag.
 */

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};

use crate::errors::ProviderError;
use crate::providers::TranscriptSource;
use crate::transcript::{Transcript, TranscriptOrigin, TtlCache};

/// Resolves transcripts through cache -> primary -> fallback.
pub struct TranscriptAcquirer {
    /// Preferred source, usually language-restricted
    primary: Arc<dyn TranscriptSource>,

    /// Last-resort source, usually accepting any language
    fallback: Option<Arc<dyn TranscriptSource>>,

    /// Successful acquisitions, keyed by video id and language preferences
    cache: TtlCache<String, Transcript>,
}

impl TranscriptAcquirer {
    pub fn new(
        primary: Arc<dyn TranscriptSource>,
        fallback: Option<Arc<dyn TranscriptSource>>,
        ttl: Duration,
    ) -> Self {
        Self {
            primary,
            fallback,
            cache: TtlCache::new(ttl),
        }
    }

    /// Resolve a transcript for `video_id`, preferring `languages` in order.
    ///
    /// Video-level failures (removed, private, rate-limited, bad
    /// credentials) propagate unchanged; when every hop merely lacks a
    /// transcript the combined failure is reported as
    /// [`ProviderError::TranscriptUnavailable`].
    pub async fn acquire(
        &self,
        video_id: &str,
        languages: &[String],
    ) -> Result<Transcript, ProviderError> {
        let key = cache_key(video_id, languages);

        if let Some(transcript) = self.cache.get(&key) {
            debug!("Transcript for {} served from cache", video_id);
            return Ok(transcript);
        }

        // Computed outside the cache lock; a concurrent miss for the same
        // video may fetch twice and the last write wins
        let transcript = self.acquire_uncached(video_id, languages).await?;
        self.cache.set(key, transcript.clone());
        Ok(transcript)
    }

    async fn acquire_uncached(
        &self,
        video_id: &str,
        languages: &[String],
    ) -> Result<Transcript, ProviderError> {
        let primary_error = match self.primary.fetch_transcript(video_id, languages).await {
            Ok(transcript) => {
                info!(
                    "Fetched {} transcript for {} via {} ({} segments)",
                    transcript.language,
                    video_id,
                    self.primary.name(),
                    transcript.segment_count()
                );
                return Ok(transcript);
            }
            Err(error) if error.is_video_level() => return Err(error),
            Err(error) => error,
        };

        let Some(fallback) = &self.fallback else {
            return Err(ProviderError::TranscriptUnavailable(format!(
                "{} failed: {}",
                self.primary.name(),
                primary_error
            )));
        };

        warn!(
            "Transcript source {} failed for {} ({}), trying {}",
            self.primary.name(),
            video_id,
            primary_error,
            fallback.name()
        );

        match fallback.fetch_transcript(video_id, languages).await {
            Ok(mut transcript) => {
                transcript.origin = TranscriptOrigin::Fallback;
                info!(
                    "Fetched {} transcript for {} via fallback {} ({} segments)",
                    transcript.language,
                    video_id,
                    fallback.name(),
                    transcript.segment_count()
                );
                Ok(transcript)
            }
            Err(error) if error.is_video_level() => Err(error),
            Err(fallback_error) => Err(ProviderError::TranscriptUnavailable(format!(
                "{} failed: {}; {} failed: {}",
                self.primary.name(),
                primary_error,
                fallback.name(),
                fallback_error
            ))),
        }
    }

    /// Cache statistics as (hits, misses, hit_rate)
    pub fn cache_stats(&self) -> (usize, usize, f64) {
        self.cache.stats()
    }
}

fn cache_key(video_id: &str, languages: &[String]) -> String {
    format!("{}:{}", video_id, languages.join(","))
}
