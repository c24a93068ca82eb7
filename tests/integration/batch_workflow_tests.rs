/*!
 * End-to-end batch scheduling tests.
 *
 * These run whole batches against scripted providers and check the
 * ordering, counting, and isolation guarantees of the scheduler.
 */

use std::sync::Arc;
use std::time::{Duration, Instant};

use tldw::errors::ErrorCode;
use tldw::pipeline::BatchOptions;
use tldw::providers::mock::{MockErrorKind, MockProvider};
use tldw::transcript::ChunkingConfig;

use crate::common::mock_providers::{JitterySummarizer, ScriptedMetadataProvider};
use crate::common::{build_scheduler, long_transcript, tasks_for, working_scheduler};

#[tokio::test]
async fn test_processBatch_withOneUnavailableVideo_shouldCountTwoOkOneFailed() {
    // Three videos, two at a time; the middle one has been taken down
    let metadata = ScriptedMetadataProvider::new()
        .failing("bbbbbbbbbbb", MockErrorKind::VideoUnavailable);
    let scheduler = build_scheduler(
        Arc::new(metadata),
        Arc::new(MockProvider::working()),
        Arc::new(MockProvider::working()),
        ChunkingConfig::default(),
        BatchOptions {
            max_concurrent: 2,
            ..BatchOptions::default()
        },
    );

    let tasks = tasks_for(&[
        "https://youtu.be/aaaaaaaaaaa",
        "https://youtu.be/bbbbbbbbbbb",
        "https://youtu.be/ccccccccccc",
    ]);
    let batch = scheduler.process_batch(&tasks).await;

    assert_eq!(batch.total, 3);
    assert_eq!(batch.succeeded, 2);
    assert_eq!(batch.failed, 1);

    assert!(batch.results[0].is_ok());
    assert!(batch.results[2].is_ok());
    assert_eq!(
        batch.results[1].error_code(),
        Some(ErrorCode::VideoUnavailable)
    );
    assert_eq!(batch.results[1].video_id.as_deref(), Some("bbbbbbbbbbb"));
}

#[tokio::test]
async fn test_processBatch_withRandomizedLatency_shouldKeepInputOrder() {
    // Per-chunk jitter makes completion order differ from submission
    // order; the result slots must not
    let scheduler = build_scheduler(
        Arc::new(MockProvider::working()),
        Arc::new(MockProvider::working().with_transcript(long_transcript(24, 30))),
        Arc::new(JitterySummarizer::new(40)),
        ChunkingConfig {
            max_tokens: 120,
            max_chars: 100_000,
        },
        BatchOptions {
            max_concurrent: 4,
            ..BatchOptions::default()
        },
    );

    let sources: Vec<String> = (0..8).map(|i| format!("id{:09}", i)).collect();
    let source_refs: Vec<&str> = sources.iter().map(String::as_str).collect();
    let batch = scheduler.process_batch(&tasks_for(&source_refs)).await;

    assert_eq!(batch.results.len(), 8);
    assert_eq!(batch.failed, 0);
    for (source, result) in sources.iter().zip(&batch.results) {
        assert_eq!(&result.source, source);
        assert_eq!(result.video_id.as_deref(), Some(source.as_str()));
    }
}

#[tokio::test]
async fn test_processBatch_withOneHangingItem_shouldTimeOutOnlyThatSlot() {
    let metadata = ScriptedMetadataProvider::new().stalling("bbbbbbbbbbb", 10_000);
    let scheduler = build_scheduler(
        Arc::new(metadata),
        Arc::new(MockProvider::working()),
        Arc::new(MockProvider::working()),
        ChunkingConfig::default(),
        BatchOptions {
            max_concurrent: 3,
            timeout_per_video_secs: 1,
            ..BatchOptions::default()
        },
    );

    let started = Instant::now();
    let batch = scheduler
        .process_batch(&tasks_for(&["aaaaaaaaaaa", "bbbbbbbbbbb", "ccccccccccc"]))
        .await;

    assert_eq!(batch.succeeded, 2);
    assert_eq!(batch.failed, 1);
    assert_eq!(batch.results[1].error_code(), Some(ErrorCode::Timeout));
    assert!(batch.results[0].is_ok());
    assert!(batch.results[2].is_ok());
    // The healthy items never waited on the hung one
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_processBatch_withMixedSources_shouldResolveBareIdsAndUrls() {
    let scheduler = working_scheduler(BatchOptions::default());

    let batch = scheduler
        .process_batch(&tasks_for(&[
            "dQw4w9WgXcQ",
            "https://www.youtube.com/watch?v=jNQXAC9IVRw",
            "youtu.be/9bZkp7q19f0",
            "not a video at all",
        ]))
        .await;

    assert_eq!(batch.succeeded, 3);
    assert_eq!(batch.failed, 1);
    assert_eq!(batch.results[0].video_id.as_deref(), Some("dQw4w9WgXcQ"));
    assert_eq!(batch.results[1].video_id.as_deref(), Some("jNQXAC9IVRw"));
    assert_eq!(batch.results[2].video_id.as_deref(), Some("9bZkp7q19f0"));
    assert_eq!(
        batch.results[3].error_code(),
        Some(ErrorCode::InvalidSource)
    );
}

#[tokio::test]
async fn test_processBatch_resultJson_shouldCarryCodesNotMessages() {
    let metadata = ScriptedMetadataProvider::new()
        .failing("bbbbbbbbbbb", MockErrorKind::VideoPrivate);
    let scheduler = build_scheduler(
        Arc::new(metadata),
        Arc::new(MockProvider::working()),
        Arc::new(MockProvider::working()),
        ChunkingConfig::default(),
        BatchOptions::default(),
    );

    let batch = scheduler.process_batch(&tasks_for(&["bbbbbbbbbbb"])).await;
    let json = serde_json::to_value(&batch).unwrap();

    assert_eq!(json["total"], 1);
    assert_eq!(json["results"][0]["status"], "error");
    assert_eq!(json["results"][0]["error"]["code"], "VIDEO_PRIVATE");
    // Successful stages keep their fields out of failed results
    assert!(json["results"][0].get("summary").is_none());
}
