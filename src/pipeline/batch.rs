/*!
 * Concurrent batch fan-out with ordering, timeouts, and failure isolation.
 *
 * Items run through the pipeline with a bounded number in flight. Each
 * item gets its own timeout; a hung or panicking item becomes an error
 * result in its own slot and never disturbs its siblings. Results always
 * come back aligned with the input order.
 */

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{self, StreamExt};
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::task::AbortHandle;
use tokio::time::timeout;
use uuid::Uuid;

use crate::errors::{ErrorCode, ErrorInfo};
use crate::pipeline::{short_id, BatchResult, ConfigEcho, VideoPipeline, VideoResult, VideoTask};

/// Batch-level processing knobs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchOptions {
    /// Maximum number of items processed at once
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    /// Per-item deadline in seconds
    #[serde(default = "default_timeout_per_video_secs")]
    pub timeout_per_video_secs: u64,

    /// Whether failed items get re-run after the first pass
    #[serde(default)]
    pub retry_failed: bool,

    /// How many retry passes failed items get
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_max_concurrent() -> usize {
    3
}

fn default_timeout_per_video_secs() -> u64 {
    300
}

fn default_max_retries() -> u32 {
    1
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            max_concurrent: default_max_concurrent(),
            timeout_per_video_secs: default_timeout_per_video_secs(),
            retry_failed: false,
            max_retries: default_max_retries(),
        }
    }
}

impl BatchOptions {
    fn per_item_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_per_video_secs)
    }
}

/// Fans a batch of tasks out over the pipeline.
pub struct BatchScheduler {
    /// Shared single-item pipeline
    pipeline: Arc<VideoPipeline>,

    /// Concurrency, timeout, and retry settings
    options: BatchOptions,

    /// Settings echoed into each result
    config_echo: ConfigEcho,
}

impl BatchScheduler {
    pub fn new(pipeline: Arc<VideoPipeline>, options: BatchOptions, config_echo: ConfigEcho) -> Self {
        Self {
            pipeline,
            options: BatchOptions {
                max_concurrent: options.max_concurrent.max(1),
                ..options
            },
            config_echo,
        }
    }

    pub fn options(&self) -> &BatchOptions {
        &self.options
    }

    /// Process every task and return results aligned with the input order.
    pub async fn process_batch(&self, tasks: &[VideoTask]) -> BatchResult {
        self.process_batch_with_progress(tasks, |_, _| {}).await
    }

    /// Like [`process_batch`](Self::process_batch), reporting completions
    /// as `(done, total)` to the callback.
    pub async fn process_batch_with_progress(
        &self,
        tasks: &[VideoTask],
        progress: impl Fn(usize, usize) + Clone + Send + 'static,
    ) -> BatchResult {
        let request_id = Uuid::new_v4();
        let started = Instant::now();
        let total = tasks.len();

        if tasks.is_empty() {
            return BatchResult::new(request_id, Vec::new(), self.config_echo.clone(), 0);
        }

        info!(
            "[{}] Processing batch of {} (max {} concurrent, {}s per item)",
            short_id(&request_id),
            total,
            self.options.max_concurrent,
            self.options.timeout_per_video_secs
        );

        let mut results = self.run_pass(tasks, progress).await;

        if self.options.retry_failed {
            self.retry_failures(tasks, &mut results).await;
        }

        let batch = BatchResult::new(
            request_id,
            results,
            self.config_echo.clone(),
            started.elapsed().as_millis() as u64,
        );
        info!(
            "[{}] Batch done in {}ms: {} ok, {} failed",
            short_id(&batch.request_id),
            batch.elapsed_ms,
            batch.succeeded,
            batch.failed
        );
        batch
    }

    /// One concurrent pass over `tasks`, yielding one result per slot.
    async fn run_pass(
        &self,
        tasks: &[VideoTask],
        progress: impl Fn(usize, usize) + Clone + Send + 'static,
    ) -> Vec<VideoResult> {
        let total = tasks.len();
        let semaphore = Arc::new(Semaphore::new(self.options.max_concurrent));
        let per_item_timeout = self.options.per_item_timeout();

        let mut indexed = stream::iter(tasks.iter().cloned().enumerate())
            .map(|(index, task)| {
                let pipeline = self.pipeline.clone();
                let semaphore = semaphore.clone();
                let progress = progress.clone();

                async move {
                    let _permit = semaphore.acquire().await.unwrap();
                    let result = run_one(pipeline, task, per_item_timeout).await;
                    progress(index + 1, total);
                    (index, result)
                }
            })
            .buffer_unordered(self.options.max_concurrent)
            .collect::<Vec<_>>()
            .await;

        // Completion order is arbitrary; reorder into submission order
        indexed.sort_by_key(|(index, _)| *index);
        indexed.into_iter().map(|(_, result)| result).collect()
    }

    /// Re-run failed slots, replacing their results in place.
    async fn retry_failures(&self, tasks: &[VideoTask], results: &mut [VideoResult]) {
        for pass in 1..=self.options.max_retries {
            let failed: Vec<usize> = results
                .iter()
                .enumerate()
                .filter(|(_, r)| !r.is_ok())
                .map(|(i, _)| i)
                .collect();

            if failed.is_empty() {
                return;
            }

            info!(
                "Retry pass {}/{}: re-running {} failed items",
                pass,
                self.options.max_retries,
                failed.len()
            );

            let retry_tasks: Vec<VideoTask> = failed.iter().map(|&i| tasks[i].clone()).collect();
            let retried = self.run_pass(&retry_tasks, |_, _| {}).await;

            for (&slot, result) in failed.iter().zip(retried) {
                if result.is_ok() {
                    debug!("Item {} recovered on retry pass {}", slot, pass);
                } else {
                    warn!(
                        "Item {} still failing after retry pass {}: {:?}",
                        slot,
                        pass,
                        result.error_code()
                    );
                }
                // The newest outcome wins either way
                results[slot] = result;
            }
        }
    }
}

/// Takes the item task down when its driver future goes away
struct AbortOnDrop(AbortHandle);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Run one item on its own task so a panic or hang stays contained.
async fn run_one(pipeline: Arc<VideoPipeline>, task: VideoTask, deadline: Duration) -> VideoResult {
    let source = task.source.clone();
    let mut handle = tokio::spawn(async move { pipeline.process(&task).await });
    // A cancelled batch drops this future mid-await; the guard aborts
    // the item task instead of letting it run on detached
    let _abort = AbortOnDrop(handle.abort_handle());

    match timeout(deadline, &mut handle).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_error)) => {
            error!("Item task for {} crashed: {}", source, join_error);
            VideoResult::failed(
                source,
                ErrorInfo::new(
                    ErrorCode::TaskException,
                    format!("item task crashed: {}", join_error),
                ),
            )
        }
        Err(_) => {
            // The slot is released; the guard stops the abandoned work
            warn!("Item {} exceeded its {:?} deadline", source, deadline);
            VideoResult::failed(
                source,
                ErrorInfo::new(
                    ErrorCode::Timeout,
                    format!("processing exceeded {}s", deadline.as_secs()),
                ),
            )
        }
    }
}
