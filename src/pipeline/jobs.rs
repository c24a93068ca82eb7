/*!
 * Cancellable background jobs with a pollable registry.
 *
 * A job is one batch run in the background. The registry owns every
 * record; callers only ever observe clones. Terminal transitions are
 * claimed under the record table's write lock, so a completing job and a
 * concurrent cancel cannot both write the terminal state: whichever gets
 * there first wins and the loser no-ops.
 *
 * Registry state is process-lifetime only; a restart forgets all jobs.
 */

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use log::{debug, info, warn};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tokio::task::AbortHandle;
use uuid::Uuid;

use crate::errors::{ErrorCode, ErrorInfo};
use crate::pipeline::{short_id, BatchResult, BatchScheduler, VideoTask};

/// Lifecycle state of one job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Pending,
    Running,
    Completed,
    Failed,
}

impl JobState {
    /// Whether the state admits no further transitions
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Snapshot of one job. Mutated only inside the registry; callers get
/// clones.
#[derive(Debug, Clone, Serialize)]
pub struct JobRecord {
    /// Job id, also the batch request id
    pub id: Uuid,

    /// Current lifecycle state
    pub state: JobState,

    /// Submission timestamp
    pub created_at: DateTime<Utc>,

    /// Terminal timestamp, absent while pending or running
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,

    /// Number of items in the batch
    pub video_count: usize,

    /// Batch outcome, present once completed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<BatchResult>,

    /// Failure details, present when the job failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

impl JobRecord {
    fn new(id: Uuid, video_count: usize) -> Self {
        Self {
            id,
            state: JobState::Pending,
            created_at: Utc::now(),
            completed_at: None,
            video_count,
            result: None,
            error: None,
        }
    }
}

/// Aggregate snapshot over all retained records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct JobCounts {
    pub total: usize,
    pub pending: usize,
    pub running: usize,
    pub completed: usize,
    pub failed: usize,
}

/// Owns all job records and their background tasks.
pub struct JobRegistry {
    /// Scheduler every job runs through
    scheduler: Arc<BatchScheduler>,

    /// Record table; all mutation goes through registry methods
    jobs: Arc<RwLock<HashMap<Uuid, JobRecord>>>,

    /// Abort handles for in-flight background tasks
    handles: Arc<Mutex<HashMap<Uuid, AbortHandle>>>,
}

impl JobRegistry {
    pub fn new(scheduler: Arc<BatchScheduler>) -> Self {
        Self {
            scheduler,
            jobs: Arc::new(RwLock::new(HashMap::new())),
            handles: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Register a job and start its batch in the background.
    ///
    /// Returns as soon as the record exists; the batch runs on its own
    /// task and the registry writes the terminal state when it finishes.
    pub fn create_job(&self, tasks: Vec<VideoTask>) -> Uuid {
        let id = Uuid::new_v4();
        self.jobs.write().insert(id, JobRecord::new(id, tasks.len()));
        info!("[{}] Job created with {} items", short_id(&id), tasks.len());

        let scheduler = self.scheduler.clone();
        let jobs = self.jobs.clone();
        let handles = self.handles.clone();

        let handle = tokio::spawn(async move {
            // A cancel can land before this task gets scheduled; respect it
            {
                let mut table = jobs.write();
                match table.get_mut(&id) {
                    Some(record) if record.state == JobState::Pending => {
                        record.state = JobState::Running;
                    }
                    _ => return,
                }
            }

            let result = scheduler.process_batch(&tasks).await;

            let mut table = jobs.write();
            if let Some(record) = table.get_mut(&id) {
                // A cancel that won the race already wrote the terminal
                // state; do not overwrite it
                if !record.state.is_terminal() {
                    info!(
                        "[{}] Job completed: {} ok, {} failed",
                        short_id(&id),
                        result.succeeded,
                        result.failed
                    );
                    record.state = JobState::Completed;
                    record.completed_at = Some(Utc::now());
                    record.result = Some(result);
                }
            }
            drop(table);
            handles.lock().remove(&id);
        });

        self.handles.lock().insert(id, handle.abort_handle());
        id
    }

    /// Snapshot of one job, `None` for unknown ids. Never blocks on the
    /// running task.
    pub fn get_status(&self, id: Uuid) -> Option<JobRecord> {
        self.jobs.read().get(&id).cloned()
    }

    /// Cancel a pending or running job.
    ///
    /// The record flips to failed with `JOB_CANCELLED` and the in-flight
    /// task is aborted immediately; in-flight items are interrupted, not
    /// drained. Returns false for unknown or already-terminal jobs, so a
    /// second cancel is a no-op.
    pub fn cancel_job(&self, id: Uuid) -> bool {
        {
            let mut table = self.jobs.write();
            let Some(record) = table.get_mut(&id) else {
                debug!("Cancel for unknown job {}", short_id(&id));
                return false;
            };
            if record.state.is_terminal() {
                debug!(
                    "Cancel for job {} ignored, already {:?}",
                    short_id(&id),
                    record.state
                );
                return false;
            }

            record.state = JobState::Failed;
            record.completed_at = Some(Utc::now());
            record.error = Some(ErrorInfo::new(
                ErrorCode::JobCancelled,
                "job cancelled by caller",
            ));
        }

        if let Some(handle) = self.handles.lock().remove(&id) {
            handle.abort();
        }
        warn!("[{}] Job cancelled", short_id(&id));
        true
    }

    /// Aggregate counts over all retained records
    pub fn counts(&self) -> JobCounts {
        let table = self.jobs.read();
        let mut counts = JobCounts {
            total: table.len(),
            ..JobCounts::default()
        };
        for record in table.values() {
            match record.state {
                JobState::Pending => counts.pending += 1,
                JobState::Running => counts.running += 1,
                JobState::Completed => counts.completed += 1,
                JobState::Failed => counts.failed += 1,
            }
        }
        counts
    }

    /// Drop terminal records older than `max_age`; returns how many went.
    pub fn cleanup_old_jobs(&self, max_age: Duration) -> usize {
        let cutoff = Utc::now() - max_age;
        let mut table = self.jobs.write();
        let before = table.len();
        table.retain(|_, record| {
            !(record.state.is_terminal()
                && record.completed_at.map(|at| at < cutoff).unwrap_or(false))
        });
        let removed = before - table.len();

        // A job task that finishes before its abort handle is inserted
        // leaves a stale entry behind; sweep those out with the records
        self.handles.lock().retain(|id, _| table.contains_key(id));

        if removed > 0 {
            info!("Cleaned up {} old job records", removed);
        }
        removed
    }
}
