use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::{Config, SummaryProvider};
use crate::errors::ErrorCode;
use crate::pipeline::{
    AnalysisOptions, BatchResult, BatchScheduler, ConfigEcho, JobRegistry, JobState, VideoPipeline,
    VideoTask,
};
use crate::providers::anthropic::Anthropic;
use crate::providers::openai::OpenAI;
use crate::providers::youtube::{YouTubeMetadataProvider, YouTubeTranscriptSource};
use crate::providers::Summarizer;
use crate::retry::RetryPolicy;
use crate::summarize::service::BatchSummarizer;
use crate::transcript::{TranscriptAcquirer, TranscriptChunker};

// @module: Application controller for video summarization

/// Main application controller wiring config to the processing engine
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    /// Create a new controller for test purposes with default configuration
    pub fn new_for_test() -> Result<Self> {
        Self::with_config(Config::default())
    }

    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Build the summarization client selected by the config
    fn build_summarizer(&self) -> Arc<dyn Summarizer> {
        let summarize = &self.config.summarize;
        match summarize.provider {
            SummaryProvider::OpenAI => Arc::new(OpenAI::with_timeout(
                summarize.get_api_key(),
                summarize.get_endpoint(),
                summarize.get_model(),
                summarize.request_timeout_secs(),
            )),
            SummaryProvider::Anthropic => Arc::new(Anthropic::with_timeout(
                summarize.get_api_key(),
                summarize.get_endpoint(),
                summarize.get_model(),
                summarize.request_timeout_secs(),
            )),
        }
    }

    /// Wire the full processing engine from the configuration
    pub fn build_scheduler(&self) -> Arc<BatchScheduler> {
        let transcripts = TranscriptAcquirer::new(
            Arc::new(YouTubeTranscriptSource::preferred()),
            Some(Arc::new(YouTubeTranscriptSource::any_available())),
            Duration::from_secs(self.config.cache.transcript_ttl_secs),
        );

        let common = &self.config.summarize.common;
        let summarizer = BatchSummarizer::new(
            self.build_summarizer(),
            self.config.summarize.concurrent_requests(),
            RetryPolicy::new(common.retry_count, common.retry_backoff_ms),
        )
        .with_rate_limit_delay(common.rate_limit_delay_ms);

        let pipeline = VideoPipeline::new(
            Arc::new(YouTubeMetadataProvider::new()),
            Arc::new(transcripts),
            TranscriptChunker::new(self.config.chunking),
            summarizer,
        );

        let config_echo = ConfigEcho {
            provider: self.config.summarize.provider.to_lowercase_string(),
            model: self.config.summarize.get_model(),
            temperature: common.temperature,
            max_tokens: common.max_response_tokens,
        };

        Arc::new(BatchScheduler::new(
            Arc::new(pipeline),
            self.config.batch,
            config_echo,
        ))
    }

    /// Turn submitted URLs into tasks carrying the config defaults
    pub fn tasks_from_urls(&self, urls: &[String]) -> Vec<VideoTask> {
        let options = AnalysisOptions {
            languages: self.config.languages.clone(),
            temperature: self.config.summarize.common.temperature,
            max_summary_tokens: self.config.summarize.common.max_response_tokens,
        };
        urls.iter()
            .map(|url| VideoTask::new(url.clone(), options.clone()))
            .collect()
    }

    /// Process a batch synchronously with a progress bar
    pub async fn run(&self, urls: Vec<String>, json_output: bool) -> Result<BatchResult> {
        let scheduler = self.build_scheduler();
        let tasks = self.tasks_from_urls(&urls);

        info!(
            "tldw: summarizing {} video(s) with {} ({})",
            tasks.len(),
            self.config.summarize.provider.display_name(),
            self.config.summarize.get_model()
        );

        let progress_bar = ProgressBar::new(tasks.len() as u64);
        let template_result = ProgressStyle::default_bar()
            .template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(template_result);

        let pb = progress_bar.clone();
        let batch = scheduler
            .process_batch_with_progress(&tasks, move |done, _total| {
                pb.set_position(done as u64);
            })
            .await;
        progress_bar.finish_and_clear();

        if json_output {
            println!("{}", serde_json::to_string_pretty(&batch)?);
        } else {
            print_batch(&batch);
        }

        info!(
            "Batch finished: {}/{} ok in {}ms",
            batch.succeeded, batch.total, batch.elapsed_ms
        );
        Ok(batch)
    }

    /// Process a batch through the job registry, polling until terminal.
    ///
    /// Ctrl-C while the job runs cancels it instead of killing the
    /// process outright.
    pub async fn run_as_job(&self, urls: Vec<String>, json_output: bool) -> Result<()> {
        let scheduler = self.build_scheduler();
        let registry = JobRegistry::new(scheduler);
        let tasks = self.tasks_from_urls(&urls);

        let job_id = registry.create_job(tasks);
        info!("Submitted job {}", job_id);

        let record = loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    warn!("Interrupt received, cancelling job {}", job_id);
                    registry.cancel_job(job_id);
                }
                _ = tokio::time::sleep(Duration::from_millis(500)) => {}
            }

            let record = registry
                .get_status(job_id)
                .context("job record disappeared while polling")?;
            if record.state.is_terminal() {
                break record;
            }
            info!("Job {} is {:?}...", job_id, record.state);
        };

        if json_output {
            println!("{}", serde_json::to_string_pretty(&record)?);
            return Ok(());
        }

        match record.state {
            JobState::Completed => {
                if let Some(batch) = &record.result {
                    print_batch(batch);
                }
            }
            JobState::Failed => {
                let code = record
                    .error
                    .as_ref()
                    .map(|e| e.code)
                    .unwrap_or(ErrorCode::TaskException);
                warn!("Job {} failed: {}", job_id, code);
            }
            _ => unreachable!("polling loop only exits on terminal states"),
        }
        Ok(())
    }
}

/// Render a batch result for human eyes
fn print_batch(batch: &BatchResult) {
    for result in &batch.results {
        println!();
        match (&result.metadata, &result.error) {
            (Some(metadata), _) => {
                println!("## {} | {}", metadata.title, metadata.channel);
            }
            (None, Some(error)) => {
                println!("## {} FAILED ({})", result.source, error.code);
                println!("   {}", error.message);
                continue;
            }
            (None, None) => {
                println!("## {}", result.source);
            }
        }

        if let Some(note) = &result.note {
            println!("   note: {}", note);
        }

        let Some(summary) = &result.summary else {
            continue;
        };

        println!();
        println!("{}", summary.summary);
        if !summary.key_insights.is_empty() {
            println!();
            println!("Key insights:");
            for insight in &summary.key_insights {
                println!("  - {}", insight);
            }
        }
        if !summary.frameworks.is_empty() {
            println!();
            println!("Frameworks:");
            for framework in &summary.frameworks {
                println!("  - {}: {}", framework.name, framework.description);
            }
        }
        if !summary.key_moments.is_empty() {
            println!();
            println!("Moments:");
            for moment in &summary.key_moments {
                println!("  - {}", moment);
            }
        }
    }

    println!();
    println!(
        "{} ok, {} failed of {} ({}ms, {}/{})",
        batch.succeeded,
        batch.failed,
        batch.total,
        batch.elapsed_ms,
        batch.config.provider,
        batch.config.model
    );
}
