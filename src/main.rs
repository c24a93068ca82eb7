// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]
// Add other lints specific to this module that you want to allow but not auto-fix

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::Path;

use crate::app_config::{Config, SummaryProvider};
use app_controller::Controller;

mod app_config;
mod app_controller;
mod errors;
mod language_utils;
mod pipeline;
mod providers;
mod retry;
mod summarize;
mod transcript;
mod url_utils;

/// CLI Wrapper for SummaryProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliSummaryProvider {
    OpenAI,
    Anthropic,
}

impl From<CliSummaryProvider> for SummaryProvider {
    fn from(cli_provider: CliSummaryProvider) -> Self {
        match cli_provider {
            CliSummaryProvider::OpenAI => SummaryProvider::OpenAI,
            CliSummaryProvider::Anthropic => SummaryProvider::Anthropic,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

impl From<&app_config::LogLevel> for LevelFilter {
    fn from(level: &app_config::LogLevel) -> Self {
        match level {
            app_config::LogLevel::Error => LevelFilter::Error,
            app_config::LogLevel::Warn => LevelFilter::Warn,
            app_config::LogLevel::Info => LevelFilter::Info,
            app_config::LogLevel::Debug => LevelFilter::Debug,
            app_config::LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Summarize videos synchronously (default command)
    #[command(alias = "summarize")]
    Run(RunArgs),

    /// Submit videos as a background job and poll until it finishes
    Jobs(RunArgs),

    /// Write a default configuration file and exit
    InitConfig {
        /// Configuration file path
        #[arg(short, long, default_value = "conf.json")]
        config_path: String,
    },

    /// Generate shell completions for tldw
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Video URLs or bare video ids to process
    #[arg(value_name = "URL", required = true)]
    urls: Vec<String>,

    /// Summarization provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliSummaryProvider>,

    /// Model name to use for summarization
    #[arg(short, long)]
    model: Option<String>,

    /// Preferred transcript language codes, in order (e.g. 'en', 'es')
    #[arg(short = 'L', long = "language")]
    languages: Vec<String>,

    /// Maximum number of videos processed at once
    #[arg(long)]
    max_concurrent: Option<usize>,

    /// Per-video timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Re-run failed videos once after the first pass
    #[arg(long)]
    retry_failed: bool,

    /// Print the batch result as JSON on stdout
    #[arg(short, long)]
    json: bool,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// tldw - too long; didn't watch
///
/// Summarizes videos by fetching their transcripts and condensing them
/// with AI providers (OpenAI, Anthropic).
#[derive(Parser, Debug)]
#[command(name = "tldw")]
#[command(version = "1.0.0")]
#[command(about = "AI-powered video summarization tool")]
#[command(long_about = "tldw fetches video metadata and transcripts, splits long transcripts \
into token-budgeted chunks, and summarizes them with AI providers.

EXAMPLES:
    tldw https://youtu.be/dQw4w9WgXcQ              # Summarize using default config
    tldw -p anthropic URL1 URL2 URL3               # Use a specific provider
    tldw -L en -L es --json URL                    # Language preference, JSON output
    tldw jobs --max-concurrent 5 URL1 URL2         # Run as a cancellable background job
    tldw init-config                               # Write a default conf.json
    tldw completions bash > tldw.bash              # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default
    one will be created automatically.

SUPPORTED PROVIDERS:
    openai    - OpenAI API (requires API key)
    anthropic - Anthropic Claude API (requires API key)")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Video URLs or bare video ids to process
    #[arg(value_name = "URL")]
    urls: Vec<String>,

    /// Summarization provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliSummaryProvider>,

    /// Model name to use for summarization
    #[arg(short, long)]
    model: Option<String>,

    /// Preferred transcript language codes, in order (e.g. 'en', 'es')
    #[arg(short = 'L', long = "language")]
    languages: Vec<String>,

    /// Maximum number of videos processed at once
    #[arg(long)]
    max_concurrent: Option<usize>,

    /// Per-video timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Re-run failed videos once after the first pass
    #[arg(long)]
    retry_failed: bool,

    /// Print the batch result as JSON on stdout
    #[arg(short, long)]
    json: bool,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color for log level
    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let color = Self::get_color_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {:5} {}\x1B[0m",
                color,
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    // Parse command line arguments using clap
    let cli = CommandLineOptions::parse();

    // Handle subcommands
    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "tldw", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::InitConfig { config_path }) => {
            if Path::new(&config_path).exists() {
                return Err(anyhow!("Config file already exists: {}", config_path));
            }
            Config::default().to_file(&config_path)?;
            println!("Wrote default configuration to {}", config_path);
            Ok(())
        }
        Some(Commands::Run(args)) => run_batch(args, false).await,
        Some(Commands::Jobs(args)) => run_batch(args, true).await,
        None => {
            // Default behavior - use top-level args for backwards compatibility
            if cli.urls.is_empty() {
                return Err(anyhow!(
                    "at least one URL is required when no subcommand is specified"
                ));
            }

            let args = RunArgs {
                urls: cli.urls,
                provider: cli.provider,
                model: cli.model,
                languages: cli.languages,
                max_concurrent: cli.max_concurrent,
                timeout: cli.timeout,
                retry_failed: cli.retry_failed,
                json: cli.json,
                config_path: cli.config_path,
                log_level: cli.log_level,
            };
            run_batch(args, false).await
        }
    }
}

async fn run_batch(options: RunArgs, as_job: bool) -> Result<()> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        let config_log_level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level((&config_log_level).into());
    }

    // Load or create configuration
    let config_path = &options.config_path;
    let mut config = if Path::new(config_path).exists() {
        Config::from_file(config_path)?
    } else {
        // Create default configuration if not exists
        warn!(
            "Config file not found at '{}', creating default config.",
            config_path
        );
        let config = Config::default();
        config
            .to_file(config_path)
            .context(format!("Failed to write default config to file: {}", config_path))?;
        config
    };

    // Override config with CLI options if provided
    if let Some(provider) = &options.provider {
        config.summarize.provider = provider.clone().into();
    }
    if let Some(model) = &options.model {
        let provider_str = config.summarize.provider.to_lowercase_string();
        if let Some(provider_config) = config
            .summarize
            .available_providers
            .iter_mut()
            .find(|p| p.provider_type == provider_str)
        {
            provider_config.model = model.clone();
        }
    }
    if !options.languages.is_empty() {
        config.languages = options.languages.clone();
    }
    if let Some(max_concurrent) = options.max_concurrent {
        config.batch.max_concurrent = max_concurrent;
    }
    if let Some(timeout) = options.timeout {
        config.batch.timeout_per_video_secs = timeout;
    }
    if options.retry_failed {
        config.batch.retry_failed = true;
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }

    // Validate the configuration after loading and overriding
    config
        .validate()
        .context("Configuration validation failed")?;

    // If log level was not set via command line, update it from config now
    if options.log_level.is_none() {
        log::set_max_level((&config.log_level).into());
    }

    // Create controller
    let controller = Controller::with_config(config)?;

    if as_job {
        controller.run_as_job(options.urls, options.json).await
    } else {
        controller.run(options.urls, options.json).await.map(|_| ())
    }
}
