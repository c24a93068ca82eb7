use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::Path;

use crate::pipeline::BatchOptions;
use crate::transcript::ChunkingConfig;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Transcript language preference order (ISO codes)
    #[serde(default = "default_languages")]
    pub languages: Vec<String>,

    /// Summarization config
    #[serde(default)]
    pub summarize: SummarizeConfig,

    /// Transcript chunking budgets
    #[serde(default)]
    pub chunking: ChunkingConfig,

    /// Batch scheduling config
    #[serde(default)]
    pub batch: BatchOptions,

    /// Cache config
    #[serde(default)]
    pub cache: CacheConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Summarization provider type
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SummaryProvider {
    // @provider: OpenAI
    #[default]
    OpenAI,
    // @provider: Anthropic
    Anthropic,
}

impl SummaryProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::OpenAI => "OpenAI",
            Self::Anthropic => "Anthropic",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::OpenAI => "openai".to_string(),
            Self::Anthropic => "anthropic".to_string(),
        }
    }
}

// Implement Display trait for SummaryProvider
impl std::fmt::Display for SummaryProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

// Implement FromStr trait for SummaryProvider
impl std::str::FromStr for SummaryProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "anthropic" => Ok(Self::Anthropic),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Provider configuration wrapper
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type")]
    pub provider_type: String,

    // @field: Model name
    #[serde(default = "String::new")]
    pub model: String,

    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Max concurrent requests
    #[serde(default = "default_concurrent_requests")]
    pub concurrent_requests: usize,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ProviderConfig {
    // @param provider_type: Provider enum
    // @returns: Provider config with defaults
    pub fn new(provider_type: SummaryProvider) -> Self {
        match provider_type {
            SummaryProvider::OpenAI => Self {
                provider_type: "openai".to_string(),
                model: default_openai_model(),
                api_key: String::new(),
                endpoint: default_openai_endpoint(),
                concurrent_requests: default_concurrent_requests(),
                timeout_secs: default_timeout_secs(),
            },
            SummaryProvider::Anthropic => Self {
                provider_type: "anthropic".to_string(),
                model: default_anthropic_model(),
                api_key: String::new(),
                endpoint: default_anthropic_endpoint(),
                concurrent_requests: default_concurrent_requests(),
                timeout_secs: default_anthropic_timeout_secs(),
            },
        }
    }
}

/// Summarization service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SummarizeConfig {
    /// Summarization provider to use
    #[serde(default)]
    pub provider: SummaryProvider,

    /// Available summarization providers
    #[serde(default)]
    pub available_providers: Vec<ProviderConfig>,

    /// Common summarization settings
    #[serde(default)]
    pub common: SummarizeCommonConfig,
}

/// Common summarization settings applicable to all providers
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SummarizeCommonConfig {
    /// Retry count for failed chunk requests
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Backoff multiplier for retries (in milliseconds)
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Rate limit delay in milliseconds between consecutive requests
    #[serde(default = "default_rate_limit_delay_ms")]
    pub rate_limit_delay_ms: u64,

    /// Temperature parameter for text generation (0.0 to 2.0)
    /// Lower values make output more deterministic, higher values more creative
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Output token cap per chunk summary
    #[serde(default = "default_max_response_tokens")]
    pub max_response_tokens: u32,
}

impl Default for SummarizeCommonConfig {
    fn default() -> Self {
        Self {
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
            rate_limit_delay_ms: default_rate_limit_delay_ms(),
            temperature: default_temperature(),
            max_response_tokens: default_max_response_tokens(),
        }
    }
}

/// Cache configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CacheConfig {
    /// How long fetched transcripts stay fresh, in seconds
    #[serde(default = "default_transcript_ttl_secs")]
    pub transcript_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            transcript_ttl_secs: default_transcript_ttl_secs(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_languages() -> Vec<String> {
    vec!["en".to_string(), "es".to_string()]
}

fn default_concurrent_requests() -> usize {
    4
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_anthropic_timeout_secs() -> u64 {
    120
}

fn default_rate_limit_delay_ms() -> u64 {
    500 // 500ms default delay between requests
}

fn default_retry_count() -> u32 {
    3 // Default to 3 retries
}

fn default_retry_backoff_ms() -> u64 {
    1000 // 1 second base backoff time, doubled on each retry
}

fn default_temperature() -> f32 {
    0.3
}

fn default_max_response_tokens() -> u32 {
    1500
}

fn default_transcript_ttl_secs() -> u64 {
    3600
}

fn default_openai_endpoint() -> String {
    "https://api.openai.com".to_string()
}

fn default_anthropic_endpoint() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_anthropic_model() -> String {
    "claude-3-haiku".to_string()
}

impl Config {
    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to open config file: {}", path.display()))?;
        let config: Config = serde_json::from_str(&content)
            .context(format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content =
            serde_json::to_string_pretty(self).context("Failed to serialize config to JSON")?;
        std::fs::write(path, content)
            .context(format!("Failed to write config to file: {}", path.display()))?;
        Ok(())
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        // Validate languages
        if self.languages.is_empty() {
            return Err(anyhow!("At least one transcript language is required"));
        }
        for code in &self.languages {
            crate::language_utils::validate_language_code(code)
                .context(format!("Invalid language code: {}", code))?;
        }

        // Validate temperature range
        let temperature = self.summarize.common.temperature;
        if !(0.0..=2.0).contains(&temperature) {
            return Err(anyhow!(
                "Temperature must be between 0.0 and 2.0, got {}",
                temperature
            ));
        }

        // Validate API key for the active provider
        let api_key = self.summarize.get_api_key();
        if api_key.is_empty() {
            return Err(anyhow!(
                "Summarization API key is required for {} provider",
                self.summarize.provider.display_name()
            ));
        }

        if self.batch.max_concurrent == 0 {
            return Err(anyhow!("batch.max_concurrent must be at least 1"));
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            languages: default_languages(),
            summarize: SummarizeConfig::default(),
            chunking: ChunkingConfig::default(),
            batch: BatchOptions::default(),
            cache: CacheConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl SummarizeConfig {
    /// Get the active provider configuration from the available_providers array
    pub fn get_active_provider_config(&self) -> Option<&ProviderConfig> {
        let provider_str = self.provider.to_lowercase_string();
        self.available_providers
            .iter()
            .find(|p| p.provider_type == provider_str)
    }

    /// Get a specific provider configuration by type for testing
    pub fn get_provider_config(&self, provider_type: &SummaryProvider) -> Option<&ProviderConfig> {
        let provider_str = provider_type.to_lowercase_string();
        self.available_providers
            .iter()
            .find(|p| p.provider_type == provider_str)
    }

    /// Get the model for the active provider
    pub fn get_model(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.model.is_empty() {
                return provider_config.model.clone();
            }
        }

        // Default fallback based on provider type
        match self.provider {
            SummaryProvider::OpenAI => default_openai_model(),
            SummaryProvider::Anthropic => default_anthropic_model(),
        }
    }

    /// Get the API key for the active provider
    pub fn get_api_key(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.api_key.is_empty() {
                return provider_config.api_key.clone();
            }
        }

        String::new()
    }

    /// Get the endpoint for the active provider
    pub fn get_endpoint(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.endpoint.is_empty() {
                return provider_config.endpoint.clone();
            }
        }

        // Default fallback based on provider type
        match self.provider {
            SummaryProvider::OpenAI => default_openai_endpoint(),
            SummaryProvider::Anthropic => default_anthropic_endpoint(),
        }
    }

    /// Get the HTTP request timeout for the active provider
    pub fn request_timeout_secs(&self) -> u64 {
        if let Some(provider_config) = self.get_active_provider_config() {
            if provider_config.timeout_secs > 0 {
                return provider_config.timeout_secs;
            }
        }

        // Default fallback
        default_timeout_secs()
    }

    /// Get the max concurrent chunk requests for the active provider
    pub fn concurrent_requests(&self) -> usize {
        if let Some(provider_config) = self.get_active_provider_config() {
            if provider_config.concurrent_requests > 0 {
                return provider_config.concurrent_requests;
            }
        }

        // Default fallback
        default_concurrent_requests()
    }
}

impl Default for SummarizeConfig {
    fn default() -> Self {
        let mut config = Self {
            provider: SummaryProvider::default(),
            available_providers: Vec::new(),
            common: SummarizeCommonConfig::default(),
        };

        // Add default providers
        config
            .available_providers
            .push(ProviderConfig::new(SummaryProvider::OpenAI));
        config
            .available_providers
            .push(ProviderConfig::new(SummaryProvider::Anthropic));

        config
    }
}
