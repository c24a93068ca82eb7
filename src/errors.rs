/*!
 * Error types for the tldw application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions. Failures are
 * classified with the `ErrorCode` enum; result payloads never rely on matching
 * message substrings.
 */

// Allow dead code - error types are for library consumers
#![allow(dead_code)]

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// The requested video does not exist or has been removed
    #[error("Video unavailable: {0}")]
    VideoUnavailable(String),

    /// The requested video exists but is not publicly accessible
    #[error("Video is private: {0}")]
    VideoPrivate(String),

    /// No transcript could be obtained for the video
    #[error("Transcript unavailable: {0}")]
    TranscriptUnavailable(String),
}

impl ProviderError {
    /// The enumerated code for this failure.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::RequestFailed(_) => ErrorCode::ConnectionError,
            Self::ParseError(_) => ErrorCode::InvalidResponse,
            Self::ApiError { .. } => ErrorCode::ApiError,
            Self::ConnectionError(_) => ErrorCode::ConnectionError,
            Self::RateLimitExceeded(_) => ErrorCode::RateLimit,
            Self::AuthenticationError(_) => ErrorCode::AuthError,
            Self::VideoUnavailable(_) => ErrorCode::VideoUnavailable,
            Self::VideoPrivate(_) => ErrorCode::VideoPrivate,
            Self::TranscriptUnavailable(_) => ErrorCode::TranscriptUnavailable,
        }
    }

    /// Code surfaced in item results. Domain kinds keep their own code;
    /// transport-level failures collapse to the generic code of the stage
    /// they occurred in.
    pub fn code_at(&self, stage: PipelineStage) -> ErrorCode {
        match self {
            Self::VideoUnavailable(_)
            | Self::VideoPrivate(_)
            | Self::RateLimitExceeded(_)
            | Self::AuthenticationError(_)
            | Self::TranscriptUnavailable(_) => self.code(),
            _ => stage.generic_code(),
        }
    }

    /// Whether a retry has a chance of succeeding. Server-side and network
    /// failures are retryable; client errors are terminal.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RequestFailed(_) | Self::ConnectionError(_) | Self::RateLimitExceeded(_) => true,
            Self::ApiError { status_code, .. } => *status_code >= 500,
            _ => false,
        }
    }

    /// Whether the failure concerns the video or the account rather than
    /// the particular source that reported it. A fallback chain propagates
    /// these unchanged instead of trying its next source.
    pub fn is_video_level(&self) -> bool {
        matches!(
            self,
            Self::VideoUnavailable(_)
                | Self::VideoPrivate(_)
                | Self::RateLimitExceeded(_)
                | Self::AuthenticationError(_)
        )
    }
}

/// Pipeline stage a provider failure occurred in, used to pick the generic
/// error code when the failure has no domain-specific one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Metadata,
    Transcript,
    Summarization,
}

impl PipelineStage {
    fn generic_code(self) -> ErrorCode {
        match self {
            Self::Metadata => ErrorCode::MetadataError,
            Self::Transcript => ErrorCode::TranscriptError,
            Self::Summarization => ErrorCode::SummarizationError,
        }
    }
}

/// Enumerated failure codes carried by item results and job records.
///
/// Serialized in SCREAMING_SNAKE form ("VIDEO_UNAVAILABLE") so downstream
/// consumers can switch on a stable tag instead of parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// The source identifier could not be resolved to a video id
    InvalidSource,
    /// Metadata lookup failed for a reason without a more specific code
    MetadataError,
    /// Transcript acquisition failed for a reason without a more specific code
    TranscriptError,
    /// No chunk produced a usable summary
    SummarizationError,
    /// The per-item deadline elapsed
    Timeout,
    /// The item's task failed outside the pipeline's own error handling
    TaskException,
    /// The owning job was cancelled while the item was queued or running
    JobCancelled,
    /// Provider reported the video as removed or nonexistent
    VideoUnavailable,
    /// Provider reported the video as private
    VideoPrivate,
    /// Provider rate limit was exhausted
    RateLimit,
    /// Provider rejected the credentials
    AuthError,
    /// The provider could not be reached
    ConnectionError,
    /// The provider returned a non-success status
    ApiError,
    /// The provider response could not be parsed
    InvalidResponse,
    /// No caption track was available in any acceptable language
    TranscriptUnavailable,
}

impl ErrorCode {
    /// Stable string form, identical to the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidSource => "INVALID_SOURCE",
            Self::MetadataError => "METADATA_ERROR",
            Self::TranscriptError => "TRANSCRIPT_ERROR",
            Self::SummarizationError => "SUMMARIZATION_ERROR",
            Self::Timeout => "TIMEOUT",
            Self::TaskException => "TASK_EXCEPTION",
            Self::JobCancelled => "JOB_CANCELLED",
            Self::VideoUnavailable => "VIDEO_UNAVAILABLE",
            Self::VideoPrivate => "VIDEO_PRIVATE",
            Self::RateLimit => "RATE_LIMIT",
            Self::AuthError => "AUTH_ERROR",
            Self::ConnectionError => "CONNECTION_ERROR",
            Self::ApiError => "API_ERROR",
            Self::InvalidResponse => "INVALID_RESPONSE",
            Self::TranscriptUnavailable => "TRANSCRIPT_UNAVAILABLE",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Code plus human-readable message, attached to failed results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Enumerated failure code
    pub code: ErrorCode,

    /// Human-readable description, for logs and operators only
    pub message: String,
}

impl ErrorInfo {
    /// Create error info from a code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Classify a provider failure observed at the given stage
    pub fn from_provider(stage: PipelineStage, error: &ProviderError) -> Self {
        Self {
            code: error.code_at(stage),
            message: error.to_string(),
        }
    }
}

impl std::fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a configuration problem
    #[error("Config error: {0}")]
    Config(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from the job registry
    #[error("Job error: {0}")]
    Job(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::Config(error.to_string())
    }
}
