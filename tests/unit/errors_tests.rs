/*!
 * Tests for failure classification and error codes
 */

use tldw::errors::{ErrorCode, ErrorInfo, PipelineStage, ProviderError};

#[test]
fn test_errorCode_serde_shouldUseScreamingSnake() {
    assert_eq!(
        serde_json::to_string(&ErrorCode::VideoUnavailable).unwrap(),
        "\"VIDEO_UNAVAILABLE\""
    );
    assert_eq!(
        serde_json::to_string(&ErrorCode::TaskException).unwrap(),
        "\"TASK_EXCEPTION\""
    );

    let back: ErrorCode = serde_json::from_str("\"JOB_CANCELLED\"").unwrap();
    assert_eq!(back, ErrorCode::JobCancelled);
}

#[test]
fn test_errorCode_asStr_shouldMatchSerdeForm() {
    for code in [
        ErrorCode::InvalidSource,
        ErrorCode::MetadataError,
        ErrorCode::TranscriptError,
        ErrorCode::SummarizationError,
        ErrorCode::Timeout,
        ErrorCode::TaskException,
        ErrorCode::JobCancelled,
        ErrorCode::VideoUnavailable,
        ErrorCode::VideoPrivate,
        ErrorCode::RateLimit,
        ErrorCode::AuthError,
        ErrorCode::ConnectionError,
        ErrorCode::ApiError,
        ErrorCode::InvalidResponse,
        ErrorCode::TranscriptUnavailable,
    ] {
        let serialized = serde_json::to_string(&code).unwrap();
        assert_eq!(serialized, format!("\"{}\"", code.as_str()));
        assert_eq!(code.to_string(), code.as_str());
    }
}

#[test]
fn test_codeAt_withDomainError_shouldKeepItsOwnCode() {
    let error = ProviderError::VideoPrivate("members only".to_string());

    // The domain code survives whatever stage reports it
    assert_eq!(error.code_at(PipelineStage::Metadata), ErrorCode::VideoPrivate);
    assert_eq!(error.code_at(PipelineStage::Transcript), ErrorCode::VideoPrivate);
}

#[test]
fn test_codeAt_withTransportError_shouldCollapseToStageCode() {
    let error = ProviderError::ConnectionError("refused".to_string());

    assert_eq!(error.code_at(PipelineStage::Metadata), ErrorCode::MetadataError);
    assert_eq!(
        error.code_at(PipelineStage::Transcript),
        ErrorCode::TranscriptError
    );
    assert_eq!(
        error.code_at(PipelineStage::Summarization),
        ErrorCode::SummarizationError
    );
}

#[test]
fn test_isRetryable_shouldSeparateServerFromClientFailures() {
    assert!(ProviderError::ConnectionError("reset".to_string()).is_retryable());
    assert!(ProviderError::RateLimitExceeded("429".to_string()).is_retryable());
    assert!(
        ProviderError::ApiError {
            status_code: 503,
            message: "overloaded".to_string(),
        }
        .is_retryable()
    );

    assert!(
        !ProviderError::ApiError {
            status_code: 400,
            message: "bad request".to_string(),
        }
        .is_retryable()
    );
    assert!(!ProviderError::AuthenticationError("bad key".to_string()).is_retryable());
    assert!(!ProviderError::VideoUnavailable("gone".to_string()).is_retryable());
    assert!(!ProviderError::ParseError("not json".to_string()).is_retryable());
}

#[test]
fn test_isVideoLevel_shouldStopFallbackForAccountAndVideoFailures() {
    assert!(ProviderError::VideoUnavailable("gone".to_string()).is_video_level());
    assert!(ProviderError::VideoPrivate("private".to_string()).is_video_level());
    assert!(ProviderError::RateLimitExceeded("429".to_string()).is_video_level());
    assert!(ProviderError::AuthenticationError("bad key".to_string()).is_video_level());

    // Source-specific failures are worth retrying elsewhere
    assert!(!ProviderError::TranscriptUnavailable("none".to_string()).is_video_level());
    assert!(!ProviderError::ConnectionError("reset".to_string()).is_video_level());
}

#[test]
fn test_errorInfo_fromProvider_shouldClassifyWithoutMessageMatching() {
    let error = ProviderError::ApiError {
        status_code: 500,
        message: "video unavailable".to_string(),
    };

    // The message mentions unavailability but the code comes from the
    // variant, not the text
    let info = ErrorInfo::from_provider(PipelineStage::Metadata, &error);
    assert_eq!(info.code, ErrorCode::MetadataError);
    assert!(info.message.contains("500"));
}

#[test]
fn test_errorInfo_display_shouldLeadWithCode() {
    let info = ErrorInfo::new(ErrorCode::Timeout, "exceeded 300s");
    assert_eq!(info.to_string(), "TIMEOUT: exceeded 300s");
}

#[test]
fn test_errorInfo_serde_roundTrip() {
    let info = ErrorInfo::new(ErrorCode::RateLimit, "quota exhausted");
    let json = serde_json::to_string(&info).unwrap();
    assert!(json.contains("\"RATE_LIMIT\""));

    let back: ErrorInfo = serde_json::from_str(&json).unwrap();
    assert_eq!(back, info);
}
