/*!
 * Tests for error types
 */

use proofreader::errors::{AppError, ApplyError, ProviderError, SchemaError, StageError, StoreError};

/// Test which provider failures are worth retrying
#[test]
fn test_providerError_isRetryable_shouldOnlyRetryTransientFailures() {
    assert!(ProviderError::ConnectionError("refused".to_string()).is_retryable());
    assert!(ProviderError::RateLimitExceeded("slow down".to_string()).is_retryable());
    assert!(ProviderError::ApiError { status_code: 503, message: "busy".to_string() }.is_retryable());

    assert!(!ProviderError::ApiError { status_code: 400, message: "bad".to_string() }.is_retryable());
    assert!(!ProviderError::AuthenticationError("no".to_string()).is_retryable());
    assert!(!ProviderError::ParseError("junk".to_string()).is_retryable());
}

/// Test that a store conflict becomes an apply conflict
#[test]
fn test_applyError_fromStoreConflict_shouldBeConflict() {
    let error = ApplyError::from(StoreError::Conflict {
        document_id: "p1".to_string(),
        message: "stale".to_string(),
    });

    assert!(matches!(error, ApplyError::Conflict(ref message) if message == "stale"));
}

/// Test that every other store failure becomes a transport failure
#[test]
fn test_applyError_fromOtherStoreErrors_shouldBeTransport() {
    for error in [
        StoreError::NotFound("p1".to_string()),
        StoreError::Transport("timeout".to_string()),
        StoreError::Api { status_code: 500, message: "boom".to_string() },
        StoreError::Authentication("expired".to_string()),
    ] {
        assert!(matches!(ApplyError::from(error), ApplyError::Transport(_)));
    }
}

/// Test stage errors wrap both failure classes
#[test]
fn test_stageError_display_shouldNameTheFailureClass() {
    let transport: StageError = ProviderError::ConnectionError("refused".to_string()).into();
    let schema: StageError = SchemaError::Mismatch {
        schema: "suggestions",
        message: "missing field `suggestions`".to_string(),
    }
    .into();

    assert!(transport.to_string().starts_with("Transport error"));
    assert!(schema.to_string().contains("suggestions schema"));
}

/// Test application error conversions
#[test]
fn test_appError_conversions_shouldKeepMessages() {
    let app: AppError = StoreError::NotFound("p9".to_string()).into();
    assert!(app.to_string().contains("p9"));

    let app: AppError = ApplyError::Conflict("stale".to_string()).into();
    assert!(matches!(app, AppError::Apply(ApplyError::Conflict(_))));

    let app: AppError = std::io::Error::other("disk full").into();
    assert!(matches!(app, AppError::File(ref m) if m.contains("disk full")));

    let app: AppError = anyhow::anyhow!("odd").into();
    assert!(matches!(app, AppError::Unknown(_)));
}
