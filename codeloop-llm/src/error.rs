//! LLM error types
//!
//! Re-exports codeloop-error and converts provider failures into it.

pub use codeloop_error::{Error, ErrorKind, ErrorStatus, Result};

use crate::provider::ProviderError;

/// Convert a wire-level [`ProviderError`] into the unified error type.
///
/// The kind is picked from the variant so callers can still tell a rate
/// limit from a bad key; the original error is kept as the source.
pub fn provider_error(err: ProviderError) -> Error {
    let (kind, retry_after) = match &err {
        ProviderError::Network(_) => (ErrorKind::NetworkFailed, None),
        ProviderError::RateLimited { retry_after } => (ErrorKind::RateLimited, *retry_after),
        ProviderError::AuthenticationFailed => (ErrorKind::AuthenticationFailed, None),
        ProviderError::Parse(_) => (ErrorKind::ParseFailed, None),
        ProviderError::InvalidRequest(_) => (ErrorKind::InvalidArgument, None),
        ProviderError::ModelNotFound(_) => (ErrorKind::ConfigInvalid, None),
        ProviderError::Api { status, .. } if *status >= 500 => {
            (ErrorKind::ProviderUnavailable, None)
        }
        ProviderError::Api { .. } | ProviderError::Other(_) => (ErrorKind::InferenceFailed, None),
    };

    let mut error = Error::new(kind, err.to_string()).with_operation("provider::complete");
    if let ProviderError::Api { status, .. } = &err {
        error = error.with_context("status", status.to_string());
    }
    if let Some(secs) = retry_after {
        error = error.with_context("retry_after", secs.to_string());
    }
    error.set_source(err)
}

/// Create an InferenceFailed error for a completion that carried no text
pub fn empty_completion(provider: &str) -> Error {
    Error::inference_failed("completion contained no text")
        .with_context("provider", provider)
        .permanent()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        let err = provider_error(ProviderError::RateLimited { retry_after: Some(7) });
        assert_eq!(err.kind(), ErrorKind::RateLimited);
        assert!(err.is_retryable());
        assert_eq!(err.context_value("retry_after"), Some("7"));

        let err = provider_error(ProviderError::AuthenticationFailed);
        assert_eq!(err.kind(), ErrorKind::AuthenticationFailed);
        assert!(!err.is_retryable());

        let err = provider_error(ProviderError::Api {
            status: 503,
            message: "overloaded".into(),
        });
        assert_eq!(err.kind(), ErrorKind::ProviderUnavailable);
        assert_eq!(err.context_value("status"), Some("503"));

        let err = provider_error(ProviderError::Api {
            status: 400,
            message: "bad".into(),
        });
        assert_eq!(err.kind(), ErrorKind::InferenceFailed);
    }

    #[test]
    fn test_source_is_kept() {
        let err = provider_error(ProviderError::Network("refused".into()));
        assert_eq!(err.operation(), "provider::complete");
        assert!(err.source_ref().is_some());
        assert!(err.message().contains("refused"));
    }

    #[test]
    fn test_empty_completion_is_permanent() {
        let err = empty_completion("gemini");
        assert_eq!(err.kind(), ErrorKind::InferenceFailed);
        assert!(!err.is_retryable());
    }
}
