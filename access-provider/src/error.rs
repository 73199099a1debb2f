//! Error types for authorization provider calls.

use std::time::Duration;
use thiserror::Error;

/// Authorization provider errors.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error ({status}): {message}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Error message from the API.
        message: String,
    },

    /// Invalid response from the API.
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// Resource or assignment not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Authentication failed.
    #[error("Authentication failed")]
    AuthenticationFailed,

    /// The call did not complete in time.
    #[error("Provider call timed out after {0:?}")]
    Timeout(Duration),

    /// The provider refused or could not serve the call.
    #[error("Provider unavailable: {0}")]
    Unavailable(String),
}

/// Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

impl ProviderError {
    /// Get error code for operator-facing reports.
    pub fn error_code(&self) -> &'static str {
        match self {
            ProviderError::RequestFailed(_) => "REQUEST_FAILED",
            ProviderError::ApiError { .. } => "API_ERROR",
            ProviderError::InvalidResponse(_) => "INVALID_RESPONSE",
            ProviderError::NotFound(_) => "NOT_FOUND",
            ProviderError::AuthenticationFailed => "AUTHENTICATION_FAILED",
            ProviderError::Timeout(_) => "TIMEOUT",
            ProviderError::Unavailable(_) => "UNAVAILABLE",
        }
    }

    /// Check if this error came from the call timing out.
    pub fn is_timeout(&self) -> bool {
        match self {
            ProviderError::Timeout(_) => true,
            ProviderError::RequestFailed(e) => e.is_timeout(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(ProviderError::AuthenticationFailed.error_code(), "AUTHENTICATION_FAILED");
        assert_eq!(
            ProviderError::ApiError {
                status: 409,
                message: "conflict".to_string()
            }
            .error_code(),
            "API_ERROR"
        );
    }

    #[test]
    fn test_timeout_detection() {
        assert!(ProviderError::Timeout(Duration::from_secs(1)).is_timeout());
        assert!(!ProviderError::NotFound("x".to_string()).is_timeout());
    }

    #[test]
    fn test_display() {
        let err = ProviderError::ApiError {
            status: 403,
            message: "denied".to_string(),
        };
        assert_eq!(err.to_string(), "API error (403): denied");
    }
}
