//! Error types for role assignment and session operations.

use access_provider::ProviderError;
use access_rbac::Action;
use thiserror::Error;

/// Access error types.
///
/// None of these are fatal to an interactive session: each is reported and
/// the next request is served.
#[derive(Debug, Error)]
pub enum AccessError {
    /// Requested role is not in the catalog
    #[error("Invalid role: {0}")]
    InvalidRole(String),

    /// User is not in the directory
    #[error("User not found: {0}")]
    UnknownUser(String),

    /// User already holds an equal or higher role
    #[error("{user} already has {current}, which is equal or higher than {requested}")]
    InsufficientUpgrade {
        /// User name
        user: String,
        /// Highest role currently held
        current: String,
        /// Role that was requested
        requested: String,
    },

    /// Provider call failed
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Grant step failed after validation passed
    #[error("Failed to assign {role} role to {user}: {source}")]
    AssignmentFailed {
        /// User name
        user: String,
        /// Role that was being granted
        role: String,
        /// Underlying provider failure
        source: ProviderError,
    },

    /// Startup read of existing assignments failed
    #[error("Failed to synchronize existing roles: {0}")]
    SyncFailed(#[source] ProviderError),

    /// User's roles do not permit the action
    #[error("{user} isn't allowed to {action} the resource")]
    Forbidden {
        /// User name
        user: String,
        /// Attempted action
        action: Action,
    },
}

/// Result type for access operations.
pub type AccessResult<T> = Result<T, AccessError>;

impl AccessError {
    /// Check if this error is a validation rejection (no provider call was made).
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            AccessError::InvalidRole(_)
                | AccessError::UnknownUser(_)
                | AccessError::InsufficientUpgrade { .. }
                | AccessError::Forbidden { .. }
        )
    }

    /// Get error code for operator-facing reports.
    pub fn error_code(&self) -> &'static str {
        match self {
            AccessError::InvalidRole(_) => "INVALID_ROLE",
            AccessError::UnknownUser(_) => "UNKNOWN_USER",
            AccessError::InsufficientUpgrade { .. } => "INSUFFICIENT_UPGRADE",
            AccessError::Provider(_) => "PROVIDER_ERROR",
            AccessError::AssignmentFailed { .. } => "ASSIGNMENT_FAILED",
            AccessError::SyncFailed(_) => "SYNC_FAILED",
            AccessError::Forbidden { .. } => "FORBIDDEN",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_upgrade_message() {
        let err = AccessError::InsufficientUpgrade {
            user: "UserC".to_string(),
            current: "Contributor".to_string(),
            requested: "Reader".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "UserC already has Contributor, which is equal or higher than Reader"
        );
        assert!(err.is_rejection());
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(AccessError::InvalidRole("Admin".to_string()).error_code(), "INVALID_ROLE");
        let err = AccessError::AssignmentFailed {
            user: "UserA".to_string(),
            role: "Owner".to_string(),
            source: ProviderError::AuthenticationFailed,
        };
        assert_eq!(err.error_code(), "ASSIGNMENT_FAILED");
        assert!(!err.is_rejection());
    }

    #[test]
    fn test_forbidden_message() {
        let err = AccessError::Forbidden {
            user: "UserB".to_string(),
            action: Action::Delete,
        };
        assert_eq!(err.to_string(), "UserB isn't allowed to delete the resource");
    }
}
