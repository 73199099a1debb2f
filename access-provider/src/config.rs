//! Provider configuration.
//!
//! Endpoint, subscription, credentials and timeout for the resource manager
//! API. Configuration is loaded from environment variables with defaults for
//! the public cloud endpoint.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::provider::resource_group_scope;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Missing required environment variable.
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    /// Invalid configuration value.
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue {
        /// Configuration key.
        key: String,
        /// Error message.
        message: String,
    },
}

/// Resource manager endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of the resource manager (e.g., "https://management.azure.com").
    pub base_url: String,

    /// Subscription that owns the resource group.
    pub subscription_id: String,

    /// Pre-issued bearer token for the resource manager.
    pub access_token: Option<String>,

    /// Per-call timeout in seconds.
    pub timeout_secs: u64,

    /// API version used for resource group calls.
    pub resource_api_version: String,

    /// API version used for role assignment calls.
    pub authorization_api_version: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://management.azure.com".to_string(),
            subscription_id: "AZURE_SUBSCRIPTION_ID".to_string(),
            access_token: None,
            timeout_secs: 30,
            resource_api_version: "2021-04-01".to_string(),
            authorization_api_version: "2022-04-01".to_string(),
        }
    }
}

impl ProviderConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `ARM_BASE_URL`: Resource manager URL (default: https://management.azure.com)
    /// - `AZURE_SUBSCRIPTION_ID`: Subscription id
    /// - `ARM_ACCESS_TOKEN`: Bearer token for the resource manager
    /// - `PROVIDER_TIMEOUT_SECS`: Per-call timeout in seconds (default: 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        let default = Self::default();

        let timeout_secs = match std::env::var("PROVIDER_TIMEOUT_SECS") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: "PROVIDER_TIMEOUT_SECS".to_string(),
                message: format!("expected whole seconds, got {:?}", raw),
            })?,
            Err(_) => default.timeout_secs,
        };

        Ok(Self {
            base_url: std::env::var("ARM_BASE_URL").unwrap_or(default.base_url),
            subscription_id: std::env::var("AZURE_SUBSCRIPTION_ID")
                .unwrap_or(default.subscription_id),
            access_token: std::env::var("ARM_ACCESS_TOKEN").ok(),
            timeout_secs,
            ..default
        })
    }

    /// Get the per-call timeout as a Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Scope string for a resource group in this subscription.
    pub fn scope(&self, resource_group: &str) -> String {
        resource_group_scope(&self.subscription_id, resource_group)
    }

    /// Build a full URL by appending a path to the base URL.
    pub fn url(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{}/{}", base, path)
    }

    /// Validate that the configuration can reach a real subscription.
    pub fn validate_for_remote(&self) -> Result<(), ConfigError> {
        if self.access_token.is_none() {
            return Err(ConfigError::MissingEnvVar("ARM_ACCESS_TOKEN".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "PROVIDER_TIMEOUT_SECS".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ProviderConfig::default();
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert!(config.access_token.is_none());
    }

    #[test]
    fn test_url_joining() {
        let config = ProviderConfig {
            base_url: "https://arm.example.com/".to_string(),
            ..ProviderConfig::default()
        };
        assert_eq!(
            config.url("/subscriptions/s1"),
            "https://arm.example.com/subscriptions/s1"
        );
        assert_eq!(config.url("subscriptions/s1"), "https://arm.example.com/subscriptions/s1");
    }

    #[test]
    fn test_scope() {
        let config = ProviderConfig {
            subscription_id: "s1".to_string(),
            ..ProviderConfig::default()
        };
        assert_eq!(config.scope("RBACDemo"), "/subscriptions/s1/resourceGroups/RBACDemo");
    }

    #[test]
    fn test_validate_for_remote() {
        let mut config = ProviderConfig::default();
        assert!(config.validate_for_remote().is_err());

        config.access_token = Some("token".to_string());
        assert!(config.validate_for_remote().is_ok());

        config.timeout_secs = 0;
        assert!(config.validate_for_remote().is_err());
    }
}
