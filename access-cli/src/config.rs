//! Driver configuration.
//!
//! Loaded from environment variables with defaults matching the demo
//! resource group.

use access_provider::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Interactive driver configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Protected resource group.
    pub resource_group: String,

    /// Location used when the resource group is created.
    pub location: String,

    /// Optional JSON catalog replacing the built-in users and roles.
    pub catalog_path: Option<PathBuf>,

    /// Pause before each simulated action.
    pub action_delay: Duration,

    /// Use the in-memory provider instead of the resource manager.
    pub offline: bool,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            resource_group: "RBACDemo".to_string(),
            location: "eastus".to_string(),
            catalog_path: None,
            action_delay: Duration::from_secs(1),
            offline: false,
        }
    }
}

impl DriverConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `RBAC_RESOURCE_GROUP`: Resource group name (default: RBACDemo)
    /// - `RBAC_LOCATION`: Resource group location (default: eastus)
    /// - `RBAC_CATALOG_PATH`: JSON catalog file
    /// - `RBAC_ACTION_DELAY_MS`: Pause before each simulated action (default: 1000)
    /// - `RBAC_OFFLINE`: Use the in-memory provider (default: false)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let default = Self::default();

        let action_delay = match lookup("RBAC_ACTION_DELAY_MS") {
            Some(raw) => Duration::from_millis(raw.trim().parse().map_err(|_| {
                ConfigError::InvalidValue {
                    key: "RBAC_ACTION_DELAY_MS".to_string(),
                    message: format!("expected milliseconds, got {:?}", raw),
                }
            })?),
            None => default.action_delay,
        };

        let offline = match lookup("RBAC_OFFLINE") {
            Some(raw) => parse_flag("RBAC_OFFLINE", &raw)?,
            None => default.offline,
        };

        Ok(Self {
            resource_group: lookup("RBAC_RESOURCE_GROUP").unwrap_or(default.resource_group),
            location: lookup("RBAC_LOCATION").unwrap_or(default.location),
            catalog_path: lookup("RBAC_CATALOG_PATH").map(PathBuf::from),
            action_delay,
            offline,
        })
    }
}

fn parse_flag(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("expected a boolean, got {:?}", raw),
        }),
    }
}
