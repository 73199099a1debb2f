//! # Access Provider
//!
//! The external authorization provider that owns real-world role assignments.
//!
//! ## Overview
//!
//! The access-provider crate handles:
//! - **Provider trait**: The five operations the role engine consumes
//! - **Resource manager client**: HTTP implementation against the Azure
//!   Resource Manager REST API
//! - **Memory provider**: In-process implementation for offline runs and tests
//! - **Configuration**: Endpoint, subscription, token and timeout from the
//!   environment
//!
//! ## Usage
//!
//! ```rust,no_run
//! use access_provider::{ArmClient, AuthorizationProvider, ProviderConfig};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ProviderConfig::from_env()?;
//!     let scope = config.scope("RBACDemo");
//!     let client = ArmClient::new(config)?;
//!
//!     client.ensure_resource_group("RBACDemo", "eastus").await?;
//!     for assignment in client.list_assignments(&scope).await? {
//!         println!("{} -> {}", assignment.principal_id, assignment.role_external_id);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! Calls are never retried here. Callers bound each call with their own
//! timeout.

pub mod arm;
pub mod config;
pub mod error;
pub mod memory;
pub mod provider;

// Re-export main types for convenience
pub use arm::ArmClient;
pub use config::{ConfigError, ProviderConfig};
pub use error::{ProviderError, ProviderResult};
pub use memory::{MemoryProvider, Operation, ProviderStats};
pub use provider::{
    resource_group_scope, AuthorizationProvider, ProviderAssignment, ResourceGroupStatus,
};
