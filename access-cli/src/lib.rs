//! # Access CLI
//!
//! Interactive role assignment demo over a single resource group.
//!
//! The driver makes sure the resource group exists, loads existing role
//! assignments, then repeatedly asks for a user and a role to assign. Once
//! the operator types `exit`, every user's read, modify and delete
//! permissions are simulated in directory order. Deleting requires an
//! explicit `yes`.
//!
//! ## Configuration
//!
//! - [`DriverConfig`]: resource group, location, catalog file, pacing
//! - [`access_provider::ProviderConfig`]: resource manager endpoint and token

pub mod config;
pub mod driver;

pub use config::DriverConfig;
pub use driver::{title_case, Driver, DriverError};
