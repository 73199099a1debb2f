//! # Access Engine
//!
//! Role assignment workflow over an external authorization provider.
//!
//! ## Overview
//!
//! The access-engine crate handles:
//! - **Engine**: Rank-checked role upgrades with superseded-role cleanup
//! - **Sync**: One startup read of existing provider assignments
//! - **Session**: Ownership of the engine and the assignment store for a run
//! - **Errors**: Typed rejections and provider failures
//!
//! ## Request Flow
//!
//! ```text
//! assign_role(user, role)
//!   1. resolve role            → InvalidRole
//!   2. compare with highest    → InsufficientUpgrade
//!   3. remove lower roles      (best effort, logged)
//!   4. create new assignment   → AssignmentFailed
//!   5. store := [role]
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use access_engine::{EngineConfig, RoleAssignmentEngine, Session};
//! use access_provider::MemoryProvider;
//! use access_rbac::{Action, CatalogConfig};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let (catalog, directory) = CatalogConfig::default().build()?;
//!     let engine = RoleAssignmentEngine::new(
//!         catalog,
//!         directory,
//!         Arc::new(MemoryProvider::new()),
//!         EngineConfig::default(),
//!     );
//!
//!     let mut session = Session::new(engine);
//!     session.start().await?;
//!     session.assign_role("UserA", "Owner").await?;
//!     assert!(session.is_allowed("UserA", Action::Delete));
//!     Ok(())
//! }
//! ```

pub mod engine;
pub mod error;
pub mod session;

// Re-export main types for convenience
pub use engine::{
    new_assignment_name, AssignmentOutcome, EngineConfig, RemovalFailure, RoleAssignmentEngine,
    SyncReport,
};
pub use error::{AccessError, AccessResult};
pub use session::{Session, Simulation, StartReport};
