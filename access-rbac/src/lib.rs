//! # Access RBAC
//!
//! Rank-based role model and local authorization decisions for a single
//! protected resource.
//!
//! ## Overview
//!
//! The access-rbac crate handles:
//! - **Catalog**: Known roles (name, provider id, rank) and known users
//! - **Actions**: Read, modify and delete on the protected resource
//! - **Store**: Which roles each user currently holds
//! - **Check**: Allow/deny decisions over the store
//!
//! ## Architecture
//!
//! ```text
//! CatalogConfig ─→ RoleCatalog + UserDirectory
//!                        │
//!                        └─→ AssignmentStore (user → roles)
//!                                   │
//!                                   └─→ check::is_allowed(user, Action)
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use access_rbac::{check, Action, AssignmentStore, CatalogConfig};
//!
//! let (catalog, directory) = CatalogConfig::default().build().unwrap();
//! let mut store = AssignmentStore::for_users(&directory);
//!
//! let contributor = catalog.role_by_name("Contributor").unwrap().clone();
//! store.set_roles("UserB", vec![contributor]);
//!
//! assert!(check::is_allowed(&store, "UserB", Action::Modify));
//! assert!(!check::is_allowed(&store, "UserB", Action::Delete));
//! ```
//!
//! ## Decision Rules
//!
//! - `Read` needs any role with rank >= 1
//! - `Modify` needs any role with rank >= 2
//! - `Delete` needs a role named exactly `Owner`

pub mod actions;
pub mod catalog;
pub mod check;
pub mod store;

// Re-export main types for convenience
pub use actions::Action;
pub use catalog::{compare_rank, CatalogConfig, CatalogError, Role, RoleCatalog, User, UserDirectory};
pub use store::AssignmentStore;
