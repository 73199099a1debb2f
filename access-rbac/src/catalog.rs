//! # Catalog
//!
//! Static role and user data for an access session.
//!
//! Roles form a flat hierarchy ordered by rank: a higher rank grants more
//! privilege. Users form a closed set of named principals. Both are built
//! once from a [`CatalogConfig`] and never change for the lifetime of a
//! session.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;
use uuid::Uuid;

/// Catalog configuration errors.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Two roles share a name.
    #[error("Duplicate role name: {0}")]
    DuplicateRoleName(String),

    /// Two roles share a rank, so the order would not be total.
    #[error("Duplicate role rank {rank} ({first} and {second})")]
    DuplicateRank {
        /// The shared rank.
        rank: u32,
        /// First role holding the rank.
        first: String,
        /// Second role holding the rank.
        second: String,
    },

    /// Two users share a display name.
    #[error("Duplicate user name: {0}")]
    DuplicateUserName(String),

    /// Two users share a principal.
    #[error("Duplicate principal id: {0}")]
    DuplicatePrincipal(Uuid),

    /// The catalog file could not be read.
    #[error("Failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    /// The catalog file is not valid JSON for a catalog.
    #[error("Invalid catalog file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A role that can be assigned at the protected scope.
///
/// # Examples
///
/// ```
/// use access_rbac::Role;
/// use uuid::Uuid;
///
/// let reader = Role::new("Reader", Uuid::nil(), 1);
/// let owner = Role::new("Owner", Uuid::nil(), 3);
/// assert!(owner.outranks(&reader));
/// assert_eq!(Role::rank_delta(&reader, &owner), -2);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Role {
    /// Display name, matched exactly on lookup.
    pub name: String,

    /// Role definition id understood by the authorization provider.
    pub external_id: Uuid,

    /// Privilege rank. Higher is more privileged.
    pub rank: u32,
}

impl Role {
    /// Create a new role.
    pub fn new(name: impl Into<String>, external_id: Uuid, rank: u32) -> Self {
        Self {
            name: name.into(),
            external_id,
            rank,
        }
    }

    /// Signed rank difference `a.rank - b.rank`.
    pub fn rank_delta(a: &Role, b: &Role) -> i64 {
        i64::from(a.rank) - i64::from(b.rank)
    }

    /// Check if this role is strictly more privileged than `other`.
    pub fn outranks(&self, other: &Role) -> bool {
        self.rank > other.rank
    }
}

/// Order two roles by rank.
pub fn compare_rank(a: &Role, b: &Role) -> Ordering {
    a.rank.cmp(&b.rank)
}

/// A known user and the principal the provider knows them by.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct User {
    /// Display name, matched case-sensitively.
    pub name: String,

    /// Principal (object) id at the authorization provider.
    pub principal_id: Uuid,
}

impl User {
    /// Create a new user.
    pub fn new(name: impl Into<String>, principal_id: Uuid) -> Self {
        Self {
            name: name.into(),
            principal_id,
        }
    }
}

/// Serializable catalog definition.
///
/// The default is the three-user, three-role demo catalog:
/// `Reader < Contributor < Owner` with the provider's built-in role ids.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogConfig {
    /// Known users, in display order.
    pub users: Vec<User>,

    /// Known roles.
    pub roles: Vec<Role>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            users: vec![
                User::new("UserA", Uuid::from_u128(0x11111111_1111_1111_1111_111111111111)),
                User::new("UserB", Uuid::from_u128(0x22222222_2222_2222_2222_222222222222)),
                User::new("UserC", Uuid::from_u128(0x33333333_3333_3333_3333_333333333333)),
            ],
            roles: vec![
                Role::new(
                    "Reader",
                    Uuid::from_u128(0xacdd72a7_3385_48ef_bd42_f606fba81ae7),
                    1,
                ),
                Role::new(
                    "Contributor",
                    Uuid::from_u128(0xb24988ac_6180_42a0_ab88_20f7382dd24c),
                    2,
                ),
                Role::new(
                    "Owner",
                    Uuid::from_u128(0x8e3af657_a8ff_443c_a75c_2fe8c4bcb635),
                    3,
                ),
            ],
        }
    }
}

impl CatalogConfig {
    /// Load a catalog definition from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Validate and split into a role catalog and a user directory.
    pub fn build(self) -> Result<(RoleCatalog, UserDirectory), CatalogError> {
        Ok((RoleCatalog::new(self.roles)?, UserDirectory::new(self.users)?))
    }
}

/// Lookup table of known roles.
#[derive(Debug, Clone)]
pub struct RoleCatalog {
    roles: Vec<Role>,
}

impl RoleCatalog {
    /// Build a catalog, rejecting duplicate names and ranks.
    ///
    /// Roles are kept sorted by ascending rank.
    pub fn new(mut roles: Vec<Role>) -> Result<Self, CatalogError> {
        let mut names = HashSet::new();
        for role in &roles {
            if !names.insert(role.name.as_str()) {
                return Err(CatalogError::DuplicateRoleName(role.name.clone()));
            }
        }

        roles.sort_by(compare_rank);
        if let Some(pair) = roles.windows(2).find(|pair| pair[0].rank == pair[1].rank) {
            return Err(CatalogError::DuplicateRank {
                rank: pair[0].rank,
                first: pair[0].name.clone(),
                second: pair[1].name.clone(),
            });
        }

        Ok(Self { roles })
    }

    /// Find a role by exact name.
    ///
    /// # Examples
    ///
    /// ```
    /// use access_rbac::{CatalogConfig, RoleCatalog};
    ///
    /// let catalog = RoleCatalog::new(CatalogConfig::default().roles).unwrap();
    /// assert_eq!(catalog.role_by_name("Owner").map(|r| r.rank), Some(3));
    /// assert!(catalog.role_by_name("owner").is_none());
    /// ```
    pub fn role_by_name(&self, name: &str) -> Option<&Role> {
        self.roles.iter().find(|role| role.name == name)
    }

    /// Find a role by its provider role definition id.
    pub fn role_by_external_id(&self, external_id: &Uuid) -> Option<&Role> {
        self.roles.iter().find(|role| role.external_id == *external_id)
    }

    /// Roles in ascending rank order.
    pub fn roles(&self) -> &[Role] {
        &self.roles
    }
}

/// The closed set of users a session operates on.
#[derive(Debug, Clone)]
pub struct UserDirectory {
    users: Vec<User>,
}

impl UserDirectory {
    /// Build a directory, rejecting duplicate names and principals.
    ///
    /// Declaration order is kept; it is the order users are listed and
    /// simulated in.
    pub fn new(users: Vec<User>) -> Result<Self, CatalogError> {
        let mut names = HashSet::new();
        let mut principals = HashSet::new();
        for user in &users {
            if !names.insert(user.name.as_str()) {
                return Err(CatalogError::DuplicateUserName(user.name.clone()));
            }
            if !principals.insert(user.principal_id) {
                return Err(CatalogError::DuplicatePrincipal(user.principal_id));
            }
        }
        Ok(Self { users })
    }

    /// Find a user by display name (case-sensitive).
    pub fn user_by_name(&self, name: &str) -> Option<&User> {
        self.users.iter().find(|user| user.name == name)
    }

    /// Find a user by provider principal id.
    pub fn user_by_principal(&self, principal_id: &Uuid) -> Option<&User> {
        self.users
            .iter()
            .find(|user| user.principal_id == *principal_id)
    }

    /// Iterate users in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &User> {
        self.users.iter()
    }

    /// Number of known users.
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Whether the directory has no users.
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
