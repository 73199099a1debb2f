//! # Authorization Check
//!
//! Local allow/deny decisions over a user's current roles.
//!
//! Read and modify are rank thresholds. Delete is granted only to a role
//! literally named [`OWNER_ROLE`], whatever its rank.

use crate::actions::Action;
use crate::catalog::Role;
use crate::store::AssignmentStore;

/// Minimum rank that grants [`Action::Read`].
pub const READ_MIN_RANK: u32 = 1;

/// Minimum rank that grants [`Action::Modify`].
pub const MODIFY_MIN_RANK: u32 = 2;

/// Name of the only role that grants [`Action::Delete`].
pub const OWNER_ROLE: &str = "Owner";

/// Whether any held role grants read access.
pub fn can_read(roles: &[Role]) -> bool {
    roles.iter().any(|role| role.rank >= READ_MIN_RANK)
}

/// Whether any held role grants modify access.
pub fn can_modify(roles: &[Role]) -> bool {
    roles.iter().any(|role| role.rank >= MODIFY_MIN_RANK)
}

/// Whether the held roles include the owner role (by name).
///
/// # Examples
///
/// ```
/// use access_rbac::{check::can_delete, Role};
/// use uuid::Uuid;
///
/// assert!(can_delete(&[Role::new("Owner", Uuid::nil(), 3)]));
/// assert!(!can_delete(&[Role::new("Administrator", Uuid::nil(), 3)]));
/// ```
pub fn can_delete(roles: &[Role]) -> bool {
    roles.iter().any(|role| role.name == OWNER_ROLE)
}

/// Decide whether a set of roles permits `action`.
pub fn permits(roles: &[Role], action: Action) -> bool {
    match action {
        Action::Read => can_read(roles),
        Action::Modify => can_modify(roles),
        Action::Delete => can_delete(roles),
    }
}

/// Decide whether `user` may perform `action` according to `store`.
pub fn is_allowed(store: &AssignmentStore, user: &str, action: Action) -> bool {
    permits(store.roles_of(user), action)
}
