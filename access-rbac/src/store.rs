//! # Assignment Store
//!
//! In-memory mapping from user name to the roles they currently hold.
//!
//! The store is seeded with an empty role list for every known user, filled
//! once by the startup sync pass through [`AssignmentStore::add_role`], and
//! afterwards changed only by full replacement through
//! [`AssignmentStore::set_roles`].

use std::collections::HashMap;

use crate::catalog::{compare_rank, Role, UserDirectory};

/// Current role holdings per user.
///
/// The store does not deduplicate: a sync pass that sees the same role twice
/// for one principal records it twice.
#[derive(Debug, Clone, Default)]
pub struct AssignmentStore {
    roles: HashMap<String, Vec<Role>>,
    order: Vec<String>,
}

impl AssignmentStore {
    /// Create an empty store with no users.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with an empty role list for every user in `directory`.
    pub fn for_users(directory: &UserDirectory) -> Self {
        let mut store = Self::new();
        for user in directory.iter() {
            store.ensure_user(&user.name);
        }
        store
    }

    fn ensure_user(&mut self, user: &str) -> &mut Vec<Role> {
        if !self.roles.contains_key(user) {
            self.order.push(user.to_string());
        }
        self.roles.entry(user.to_string()).or_default()
    }

    /// Roles currently held by `user`, in insertion order.
    ///
    /// Unknown users hold no roles.
    pub fn roles_of(&self, user: &str) -> &[Role] {
        self.roles.get(user).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Replace every role held by `user`.
    pub fn set_roles(&mut self, user: &str, roles: Vec<Role>) {
        *self.ensure_user(user) = roles;
    }

    /// Append a role to `user`'s holdings.
    ///
    /// Used by the startup sync pass only.
    pub fn add_role(&mut self, user: &str, role: Role) {
        self.ensure_user(user).push(role);
    }

    /// The most privileged role held by `user`, if any.
    pub fn highest_role(&self, user: &str) -> Option<&Role> {
        self.roles_of(user)
            .iter()
            .max_by(|a, b| compare_rank(a, b))
    }

    /// Users and their roles in the order users were first seen.
    pub fn snapshot(&self) -> Vec<(&str, &[Role])> {
        self.order
            .iter()
            .map(|user| (user.as_str(), self.roles_of(user)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogConfig;
    use uuid::Uuid;

    fn role(name: &str, rank: u32) -> Role {
        Role::new(name, Uuid::from_u128(rank as u128), rank)
    }

    fn store() -> AssignmentStore {
        let directory = UserDirectory::new(CatalogConfig::default().users).unwrap();
        AssignmentStore::for_users(&directory)
    }

    #[test]
    fn test_store_starts_empty_for_all_users() {
        let store = store();
        let snapshot = store.snapshot();
        assert_eq!(snapshot.len(), 3);
        assert!(snapshot.iter().all(|(_, roles)| roles.is_empty()));
        assert_eq!(snapshot[0].0, "UserA");
    }

    #[test]
    fn test_add_role_appends_without_dedup() {
        let mut store = store();
        store.add_role("UserB", role("Reader", 1));
        store.add_role("UserB", role("Reader", 1));
        assert_eq!(store.roles_of("UserB").len(), 2);
    }

    #[test]
    fn test_set_roles_replaces() {
        let mut store = store();
        store.add_role("UserB", role("Reader", 1));
        store.add_role("UserB", role("Contributor", 2));
        store.set_roles("UserB", vec![role("Owner", 3)]);
        assert_eq!(store.roles_of("UserB"), &[role("Owner", 3)]);
    }

    #[test]
    fn test_highest_role() {
        let mut store = store();
        assert!(store.highest_role("UserA").is_none());
        store.add_role("UserA", role("Contributor", 2));
        store.add_role("UserA", role("Reader", 1));
        assert_eq!(store.highest_role("UserA").unwrap().name, "Contributor");
    }

    #[test]
    fn test_unknown_user_holds_nothing() {
        let store = store();
        assert!(store.roles_of("Mallory").is_empty());
    }
}
