//! Access session.
//!
//! A session owns the engine and the assignment store for one run. It is
//! the only place the store is mutated, so requests are serialized through
//! `&mut self`.

use access_provider::ResourceGroupStatus;
use access_rbac::{check, Action, AssignmentStore, Role, User};
use tracing::info;

use crate::engine::{AssignmentOutcome, RoleAssignmentEngine, SyncReport};
use crate::error::{AccessError, AccessResult};

/// What happened when a session started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartReport {
    /// Whether the resource group was reused or created.
    pub resource_group: ResourceGroupStatus,
    /// Result of the sync pass.
    pub sync: SyncReport,
}

/// Decisions for every action for one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Simulation {
    /// User name.
    pub user: String,
    /// Roles held when the simulation ran.
    pub roles: Vec<Role>,
    /// Allow (`true`) or deny per action, in [`Action::all`] order.
    pub decisions: Vec<(Action, bool)>,
}

impl Simulation {
    /// Decision for one action.
    pub fn allowed(&self, action: Action) -> bool {
        self.decisions
            .iter()
            .any(|(candidate, allowed)| *candidate == action && *allowed)
    }
}

/// One run of the role assignment workflow.
#[derive(Debug)]
pub struct Session {
    engine: RoleAssignmentEngine,
    store: AssignmentStore,
}

impl Session {
    /// Create a session with an empty role list for every known user.
    pub fn new(engine: RoleAssignmentEngine) -> Self {
        let store = AssignmentStore::for_users(engine.directory());
        Self { engine, store }
    }

    /// Ensure the resource group exists, then load existing assignments.
    pub async fn start(&mut self) -> AccessResult<StartReport> {
        let resource_group = self.engine.ensure_resource_group().await?;
        let sync = self.engine.sync(&mut self.store).await?;
        Ok(StartReport {
            resource_group,
            sync,
        })
    }

    /// Assign a role to a user. See [`RoleAssignmentEngine::assign_role`].
    pub async fn assign_role(
        &mut self,
        user: &str,
        role: &str,
    ) -> AccessResult<AssignmentOutcome> {
        self.engine.assign_role(&mut self.store, user, role).await
    }

    /// Known users in directory order.
    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.engine.directory().iter()
    }

    /// Look up a known user by exact name.
    pub fn user(&self, name: &str) -> Option<&User> {
        self.engine.directory().user_by_name(name)
    }

    /// Roles currently held by `user`.
    pub fn roles_of(&self, user: &str) -> &[Role] {
        self.store.roles_of(user)
    }

    /// Read-only view of the store.
    pub fn store(&self) -> &AssignmentStore {
        &self.store
    }

    /// The engine behind this session.
    pub fn engine(&self) -> &RoleAssignmentEngine {
        &self.engine
    }

    /// Local decision for `user` attempting `action`.
    pub fn is_allowed(&self, user: &str, action: Action) -> bool {
        check::is_allowed(&self.store, user, action)
    }

    /// Decide every action for `user`.
    pub fn simulate(&self, user: &str) -> Simulation {
        let roles = self.store.roles_of(user);
        Simulation {
            user: user.to_string(),
            roles: roles.to_vec(),
            decisions: Action::all()
                .into_iter()
                .map(|action| (action, check::permits(roles, action)))
                .collect(),
        }
    }

    /// Delete the protected resource group on behalf of `user`.
    ///
    /// Requires [`check::can_delete`]; the deletion is only started, not
    /// awaited to completion.
    pub async fn delete_resource(&self, user: &str) -> AccessResult<()> {
        if !self.is_allowed(user, Action::Delete) {
            return Err(AccessError::Forbidden {
                user: user.to_string(),
                action: Action::Delete,
            });
        }
        info!(user, "Deleting resource group");
        self.engine.delete_resource_group().await
    }
}
