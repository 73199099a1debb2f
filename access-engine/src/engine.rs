//! Role assignment engine.
//!
//! Validates role change requests against the rank order, removes superseded
//! assignments at the provider, grants the new role and commits the result
//! to the [`AssignmentStore`].
//!
//! A request runs validate → cleanup → grant → commit once. Cleanup is best
//! effort: removal failures are logged and reported in the outcome but never
//! abort the request. Only a failed grant fails the request, and roles removed
//! during cleanup are not restored when it does.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use access_provider::{
    resource_group_scope, AuthorizationProvider, ProviderError, ProviderResult,
    ResourceGroupStatus,
};
use access_rbac::{AssignmentStore, Role, RoleCatalog, User, UserDirectory};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

use crate::error::{AccessError, AccessResult};

/// Engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Subscription that owns the resource group.
    pub subscription_id: String,

    /// Protected resource group.
    pub resource_group: String,

    /// Location used when the resource group has to be created.
    pub location: String,

    /// Upper bound for every provider call.
    pub timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            subscription_id: "AZURE_SUBSCRIPTION_ID".to_string(),
            resource_group: "RBACDemo".to_string(),
            location: "eastus".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl EngineConfig {
    /// Scope string role assignments are made at.
    pub fn scope(&self) -> String {
        resource_group_scope(&self.subscription_id, &self.resource_group)
    }
}

/// A superseded role the provider could not remove.
#[derive(Debug)]
pub struct RemovalFailure {
    /// Role that stayed at the provider.
    pub role: Role,
    /// Why removal failed.
    pub error: ProviderError,
}

/// Result of a successful role assignment.
#[derive(Debug)]
pub struct AssignmentOutcome {
    /// User the role was assigned to.
    pub user: String,
    /// Role now held.
    pub role: Role,
    /// Provider-side name of the new assignment.
    pub assignment_name: String,
    /// Superseded roles removed at the provider.
    pub removed: Vec<Role>,
    /// Superseded roles whose removal failed.
    pub failed_removals: Vec<RemovalFailure>,
}

impl AssignmentOutcome {
    /// The role the user was upgraded from, if a removal happened.
    ///
    /// With several removals this is the last one.
    pub fn upgraded_from(&self) -> Option<&Role> {
        self.removed.last()
    }
}

/// Result of the startup sync pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Assignments recorded in the store.
    pub matched: usize,
    /// Assignments for unknown principals or roles.
    pub skipped: usize,
}

/// Role assignment engine.
pub struct RoleAssignmentEngine {
    catalog: RoleCatalog,
    directory: UserDirectory,
    provider: Arc<dyn AuthorizationProvider>,
    config: EngineConfig,
    scope: String,
}

impl std::fmt::Debug for RoleAssignmentEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoleAssignmentEngine")
            .field("scope", &self.scope)
            .field("roles", &self.catalog.roles().len())
            .field("users", &self.directory.len())
            .finish()
    }
}

impl RoleAssignmentEngine {
    /// Create a new engine.
    pub fn new(
        catalog: RoleCatalog,
        directory: UserDirectory,
        provider: Arc<dyn AuthorizationProvider>,
        config: EngineConfig,
    ) -> Self {
        let scope = config.scope();
        Self {
            catalog,
            directory,
            provider,
            config,
            scope,
        }
    }

    /// Known roles.
    pub fn catalog(&self) -> &RoleCatalog {
        &self.catalog
    }

    /// Known users.
    pub fn directory(&self) -> &UserDirectory {
        &self.directory
    }

    /// Engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Scope assignments are made at.
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Run a provider call under the configured timeout.
    async fn bounded<T>(&self, call: impl Future<Output = ProviderResult<T>>) -> ProviderResult<T> {
        match tokio::time::timeout(self.config.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout(self.config.timeout)),
        }
    }

    /// Make sure the protected resource group exists.
    #[instrument(skip(self), fields(resource_group = %self.config.resource_group))]
    pub async fn ensure_resource_group(&self) -> AccessResult<ResourceGroupStatus> {
        let status = self
            .bounded(
                self.provider
                    .ensure_resource_group(&self.config.resource_group, &self.config.location),
            )
            .await?;
        info!(?status, "Resource group ready");
        Ok(status)
    }

    /// Start deleting the protected resource group.
    ///
    /// This is not gated; see [`crate::Session::delete_resource`].
    #[instrument(skip(self), fields(resource_group = %self.config.resource_group))]
    pub async fn delete_resource_group(&self) -> AccessResult<()> {
        self.bounded(
            self.provider
                .delete_resource_group(&self.config.resource_group),
        )
        .await?;
        info!("Resource group deletion started");
        Ok(())
    }

    /// Load existing assignments from the provider into `store`.
    ///
    /// Assignments for principals or roles outside the catalog are skipped.
    #[instrument(skip(self, store), fields(scope = %self.scope))]
    pub async fn sync(&self, store: &mut AssignmentStore) -> AccessResult<SyncReport> {
        let assignments = self
            .bounded(self.provider.list_assignments(&self.scope))
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to list existing role assignments");
                AccessError::SyncFailed(e)
            })?;

        let mut report = SyncReport::default();
        for assignment in assignments {
            let user = self.directory.user_by_principal(&assignment.principal_id);
            let role = self.catalog.role_by_external_id(&assignment.role_external_id);
            match (user, role) {
                (Some(user), Some(role)) => {
                    store.add_role(&user.name, role.clone());
                    report.matched += 1;
                }
                _ => {
                    debug!(
                        assignment = %assignment.assignment_name,
                        principal_id = %assignment.principal_id,
                        role_id = %assignment.role_external_id,
                        "Skipping assignment outside the catalog"
                    );
                    report.skipped += 1;
                }
            }
        }

        info!(matched = report.matched, skipped = report.skipped, "Existing roles synchronized");
        Ok(report)
    }

    /// Assign `requested_role` to `user_name`, replacing any lower role.
    ///
    /// # Errors
    ///
    /// - [`AccessError::InvalidRole`] if the role is not in the catalog
    /// - [`AccessError::UnknownUser`] if the user is not in the directory
    /// - [`AccessError::InsufficientUpgrade`] if the user already holds an
    ///   equal or higher role
    /// - [`AccessError::AssignmentFailed`] if the provider rejects the grant
    ///
    /// Validation failures make no provider call and leave `store` untouched.
    #[instrument(skip(self, store))]
    pub async fn assign_role(
        &self,
        store: &mut AssignmentStore,
        user_name: &str,
        requested_role: &str,
    ) -> AccessResult<AssignmentOutcome> {
        let role = self
            .catalog
            .role_by_name(requested_role)
            .ok_or_else(|| AccessError::InvalidRole(requested_role.to_string()))?
            .clone();
        let user = self
            .directory
            .user_by_name(user_name)
            .ok_or_else(|| AccessError::UnknownUser(user_name.to_string()))?
            .clone();

        if let Some(current) = store.highest_role(&user.name) {
            if current.rank >= role.rank {
                return Err(AccessError::InsufficientUpgrade {
                    user: user.name,
                    current: current.name.clone(),
                    requested: role.name,
                });
            }
        }

        let superseded: Vec<Role> = store
            .roles_of(&user.name)
            .iter()
            .filter(|held| held.rank < role.rank)
            .cloned()
            .collect();

        let mut removed = Vec::new();
        let mut failed_removals = Vec::new();
        for old in superseded {
            match self.remove_assignment(&user, &old).await {
                Ok(true) => removed.push(old),
                Ok(false) => debug!(role = %old.name, "No provider assignment to remove"),
                Err(error) => {
                    warn!(
                        role = %old.name,
                        code = error.error_code(),
                        error = %error,
                        "Failed to remove superseded role"
                    );
                    failed_removals.push(RemovalFailure { role: old, error });
                }
            }
        }

        let assignment_name = new_assignment_name();
        if let Err(source) = self
            .bounded(self.provider.create_assignment(
                &self.scope,
                &assignment_name,
                user.principal_id,
                role.external_id,
            ))
            .await
        {
            error!(
                role = %role.name,
                code = source.error_code(),
                error = %source,
                "Failed to create role assignment"
            );
            return Err(AccessError::AssignmentFailed {
                user: user.name,
                role: role.name,
                source,
            });
        }

        store.set_roles(&user.name, vec![role.clone()]);
        info!(role = %role.name, assignment = %assignment_name, "Role assigned");

        Ok(AssignmentOutcome {
            user: user.name,
            role,
            assignment_name,
            removed,
            failed_removals,
        })
    }

    /// Delete the first provider assignment binding `user` to `role`.
    ///
    /// Returns `false` when the provider holds no such assignment.
    async fn remove_assignment(&self, user: &User, role: &Role) -> ProviderResult<bool> {
        let assignments = self
            .bounded(self.provider.list_assignments(&self.scope))
            .await?;

        let found = assignments.into_iter().find(|assignment| {
            assignment.principal_id == user.principal_id
                && assignment.role_external_id == role.external_id
        });

        match found {
            Some(assignment) => {
                self.bounded(
                    self.provider
                        .delete_assignment(&self.scope, &assignment.assignment_name),
                )
                .await?;
                debug!(assignment = %assignment.assignment_name, "Removed superseded assignment");
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Fresh random assignment name: 16 random bytes as lowercase hex.
pub fn new_assignment_name() -> String {
    let bytes: [u8; 16] = rand::random();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
