//! Authorization provider abstraction.
//!
//! The provider is the source of truth for real-world role assignments. The
//! engine reaches it only through [`AuthorizationProvider`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ProviderResult;

/// Outcome of making sure a resource group exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceGroupStatus {
    /// The group was already there and is reused.
    Existing,
    /// The group was created by this call.
    Created,
}

/// A role assignment as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderAssignment {
    /// Provider-side assignment name, used to delete it.
    pub assignment_name: String,
    /// Principal the role is bound to.
    pub principal_id: Uuid,
    /// Role definition id.
    pub role_external_id: Uuid,
}

/// Authorization provider trait.
///
/// Every method is attempted once by callers; implementations must not retry
/// on their own.
#[async_trait]
pub trait AuthorizationProvider: Send + Sync {
    /// Make sure the resource group exists, creating it if needed.
    ///
    /// An already existing group is success.
    async fn ensure_resource_group(
        &self,
        name: &str,
        location: &str,
    ) -> ProviderResult<ResourceGroupStatus>;

    /// List role assignments at a scope.
    async fn list_assignments(&self, scope: &str) -> ProviderResult<Vec<ProviderAssignment>>;

    /// Bind a principal to a role at a scope under `assignment_name`.
    async fn create_assignment(
        &self,
        scope: &str,
        assignment_name: &str,
        principal_id: Uuid,
        role_external_id: Uuid,
    ) -> ProviderResult<()>;

    /// Remove a role assignment by name.
    async fn delete_assignment(&self, scope: &str, assignment_name: &str) -> ProviderResult<()>;

    /// Start deleting a resource group.
    ///
    /// Returns once the deletion has been accepted, not when it completes.
    async fn delete_resource_group(&self, name: &str) -> ProviderResult<()>;
}

/// Build the scope string for a resource group.
///
/// # Examples
///
/// ```
/// use access_provider::resource_group_scope;
///
/// assert_eq!(
///     resource_group_scope("sub-1", "RBACDemo"),
///     "/subscriptions/sub-1/resourceGroups/RBACDemo"
/// );
/// ```
pub fn resource_group_scope(subscription_id: &str, resource_group: &str) -> String {
    format!(
        "/subscriptions/{}/resourceGroups/{}",
        subscription_id, resource_group
    )
}
