//! In-memory authorization provider.
//!
//! Keeps resource groups and role assignments in process memory. Suitable
//! for offline runs and testing; failures and latency can be injected per
//! operation.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{ProviderError, ProviderResult};
use crate::provider::{AuthorizationProvider, ProviderAssignment, ResourceGroupStatus};

/// Provider operations that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `ensure_resource_group`
    EnsureResourceGroup,
    /// `list_assignments`
    ListAssignments,
    /// `create_assignment`
    CreateAssignment,
    /// `delete_assignment`
    DeleteAssignment,
    /// `delete_resource_group`
    DeleteResourceGroup,
}

/// Call counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderStats {
    /// Calls to `ensure_resource_group`
    pub ensure_calls: u64,
    /// Calls to `list_assignments`
    pub list_calls: u64,
    /// Calls to `create_assignment`
    pub create_calls: u64,
    /// Calls to `delete_assignment`
    pub delete_calls: u64,
    /// Calls to `delete_resource_group`
    pub delete_group_calls: u64,
}

impl ProviderStats {
    /// Total number of provider calls.
    pub fn total(&self) -> u64 {
        self.ensure_calls
            + self.list_calls
            + self.create_calls
            + self.delete_calls
            + self.delete_group_calls
    }
}

#[derive(Debug, Clone)]
struct StoredAssignment {
    scope: String,
    assignment: ProviderAssignment,
}

#[derive(Debug, Default)]
struct MemoryState {
    resource_groups: HashSet<String>,
    assignments: Vec<StoredAssignment>,
    failing: HashSet<Operation>,
    failing_once: HashSet<Operation>,
    latency: Option<Duration>,
    stats: ProviderStats,
}

/// In-memory provider implementation.
///
/// Clones share state, so a test can keep a handle for inspection while the
/// engine owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryProvider {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an existing assignment at `scope`.
    pub async fn seed_assignment(
        &self,
        scope: &str,
        assignment_name: &str,
        principal_id: Uuid,
        role_external_id: Uuid,
    ) {
        self.state.write().await.assignments.push(StoredAssignment {
            scope: scope.to_string(),
            assignment: ProviderAssignment {
                assignment_name: assignment_name.to_string(),
                principal_id,
                role_external_id,
            },
        });
    }

    /// Seed an existing resource group.
    pub async fn seed_resource_group(&self, name: &str) {
        self.state
            .write()
            .await
            .resource_groups
            .insert(name.to_string());
    }

    /// Make every future call of `operation` fail.
    pub async fn fail(&self, operation: Operation) {
        self.state.write().await.failing.insert(operation);
    }

    /// Make only the next call of `operation` fail.
    pub async fn fail_once(&self, operation: Operation) {
        self.state.write().await.failing_once.insert(operation);
    }

    /// Let `operation` succeed again.
    pub async fn recover(&self, operation: Operation) {
        self.state.write().await.failing.remove(&operation);
    }

    /// Delay every call by `latency` before it is served.
    pub async fn set_latency(&self, latency: Option<Duration>) {
        self.state.write().await.latency = latency;
    }

    /// Current call counters.
    pub async fn stats(&self) -> ProviderStats {
        self.state.read().await.stats.clone()
    }

    /// Assignments currently held at `scope`.
    pub async fn assignments(&self, scope: &str) -> Vec<ProviderAssignment> {
        self.state
            .read()
            .await
            .assignments
            .iter()
            .filter(|stored| stored.scope == scope)
            .map(|stored| stored.assignment.clone())
            .collect()
    }

    /// Whether a resource group exists.
    pub async fn has_resource_group(&self, name: &str) -> bool {
        self.state.read().await.resource_groups.contains(name)
    }

    /// Count the call, apply latency and report injected failure.
    async fn enter(&self, operation: Operation) -> ProviderResult<()> {
        let latency = {
            let mut state = self.state.write().await;
            let stats = &mut state.stats;
            match operation {
                Operation::EnsureResourceGroup => stats.ensure_calls += 1,
                Operation::ListAssignments => stats.list_calls += 1,
                Operation::CreateAssignment => stats.create_calls += 1,
                Operation::DeleteAssignment => stats.delete_calls += 1,
                Operation::DeleteResourceGroup => stats.delete_group_calls += 1,
            }
            state.latency
        };

        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let failed = {
            let mut state = self.state.write().await;
            state.failing_once.remove(&operation) || state.failing.contains(&operation)
        };
        if failed {
            return Err(ProviderError::Unavailable(format!(
                "{:?} failed (injected)",
                operation
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl AuthorizationProvider for MemoryProvider {
    async fn ensure_resource_group(
        &self,
        name: &str,
        _location: &str,
    ) -> ProviderResult<ResourceGroupStatus> {
        self.enter(Operation::EnsureResourceGroup).await?;
        let mut state = self.state.write().await;
        if state.resource_groups.insert(name.to_string()) {
            Ok(ResourceGroupStatus::Created)
        } else {
            Ok(ResourceGroupStatus::Existing)
        }
    }

    async fn list_assignments(&self, scope: &str) -> ProviderResult<Vec<ProviderAssignment>> {
        self.enter(Operation::ListAssignments).await?;
        Ok(self.assignments(scope).await)
    }

    async fn create_assignment(
        &self,
        scope: &str,
        assignment_name: &str,
        principal_id: Uuid,
        role_external_id: Uuid,
    ) -> ProviderResult<()> {
        self.enter(Operation::CreateAssignment).await?;
        let mut state = self.state.write().await;
        let taken = state
            .assignments
            .iter()
            .any(|stored| stored.scope == scope && stored.assignment.assignment_name == assignment_name);
        if taken {
            return Err(ProviderError::ApiError {
                status: 409,
                message: format!("Role assignment {} already exists", assignment_name),
            });
        }
        state.assignments.push(StoredAssignment {
            scope: scope.to_string(),
            assignment: ProviderAssignment {
                assignment_name: assignment_name.to_string(),
                principal_id,
                role_external_id,
            },
        });
        Ok(())
    }

    async fn delete_assignment(&self, scope: &str, assignment_name: &str) -> ProviderResult<()> {
        self.enter(Operation::DeleteAssignment).await?;
        let mut state = self.state.write().await;
        let before = state.assignments.len();
        state.assignments.retain(|stored| {
            !(stored.scope == scope && stored.assignment.assignment_name == assignment_name)
        });
        if state.assignments.len() == before {
            return Err(ProviderError::NotFound(assignment_name.to_string()));
        }
        Ok(())
    }

    async fn delete_resource_group(&self, name: &str) -> ProviderResult<()> {
        self.enter(Operation::DeleteResourceGroup).await?;
        let mut state = self.state.write().await;
        if !state.resource_groups.remove(name) {
            return Err(ProviderError::NotFound(name.to_string()));
        }
        Ok(())
    }
}
