//! Resource manager client.
//!
//! HTTP client for the Azure Resource Manager REST API. Covers resource group
//! existence and deletion plus role assignment listing, creation and removal.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument, warn};
use uuid::Uuid;

use crate::config::ProviderConfig;
use crate::error::{ProviderError, ProviderResult};
use crate::provider::{AuthorizationProvider, ProviderAssignment, ResourceGroupStatus};

const ROLE_ASSIGNMENTS_PATH: &str = "providers/Microsoft.Authorization/roleAssignments";

/// Resource manager client.
#[derive(Clone)]
pub struct ArmClient {
    /// HTTP client instance.
    client: Client,

    /// Endpoint and subscription configuration.
    config: ProviderConfig,
}

impl std::fmt::Debug for ArmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArmClient")
            .field("base_url", &self.config.base_url)
            .field("subscription_id", &self.config.subscription_id)
            .finish()
    }
}

impl ArmClient {
    /// Create a new resource manager client.
    pub fn new(config: ProviderConfig) -> ProviderResult<Self> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self { client, config })
    }

    /// Full role definition id for a role, as the API expects it.
    pub fn role_definition_id(&self, role_external_id: Uuid) -> String {
        format!(
            "/subscriptions/{}/providers/Microsoft.Authorization/roleDefinitions/{}",
            self.config.subscription_id, role_external_id
        )
    }

    fn resource_group_url(&self, name: &str) -> String {
        self.config.url(&format!(
            "/subscriptions/{}/resourcegroups/{}?api-version={}",
            self.config.subscription_id, name, self.config.resource_api_version
        ))
    }

    fn assignments_url(&self, scope: &str) -> String {
        self.config.url(&format!(
            "{}/{}?api-version={}",
            scope.trim_end_matches('/'),
            ROLE_ASSIGNMENTS_PATH,
            self.config.authorization_api_version
        ))
    }

    fn assignment_url(&self, scope: &str, assignment_name: &str) -> String {
        self.config.url(&format!(
            "{}/{}/{}?api-version={}",
            scope.trim_end_matches('/'),
            ROLE_ASSIGNMENTS_PATH,
            assignment_name,
            self.config.authorization_api_version
        ))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.config.access_token {
            Some(ref token) => request.header("Authorization", format!("Bearer {}", token)),
            None => request,
        }
    }

    /// Map non-success statuses to errors, passing successful responses through.
    async fn check_status(&self, response: Response, what: &str) -> ProviderResult<Response> {
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            error!("Resource manager authentication failed");
            return Err(ProviderError::AuthenticationFailed);
        }

        if status == StatusCode::NOT_FOUND {
            return Err(ProviderError::NotFound(what.to_string()));
        }

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            warn!("Resource manager API error ({}): {}", status.as_u16(), message);
            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl AuthorizationProvider for ArmClient {
    #[instrument(skip(self))]
    async fn ensure_resource_group(
        &self,
        name: &str,
        location: &str,
    ) -> ProviderResult<ResourceGroupStatus> {
        let url = self.resource_group_url(name);

        let response = self.authorize(self.client.get(&url)).send().await?;
        match self.check_status(response, name).await {
            Ok(_) => {
                debug!("Resource group {} already exists", name);
                return Ok(ResourceGroupStatus::Existing);
            }
            Err(ProviderError::NotFound(_)) => {}
            Err(e) => return Err(e),
        }

        debug!("Creating resource group {} in {}", name, location);
        let body = ResourceGroupBody {
            location: location.to_string(),
        };
        let response = self.authorize(self.client.put(&url).json(&body)).send().await?;
        self.check_status(response, name).await?;
        Ok(ResourceGroupStatus::Created)
    }

    #[instrument(skip(self))]
    async fn list_assignments(&self, scope: &str) -> ProviderResult<Vec<ProviderAssignment>> {
        let mut assignments = Vec::new();
        let mut next = Some(self.assignments_url(scope));

        while let Some(url) = next.take() {
            let response = self.authorize(self.client.get(&url)).send().await?;
            let page: AssignmentPage = self
                .check_status(response, scope)
                .await?
                .json()
                .await
                .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

            assignments.extend(page.value.into_iter().filter_map(AssignmentResource::into_assignment));
            next = page.next_link;
        }

        debug!("Listed {} role assignments", assignments.len());
        Ok(assignments)
    }

    #[instrument(skip(self))]
    async fn create_assignment(
        &self,
        scope: &str,
        assignment_name: &str,
        principal_id: Uuid,
        role_external_id: Uuid,
    ) -> ProviderResult<()> {
        let url = self.assignment_url(scope, assignment_name);
        let body = CreateAssignmentBody {
            properties: CreateAssignmentProperties {
                role_definition_id: self.role_definition_id(role_external_id),
                principal_id: principal_id.to_string(),
            },
        };

        let response = self.authorize(self.client.put(&url).json(&body)).send().await?;
        self.check_status(response, assignment_name).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_assignment(&self, scope: &str, assignment_name: &str) -> ProviderResult<()> {
        let url = self.assignment_url(scope, assignment_name);
        let response = self.authorize(self.client.delete(&url)).send().await?;
        self.check_status(response, assignment_name).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_resource_group(&self, name: &str) -> ProviderResult<()> {
        let url = self.resource_group_url(name);
        let response = self.authorize(self.client.delete(&url)).send().await?;
        self.check_status(response, name).await?;
        debug!("Deletion of resource group {} accepted", name);
        Ok(())
    }
}

/// Body for creating a resource group.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ResourceGroupBody {
    location: String,
}

/// Body for creating a role assignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CreateAssignmentBody {
    properties: CreateAssignmentProperties,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateAssignmentProperties {
    role_definition_id: String,
    principal_id: String,
}

/// One page of a role assignment listing.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssignmentPage {
    #[serde(default)]
    value: Vec<AssignmentResource>,
    next_link: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct AssignmentResource {
    name: String,
    properties: AssignmentProperties,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssignmentProperties {
    principal_id: String,
    role_definition_id: String,
}

impl AssignmentResource {
    /// Convert to a provider assignment, skipping entries with non-GUID ids.
    fn into_assignment(self) -> Option<ProviderAssignment> {
        let principal_id = match self.properties.principal_id.parse::<Uuid>() {
            Ok(id) => id,
            Err(_) => {
                warn!(assignment = %self.name, "Skipping assignment with unparsable principal id");
                return None;
            }
        };
        let role_external_id = match parse_role_definition_id(&self.properties.role_definition_id) {
            Some(id) => id,
            None => {
                warn!(assignment = %self.name, "Skipping assignment with unparsable role definition id");
                return None;
            }
        };

        Some(ProviderAssignment {
            assignment_name: self.name,
            principal_id,
            role_external_id,
        })
    }
}

/// Extract the role GUID from the last segment of a role definition id.
fn parse_role_definition_id(role_definition_id: &str) -> Option<Uuid> {
    role_definition_id
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .and_then(|segment| segment.parse().ok())
}
