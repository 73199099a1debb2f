//! Scenario tests for the role assignment engine and session.
//!
//! The in-memory provider stands in for the resource manager. Each test seeds
//! provider-side assignments, starts a session (which syncs them into the
//! store) and checks both the store and the provider afterwards.

use std::sync::Arc;
use std::time::Duration;

use access_engine::{AccessError, EngineConfig, RoleAssignmentEngine, Session};
use access_provider::{MemoryProvider, Operation, ResourceGroupStatus};
use access_rbac::{check, Action, CatalogConfig, Role, RoleCatalog};
use uuid::Uuid;

const USER_A: Uuid = Uuid::from_u128(0x11111111_1111_1111_1111_111111111111);
const USER_B: Uuid = Uuid::from_u128(0x22222222_2222_2222_2222_222222222222);
const USER_C: Uuid = Uuid::from_u128(0x33333333_3333_3333_3333_333333333333);

/// Test fixture providing a session over a shared in-memory provider.
struct TestFixture {
    provider: MemoryProvider,
    catalog: RoleCatalog,
    config: EngineConfig,
}

impl TestFixture {
    fn new() -> Self {
        Self {
            provider: MemoryProvider::new(),
            catalog: RoleCatalog::new(CatalogConfig::default().roles).unwrap(),
            config: EngineConfig {
                subscription_id: "sub-1".to_string(),
                timeout: Duration::from_secs(5),
                ..EngineConfig::default()
            },
        }
    }

    fn role(&self, name: &str) -> Role {
        self.catalog.role_by_name(name).unwrap().clone()
    }

    fn scope(&self) -> String {
        self.config.scope()
    }

    async fn seed(&self, assignment_name: &str, principal: Uuid, role: &str) {
        self.provider
            .seed_assignment(
                &self.scope(),
                assignment_name,
                principal,
                self.role(role).external_id,
            )
            .await;
    }

    async fn session(&self) -> Session {
        let (catalog, directory) = CatalogConfig::default().build().unwrap();
        let engine = RoleAssignmentEngine::new(
            catalog,
            directory,
            Arc::new(self.provider.clone()),
            self.config.clone(),
        );
        let mut session = Session::new(engine);
        session.start().await.unwrap();
        session
    }

    /// Role names the provider holds for a principal.
    async fn provider_roles(&self, principal: Uuid) -> Vec<String> {
        self.provider
            .assignments(&self.scope())
            .await
            .into_iter()
            .filter(|a| a.principal_id == principal)
            .filter_map(|a| {
                self.catalog
                    .role_by_external_id(&a.role_external_id)
                    .map(|r| r.name.clone())
            })
            .collect()
    }
}

fn names(roles: &[Role]) -> Vec<&str> {
    roles.iter().map(|r| r.name.as_str()).collect()
}

#[tokio::test]
async fn test_reference_scenario() {
    let fixture = TestFixture::new();
    fixture.seed("b-reader", USER_B, "Reader").await;
    fixture.seed("c-contributor", USER_C, "Contributor").await;
    let mut session = fixture.session().await;

    assert!(session.roles_of("UserA").is_empty());
    assert_eq!(names(session.roles_of("UserB")), vec!["Reader"]);
    assert_eq!(names(session.roles_of("UserC")), vec!["Contributor"]);

    let outcome = session.assign_role("UserB", "Contributor").await.unwrap();
    assert_eq!(outcome.upgraded_from().map(|r| r.name.as_str()), Some("Reader"));
    assert_eq!(names(session.roles_of("UserB")), vec!["Contributor"]);
    assert_eq!(fixture.provider_roles(USER_B).await, vec!["Contributor"]);

    let err = session.assign_role("UserC", "Reader").await.unwrap_err();
    assert!(matches!(err, AccessError::InsufficientUpgrade { .. }));
    assert_eq!(names(session.roles_of("UserC")), vec!["Contributor"]);

    session.assign_role("UserA", "Owner").await.unwrap();
    assert_eq!(names(session.roles_of("UserA")), vec!["Owner"]);
    assert!(session.is_allowed("UserA", Action::Delete));
    assert!(!session.is_allowed("UserB", Action::Delete));
}

#[tokio::test]
async fn test_every_strict_upgrade_succeeds() {
    let ranks = ["Reader", "Contributor", "Owner"];
    for (i, from) in ranks.iter().enumerate() {
        for to in &ranks[i + 1..] {
            let fixture = TestFixture::new();
            fixture.seed("existing", USER_B, from).await;
            let mut session = fixture.session().await;

            session.assign_role("UserB", to).await.unwrap();
            assert_eq!(names(session.roles_of("UserB")), vec![*to]);
            assert_eq!(fixture.provider_roles(USER_B).await, vec![to.to_string()]);
        }
    }
}

#[tokio::test]
async fn test_every_non_upgrade_is_rejected_without_provider_calls() {
    let ranks = ["Reader", "Contributor", "Owner"];
    for (i, held) in ranks.iter().enumerate() {
        for requested in &ranks[..=i] {
            let fixture = TestFixture::new();
            fixture.seed("existing", USER_C, held).await;
            let mut session = fixture.session().await;
            let before = fixture.provider.stats().await;

            let err = session.assign_role("UserC", requested).await.unwrap_err();
            match err {
                AccessError::InsufficientUpgrade {
                    user,
                    current,
                    requested: asked,
                } => {
                    assert_eq!(user, "UserC");
                    assert_eq!(current, *held);
                    assert_eq!(asked, *requested);
                }
                other => panic!("unexpected error: {:?}", other),
            }
            assert_eq!(names(session.roles_of("UserC")), vec![*held]);
            assert_eq!(fixture.provider.stats().await, before);
        }
    }
}

#[tokio::test]
async fn test_invalid_role_never_calls_provider() {
    let fixture = TestFixture::new();
    let mut session = fixture.session().await;
    let before = fixture.provider.stats().await;

    for name in ["Admin", "reader", "", "OWNER"] {
        let err = session.assign_role("UserA", name).await.unwrap_err();
        assert!(matches!(err, AccessError::InvalidRole(_)));
    }
    assert_eq!(fixture.provider.stats().await, before);
}

#[tokio::test]
async fn test_multiple_synced_roles_collapse_to_one() {
    let fixture = TestFixture::new();
    fixture.seed("b-reader", USER_B, "Reader").await;
    fixture.seed("b-reader-dup", USER_B, "Reader").await;
    fixture.seed("b-contributor", USER_B, "Contributor").await;
    let mut session = fixture.session().await;
    assert_eq!(session.roles_of("UserB").len(), 3);

    let outcome = session.assign_role("UserB", "Owner").await.unwrap();
    assert_eq!(outcome.removed.len(), 3);
    assert!(outcome.failed_removals.is_empty());
    assert_eq!(names(session.roles_of("UserB")), vec!["Owner"]);
    assert_eq!(fixture.provider_roles(USER_B).await, vec!["Owner"]);
}

#[tokio::test]
async fn test_removal_failure_does_not_abort_grant() {
    let fixture = TestFixture::new();
    fixture.seed("b-reader", USER_B, "Reader").await;
    let mut session = fixture.session().await;
    fixture.provider.fail(Operation::DeleteAssignment).await;

    let outcome = session.assign_role("UserB", "Contributor").await.unwrap();
    assert!(outcome.removed.is_empty());
    assert_eq!(outcome.failed_removals.len(), 1);
    assert_eq!(outcome.failed_removals[0].role.name, "Reader");
    assert_eq!(names(session.roles_of("UserB")), vec!["Contributor"]);

    let mut held = fixture.provider_roles(USER_B).await;
    held.sort();
    assert_eq!(held, vec!["Contributor", "Reader"]);
}

#[tokio::test]
async fn test_grant_failure_keeps_store_but_not_removed_roles() {
    let fixture = TestFixture::new();
    fixture.seed("b-reader", USER_B, "Reader").await;
    let mut session = fixture.session().await;
    fixture.provider.fail(Operation::CreateAssignment).await;

    let err = session.assign_role("UserB", "Contributor").await.unwrap_err();
    assert!(matches!(err, AccessError::AssignmentFailed { .. }));

    // The store is left as it was; the provider already lost the old role.
    assert_eq!(names(session.roles_of("UserB")), vec!["Reader"]);
    assert!(fixture.provider_roles(USER_B).await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_grant_timeout_is_assignment_failure() {
    let fixture = TestFixture::new();
    let mut session = fixture.session().await;
    fixture.provider.set_latency(Some(Duration::from_secs(60))).await;

    let err = session.assign_role("UserA", "Reader").await.unwrap_err();
    match err {
        AccessError::AssignmentFailed { source, .. } => assert!(source.is_timeout()),
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(session.roles_of("UserA").is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_sync_timeout_is_sync_failure() {
    let fixture = TestFixture::new();
    fixture.provider.seed_resource_group("RBACDemo").await;
    fixture.provider.set_latency(Some(Duration::from_secs(60))).await;

    let (catalog, directory) = CatalogConfig::default().build().unwrap();
    let engine = RoleAssignmentEngine::new(
        catalog,
        directory,
        Arc::new(fixture.provider.clone()),
        fixture.config.clone(),
    );
    let mut session = Session::new(engine);

    // ensure_resource_group times out first and surfaces as a provider error.
    let err = session.start().await.unwrap_err();
    assert!(matches!(err, AccessError::Provider(ref e) if e.is_timeout()));

    let mut store = session.store().clone();
    let err = session.engine().sync(&mut store).await.unwrap_err();
    assert!(matches!(err, AccessError::SyncFailed(ref e) if e.is_timeout()));
}

#[tokio::test]
async fn test_sync_skips_unknown_principals_and_roles() {
    let fixture = TestFixture::new();
    fixture.seed("b-reader", USER_B, "Reader").await;
    fixture
        .provider
        .seed_assignment(&fixture.scope(), "stranger", Uuid::from_u128(99), fixture.role("Owner").external_id)
        .await;
    fixture
        .provider
        .seed_assignment(&fixture.scope(), "custom-role", USER_A, Uuid::from_u128(42))
        .await;
    fixture
        .provider
        .seed_assignment("/subscriptions/sub-1/resourceGroups/Other", "elsewhere", USER_C, fixture.role("Owner").external_id)
        .await;

    let (catalog, directory) = CatalogConfig::default().build().unwrap();
    let engine = RoleAssignmentEngine::new(
        catalog,
        directory,
        Arc::new(fixture.provider.clone()),
        fixture.config.clone(),
    );
    let mut session = Session::new(engine);
    let report = session.start().await.unwrap();

    assert_eq!(report.resource_group, ResourceGroupStatus::Created);
    assert_eq!(report.sync.matched, 1);
    assert_eq!(report.sync.skipped, 2);
    assert!(session.roles_of("UserA").is_empty());
    assert!(session.roles_of("UserC").is_empty());
}

#[tokio::test]
async fn test_delete_resource_requires_owner() {
    let fixture = TestFixture::new();
    fixture.seed("c-contributor", USER_C, "Contributor").await;
    let mut session = fixture.session().await;

    let err = session.delete_resource("UserC").await.unwrap_err();
    assert!(matches!(err, AccessError::Forbidden { action: Action::Delete, .. }));
    assert!(fixture.provider.has_resource_group("RBACDemo").await);

    session.assign_role("UserA", "Owner").await.unwrap();
    session.delete_resource("UserA").await.unwrap();
    assert!(!fixture.provider.has_resource_group("RBACDemo").await);
    assert_eq!(fixture.provider.stats().await.delete_group_calls, 1);
}

#[tokio::test]
async fn test_simulation_decisions() {
    let fixture = TestFixture::new();
    fixture.seed("b-reader", USER_B, "Reader").await;
    fixture.seed("c-contributor", USER_C, "Contributor").await;
    let mut session = fixture.session().await;
    session.assign_role("UserA", "Owner").await.unwrap();

    let a = session.simulate("UserA");
    assert!(a.allowed(Action::Read) && a.allowed(Action::Modify) && a.allowed(Action::Delete));

    let b = session.simulate("UserB");
    assert!(b.allowed(Action::Read));
    assert!(!b.allowed(Action::Modify));
    assert!(!b.allowed(Action::Delete));

    let c = session.simulate("UserC");
    assert_eq!(
        c.decisions,
        vec![(Action::Read, true), (Action::Modify, true), (Action::Delete, false)]
    );
}

#[test]
fn test_renamed_top_role_cannot_delete() {
    let top = Role::new("Administrator", Uuid::from_u128(7), 3);
    assert!(check::can_modify(&[top.clone()]));
    assert!(!check::can_delete(&[top]));
}
