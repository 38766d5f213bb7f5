use std::collections::{BTreeMap, HashSet};
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use agora_core::{AppError, AppResult, CallerContext};
use agora_domain::{
    AuditAction, Category, CategoryAccess, CategoryChanges, CategoryId, PrivilegeListing,
    PrivilegeNames, PrivilegeScope, PrivilegeSet,
};

use crate::category_ports::{
    AuditDetail, AuditEvent, AuditLogEntry, AuditLogQuery, AuditLogRepository, AuditRepository,
    CategoryRepository, CategoryUpdate, CreateCategoryInput, IdentityDirectory,
    PrivilegeChangeInput, PrivilegeRegistry,
};

use super::CategoryService;

#[derive(Debug, Clone, PartialEq, Eq)]
enum RegistryCall {
    PrivilegeList(PrivilegeScope),
    Give(PrivilegeScope, Vec<String>, String),
    Rescind(PrivilegeScope, Vec<String>, String),
    List(PrivilegeScope, u64),
    CategoryAccess(CategoryId, u64),
}

#[derive(Default)]
struct FakeIdentityDirectory {
    users: HashSet<String>,
    groups: HashSet<String>,
    unavailable: bool,
}

#[async_trait]
impl IdentityDirectory for FakeIdentityDirectory {
    async fn user_exists(&self, member: &str) -> AppResult<bool> {
        if self.unavailable {
            return Err(AppError::Internal("user lookup unavailable".to_owned()));
        }
        Ok(self.users.contains(member))
    }

    async fn group_exists(&self, member: &str) -> AppResult<bool> {
        Ok(self.groups.contains(member))
    }
}

struct RecordingPrivilegeRegistry {
    admin: PrivilegeSet,
    global: PrivilegeSet,
    category: PrivilegeSet,
    readable: bool,
    failing_scope: Option<PrivilegeScope>,
    calls: Mutex<Vec<RegistryCall>>,
}

impl Default for RecordingPrivilegeRegistry {
    fn default() -> Self {
        Self {
            admin: PrivilegeSet::from_names(["admin:x", "admin:settings"]),
            global: PrivilegeSet::from_names(["global:y", "chat"]),
            category: PrivilegeSet::from_names(["read", "find", "topics:create"]),
            readable: true,
            failing_scope: None,
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl RecordingPrivilegeRegistry {
    async fn calls(&self) -> Vec<RegistryCall> {
        self.calls.lock().await.clone()
    }

    async fn mutations(&self) -> Vec<RegistryCall> {
        self.calls()
            .await
            .into_iter()
            .filter(|call| matches!(call, RegistryCall::Give(..) | RegistryCall::Rescind(..)))
            .collect()
    }

    fn fail_if_configured(&self, scope: PrivilegeScope) -> AppResult<()> {
        if self.failing_scope == Some(scope) {
            return Err(AppError::Internal(format!("registry write failed for {scope}")));
        }
        Ok(())
    }
}

#[async_trait]
impl PrivilegeRegistry for RecordingPrivilegeRegistry {
    async fn privilege_list(&self, scope: PrivilegeScope) -> AppResult<PrivilegeSet> {
        self.calls
            .lock()
            .await
            .push(RegistryCall::PrivilegeList(scope));

        Ok(match scope {
            PrivilegeScope::Admin => self.admin.clone(),
            PrivilegeScope::Global => self.global.clone(),
            PrivilegeScope::Category(_) => self.category.clone(),
        })
    }

    async fn give(
        &self,
        scope: PrivilegeScope,
        privileges: &[String],
        member: &str,
    ) -> AppResult<()> {
        self.fail_if_configured(scope)?;
        self.calls.lock().await.push(RegistryCall::Give(
            scope,
            privileges.to_vec(),
            member.to_owned(),
        ));
        Ok(())
    }

    async fn rescind(
        &self,
        scope: PrivilegeScope,
        privileges: &[String],
        member: &str,
    ) -> AppResult<()> {
        self.fail_if_configured(scope)?;
        self.calls.lock().await.push(RegistryCall::Rescind(
            scope,
            privileges.to_vec(),
            member.to_owned(),
        ));
        Ok(())
    }

    async fn list(&self, scope: PrivilegeScope, caller_uid: u64) -> AppResult<PrivilegeListing> {
        self.calls
            .lock()
            .await
            .push(RegistryCall::List(scope, caller_uid));

        Ok(PrivilegeListing {
            scope,
            user_privileges: Vec::new(),
            group_privileges: Vec::new(),
            users: Vec::new(),
            groups: Vec::new(),
        })
    }

    async fn category_access(&self, cid: CategoryId, uid: u64) -> AppResult<CategoryAccess> {
        self.calls
            .lock()
            .await
            .push(RegistryCall::CategoryAccess(cid, uid));

        Ok(CategoryAccess {
            read: self.readable,
            privileges: BTreeMap::from([("read".to_owned(), self.readable)]),
        })
    }
}

#[derive(Default)]
struct FakeCategoryRepository {
    categories: Mutex<BTreeMap<CategoryId, Category>>,
    purged: Mutex<Vec<(CategoryId, u64)>>,
    updates: Mutex<Vec<CategoryUpdate>>,
}

impl FakeCategoryRepository {
    async fn seed(&self, cid: u64, name: &str) {
        let cid = test_cid(cid);
        let category = Category::new(cid, name, "", None, 1, false)
            .unwrap_or_else(|error| panic!("invalid seed category: {error}"));
        self.categories.lock().await.insert(cid, category);
    }
}

#[async_trait]
impl CategoryRepository for FakeCategoryRepository {
    async fn find_category(&self, cid: CategoryId) -> AppResult<Option<Category>> {
        Ok(self.categories.lock().await.get(&cid).cloned())
    }

    async fn create_category(&self, input: CreateCategoryInput) -> AppResult<CategoryId> {
        let mut categories = self.categories.lock().await;
        let next = categories
            .keys()
            .last()
            .map_or(1, |cid| cid.as_u64() + 1);
        let cid = CategoryId::new(next)?;
        let category = Category::new(
            cid,
            input.name,
            input.description,
            input.parent_cid,
            input.order.unwrap_or(1),
            false,
        )?;
        categories.insert(cid, category);
        Ok(cid)
    }

    async fn update_categories(&self, updates: &[CategoryUpdate]) -> AppResult<Vec<CategoryId>> {
        self.updates.lock().await.extend(updates.iter().cloned());
        Ok(updates.iter().map(|update| update.cid).collect())
    }

    async fn category_name(&self, cid: CategoryId) -> AppResult<Option<String>> {
        Ok(self
            .categories
            .lock()
            .await
            .get(&cid)
            .map(|category| category.name().as_str().to_owned()))
    }

    async fn purge_category(&self, cid: CategoryId, uid: u64) -> AppResult<()> {
        self.categories.lock().await.remove(&cid);
        self.purged.lock().await.push((cid, uid));
        Ok(())
    }

    async fn categories_for_caller(
        &self,
        cids: &[CategoryId],
        _uid: u64,
    ) -> AppResult<Vec<Category>> {
        let categories = self.categories.lock().await;
        Ok(cids
            .iter()
            .filter_map(|cid| categories.get(cid).cloned())
            .collect())
    }
}

#[derive(Default)]
struct RecordingAuditRepository {
    events: Mutex<Vec<AuditEvent>>,
}

#[async_trait]
impl AuditRepository for RecordingAuditRepository {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        self.events.lock().await.push(event);
        Ok(())
    }
}

#[async_trait]
impl AuditLogRepository for RecordingAuditRepository {
    async fn list_recent_entries(&self, query: AuditLogQuery) -> AppResult<Vec<AuditLogEntry>> {
        Ok(self
            .events
            .lock()
            .await
            .iter()
            .rev()
            .filter(|event| query.action.is_none_or(|action| action == event.action))
            .skip(query.offset)
            .take(query.limit)
            .enumerate()
            .map(|(index, event)| AuditLogEntry {
                event_id: index.to_string(),
                uid: event.uid,
                ip: event.ip.map(|ip| ip.to_string()),
                action: event.action,
                detail: event.detail.clone(),
                created_at: "2026-01-01T00:00:00Z".to_owned(),
            })
            .collect())
    }
}

struct Harness {
    service: CategoryService,
    registry: Arc<RecordingPrivilegeRegistry>,
    categories: Arc<FakeCategoryRepository>,
    audit: Arc<RecordingAuditRepository>,
}

fn harness_with(registry: RecordingPrivilegeRegistry, directory: FakeIdentityDirectory) -> Harness {
    let registry = Arc::new(registry);
    let categories = Arc::new(FakeCategoryRepository::default());
    let audit = Arc::new(RecordingAuditRepository::default());
    let service = CategoryService::new(
        Arc::new(directory),
        registry.clone(),
        categories.clone(),
        audit.clone(),
        audit.clone(),
    );

    Harness {
        service,
        registry,
        categories,
        audit,
    }
}

fn harness() -> Harness {
    harness_with(RecordingPrivilegeRegistry::default(), known_members())
}

fn known_members() -> FakeIdentityDirectory {
    FakeIdentityDirectory {
        users: HashSet::from(["7".to_owned()]),
        groups: HashSet::from(["moderators".to_owned()]),
        unavailable: false,
    }
}

fn caller() -> CallerContext {
    CallerContext::new(1, Some(IpAddr::V4(Ipv4Addr::new(192, 0, 2, 10))))
}

fn test_cid(value: u64) -> CategoryId {
    CategoryId::new(value).unwrap_or_else(|error| panic!("invalid test cid: {error}"))
}

fn names(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_owned()).collect()
}

fn change(scope: &str, privileges: &[&str], member: &str, set: bool) -> PrivilegeChangeInput {
    PrivilegeChangeInput {
        scope: scope.to_owned(),
        privilege: PrivilegeNames::Many(names(privileges)),
        member: member.to_owned(),
        set,
    }
}

#[tokio::test]
async fn unknown_member_is_rejected_before_any_mutation() {
    let harness = harness();

    let result = harness
        .service
        .set_privilege(&caller(), change("0", &["admin:x"], "ghost", true))
        .await;

    assert!(matches!(result, Err(AppError::NoUserOrGroup(_))));
    assert!(harness.registry.calls().await.is_empty());
    assert!(harness.audit.events.lock().await.is_empty());
}

#[tokio::test]
async fn group_members_are_accepted() {
    let harness = harness();

    let result = harness
        .service
        .set_privilege(&caller(), change("3", &["read"], "moderators", true))
        .await;

    assert!(result.is_ok());
    assert_eq!(
        harness.registry.mutations().await,
        vec![RegistryCall::Give(
            PrivilegeScope::Category(test_cid(3)),
            names(&["read"]),
            "moderators".to_owned()
        )]
    );
}

#[tokio::test]
async fn identity_lookup_failure_propagates() {
    let harness = harness_with(
        RecordingPrivilegeRegistry::default(),
        FakeIdentityDirectory {
            unavailable: true,
            ..known_members()
        },
    );

    let result = harness
        .service
        .set_privilege(&caller(), change("0", &["admin:x"], "7", true))
        .await;

    assert!(matches!(result, Err(AppError::Internal(_))));
    assert!(harness.registry.calls().await.is_empty());
}

#[tokio::test]
async fn empty_privilege_list_is_invalid_data() {
    let harness = harness();

    let result = harness
        .service
        .set_privilege(&caller(), change("0", &[], "7", true))
        .await;

    let Err(error) = result else {
        panic!("empty privilege list should be rejected");
    };
    assert_eq!(error.code(), "invalid-data");
    assert!(harness.registry.calls().await.is_empty());
    assert!(harness.audit.events.lock().await.is_empty());
}

#[tokio::test]
async fn site_wide_request_partitions_between_admin_and_global() {
    let harness = harness();

    let result = harness
        .service
        .set_privilege(
            &caller(),
            change("0", &["admin:x", "global:y", "unknown:z"], "7", true),
        )
        .await;

    assert!(result.is_ok());
    assert_eq!(
        harness.registry.calls().await,
        vec![
            RegistryCall::PrivilegeList(PrivilegeScope::Admin),
            RegistryCall::Give(PrivilegeScope::Admin, names(&["admin:x"]), "7".to_owned()),
            RegistryCall::PrivilegeList(PrivilegeScope::Global),
            RegistryCall::Give(PrivilegeScope::Global, names(&["global:y"]), "7".to_owned()),
        ]
    );
}

#[tokio::test]
async fn non_numeric_scope_is_treated_as_site_wide() {
    let harness = harness();

    let result = harness
        .service
        .set_privilege(&caller(), change("admin", &["admin:settings"], "7", false))
        .await;

    assert!(result.is_ok());
    assert_eq!(
        harness.registry.mutations().await,
        vec![RegistryCall::Rescind(
            PrivilegeScope::Admin,
            names(&["admin:settings"]),
            "7".to_owned()
        )]
    );
}

#[tokio::test]
async fn site_wide_scopes_without_matches_are_skipped() {
    let harness = harness();

    let result = harness
        .service
        .set_privilege(&caller(), change("0", &["bogus"], "7", true))
        .await;

    assert!(result.is_ok());
    assert!(harness.registry.mutations().await.is_empty());
    assert_eq!(harness.audit.events.lock().await.len(), 1);
}

#[tokio::test]
async fn category_scope_applies_even_an_empty_batch() {
    let harness = harness();

    let result = harness
        .service
        .set_privilege(&caller(), change("5", &["bogus"], "7", true))
        .await;

    assert!(result.is_ok());
    assert_eq!(
        harness.registry.mutations().await,
        vec![RegistryCall::Give(
            PrivilegeScope::Category(test_cid(5)),
            Vec::new(),
            "7".to_owned()
        )]
    );
}

#[tokio::test]
async fn rescind_is_dispatched_to_rescind() {
    let harness = harness();

    let result = harness
        .service
        .set_privilege(&caller(), change("5", &["read", "find"], "7", false))
        .await;

    assert!(result.is_ok());
    assert_eq!(
        harness.registry.mutations().await,
        vec![RegistryCall::Rescind(
            PrivilegeScope::Category(test_cid(5)),
            names(&["read", "find"]),
            "7".to_owned()
        )]
    );
}

#[tokio::test]
async fn audit_event_keeps_the_unfiltered_request() {
    let harness = harness();

    let result = harness
        .service
        .set_privilege(
            &caller(),
            change("0", &["admin:x", "global:y", "unknown:z"], "7", true),
        )
        .await;
    assert!(result.is_ok());

    let events = harness.audit.events.lock().await.clone();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].uid, 1);
    assert_eq!(events[0].action, AuditAction::PrivilegeChange);
    assert_eq!(
        events[0].detail,
        AuditDetail::PrivilegeChange {
            privilege: "admin:x,global:y,unknown:z".to_owned(),
            cid: "0".to_owned(),
            action: "grant".to_owned(),
            target: "7".to_owned(),
        }
    );
}

#[tokio::test]
async fn single_privilege_name_is_normalized() {
    let harness = harness();

    let result = harness
        .service
        .set_privilege(
            &caller(),
            PrivilegeChangeInput {
                scope: "5".to_owned(),
                privilege: PrivilegeNames::from("read"),
                member: "7".to_owned(),
                set: true,
            },
        )
        .await;

    assert!(result.is_ok());
    assert_eq!(
        harness.registry.mutations().await,
        vec![RegistryCall::Give(
            PrivilegeScope::Category(test_cid(5)),
            names(&["read"]),
            "7".to_owned()
        )]
    );
}

#[tokio::test]
async fn global_failure_keeps_admin_changes_and_skips_audit() {
    let harness = harness_with(
        RecordingPrivilegeRegistry {
            failing_scope: Some(PrivilegeScope::Global),
            ..RecordingPrivilegeRegistry::default()
        },
        known_members(),
    );

    let result = harness
        .service
        .set_privilege(&caller(), change("0", &["admin:x", "global:y"], "7", true))
        .await;

    assert!(matches!(result, Err(AppError::Internal(_))));
    assert_eq!(
        harness.registry.mutations().await,
        vec![RegistryCall::Give(
            PrivilegeScope::Admin,
            names(&["admin:x"]),
            "7".to_owned()
        )]
    );
    assert!(harness.audit.events.lock().await.is_empty());
}

#[tokio::test]
async fn negative_scope_is_invalid_data() {
    let harness = harness();

    let result = harness
        .service
        .set_privilege(&caller(), change("-4", &["read"], "7", true))
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
    assert!(harness.registry.mutations().await.is_empty());
}

#[tokio::test]
async fn privilege_listing_routes_by_scope_sentinel() {
    let harness = harness();
    let caller = caller();

    for raw in ["admin", "0", "categories", "5"] {
        let listing = harness.service.get_privileges(&caller, raw).await;
        assert!(listing.is_ok());
    }

    assert_eq!(
        harness.registry.calls().await,
        vec![
            RegistryCall::List(PrivilegeScope::Admin, 1),
            RegistryCall::List(PrivilegeScope::Global, 1),
            RegistryCall::List(PrivilegeScope::Global, 1),
            RegistryCall::List(PrivilegeScope::Category(test_cid(5)), 1),
        ]
    );
}

#[tokio::test]
async fn get_returns_readable_category() {
    let harness = harness();
    harness.categories.seed(2, "General").await;

    let result = harness.service.get(&caller(), test_cid(2)).await;

    let Ok(Some(category)) = result else {
        panic!("category should be visible");
    };
    assert_eq!(category.name().as_str(), "General");
    assert!(
        harness
            .registry
            .calls()
            .await
            .contains(&RegistryCall::CategoryAccess(test_cid(2), 1))
    );
}

#[tokio::test]
async fn get_hides_unreadable_or_missing_categories() {
    let hidden = harness_with(
        RecordingPrivilegeRegistry {
            readable: false,
            ..RecordingPrivilegeRegistry::default()
        },
        known_members(),
    );
    hidden.categories.seed(2, "Staff").await;

    let result = hidden.service.get(&caller(), test_cid(2)).await;
    assert!(matches!(result, Ok(None)));

    let missing = harness();
    let result = missing.service.get(&caller(), test_cid(9)).await;
    assert!(matches!(result, Ok(None)));
}

#[tokio::test]
async fn create_returns_the_stored_category() {
    let harness = harness();
    harness.categories.seed(1, "Announcements").await;

    let result = harness
        .service
        .create(
            &caller(),
            CreateCategoryInput {
                name: "Help Desk".to_owned(),
                description: "Ask away".to_owned(),
                parent_cid: Some(test_cid(1)),
                order: None,
            },
        )
        .await;

    let Ok(category) = result else {
        panic!("category should be created");
    };
    assert_eq!(category.cid(), test_cid(2));
    assert_eq!(category.slug(), "2/help-desk");
    assert_eq!(category.parent_cid(), Some(test_cid(1)));
}

#[tokio::test]
async fn update_requires_a_payload() {
    let harness = harness();

    let missing = harness.service.update(&caller(), None).await;
    assert!(matches!(missing, Err(AppError::Validation(_))));

    let empty = harness.service.update(&caller(), Some(Vec::new())).await;
    assert!(matches!(empty, Err(AppError::Validation(_))));
    assert!(harness.categories.updates.lock().await.is_empty());
}

#[tokio::test]
async fn update_forwards_to_the_store() {
    let harness = harness();
    let update = CategoryUpdate {
        cid: test_cid(4),
        changes: CategoryChanges {
            name: Some("Renamed".to_owned()),
            ..CategoryChanges::default()
        },
    };

    let result = harness
        .service
        .update(&caller(), Some(vec![update.clone()]))
        .await;

    assert_eq!(result.ok(), Some(vec![test_cid(4)]));
    assert_eq!(harness.categories.updates.lock().await.clone(), vec![update]);
}

#[tokio::test]
async fn delete_purges_and_records_the_name() {
    let harness = harness();
    harness.categories.seed(6, "Off Topic").await;

    let result = harness.service.delete(&caller(), test_cid(6)).await;

    assert!(result.is_ok());
    assert_eq!(
        harness.categories.purged.lock().await.clone(),
        vec![(test_cid(6), 1)]
    );

    let events = harness.audit.events.lock().await.clone();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].action, AuditAction::CategoryPurge);
    assert_eq!(
        events[0].detail,
        AuditDetail::CategoryPurge {
            cid: test_cid(6),
            name: "Off Topic".to_owned(),
        }
    );
}

#[tokio::test]
async fn delete_of_missing_category_is_not_found() {
    let harness = harness();

    let result = harness.service.delete(&caller(), test_cid(6)).await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
    assert!(harness.categories.purged.lock().await.is_empty());
    assert!(harness.audit.events.lock().await.is_empty());
}

#[tokio::test]
async fn audit_log_lists_recorded_events() {
    let harness = harness();
    harness.categories.seed(6, "Off Topic").await;
    assert!(harness.service.delete(&caller(), test_cid(6)).await.is_ok());
    assert!(
        harness
            .service
            .set_privilege(&caller(), change("5", &["read"], "7", true))
            .await
            .is_ok()
    );

    let entries = harness
        .service
        .list_audit_log(
            &caller(),
            AuditLogQuery {
                action: Some(AuditAction::CategoryPurge),
                ..AuditLogQuery::default()
            },
        )
        .await;

    let Ok(entries) = entries else {
        panic!("audit log should be listed");
    };
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].ip.as_deref(), Some("192.0.2.10"));

    let rejected = harness
        .service
        .list_audit_log(
            &caller(),
            AuditLogQuery {
                limit: 0,
                ..AuditLogQuery::default()
            },
        )
        .await;
    assert!(rejected.is_err());
}
