use std::sync::Arc;

use agora_application::{
    AuditLogQuery, CategoryRepository, CategoryService, CategoryUpdate, CreateCategoryInput,
    PrivilegeChangeInput, PrivilegeRegistry,
};
use agora_core::{AppError, CallerContext};
use agora_domain::{CategoryChanges, CategoryId, PrivilegeNames};

use super::InMemoryCategoryRepository;
use crate::in_memory_audit_repository::InMemoryAuditRepository;
use crate::in_memory_identity_directory::InMemoryIdentityDirectory;
use crate::in_memory_privilege_registry::InMemoryPrivilegeRegistry;
use crate::privilege_table::is_granted;

struct Stores {
    directory: Arc<InMemoryIdentityDirectory>,
    registry: Arc<InMemoryPrivilegeRegistry>,
    repository: Arc<InMemoryCategoryRepository>,
}

fn stores() -> Stores {
    let directory = Arc::new(InMemoryIdentityDirectory::new());
    let registry = Arc::new(InMemoryPrivilegeRegistry::new(directory.clone()));
    let repository = Arc::new(InMemoryCategoryRepository::new(registry.clone()));

    Stores {
        directory,
        registry,
        repository,
    }
}

fn input(name: &str, parent_cid: Option<CategoryId>) -> CreateCategoryInput {
    CreateCategoryInput {
        name: name.to_owned(),
        description: String::new(),
        parent_cid,
        order: None,
    }
}

#[tokio::test]
async fn create_assigns_sequential_ids_and_default_grants() {
    let stores = stores();

    let first = stores.repository.create_category(input("News", None)).await;
    let second = stores.repository.create_category(input("Help", None)).await;
    assert!(first.is_ok());
    assert!(second.is_ok());
    let first = first.unwrap_or_else(|_| unreachable!());
    let second = second.unwrap_or_else(|_| unreachable!());
    assert_eq!(first.as_u64(), 1);
    assert_eq!(second.as_u64(), 2);

    let found = stores
        .repository
        .find_category(second)
        .await
        .unwrap_or_default();
    assert_eq!(found.as_ref().map(|category| category.slug()), Some("2/help"));
    assert_eq!(found.as_ref().map(|category| category.order()), Some(2));

    let guest = stores.registry.category_access(first, 0).await;
    assert!(guest.unwrap_or_default().read);
}

#[tokio::test]
async fn create_rejects_unknown_parent_and_blank_name() {
    let stores = stores();
    let missing = CategoryId::new(40).unwrap_or_else(|_| unreachable!());

    assert!(matches!(
        stores.repository.create_category(input("Child", Some(missing))).await,
        Err(AppError::Validation(_))
    ));
    assert!(matches!(
        stores.repository.create_category(input("  ", None)).await,
        Err(AppError::Validation(_))
    ));
}

#[tokio::test]
async fn update_batch_is_all_or_nothing() {
    let stores = stores();
    let cid = stores
        .repository
        .create_category(input("News", None))
        .await
        .unwrap_or_else(|_| unreachable!());
    let missing = CategoryId::new(99).unwrap_or_else(|_| unreachable!());

    let result = stores
        .repository
        .update_categories(&[
            CategoryUpdate {
                cid,
                changes: CategoryChanges {
                    name: Some("Announcements".to_owned()),
                    ..CategoryChanges::default()
                },
            },
            CategoryUpdate {
                cid: missing,
                changes: CategoryChanges::default(),
            },
        ])
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));

    let name = stores.repository.category_name(cid).await.unwrap_or_default();
    assert_eq!(name.as_deref(), Some("News"));

    let updated = stores
        .repository
        .update_categories(&[CategoryUpdate {
            cid,
            changes: CategoryChanges {
                name: Some("Announcements".to_owned()),
                disabled: Some(true),
                ..CategoryChanges::default()
            },
        }])
        .await;
    assert_eq!(updated.unwrap_or_default(), vec![cid]);

    let category = stores.repository.find_category(cid).await.unwrap_or_default();
    assert_eq!(
        category.as_ref().map(|category| category.slug()),
        Some("1/announcements")
    );
    assert_eq!(category.map(|category| category.disabled()), Some(true));
}

#[tokio::test]
async fn purge_reparents_children_and_drops_grants() {
    let stores = stores();
    let parent = stores
        .repository
        .create_category(input("Parent", None))
        .await
        .unwrap_or_else(|_| unreachable!());
    let child = stores
        .repository
        .create_category(input("Child", Some(parent)))
        .await
        .unwrap_or_else(|_| unreachable!());

    assert!(stores.repository.purge_category(parent, 1).await.is_ok());

    assert!(
        stores
            .repository
            .find_category(parent)
            .await
            .unwrap_or_default()
            .is_none()
    );
    let orphan = stores.repository.find_category(child).await.unwrap_or_default();
    assert_eq!(orphan.and_then(|category| category.parent_cid()), None);
    assert!(!stores.registry.category_access(parent, 0).await.unwrap_or_default().read);

    assert!(matches!(
        stores.repository.purge_category(parent, 1).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn categories_for_caller_keep_request_order() {
    let stores = stores();
    let first = stores
        .repository
        .create_category(input("First", None))
        .await
        .unwrap_or_else(|_| unreachable!());
    let second = stores
        .repository
        .create_category(input("Second", None))
        .await
        .unwrap_or_else(|_| unreachable!());
    let missing = CategoryId::new(77).unwrap_or_else(|_| unreachable!());

    let categories = stores
        .repository
        .categories_for_caller(&[second, missing, first], 0)
        .await
        .unwrap_or_default();
    let ids: Vec<CategoryId> = categories.iter().map(|category| category.cid()).collect();
    assert_eq!(ids, vec![second, first]);
}

#[tokio::test]
async fn category_service_round_trips_privileges_through_memory_stores() {
    let stores = stores();
    let audit = Arc::new(InMemoryAuditRepository::new());
    assert!(stores.directory.add_user(12, "alice").await.is_ok());
    assert!(stores.directory.add_user(1, "root").await.is_ok());
    assert!(stores.directory.add_member("administrators", 1).await.is_ok());

    let service = CategoryService::new(
        stores.directory.clone(),
        stores.registry.clone(),
        stores.repository.clone(),
        audit.clone(),
        audit,
    );
    let caller = CallerContext::new(1, None);

    for name in ["One", "Two", "Three", "Four", "Five"] {
        assert!(service.create(&caller, input(name, None)).await.is_ok());
    }

    let changed = service
        .set_privilege(
            &caller,
            PrivilegeChangeInput {
                scope: "5".to_owned(),
                privilege: PrivilegeNames::Many(vec![
                    "topics:create".to_owned(),
                    "chat".to_owned(),
                ]),
                member: "12".to_owned(),
                set: true,
            },
        )
        .await;
    assert!(changed.is_ok());

    let listing = service.get_privileges(&caller, "5").await;
    assert!(listing.is_ok());
    let listing = listing.unwrap_or_else(|_| unreachable!());
    assert!(is_granted(&listing, "12", "topics:create"));
    assert!(!listing.user_privileges.iter().any(|name| name == "chat"));

    let global = service
        .get_privileges(&caller, "0")
        .await
        .unwrap_or_else(|_| unreachable!());
    assert!(!is_granted(&global, "12", "chat"));

    let site_wide = service
        .set_privilege(
            &caller,
            PrivilegeChangeInput {
                scope: "0".to_owned(),
                privilege: PrivilegeNames::from("chat"),
                member: "12".to_owned(),
                set: true,
            },
        )
        .await;
    assert!(site_wide.is_ok());
    let global = service
        .get_privileges(&caller, "0")
        .await
        .unwrap_or_else(|_| unreachable!());
    assert!(is_granted(&global, "12", "chat"));

    let entries = service
        .list_audit_log(&caller, AuditLogQuery::default())
        .await
        .unwrap_or_default();
    assert_eq!(entries.len(), 2);
}

#[tokio::test]
async fn non_canonical_uid_is_not_a_member_and_grants_nothing() {
    let stores = stores();
    let audit = Arc::new(InMemoryAuditRepository::new());
    assert!(stores.directory.add_user(12, "alice").await.is_ok());

    let service = CategoryService::new(
        stores.directory.clone(),
        stores.registry.clone(),
        stores.repository.clone(),
        audit.clone(),
        audit,
    );
    let caller = CallerContext::new(1, None);
    let cid = service
        .create(&caller, input("General", None))
        .await
        .unwrap_or_else(|_| unreachable!())
        .cid();

    for member in ["012", " 12", "+12"] {
        let changed = service
            .set_privilege(
                &caller,
                PrivilegeChangeInput {
                    scope: cid.to_string(),
                    privilege: PrivilegeNames::from("moderate"),
                    member: member.to_owned(),
                    set: true,
                },
            )
            .await;
        assert!(
            matches!(changed, Err(AppError::NoUserOrGroup(_))),
            "member {member:?} must be rejected"
        );
    }

    let access = stores
        .registry
        .category_access(cid, 12)
        .await
        .unwrap_or_default();
    assert_eq!(access.privileges.get("moderate"), Some(&false));
    let entries = service
        .list_audit_log(&caller, AuditLogQuery::default())
        .await
        .unwrap_or_default();
    assert!(entries.is_empty());

    let canonical = service
        .set_privilege(
            &caller,
            PrivilegeChangeInput {
                scope: cid.to_string(),
                privilege: PrivilegeNames::from("moderate"),
                member: "12".to_owned(),
                set: true,
            },
        )
        .await;
    assert!(canonical.is_ok());
    let access = stores
        .registry
        .category_access(cid, 12)
        .await
        .unwrap_or_default();
    assert_eq!(access.privileges.get("moderate"), Some(&true));
}

#[tokio::test]
async fn readers_lose_access_after_group_grant_is_rescinded() {
    let stores = stores();
    let audit = Arc::new(InMemoryAuditRepository::new());
    let service = CategoryService::new(
        stores.directory.clone(),
        stores.registry.clone(),
        stores.repository.clone(),
        audit.clone(),
        audit,
    );
    let caller = CallerContext::new(0, None);
    let category = service
        .create(&caller, input("Public", None))
        .await
        .unwrap_or_else(|_| unreachable!());
    let cid = category.cid();

    assert!(service.get(&caller, cid).await.unwrap_or_default().is_some());

    let rescinded = service
        .set_privilege(
            &caller,
            PrivilegeChangeInput {
                scope: cid.to_string(),
                privilege: PrivilegeNames::from("groups:read"),
                member: "guests".to_owned(),
                set: false,
            },
        )
        .await;
    assert!(rescinded.is_ok());
    assert!(service.get(&caller, cid).await.unwrap_or_default().is_none());
}
