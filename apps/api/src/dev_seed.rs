use async_trait::async_trait;

use agora_application::{CategoryService, CreateCategoryInput, PrivilegeChangeInput};
use agora_core::{AppError, AppResult, CallerContext};
use agora_domain::{CategoryId, PrivilegeNames};
use agora_infrastructure::{
    ADMINISTRATORS_GROUP, InMemoryIdentityDirectory, PostgresIdentityDirectory,
    REGISTERED_USERS_GROUP,
};
use tracing::info;

const DEV_SEED_ADMIN: (u64, &str) = (1, "admin");
const DEV_SEED_MODERATOR: (u64, &str) = (2, "moderator");
const DEV_SEED_MEMBER: (u64, &str) = (3, "member");
const DEV_SEED_MODERATORS_GROUP: &str = "moderators";

const DEV_SEED_CATEGORIES: &[(&str, &str)] = &[
    ("Announcements", "News from the forum staff."),
    ("General Discussion", "Anything that fits nowhere else."),
    ("Help", "Questions about using the forum."),
];

/// Identity writes needed to seed a development forum.
#[async_trait]
pub trait SeedDirectory: Send + Sync {
    /// Registers a user; an existing uid is left untouched.
    async fn ensure_user(&self, uid: u64, username: &str) -> AppResult<()>;

    /// Registers a group when missing.
    async fn ensure_group(&self, name: &str) -> AppResult<()>;

    /// Adds a user to a group.
    async fn add_member(&self, group: &str, uid: u64) -> AppResult<()>;
}

#[async_trait]
impl SeedDirectory for InMemoryIdentityDirectory {
    async fn ensure_user(&self, uid: u64, username: &str) -> AppResult<()> {
        match self.add_user(uid, username).await {
            Err(AppError::Conflict(_)) => Ok(()),
            result => result,
        }
    }

    async fn ensure_group(&self, name: &str) -> AppResult<()> {
        self.add_group(name).await
    }

    async fn add_member(&self, group: &str, uid: u64) -> AppResult<()> {
        InMemoryIdentityDirectory::add_member(self, group, uid).await
    }
}

#[async_trait]
impl SeedDirectory for PostgresIdentityDirectory {
    async fn ensure_user(&self, uid: u64, username: &str) -> AppResult<()> {
        PostgresIdentityDirectory::ensure_user(self, uid, username).await
    }

    async fn ensure_group(&self, name: &str) -> AppResult<()> {
        PostgresIdentityDirectory::ensure_group(self, name).await
    }

    async fn add_member(&self, group: &str, uid: u64) -> AppResult<()> {
        PostgresIdentityDirectory::add_member(self, group, uid).await
    }
}

/// Seeds users, groups, categories and a few privilege overrides.
///
/// Categories are only created on an empty forum, so rerunning the seed keeps
/// existing data.
pub async fn run(
    category_service: &CategoryService,
    directory: &dyn SeedDirectory,
) -> AppResult<()> {
    seed_identities(directory).await?;

    let admin = CallerContext::new(DEV_SEED_ADMIN.0, None);
    if category_service.get(&admin, CategoryId::new(1)?).await?.is_some() {
        info!("dev seed categories already present, skipping");
        return Ok(());
    }

    let mut created = Vec::with_capacity(DEV_SEED_CATEGORIES.len());
    for (name, description) in DEV_SEED_CATEGORIES {
        let category = category_service
            .create(
                &admin,
                CreateCategoryInput {
                    name: (*name).to_owned(),
                    description: (*description).to_owned(),
                    parent_cid: None,
                    order: None,
                },
            )
            .await?;
        created.push(category.cid());
    }

    let [announcements, general, _help] = created.as_slice() else {
        return Err(AppError::Internal(
            "dev seed created an unexpected number of categories".to_owned(),
        ));
    };

    // Announcements are read-only for regular members.
    change(
        category_service,
        &admin,
        announcements.to_string(),
        &["groups:topics:create", "groups:topics:reply"],
        REGISTERED_USERS_GROUP,
        false,
    )
    .await?;
    change(
        category_service,
        &admin,
        general.to_string(),
        &["groups:moderate", "groups:posts:view_deleted"],
        DEV_SEED_MODERATORS_GROUP,
        true,
    )
    .await?;
    change(
        category_service,
        &admin,
        "0".to_owned(),
        &["groups:admin:categories", "groups:ban", "groups:mute"],
        DEV_SEED_MODERATORS_GROUP,
        true,
    )
    .await?;

    info!(categories = created.len(), "dev seed completed");
    Ok(())
}

async fn seed_identities(directory: &dyn SeedDirectory) -> AppResult<()> {
    for (uid, username) in [DEV_SEED_ADMIN, DEV_SEED_MODERATOR, DEV_SEED_MEMBER] {
        directory.ensure_user(uid, username).await?;
    }

    directory.ensure_group(DEV_SEED_MODERATORS_GROUP).await?;
    directory
        .add_member(ADMINISTRATORS_GROUP, DEV_SEED_ADMIN.0)
        .await?;
    directory
        .add_member(DEV_SEED_MODERATORS_GROUP, DEV_SEED_MODERATOR.0)
        .await
}

async fn change(
    category_service: &CategoryService,
    caller: &CallerContext,
    scope: String,
    privileges: &[&str],
    member: &str,
    set: bool,
) -> AppResult<()> {
    category_service
        .set_privilege(
            caller,
            PrivilegeChangeInput {
                scope,
                privilege: PrivilegeNames::Many(
                    privileges.iter().map(|name| (*name).to_owned()).collect(),
                ),
                member: member.to_owned(),
                set,
            },
        )
        .await
}
