use std::collections::{BTreeMap, BTreeSet};

use agora_application::IdentityDirectory;
use agora_core::{AppError, AppResult};
use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::privilege_catalogue::{SYSTEM_GROUPS, implicit_group};
use crate::privilege_table::canonical_uid;

/// In-memory directory of forum users and groups.
///
/// System groups exist from construction. Guests and registered users belong
/// to their implicit group without explicit membership.
#[derive(Debug)]
pub struct InMemoryIdentityDirectory {
    users: RwLock<BTreeMap<u64, String>>,
    groups: RwLock<BTreeMap<String, BTreeSet<u64>>>,
}

impl Default for InMemoryIdentityDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryIdentityDirectory {
    /// Creates a directory holding only the system groups.
    #[must_use]
    pub fn new() -> Self {
        let groups = SYSTEM_GROUPS
            .iter()
            .map(|name| ((*name).to_owned(), BTreeSet::new()))
            .collect();

        Self {
            users: RwLock::new(BTreeMap::new()),
            groups: RwLock::new(groups),
        }
    }

    /// Registers a user. Uid `0` is reserved for guests.
    pub async fn add_user(&self, uid: u64, username: impl Into<String>) -> AppResult<()> {
        if uid == 0 {
            return Err(AppError::Validation(
                "uid 0 is reserved for guests".to_owned(),
            ));
        }

        let mut users = self.users.write().await;
        if users.contains_key(&uid) {
            return Err(AppError::Conflict(format!("user '{uid}' already exists")));
        }

        users.insert(uid, username.into());
        Ok(())
    }

    /// Creates an empty group. Existing groups are left untouched.
    pub async fn add_group(&self, name: impl Into<String>) -> AppResult<()> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(AppError::Validation("group name must not be empty".to_owned()));
        }

        self.groups.write().await.entry(name).or_default();
        Ok(())
    }

    /// Adds an existing user to an existing group.
    pub async fn add_member(&self, group: &str, uid: u64) -> AppResult<()> {
        if !self.users.read().await.contains_key(&uid) {
            return Err(AppError::NotFound(format!("user '{uid}' does not exist")));
        }

        let mut groups = self.groups.write().await;
        let members = groups
            .get_mut(group)
            .ok_or_else(|| AppError::NotFound(format!("group '{group}' does not exist")))?;
        members.insert(uid);

        Ok(())
    }

    /// Returns explicit and implicit groups of a uid, sorted by name.
    pub async fn groups_of(&self, uid: u64) -> Vec<String> {
        let mut names: BTreeSet<String> = self
            .groups
            .read()
            .await
            .iter()
            .filter(|(_, members)| members.contains(&uid))
            .map(|(name, _)| name.clone())
            .collect();
        names.insert(implicit_group(uid).to_owned());

        names.into_iter().collect()
    }

    /// Returns every group name, sorted.
    pub async fn group_names(&self) -> Vec<String> {
        self.groups.read().await.keys().cloned().collect()
    }
}

#[async_trait]
impl IdentityDirectory for InMemoryIdentityDirectory {
    async fn user_exists(&self, member: &str) -> AppResult<bool> {
        let Some(uid) = canonical_uid(member) else {
            return Ok(false);
        };

        Ok(self.users.read().await.contains_key(&uid))
    }

    async fn group_exists(&self, member: &str) -> AppResult<bool> {
        Ok(self.groups.read().await.contains_key(member))
    }
}
