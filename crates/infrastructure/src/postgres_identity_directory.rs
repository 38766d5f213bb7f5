use async_trait::async_trait;
use sqlx::PgPool;

use agora_application::IdentityDirectory;
use agora_core::{AppError, AppResult};

use crate::postgres_ids::to_db_id;
use crate::privilege_catalogue::implicit_group;
use crate::privilege_table::canonical_uid;

/// PostgreSQL-backed directory of forum users and groups.
#[derive(Clone)]
pub struct PostgresIdentityDirectory {
    pool: PgPool,
}

impl PostgresIdentityDirectory {
    /// Creates a directory with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Registers a user, keeping an existing record untouched.
    pub async fn ensure_user(&self, uid: u64, username: &str) -> AppResult<()> {
        if uid == 0 {
            return Err(AppError::Validation(
                "uid 0 is reserved for guests".to_owned(),
            ));
        }

        sqlx::query(
            r#"
            INSERT INTO forum_users (uid, username)
            VALUES ($1, $2)
            ON CONFLICT (uid) DO NOTHING
            "#,
        )
        .bind(to_db_id(uid)?)
        .bind(username)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to save user '{uid}': {error}")))?;

        Ok(())
    }

    /// Creates a group when missing.
    pub async fn ensure_group(&self, name: &str) -> AppResult<()> {
        if name.trim().is_empty() {
            return Err(AppError::Validation("group name must not be empty".to_owned()));
        }

        sqlx::query(
            r#"
            INSERT INTO forum_groups (name)
            VALUES ($1)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(name)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to save group '{name}': {error}")))?;

        Ok(())
    }

    /// Adds an existing user to an existing group.
    pub async fn add_member(&self, group: &str, uid: u64) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO forum_group_members (group_name, uid)
            VALUES ($1, $2)
            ON CONFLICT (group_name, uid) DO NOTHING
            "#,
        )
        .bind(group)
        .bind(to_db_id(uid)?)
        .execute(&self.pool)
        .await
        .map_err(|error| match error {
            sqlx::Error::Database(database_error) if database_error.is_foreign_key_violation() => {
                AppError::NotFound(format!("group '{group}' or user '{uid}' does not exist"))
            }
            error => AppError::Internal(format!(
                "failed to add user '{uid}' to group '{group}': {error}"
            )),
        })?;

        Ok(())
    }

    /// Returns explicit and implicit groups of a uid, sorted by name.
    pub async fn groups_of(&self, uid: u64) -> AppResult<Vec<String>> {
        let mut groups = sqlx::query_scalar::<_, String>(
            r#"
            SELECT group_name
            FROM forum_group_members
            WHERE uid = $1
            "#,
        )
        .bind(to_db_id(uid)?)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list groups of user '{uid}': {error}"))
        })?;

        groups.push(implicit_group(uid).to_owned());
        groups.sort();
        groups.dedup();

        Ok(groups)
    }

    /// Returns every group name, sorted.
    pub async fn group_names(&self) -> AppResult<Vec<String>> {
        sqlx::query_scalar::<_, String>(
            r#"
            SELECT name
            FROM forum_groups
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list groups: {error}")))
    }
}

#[async_trait]
impl IdentityDirectory for PostgresIdentityDirectory {
    async fn user_exists(&self, member: &str) -> AppResult<bool> {
        let Some(uid) = canonical_uid(member).and_then(|uid| i64::try_from(uid).ok()) else {
            return Ok(false);
        };

        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (SELECT 1 FROM forum_users WHERE uid = $1)
            "#,
        )
        .bind(uid)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to look up user '{uid}': {error}")))
    }

    async fn group_exists(&self, member: &str) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (SELECT 1 FROM forum_groups WHERE name = $1)
            "#,
        )
        .bind(member)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to look up group '{member}': {error}"))
        })
    }
}
