use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    application::repos::{PermissionsRepo, RepoError, UserGroupRecord},
    domain::types::PermissionLevel,
};

use super::{PostgresRepositories, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct UserGroupRow {
    user_id: Uuid,
    group_id: Option<Uuid>,
}

#[async_trait]
impl PermissionsRepo for PostgresRepositories {
    async fn find_user_group(&self, user_id: Uuid) -> Result<Option<UserGroupRecord>, RepoError> {
        let row = sqlx::query_as::<_, UserGroupRow>(
            "SELECT user_id, group_id FROM user_group_assignments WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(|row| UserGroupRecord {
            user_id: row.user_id,
            group_id: row.group_id,
        }))
    }

    async fn screen_exists(&self, screen_key: &str) -> Result<bool, RepoError> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM screens WHERE key = $1)")
            .bind(screen_key)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)
    }

    async fn find_screen_permission(
        &self,
        group_id: Uuid,
        screen_key: &str,
    ) -> Result<Option<PermissionLevel>, RepoError> {
        sqlx::query_scalar(
            r#"
            SELECT permission_level
            FROM screen_permissions
            WHERE group_id = $1 AND screen_key = $2
            "#,
        )
        .bind(group_id)
        .bind(screen_key)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)
    }
}
