use async_trait::async_trait;
use uuid::Uuid;

use crate::application::repos::{DisparosRepo, RepoError};

use super::util::convert_count;
use super::{PostgresRepositories, map_sqlx_error};

#[async_trait]
impl DisparosRepo for PostgresRepositories {
    async fn count_for_cliente(&self, cliente_id: Uuid) -> Result<u64, RepoError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM historico_disparos WHERE cliente_id = $1")
                .bind(cliente_id)
                .fetch_one(self.pool())
                .await
                .map_err(map_sqlx_error)?;

        convert_count(count)
    }
}
