use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    application::repos::{CreateEspecialistaParams, EspecialistasRepo, RepoError},
    domain::entities::EspecialistaRecord,
};

use super::{PostgresRepositories, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct EspecialistaRow {
    id: Uuid,
    nome: String,
    email: Option<String>,
    ativo: bool,
    created_at: OffsetDateTime,
}

impl From<EspecialistaRow> for EspecialistaRecord {
    fn from(row: EspecialistaRow) -> Self {
        Self {
            id: row.id,
            nome: row.nome,
            email: row.email,
            ativo: row.ativo,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl EspecialistasRepo for PostgresRepositories {
    async fn list_active_especialistas(&self) -> Result<Vec<EspecialistaRecord>, RepoError> {
        let rows = sqlx::query_as::<_, EspecialistaRow>(
            r#"
            SELECT id, nome, email, ativo, created_at
            FROM especialistas
            WHERE ativo
            ORDER BY LOWER(nome)
            "#,
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(EspecialistaRecord::from).collect())
    }

    async fn create_especialista(
        &self,
        params: CreateEspecialistaParams,
    ) -> Result<EspecialistaRecord, RepoError> {
        let row = sqlx::query_as::<_, EspecialistaRow>(
            r#"
            INSERT INTO especialistas (nome, email)
            VALUES ($1, $2)
            RETURNING id, nome, email, ativo, created_at
            "#,
        )
        .bind(params.nome)
        .bind(params.email)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn deactivate_especialista(&self, id: Uuid) -> Result<EspecialistaRecord, RepoError> {
        let row = sqlx::query_as::<_, EspecialistaRow>(
            r#"
            UPDATE especialistas
            SET ativo = FALSE
            WHERE id = $1
            RETURNING id, nome, email, ativo, created_at
            "#,
        )
        .bind(id)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }
}
