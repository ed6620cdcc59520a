use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    application::repos::{EmpresasRepo, RepoError},
    domain::entities::EmpresaRecord,
    domain::types::EmpresaStatus,
};

use super::{PostgresRepositories, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct EmpresaRow {
    id: Uuid,
    nome_completo: String,
    nome_abreviado: String,
    status: EmpresaStatus,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<EmpresaRow> for EmpresaRecord {
    fn from(row: EmpresaRow) -> Self {
        Self {
            id: row.id,
            nome_completo: row.nome_completo,
            nome_abreviado: row.nome_abreviado,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl EmpresasRepo for PostgresRepositories {
    async fn find_empresa(&self, id: Uuid) -> Result<Option<EmpresaRecord>, RepoError> {
        let row = sqlx::query_as::<_, EmpresaRow>(
            r#"
            SELECT id, nome_completo, nome_abreviado, status, created_at, updated_at
            FROM empresas_clientes
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(EmpresaRecord::from))
    }

    async fn list_empresas(&self) -> Result<Vec<EmpresaRecord>, RepoError> {
        let rows = sqlx::query_as::<_, EmpresaRow>(
            r#"
            SELECT id, nome_completo, nome_abreviado, status, created_at, updated_at
            FROM empresas_clientes
            ORDER BY LOWER(nome_abreviado)
            "#,
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(EmpresaRecord::from).collect())
    }
}
