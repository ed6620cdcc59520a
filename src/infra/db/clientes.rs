use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    application::repos::{ClienteParams, ClientesRepo, ClientesWriteRepo, RepoError},
    domain::entities::ClienteRecord,
    domain::types::ClienteStatus,
};

use super::{PostgresRepositories, map_sqlx_error};

const COLUMNS: &str = "id, nome_completo, email, funcao, empresa_id, status, descricao_status, \
    principal_contato, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct ClienteRow {
    id: Uuid,
    nome_completo: String,
    email: String,
    funcao: Option<String>,
    empresa_id: Uuid,
    status: ClienteStatus,
    descricao_status: Option<String>,
    principal_contato: bool,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<ClienteRow> for ClienteRecord {
    fn from(row: ClienteRow) -> Self {
        Self {
            id: row.id,
            nome_completo: row.nome_completo,
            email: row.email,
            funcao: row.funcao,
            empresa_id: row.empresa_id,
            status: row.status,
            descricao_status: row.descricao_status,
            principal_contato: row.principal_contato,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl ClientesRepo for PostgresRepositories {
    async fn find_cliente(&self, id: Uuid) -> Result<Option<ClienteRecord>, RepoError> {
        let row = sqlx::query_as::<_, ClienteRow>(&format!(
            "SELECT {COLUMNS} FROM clientes WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(ClienteRecord::from))
    }

    async fn list_clientes_by_empresa(
        &self,
        empresa_id: Uuid,
    ) -> Result<Vec<ClienteRecord>, RepoError> {
        let rows = sqlx::query_as::<_, ClienteRow>(&format!(
            r#"
            SELECT {COLUMNS}
            FROM clientes
            WHERE empresa_id = $1
            ORDER BY principal_contato DESC, LOWER(nome_completo)
            "#
        ))
        .bind(empresa_id)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(ClienteRecord::from).collect())
    }

    async fn find_cliente_by_email(
        &self,
        empresa_id: Uuid,
        email: &str,
    ) -> Result<Option<ClienteRecord>, RepoError> {
        let row = sqlx::query_as::<_, ClienteRow>(&format!(
            "SELECT {COLUMNS} FROM clientes WHERE empresa_id = $1 AND LOWER(email) = LOWER(TRIM($2))"
        ))
        .bind(empresa_id)
        .bind(email)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(ClienteRecord::from))
    }

    async fn list_principais(&self, empresa_id: Uuid) -> Result<Vec<ClienteRecord>, RepoError> {
        let rows = sqlx::query_as::<_, ClienteRow>(&format!(
            "SELECT {COLUMNS} FROM clientes WHERE empresa_id = $1 AND principal_contato"
        ))
        .bind(empresa_id)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(ClienteRecord::from).collect())
    }
}

#[async_trait]
impl ClientesWriteRepo for PostgresRepositories {
    async fn create_cliente(&self, params: ClienteParams) -> Result<ClienteRecord, RepoError> {
        let row = sqlx::query_as::<_, ClienteRow>(&format!(
            r#"
            INSERT INTO clientes (
                nome_completo, email, funcao, empresa_id, status, descricao_status,
                principal_contato
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(params.nome_completo)
        .bind(params.email)
        .bind(params.funcao)
        .bind(params.empresa_id)
        .bind(params.status)
        .bind(params.descricao_status)
        .bind(params.principal_contato)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn update_cliente(
        &self,
        id: Uuid,
        params: ClienteParams,
    ) -> Result<ClienteRecord, RepoError> {
        let row = sqlx::query_as::<_, ClienteRow>(&format!(
            r#"
            UPDATE clientes
            SET nome_completo = $2,
                email = $3,
                funcao = $4,
                empresa_id = $5,
                status = $6,
                descricao_status = $7,
                principal_contato = $8,
                updated_at = now()
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(params.nome_completo)
        .bind(params.email)
        .bind(params.funcao)
        .bind(params.empresa_id)
        .bind(params.status)
        .bind(params.descricao_status)
        .bind(params.principal_contato)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn update_cliente_status(
        &self,
        id: Uuid,
        status: ClienteStatus,
        descricao_status: Option<String>,
    ) -> Result<ClienteRecord, RepoError> {
        let row = sqlx::query_as::<_, ClienteRow>(&format!(
            r#"
            UPDATE clientes
            SET status = $2, descricao_status = $3, updated_at = now()
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(status)
        .bind(descricao_status)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn set_principal_contato(&self, id: Uuid, principal: bool) -> Result<(), RepoError> {
        sqlx::query(
            "UPDATE clientes SET principal_contato = $2, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .bind(principal)
        .execute(self.pool())
        .await
        .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn delete_cliente(&self, id: Uuid) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM clientes WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}
