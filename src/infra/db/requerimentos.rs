use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::{
    application::repos::{
        CreateRequerimentoParams, RepoError, RequerimentoFilter, RequerimentosRepo,
        RequerimentosWriteRepo, UpdateRequerimentoParams,
    },
    domain::entities::RequerimentoRecord,
    domain::types::{RequerimentoStatus, TipoCobranca},
};

use super::{PostgresRepositories, map_sqlx_error};

const COLUMNS: &str = "id, chamado, cliente_id, modulo, descricao, data_envio, data_aprovacao, \
    horas_funcional, horas_tecnico, linguagem, tipo_cobranca, mes_cobranca, observacao, status, \
    enviado_faturamento, data_envio_faturamento, data_faturamento, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct RequerimentoRow {
    id: Uuid,
    chamado: String,
    cliente_id: Uuid,
    modulo: String,
    descricao: String,
    data_envio: Date,
    data_aprovacao: Option<Date>,
    horas_funcional: f64,
    horas_tecnico: f64,
    linguagem: String,
    tipo_cobranca: TipoCobranca,
    mes_cobranca: Option<String>,
    observacao: Option<String>,
    status: RequerimentoStatus,
    enviado_faturamento: bool,
    data_envio_faturamento: Option<OffsetDateTime>,
    data_faturamento: Option<OffsetDateTime>,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<RequerimentoRow> for RequerimentoRecord {
    fn from(row: RequerimentoRow) -> Self {
        Self {
            id: row.id,
            chamado: row.chamado,
            cliente_id: row.cliente_id,
            modulo: row.modulo,
            descricao: row.descricao,
            data_envio: row.data_envio,
            data_aprovacao: row.data_aprovacao,
            horas_funcional: row.horas_funcional,
            horas_tecnico: row.horas_tecnico,
            linguagem: row.linguagem,
            tipo_cobranca: row.tipo_cobranca,
            mes_cobranca: row.mes_cobranca,
            observacao: row.observacao,
            status: row.status,
            enviado_faturamento: row.enviado_faturamento,
            data_envio_faturamento: row.data_envio_faturamento,
            data_faturamento: row.data_faturamento,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl RequerimentosRepo for PostgresRepositories {
    async fn find_requerimento(&self, id: Uuid) -> Result<Option<RequerimentoRecord>, RepoError> {
        let row = sqlx::query_as::<_, RequerimentoRow>(&format!(
            "SELECT {COLUMNS} FROM requerimentos WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(RequerimentoRecord::from))
    }

    async fn list_requerimentos(
        &self,
        filter: &RequerimentoFilter,
    ) -> Result<Vec<RequerimentoRecord>, RepoError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {COLUMNS} FROM requerimentos WHERE 1 = 1"
        ));

        if let Some(status) = filter.status {
            qb.push(" AND status = ");
            qb.push_bind(status);
        }
        if let Some(cliente_id) = filter.cliente_id {
            qb.push(" AND cliente_id = ");
            qb.push_bind(cliente_id);
        }
        if let Some(mes) = filter.mes_cobranca.as_ref() {
            qb.push(" AND mes_cobranca = ");
            qb.push_bind(mes.clone());
        }
        if let Some(tipo) = filter.tipo_cobranca {
            qb.push(" AND tipo_cobranca = ");
            qb.push_bind(tipo);
        }
        qb.push(" ORDER BY data_envio DESC, chamado ASC");

        let rows = qb
            .build_query_as::<RequerimentoRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(RequerimentoRecord::from).collect())
    }
}

#[async_trait]
impl RequerimentosWriteRepo for PostgresRepositories {
    async fn create_requerimento(
        &self,
        params: CreateRequerimentoParams,
    ) -> Result<RequerimentoRecord, RepoError> {
        let row = sqlx::query_as::<_, RequerimentoRow>(&format!(
            r#"
            INSERT INTO requerimentos (
                chamado, cliente_id, modulo, descricao, data_envio, data_aprovacao,
                horas_funcional, horas_tecnico, linguagem, tipo_cobranca, mes_cobranca, observacao
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(params.chamado)
        .bind(params.cliente_id)
        .bind(params.modulo)
        .bind(params.descricao)
        .bind(params.data_envio)
        .bind(params.data_aprovacao)
        .bind(params.horas_funcional)
        .bind(params.horas_tecnico)
        .bind(params.linguagem)
        .bind(params.tipo_cobranca)
        .bind(params.mes_cobranca)
        .bind(params.observacao)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn update_requerimento(
        &self,
        params: UpdateRequerimentoParams,
    ) -> Result<RequerimentoRecord, RepoError> {
        let fields = params.fields;
        let row = sqlx::query_as::<_, RequerimentoRow>(&format!(
            r#"
            UPDATE requerimentos
            SET chamado = $2,
                cliente_id = $3,
                modulo = $4,
                descricao = $5,
                data_envio = $6,
                data_aprovacao = $7,
                horas_funcional = $8,
                horas_tecnico = $9,
                linguagem = $10,
                tipo_cobranca = $11,
                mes_cobranca = $12,
                observacao = $13,
                updated_at = now()
            WHERE id = $1
              AND status = 'lancado'::requerimento_status
              AND enviado_faturamento = FALSE
            RETURNING {COLUMNS}
            "#
        ))
        .bind(params.id)
        .bind(fields.chamado)
        .bind(fields.cliente_id)
        .bind(fields.modulo)
        .bind(fields.descricao)
        .bind(fields.data_envio)
        .bind(fields.data_aprovacao)
        .bind(fields.horas_funcional)
        .bind(fields.horas_tecnico)
        .bind(fields.linguagem)
        .bind(fields.tipo_cobranca)
        .bind(fields.mes_cobranca)
        .bind(fields.observacao)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn mark_enviado_faturamento(
        &self,
        id: Uuid,
        at: OffsetDateTime,
    ) -> Result<RequerimentoRecord, RepoError> {
        let row = sqlx::query_as::<_, RequerimentoRow>(&format!(
            r#"
            UPDATE requerimentos
            SET status = 'enviado_faturamento'::requerimento_status,
                enviado_faturamento = TRUE,
                data_envio_faturamento = $2,
                updated_at = $2
            WHERE id = $1
              AND status = 'lancado'::requerimento_status
              AND enviado_faturamento = FALSE
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(at)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn mark_faturados(
        &self,
        ids: &[Uuid],
        at: OffsetDateTime,
    ) -> Result<Vec<RequerimentoRecord>, RepoError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, RequerimentoRow>(&format!(
            r#"
            UPDATE requerimentos
            SET status = 'faturado'::requerimento_status,
                data_faturamento = $2,
                updated_at = $2
            WHERE id = ANY($1)
              AND status = 'enviado_faturamento'::requerimento_status
            RETURNING {COLUMNS}
            "#
        ))
        .bind(ids)
        .bind(at)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(RequerimentoRecord::from).collect())
    }

    async fn reset_to_lancado(&self, id: Uuid) -> Result<RequerimentoRecord, RepoError> {
        let row = sqlx::query_as::<_, RequerimentoRow>(&format!(
            r#"
            UPDATE requerimentos
            SET status = 'lancado'::requerimento_status,
                enviado_faturamento = FALSE,
                data_envio_faturamento = NULL,
                data_faturamento = NULL,
                updated_at = now()
            WHERE id = $1
              AND status <> 'lancado'::requerimento_status
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn delete_requerimento(&self, id: Uuid) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM requerimentos WHERE id = $1 AND enviado_faturamento = FALSE")
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
