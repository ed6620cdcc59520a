//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::domain::entities::{
    ClienteRecord, EmpresaRecord, EspecialistaRecord, RequerimentoRecord,
};
use crate::domain::error::{DomainError, ErrorCatalog, ErrorContext};
use crate::domain::types::{ClienteStatus, PermissionLevel, RequerimentoStatus, TipoCobranca};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("referenced record missing for foreign key `{constraint}`")]
    ForeignKey { constraint: String },
    #[error("integrity error: {message}")]
    Integrity { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }

    /// Failures that may resolve on their own.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Persistence(_) | Self::Timeout)
    }

    /// Lift an infrastructure failure into a domain catalogue. Callers translate
    /// `NotFound` and `Duplicate` themselves when they carry business meaning.
    pub fn into_domain<C: ErrorCatalog>(self, operation: &str) -> DomainError<C> {
        let code = match &self {
            Self::Timeout => C::TIMEOUT,
            Self::Persistence(_) | Self::Integrity { .. } | Self::Duplicate { .. } => C::DATABASE,
            Self::NotFound | Self::InvalidInput { .. } | Self::ForeignKey { .. } => C::UNKNOWN,
        };
        DomainError::from_code(code)
            .with_detail("cause", self.to_string())
            .with_context(ErrorContext::operation(operation))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequerimentoFilter {
    pub status: Option<RequerimentoStatus>,
    pub cliente_id: Option<Uuid>,
    /// `MM/YYYY`.
    pub mes_cobranca: Option<String>,
    pub tipo_cobranca: Option<TipoCobranca>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateRequerimentoParams {
    pub chamado: String,
    pub cliente_id: Uuid,
    pub modulo: String,
    pub descricao: String,
    pub data_envio: Date,
    pub data_aprovacao: Option<Date>,
    pub horas_funcional: f64,
    pub horas_tecnico: f64,
    pub linguagem: String,
    pub tipo_cobranca: TipoCobranca,
    pub mes_cobranca: Option<String>,
    pub observacao: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateRequerimentoParams {
    pub id: Uuid,
    pub fields: CreateRequerimentoParams,
}

#[async_trait]
pub trait RequerimentosRepo: Send + Sync {
    async fn find_requerimento(&self, id: Uuid) -> Result<Option<RequerimentoRecord>, RepoError>;

    async fn list_requerimentos(
        &self,
        filter: &RequerimentoFilter,
    ) -> Result<Vec<RequerimentoRecord>, RepoError>;
}

/// Lifecycle writes check the record's state in the same statement that changes it and
/// return [`RepoError::NotFound`] when no row is in the required state.
#[async_trait]
pub trait RequerimentosWriteRepo: Send + Sync {
    async fn create_requerimento(
        &self,
        params: CreateRequerimentoParams,
    ) -> Result<RequerimentoRecord, RepoError>;

    /// Only while `lancado` and not sent to billing.
    async fn update_requerimento(
        &self,
        params: UpdateRequerimentoParams,
    ) -> Result<RequerimentoRecord, RepoError>;

    /// `lancado` → `enviado_faturamento`.
    async fn mark_enviado_faturamento(
        &self,
        id: Uuid,
        at: OffsetDateTime,
    ) -> Result<RequerimentoRecord, RepoError>;

    /// Moves only records currently in `enviado_faturamento`; others are skipped.
    async fn mark_faturados(
        &self,
        ids: &[Uuid],
        at: OffsetDateTime,
    ) -> Result<Vec<RequerimentoRecord>, RepoError>;

    /// Back to `lancado` from a billing state, clearing the billing flag and both billing
    /// timestamps.
    async fn reset_to_lancado(&self, id: Uuid) -> Result<RequerimentoRecord, RepoError>;

    /// Only records never sent to billing.
    async fn delete_requerimento(&self, id: Uuid) -> Result<(), RepoError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClienteParams {
    pub nome_completo: String,
    pub email: String,
    pub funcao: Option<String>,
    pub empresa_id: Uuid,
    pub status: ClienteStatus,
    pub descricao_status: Option<String>,
    pub principal_contato: bool,
}

#[async_trait]
pub trait ClientesRepo: Send + Sync {
    async fn find_cliente(&self, id: Uuid) -> Result<Option<ClienteRecord>, RepoError>;

    async fn list_clientes_by_empresa(
        &self,
        empresa_id: Uuid,
    ) -> Result<Vec<ClienteRecord>, RepoError>;

    /// Case-insensitive, trimmed e-mail match within a company.
    async fn find_cliente_by_email(
        &self,
        empresa_id: Uuid,
        email: &str,
    ) -> Result<Option<ClienteRecord>, RepoError>;

    async fn list_principais(&self, empresa_id: Uuid) -> Result<Vec<ClienteRecord>, RepoError>;
}

#[async_trait]
pub trait ClientesWriteRepo: Send + Sync {
    async fn create_cliente(&self, params: ClienteParams) -> Result<ClienteRecord, RepoError>;

    async fn update_cliente(
        &self,
        id: Uuid,
        params: ClienteParams,
    ) -> Result<ClienteRecord, RepoError>;

    async fn update_cliente_status(
        &self,
        id: Uuid,
        status: ClienteStatus,
        descricao_status: Option<String>,
    ) -> Result<ClienteRecord, RepoError>;

    async fn set_principal_contato(&self, id: Uuid, principal: bool) -> Result<(), RepoError>;

    async fn delete_cliente(&self, id: Uuid) -> Result<(), RepoError>;
}

#[async_trait]
pub trait EmpresasRepo: Send + Sync {
    async fn find_empresa(&self, id: Uuid) -> Result<Option<EmpresaRecord>, RepoError>;

    async fn list_empresas(&self) -> Result<Vec<EmpresaRecord>, RepoError>;
}

#[async_trait]
pub trait DisparosRepo: Send + Sync {
    /// Dispatch history entries that reference the contact.
    async fn count_for_cliente(&self, cliente_id: Uuid) -> Result<u64, RepoError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserGroupRecord {
    pub user_id: Uuid,
    pub group_id: Option<Uuid>,
}

#[async_trait]
pub trait PermissionsRepo: Send + Sync {
    async fn find_user_group(&self, user_id: Uuid) -> Result<Option<UserGroupRecord>, RepoError>;

    async fn screen_exists(&self, screen_key: &str) -> Result<bool, RepoError>;

    async fn find_screen_permission(
        &self,
        group_id: Uuid,
        screen_key: &str,
    ) -> Result<Option<PermissionLevel>, RepoError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateEspecialistaParams {
    pub nome: String,
    pub email: Option<String>,
}

#[async_trait]
pub trait EspecialistasRepo: Send + Sync {
    async fn list_active_especialistas(&self) -> Result<Vec<EspecialistaRecord>, RepoError>;

    async fn create_especialista(
        &self,
        params: CreateEspecialistaParams,
    ) -> Result<EspecialistaRecord, RepoError>;

    async fn deactivate_especialista(&self, id: Uuid) -> Result<EspecialistaRecord, RepoError>;
}
