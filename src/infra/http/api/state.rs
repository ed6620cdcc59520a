use std::sync::Arc;

use async_trait::async_trait;

use crate::application::clientes::ClienteService;
use crate::application::especialistas::EspecialistaService;
use crate::application::faturamento::FaturamentoService;
use crate::application::permissions::PermissionService;
use crate::application::requerimentos::RequerimentoService;
use crate::infra::error::InfraError;

/// Readiness check behind `/health`.
#[async_trait]
pub trait HealthCheck: Send + Sync {
    async fn check(&self) -> Result<(), InfraError>;
}

#[derive(Clone)]
pub struct ApiState {
    pub requerimentos: Arc<RequerimentoService>,
    pub faturamento: Arc<FaturamentoService>,
    pub clientes: Arc<ClienteService>,
    pub especialistas: Arc<EspecialistaService>,
    pub permissions: Arc<PermissionService>,
    pub health: Arc<dyn HealthCheck>,
}
