use serde::Deserialize;
use uuid::Uuid;

use crate::application::repos::RequerimentoFilter;
use crate::domain::types::{ClienteStatus, RequerimentoStatus, TipoCobranca};

#[derive(Debug, Default, Deserialize)]
pub struct RequerimentoListQuery {
    pub status: Option<RequerimentoStatus>,
    pub cliente_id: Option<Uuid>,
    pub mes_cobranca: Option<String>,
    pub tipo_cobranca: Option<TipoCobranca>,
}

impl From<RequerimentoListQuery> for RequerimentoFilter {
    fn from(query: RequerimentoListQuery) -> Self {
        Self {
            status: query.status,
            cliente_id: query.cliente_id,
            mes_cobranca: query
                .mes_cobranca
                .map(|mes| mes.trim().to_string())
                .filter(|mes| !mes.is_empty()),
            tipo_cobranca: query.tipo_cobranca,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct IdsRequest {
    pub ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct MesQuery {
    pub mes: String,
}

#[derive(Debug, Deserialize)]
pub struct ClienteStatusRequest {
    pub status: ClienteStatus,
    #[serde(default)]
    pub descricao_status: Option<String>,
}
