//! Domain entities mirrored from persistent storage.

use serde::Serialize;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::domain::types::{ClienteStatus, EmpresaStatus, RequerimentoStatus, TipoCobranca};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequerimentoRecord {
    pub id: Uuid,
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
    /// Billing month in `MM/YYYY` form.
    pub mes_cobranca: Option<String>,
    pub observacao: Option<String>,
    pub status: RequerimentoStatus,
    pub enviado_faturamento: bool,
    pub data_envio_faturamento: Option<OffsetDateTime>,
    pub data_faturamento: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl RequerimentoRecord {
    pub fn horas_total(&self) -> f64 {
        self.horas_funcional + self.horas_tecnico
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmpresaRecord {
    pub id: Uuid,
    pub nome_completo: String,
    pub nome_abreviado: String,
    pub status: EmpresaStatus,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClienteRecord {
    pub id: Uuid,
    pub nome_completo: String,
    pub email: String,
    pub funcao: Option<String>,
    pub empresa_id: Uuid,
    pub status: ClienteStatus,
    pub descricao_status: Option<String>,
    pub principal_contato: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EspecialistaRecord {
    pub id: Uuid,
    pub nome: String,
    pub email: Option<String>,
    pub ativo: bool,
    pub created_at: OffsetDateTime,
}
