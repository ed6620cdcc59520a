//! Shared domain enumerations aligned with persisted database enums.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "requerimento_status", rename_all = "snake_case")]
pub enum RequerimentoStatus {
    Lancado,
    EnviadoFaturamento,
    Faturado,
}

impl RequerimentoStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lancado => "lancado",
            Self::EnviadoFaturamento => "enviado_faturamento",
            Self::Faturado => "faturado",
        }
    }
}

impl FromStr for RequerimentoStatus {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "lancado" => Ok(Self::Lancado),
            "enviado_faturamento" => Ok(Self::EnviadoFaturamento),
            "faturado" => Ok(Self::Faturado),
            _ => Err(()),
        }
    }
}

/// Billing category of a requirement. Mirrors Postgres enum `tipo_cobranca`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "tipo_cobranca")]
pub enum TipoCobranca {
    #[serde(rename = "Banco de Horas")]
    #[sqlx(rename = "Banco de Horas")]
    BancoDeHoras,
    #[serde(rename = "Cobro Interno")]
    #[sqlx(rename = "Cobro Interno")]
    CobroInterno,
    #[serde(rename = "Contrato")]
    #[sqlx(rename = "Contrato")]
    Contrato,
    #[serde(rename = "Faturado")]
    #[sqlx(rename = "Faturado")]
    Faturado,
    #[serde(rename = "Hora Extra")]
    #[sqlx(rename = "Hora Extra")]
    HoraExtra,
    #[serde(rename = "Sobreaviso")]
    #[sqlx(rename = "Sobreaviso")]
    Sobreaviso,
    #[serde(rename = "Reprovado")]
    #[sqlx(rename = "Reprovado")]
    Reprovado,
    #[serde(rename = "Bolsão Enel")]
    #[sqlx(rename = "Bolsão Enel")]
    BolsaoEnel,
}

impl TipoCobranca {
    /// Every billing type, in report order.
    pub fn all() -> &'static [TipoCobranca] {
        &[
            Self::BancoDeHoras,
            Self::CobroInterno,
            Self::Contrato,
            Self::Faturado,
            Self::HoraExtra,
            Self::Sobreaviso,
            Self::Reprovado,
            Self::BolsaoEnel,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::BancoDeHoras => "Banco de Horas",
            Self::CobroInterno => "Cobro Interno",
            Self::Contrato => "Contrato",
            Self::Faturado => "Faturado",
            Self::HoraExtra => "Hora Extra",
            Self::Sobreaviso => "Sobreaviso",
            Self::Reprovado => "Reprovado",
            Self::BolsaoEnel => "Bolsão Enel",
        }
    }
}

impl Display for TipoCobranca {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TipoCobranca {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        Self::all()
            .iter()
            .copied()
            .find(|tipo| tipo.as_str().eq_ignore_ascii_case(value))
            .ok_or(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "cliente_status", rename_all = "snake_case")]
pub enum ClienteStatus {
    Ativo,
    Inativo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "empresa_status", rename_all = "snake_case")]
pub enum EmpresaStatus {
    Ativo,
    Inativo,
    Suspenso,
}

/// Access level granted to a permission group on a screen. Ordered: `View < Edit`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "permission_level", rename_all = "snake_case")]
pub enum PermissionLevel {
    None,
    View,
    Edit,
}

impl PermissionLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::View => "view",
            Self::Edit => "edit",
        }
    }

    pub fn satisfies(self, required: PermissionLevel) -> bool {
        self >= required
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tipo_cobranca_parses_case_insensitively() {
        assert_eq!(
            "banco de horas".parse::<TipoCobranca>(),
            Ok(TipoCobranca::BancoDeHoras)
        );
        assert_eq!(" Bolsão Enel ".parse::<TipoCobranca>(), Ok(TipoCobranca::BolsaoEnel));
        assert!("Avulso".parse::<TipoCobranca>().is_err());
        assert_eq!(TipoCobranca::all().len(), 8);
    }

    #[test]
    fn tipo_cobranca_serializes_with_display_names() {
        let json = serde_json::to_string(&TipoCobranca::HoraExtra).expect("serialize");
        assert_eq!(json, "\"Hora Extra\"");
    }

    #[test]
    fn edit_satisfies_view() {
        assert!(PermissionLevel::Edit.satisfies(PermissionLevel::View));
        assert!(!PermissionLevel::View.satisfies(PermissionLevel::Edit));
        assert!(!PermissionLevel::None.satisfies(PermissionLevel::View));
    }
}
