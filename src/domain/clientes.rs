//! Field rules for client contacts and specialists.

use serde::Deserialize;
use uuid::Uuid;

use crate::domain::email::is_valid_email;
use crate::domain::error::{ClientBooksError, ClientBooksErrorCode as Code};
use crate::domain::types::ClienteStatus;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClienteFormData {
    pub nome_completo: Option<String>,
    pub email: Option<String>,
    pub funcao: Option<String>,
    pub empresa_id: Option<Uuid>,
    pub status: Option<ClienteStatus>,
    pub descricao_status: Option<String>,
    pub principal_contato: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClienteInput {
    pub nome_completo: String,
    /// Trimmed address; uniqueness is checked case-insensitively.
    pub email: String,
    pub funcao: Option<String>,
    pub empresa_id: Uuid,
    pub status: ClienteStatus,
    pub descricao_status: Option<String>,
    pub principal_contato: bool,
}

pub struct ClienteValidator;

impl ClienteValidator {
    /// Stops at the first violated rule.
    pub fn validate(data: &ClienteFormData) -> Result<ClienteInput, ClientBooksError> {
        let nome_completo = present(&data.nome_completo)
            .ok_or_else(|| required(Code::ClienteNomeRequired, "nome_completo"))?;
        let email = present(&data.email)
            .ok_or_else(|| required(Code::ClienteEmailRequired, "email"))?;
        if !is_valid_email(email) {
            return Err(ClientBooksError::from_code(Code::ClienteEmailInvalid)
                .with_detail("field", "email")
                .with_detail("value", email));
        }
        let empresa_id = data
            .empresa_id
            .ok_or_else(|| required(Code::ClienteEmpresaRequired, "empresa_id"))?;

        let status = data.status.unwrap_or(ClienteStatus::Ativo);
        let descricao_status = present(&data.descricao_status).map(str::to_string);
        Self::validate_status(status, descricao_status.as_deref())?;

        Ok(ClienteInput {
            nome_completo: nome_completo.to_string(),
            email: email.to_string(),
            funcao: present(&data.funcao).map(str::to_string),
            empresa_id,
            status,
            descricao_status,
            principal_contato: data.principal_contato.unwrap_or(false),
        })
    }

    /// Inactivating a contact requires a reason.
    pub fn validate_status(
        status: ClienteStatus,
        descricao_status: Option<&str>,
    ) -> Result<(), ClientBooksError> {
        let has_description = descricao_status.is_some_and(|value| !value.trim().is_empty());
        if status == ClienteStatus::Inativo && !has_description {
            return Err(required(
                Code::ClienteDescricaoStatusRequired,
                "descricao_status",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EspecialistaFormData {
    pub nome: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EspecialistaInput {
    pub nome: String,
    pub email: Option<String>,
}

impl EspecialistaFormData {
    pub fn validate(&self) -> Result<EspecialistaInput, ClientBooksError> {
        let nome =
            present(&self.nome).ok_or_else(|| required(Code::EspecialistaNomeRequired, "nome"))?;
        let email = present(&self.email);
        if let Some(email) = email
            && !is_valid_email(email)
        {
            return Err(ClientBooksError::from_code(Code::EspecialistaEmailInvalid)
                .with_detail("field", "email")
                .with_detail("value", email));
        }
        Ok(EspecialistaInput {
            nome: nome.to_string(),
            email: email.map(str::to_string),
        })
    }
}

fn required(code: Code, field: &'static str) -> ClientBooksError {
    ClientBooksError::from_code(code).with_detail("field", field)
}

fn present(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}
