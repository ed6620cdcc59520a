//! Requirement form data and the business rules applied before persistence.

use std::fmt::{Display, Formatter};
use std::ops::RangeInclusive;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::Date;
use uuid::Uuid;

use crate::domain::email::is_valid_email;
use crate::domain::error::{RequerimentoError, RequerimentoErrorCode as Code};
use crate::domain::types::TipoCobranca;

pub const DESCRICAO_MAX_LEN: usize = 500;
pub const OBSERVACAO_MAX_LEN: usize = 1000;

/// Annotation written on the hour-bank record spawned from a rejected requirement's
/// analysis hours.
pub const OBSERVACAO_ANALISE_EF: &str =
    "Horas de análise EF referentes a requerimento reprovado, lançadas em Banco de Horas.";

static CHAMADO_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9\-]+$").expect("valid chamado pattern"));
static MES_COBRANCA_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(0[1-9]|1[0-2])/(\d{4})$").expect("valid mes_cobranca pattern"));

/// A loosely-typed form value: JSON numbers and free text are both accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Number(_) => false,
            Self::Text(text) => text.trim().is_empty(),
        }
    }

    /// Numeric reading of the value; text accepts `,` as decimal separator.
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            Self::Number(number) => *number,
            Self::Text(text) => text.trim().replace(',', ".").parse::<f64>().ok()?,
        };
        value.is_finite().then_some(value)
    }

    fn to_json(&self) -> Value {
        match self {
            Self::Number(number) => Value::from(*number),
            Self::Text(text) => Value::from(text.as_str()),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

const YEAR_RANGE: RangeInclusive<i32> = 1000..=9999;

/// Billing month, rendered as `MM/YYYY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MesCobranca {
    year: i32,
    month: u8,
}

impl MesCobranca {
    pub fn new(month: u8, year: i32) -> Option<Self> {
        ((1..=12).contains(&month) && YEAR_RANGE.contains(&year))
            .then_some(Self { year, month })
    }

    /// Strict `MM/YYYY` parse.
    pub fn parse(value: &str) -> Option<Self> {
        let captures = MES_COBRANCA_PATTERN.captures(value.trim())?;
        let month = captures.get(1)?.as_str().parse().ok()?;
        let year = captures.get(2)?.as_str().parse().ok()?;
        Self::new(month, year)
    }

    /// Resolve a form value: either `MM/YYYY` text or a bare month number combined with
    /// `fallback_year`.
    pub fn from_field(value: &FieldValue, fallback_year: i32) -> Option<Self> {
        if let FieldValue::Text(text) = value
            && let Some(parsed) = Self::parse(text)
        {
            return Some(parsed);
        }
        let month = month_number(value)?;
        Self::new(month, fallback_year)
    }

    pub fn month(self) -> u8 {
        self.month
    }

    pub fn year(self) -> i32 {
        self.year
    }
}

impl Display for MesCobranca {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}/{:04}", self.month, self.year)
    }
}

fn month_number(value: &FieldValue) -> Option<u8> {
    let number = value.as_f64()?;
    if number.fract() != 0.0 || !(1.0..=12.0).contains(&number) {
        return None;
    }
    Some(number as u8)
}

fn mes_cobranca_is_valid(value: &FieldValue) -> bool {
    match value {
        FieldValue::Text(text) if MesCobranca::parse(text).is_some() => true,
        other => month_number(other).is_some(),
    }
}

/// Raw requirement form as submitted by the UI.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequerimentoFormData {
    pub chamado: Option<String>,
    pub cliente_id: Option<Uuid>,
    pub modulo: Option<String>,
    pub descricao: Option<String>,
    pub data_envio: Option<Date>,
    pub data_aprovacao: Option<Date>,
    pub horas_funcional: Option<FieldValue>,
    pub horas_tecnico: Option<FieldValue>,
    pub linguagem: Option<String>,
    pub tipo_cobranca: Option<String>,
    pub mes_cobranca: Option<FieldValue>,
    pub observacao: Option<String>,
}

/// Form data that passed every rule, with typed fields.
#[derive(Debug, Clone, PartialEq)]
pub struct RequerimentoInput {
    pub chamado: String,
    pub cliente_id: Uuid,
    pub modulo: String,
    pub descricao: String,
    pub data_envio: Date,
    pub data_aprovacao: Date,
    pub horas_funcional: f64,
    pub horas_tecnico: f64,
    pub linguagem: String,
    pub tipo_cobranca: TipoCobranca,
    pub mes_cobranca: MesCobranca,
    pub observacao: Option<String>,
}

pub struct RequerimentoValidator;

impl RequerimentoValidator {
    /// Check every rule and return all violations at once: required fields first, then
    /// format constraints.
    pub fn validate_form_data(data: &RequerimentoFormData) -> Vec<RequerimentoError> {
        let mut errors = Vec::new();

        if is_blank(&data.chamado) {
            errors.push(required(Code::ChamadoRequired, "chamado"));
        }
        if data.cliente_id.is_none() {
            errors.push(required(Code::ClienteRequired, "cliente_id"));
        }
        if is_blank(&data.modulo) {
            errors.push(required(Code::ModuloRequired, "modulo"));
        }
        if is_blank(&data.descricao) {
            errors.push(required(Code::DescricaoRequired, "descricao"));
        }
        if data.data_envio.is_none() {
            errors.push(required(Code::DataEnvioRequired, "data_envio"));
        }
        if data.data_aprovacao.is_none() {
            errors.push(required(Code::DataAprovacaoRequired, "data_aprovacao"));
        }
        let funcional_missing = field_missing(&data.horas_funcional);
        let tecnico_missing = field_missing(&data.horas_tecnico);
        if funcional_missing && tecnico_missing {
            errors.push(required(Code::HorasRequired, "horas"));
        }
        if is_blank(&data.linguagem) {
            errors.push(required(Code::LinguagemRequired, "linguagem"));
        }
        if is_blank(&data.tipo_cobranca) {
            errors.push(required(Code::TipoCobrancaRequired, "tipo_cobranca"));
        }
        if field_missing(&data.mes_cobranca) {
            errors.push(required(Code::MesCobrancaRequired, "mes_cobranca"));
        }

        if let Some(chamado) = present(&data.chamado)
            && !CHAMADO_PATTERN.is_match(chamado)
        {
            errors.push(
                RequerimentoError::from_code(Code::ChamadoInvalidFormat)
                    .with_detail("field", "chamado")
                    .with_detail("value", chamado),
            );
        }

        if let Some(descricao) = present(&data.descricao) {
            let length = descricao.chars().count();
            if length > DESCRICAO_MAX_LEN {
                errors.push(
                    RequerimentoError::from_code(Code::DescricaoTooLong)
                        .with_detail("currentLength", length)
                        .with_detail("maxLength", DESCRICAO_MAX_LEN),
                );
            }
        }

        if let Some(observacao) = data.observacao.as_deref() {
            let length = observacao.trim().chars().count();
            if length > OBSERVACAO_MAX_LEN {
                errors.push(
                    RequerimentoError::from_code(Code::ObservacaoTooLong)
                        .with_detail("currentLength", length)
                        .with_detail("maxLength", OBSERVACAO_MAX_LEN),
                );
            }
        }

        let mut horas_parsed = Vec::with_capacity(2);
        for (field, value) in [
            ("horas_funcional", &data.horas_funcional),
            ("horas_tecnico", &data.horas_tecnico),
        ] {
            let Some(value) = value.as_ref().filter(|value| !value.is_blank()) else {
                continue;
            };
            match value.as_f64() {
                Some(hours) if hours >= 0.0 => horas_parsed.push(hours),
                Some(_) => errors.push(
                    RequerimentoError::from_code(Code::HorasInvalid)
                        .with_detail("field", field)
                        .with_detail("value", value.to_json())
                        .with_detail("reason", "negative"),
                ),
                None => errors.push(
                    RequerimentoError::from_code(Code::HorasInvalid)
                        .with_detail("field", field)
                        .with_detail("value", value.to_json())
                        .with_detail("reason", "not_numeric"),
                ),
            }
        }
        let provided = [funcional_missing, tecnico_missing]
            .iter()
            .filter(|missing| !**missing)
            .count();
        if provided > 0 && horas_parsed.len() == provided && horas_parsed.iter().sum::<f64>() <= 0.0
        {
            errors.push(
                RequerimentoError::from_code(Code::HorasRequired)
                    .with_detail("field", "horas")
                    .with_detail("reason", "zero_total"),
            );
        }

        if let Some(tipo) = present(&data.tipo_cobranca)
            && tipo.parse::<TipoCobranca>().is_err()
        {
            errors.push(
                RequerimentoError::from_code(Code::TipoCobrancaInvalid)
                    .with_detail("field", "tipo_cobranca")
                    .with_detail("value", tipo),
            );
        }

        if let Some(data_aprovacao) = data.data_aprovacao
            && !YEAR_RANGE.contains(&data_aprovacao.year())
        {
            errors.push(
                RequerimentoError::from_code(Code::DataAprovacaoInvalid)
                    .with_detail("field", "data_aprovacao")
                    .with_detail("value", data_aprovacao.to_string())
                    .with_detail("minYear", *YEAR_RANGE.start())
                    .with_detail("maxYear", *YEAR_RANGE.end()),
            );
        }

        if let Some(mes) = data.mes_cobranca.as_ref().filter(|value| !value.is_blank())
            && !mes_cobranca_is_valid(mes)
        {
            errors.push(
                RequerimentoError::from_code(Code::MesCobrancaInvalid)
                    .with_detail("field", "mes_cobranca")
                    .with_detail("value", mes.to_json()),
            );
        }

        errors
    }

    /// Validate recipients. An empty list short-circuits with a single "required" error;
    /// otherwise every malformed address is reported in one aggregated error.
    pub fn validate_email_list(emails: &[String]) -> Vec<RequerimentoError> {
        if emails.is_empty() {
            return vec![RequerimentoError::from_code(
                Code::FaturamentoDestinatariosRequired,
            )];
        }

        let invalid: Vec<&str> = emails
            .iter()
            .map(String::as_str)
            .filter(|email| !is_valid_email(email.trim()))
            .collect();

        if invalid.is_empty() {
            return Vec::new();
        }

        vec![
            RequerimentoError::from_code(Code::FaturamentoDestinatariosInvalid)
                .with_detail("invalidEmails", invalid),
        ]
    }

    /// Validate and convert into typed input. A bare month number in `mes_cobranca` is
    /// combined with the approval year, which validation keeps within four digits.
    pub fn parse(data: &RequerimentoFormData) -> Result<RequerimentoInput, Vec<RequerimentoError>> {
        let errors = Self::validate_form_data(data);
        if !errors.is_empty() {
            return Err(errors);
        }

        let inconsistent = || vec![RequerimentoError::from_code(Code::UnknownError)];

        let (
            Some(chamado),
            Some(cliente_id),
            Some(modulo),
            Some(descricao),
            Some(data_envio),
            Some(data_aprovacao),
            Some(linguagem),
            Some(tipo_cobranca),
            Some(mes_cobranca),
        ) = (
            present(&data.chamado),
            data.cliente_id,
            present(&data.modulo),
            present(&data.descricao),
            data.data_envio,
            data.data_aprovacao,
            present(&data.linguagem),
            present(&data.tipo_cobranca),
            data.mes_cobranca.as_ref(),
        )
        else {
            return Err(inconsistent());
        };

        let tipo_cobranca = tipo_cobranca
            .parse::<TipoCobranca>()
            .map_err(|_| inconsistent())?;
        let mes_cobranca = MesCobranca::from_field(mes_cobranca, data_aprovacao.year())
            .ok_or_else(inconsistent)?;

        Ok(RequerimentoInput {
            chamado: chamado.to_string(),
            cliente_id,
            modulo: modulo.to_string(),
            descricao: descricao.to_string(),
            data_envio,
            data_aprovacao,
            horas_funcional: hours_or_zero(&data.horas_funcional),
            horas_tecnico: hours_or_zero(&data.horas_tecnico),
            linguagem: linguagem.to_string(),
            tipo_cobranca,
            mes_cobranca,
            observacao: present(&data.observacao).map(str::to_string),
        })
    }
}

fn required(code: Code, field: &'static str) -> RequerimentoError {
    RequerimentoError::from_code(code).with_detail("field", field)
}

fn present(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn is_blank(value: &Option<String>) -> bool {
    present(value).is_none()
}

fn field_missing(value: &Option<FieldValue>) -> bool {
    value.as_ref().is_none_or(FieldValue::is_blank)
}

fn hours_or_zero(value: &Option<FieldValue>) -> f64 {
    value
        .as_ref()
        .filter(|value| !value.is_blank())
        .and_then(FieldValue::as_f64)
        .unwrap_or(0.0)
}
