//! Caller-side routing of classified errors: what the user sees, how loudly, and whether the
//! operation may be retried.

use serde::Serialize;

use crate::domain::error::{
    DomainError, ErrorCatalog, ErrorKind, GENERIC_USER_MESSAGE, Severity,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToastVariant {
    Destructive,
    Warning,
    Default,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorPresentation {
    pub code: &'static str,
    pub kind: ErrorKind,
    pub severity: Severity,
    pub toast: ToastVariant,
    pub title: &'static str,
    pub message: String,
    pub recommended_action: &'static str,
    pub retryable: bool,
    pub notify_admin: bool,
    pub show_details: bool,
}

pub fn present<C: ErrorCatalog>(error: &DomainError<C>) -> ErrorPresentation {
    let code = error.code();
    let kind = error.kind();
    let severity = error.severity();

    let message = if kind.is_user_visible() {
        error.message().to_string()
    } else {
        GENERIC_USER_MESSAGE.to_string()
    };

    ErrorPresentation {
        code: code.as_str(),
        kind,
        severity,
        toast: toast_for(severity),
        title: title_for(severity),
        message,
        recommended_action: code.recommended_action(),
        retryable: error.is_temporary(),
        notify_admin: error.requires_admin_notification(),
        show_details: kind == ErrorKind::Validation && !error.details().is_empty(),
    }
}

/// Log the error at its severity, then present it.
pub fn report<C: ErrorCatalog>(error: &DomainError<C>) -> ErrorPresentation {
    error.log();
    present(error)
}

fn toast_for(severity: Severity) -> ToastVariant {
    match severity {
        Severity::Critical | Severity::Error => ToastVariant::Destructive,
        Severity::Warning => ToastVariant::Warning,
        Severity::Info => ToastVariant::Default,
    }
}

fn title_for(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "Erro crítico",
        Severity::Error => "Erro",
        Severity::Warning => "Atenção",
        Severity::Info => "Informação",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    pub code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationSummary {
    pub title: String,
    pub violations: Vec<Violation>,
}

/// Collapse a collect-all validation result into one summary for the form.
pub fn summarize<C: ErrorCatalog>(errors: &[DomainError<C>]) -> ValidationSummary {
    let title = match errors.len() {
        0 => "Nenhum problema encontrado".to_string(),
        1 => "1 problema encontrado no formulário".to_string(),
        count => format!("{count} problemas encontrados no formulário"),
    };

    let violations = errors
        .iter()
        .map(|error| Violation {
            code: error.code().as_str(),
            field: error
                .detail("field")
                .and_then(|value| value.as_str())
                .map(str::to_string),
            message: error.message().to_string(),
        })
        .collect();

    ValidationSummary { title, violations }
}
