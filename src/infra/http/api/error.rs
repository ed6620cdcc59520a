use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::application::error::{ErrorReport, ServiceError};
use crate::application::error_handling::{Violation, report, summarize};
use crate::domain::error::{DomainError, ErrorCatalog, ErrorKind};

pub mod codes {
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    pub const VALIDATION: &str = "VALIDATION_ERROR";
}

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub error: ApiErrorMessage,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<Violation>,
}

#[derive(Debug, Serialize)]
pub struct ApiErrorMessage {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
    hint: Option<String>,
    violations: Vec<Violation>,
    diagnostic: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            status,
            code,
            diagnostic: message.clone(),
            message,
            hint: None,
            violations: Vec::new(),
        }
    }

    pub fn unauthorized() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            codes::UNAUTHORIZED,
            "Identificação do usuário ausente ou inválida.",
        )
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

/// HTTP status for a failure family.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::Permission => StatusCode::FORBIDDEN,
        ErrorKind::Transient => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::Configuration | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl<C: ErrorCatalog> From<DomainError<C>> for ApiError {
    fn from(err: DomainError<C>) -> Self {
        let presentation = report(&err);
        Self {
            status: status_for(presentation.kind),
            code: presentation.code,
            message: presentation.message,
            hint: Some(presentation.recommended_action.to_string()),
            violations: Vec::new(),
            diagnostic: err.message().to_string(),
        }
    }
}

impl<C: ErrorCatalog> From<ServiceError<C>> for ApiError {
    fn from(err: ServiceError<C>) -> Self {
        match err {
            ServiceError::Domain(err) => err.into(),
            ServiceError::Invalid(errors) => {
                for error in &errors {
                    error.log();
                }
                let summary = summarize(&errors);
                let code = errors
                    .first()
                    .map(|error| error.code().as_str())
                    .unwrap_or(codes::VALIDATION);
                Self {
                    status: StatusCode::UNPROCESSABLE_ENTITY,
                    code,
                    diagnostic: format!("{} ({code})", summary.title),
                    message: summary.title,
                    hint: None,
                    violations: summary.violations,
                }
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            error: ApiErrorMessage {
                code: self.code.to_string(),
                message: self.message,
                hint: self.hint,
            },
            violations: self.violations,
        };
        let mut response = (self.status, Json(body)).into_response();
        ErrorReport::from_message("infra::http::api", self.status, self.diagnostic)
            .with_code(self.code)
            .attach(&mut response);
        response
    }
}
