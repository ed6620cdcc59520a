use std::error::Error as StdError;

use axum::{http::StatusCode, response::Response};
use thiserror::Error;

use crate::domain::error::{DomainError, ErrorCatalog};
use crate::infra::error::InfraError;

/// Diagnostic chain attached to error responses for the response-logging middleware.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: &'static str,
    pub status: StatusCode,
    pub code: Option<&'static str>,
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(source: &'static str, status: StatusCode, error: &dyn StdError) -> Self {
        let mut messages = vec![error.to_string()];
        let mut current = error.source();
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        Self {
            source,
            status,
            code: None,
            messages,
        }
    }

    pub fn from_message(
        source: &'static str,
        status: StatusCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            source,
            status,
            code: None,
            messages: vec![message.into()],
        }
    }

    pub fn with_code(mut self, code: &'static str) -> Self {
        self.code = Some(code);
        self
    }

    pub fn attach(self, response: &mut Response) {
        response.extensions_mut().insert(self);
    }
}

/// Outcome of a service call that failed: either a collect-all validation result or the
/// first business-rule breach.
#[derive(Debug, Error)]
pub enum ServiceError<C: ErrorCatalog> {
    #[error("{} validation error(s)", .0.len())]
    Invalid(Vec<DomainError<C>>),
    #[error(transparent)]
    Domain(#[from] DomainError<C>),
}

impl<C: ErrorCatalog> ServiceError<C> {
    pub fn code(&self) -> Option<C> {
        match self {
            Self::Invalid(errors) => errors.first().map(DomainError::code),
            Self::Domain(error) => Some(error.code()),
        }
    }

    pub fn log(&self) {
        match self {
            Self::Invalid(errors) => errors.iter().for_each(DomainError::log),
            Self::Domain(error) => error.log(),
        }
    }
}

/// Process-level failure returned by the binary's commands.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::{RequerimentoError, RequerimentoErrorCode};

    #[test]
    fn report_walks_the_source_chain() {
        let inner = std::io::Error::other("socket closed");
        let outer = InfraError::from(inner);
        let report = ErrorReport::from_error("test", StatusCode::BAD_GATEWAY, &outer);
        assert_eq!(report.messages.len(), 2);
        assert_eq!(report.messages[1], "socket closed");
    }

    #[test]
    fn invalid_reports_first_code() {
        let err = ServiceError::Invalid(vec![
            RequerimentoError::from_code(RequerimentoErrorCode::ChamadoRequired),
            RequerimentoError::from_code(RequerimentoErrorCode::ModuloRequired),
        ]);
        assert_eq!(err.code(), Some(RequerimentoErrorCode::ChamadoRequired));
        assert_eq!(err.to_string(), "2 validation error(s)");
    }
}
