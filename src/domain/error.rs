//! Classified domain errors shared by every bounded context.
//!
//! Each context declares a code enum implementing [`ErrorCatalog`]; the catalogue's static
//! tables drive severity, retryability, recovery strategy and the user-facing message. A
//! single [`DomainError`] type is parameterised over that enum.

use std::fmt::Debug;

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use time::OffsetDateTime;
use tracing::{error, info, warn};

pub mod client_books;
pub mod permissions;
pub mod requerimentos;

pub use client_books::{ClientBooksError, ClientBooksErrorCode};
pub use permissions::{PermissionError, PermissionErrorCode};
pub use requerimentos::{RequerimentoError, RequerimentoErrorCode};

/// Message shown for codes without an entry in the catalogue's message table.
pub const GENERIC_USER_MESSAGE: &str =
    "Ocorreu um erro inesperado. Entre em contato com o suporte.";
/// Remediation suggested for codes without an entry in the catalogue's action table.
pub const GENERIC_RECOMMENDED_ACTION: &str =
    "Entre em contato com o suporte informando o código do erro.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Critical,
    Error,
    Warning,
    Info,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryStrategy {
    Retry,
    Fallback,
    Manual,
    Ignore,
}

impl RecoveryStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Retry => "retry",
            Self::Fallback => "fallback",
            Self::Manual => "manual",
            Self::Ignore => "ignore",
        }
    }
}

/// Coarse failure family used for routing (HTTP status, visibility to end users).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Permission,
    Transient,
    Configuration,
    Internal,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::Permission => "permission",
            Self::Transient => "transient",
            Self::Configuration => "configuration",
            Self::Internal => "internal",
        }
    }

    /// Transient, configuration and internal failures are never described to end users.
    pub fn is_user_visible(self) -> bool {
        !matches!(
            self,
            Self::Transient | Self::Configuration | Self::Internal
        )
    }
}

/// Static classification contract implemented by every domain code enum.
///
/// `kind` is a required exhaustive match so that adding a code without classifying it fails
/// to compile. The lookup tables keep a safe default: unmapped codes resolve to
/// [`RecoveryStrategy::Manual`] and the generic support message.
pub trait ErrorCatalog: Copy + Eq + Debug + Send + Sync + 'static {
    const DOMAIN: &'static str;
    const ALL: &'static [Self];

    const TEMPORARY: &'static [Self];
    const CRITICAL: &'static [Self];
    const WARNING: &'static [Self];
    const ADMIN_NOTIFY: &'static [Self];
    const RECOVERY: &'static [(Self, RecoveryStrategy)];
    const MESSAGES: &'static [(Self, &'static str)];
    const ACTIONS: &'static [(Self, &'static str)];

    const DATABASE: Self;
    const TIMEOUT: Self;
    const UNKNOWN: Self;

    fn as_str(self) -> &'static str;

    fn kind(self) -> ErrorKind;

    fn severity(self) -> Severity {
        if Self::CRITICAL.contains(&self) {
            Severity::Critical
        } else if Self::WARNING.contains(&self) {
            Severity::Warning
        } else {
            Severity::Error
        }
    }

    fn is_temporary(self) -> bool {
        Self::TEMPORARY.contains(&self)
    }

    fn requires_admin_notification(self) -> bool {
        Self::ADMIN_NOTIFY.contains(&self)
    }

    fn recovery_strategy(self) -> RecoveryStrategy {
        lookup(Self::RECOVERY, self).unwrap_or(RecoveryStrategy::Manual)
    }

    fn user_message(self) -> &'static str {
        lookup(Self::MESSAGES, self).unwrap_or(GENERIC_USER_MESSAGE)
    }

    fn recommended_action(self) -> &'static str {
        lookup(Self::ACTIONS, self).unwrap_or(GENERIC_RECOMMENDED_ACTION)
    }

    fn parse(code: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|candidate| candidate.as_str() == code)
    }
}

fn lookup<C: PartialEq + Copy, V: Copy>(table: &[(C, V)], code: C) -> Option<V> {
    table
        .iter()
        .find_map(|(candidate, value)| (*candidate == code).then_some(*value))
}

/// Operation metadata attached to an error at the point of detection.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ErrorContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

impl ErrorContext {
    pub fn operation(operation: impl Into<String>) -> Self {
        Self {
            operation: Some(operation.into()),
            ..Self::default()
        }
    }

    pub fn with_entity(mut self, entity_id: impl ToString) -> Self {
        self.entity_id = Some(entity_id.to_string());
        self
    }

    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }
}

/// A classified failure. Built once where the failure is detected and read-only afterwards.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct DomainError<C: ErrorCatalog> {
    message: String,
    code: C,
    details: Map<String, Value>,
    context: ErrorContext,
    timestamp: OffsetDateTime,
}

impl<C: ErrorCatalog> DomainError<C> {
    pub fn new(code: C, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code,
            details: Map::new(),
            context: ErrorContext::default(),
            timestamp: OffsetDateTime::now_utc(),
        }
    }

    /// Build an error whose message is the catalogue's user message for `code`.
    pub fn from_code(code: C) -> Self {
        Self::new(code, code.user_message())
    }

    pub fn with_detail(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }

    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = context;
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn code(&self) -> C {
        self.code
    }

    pub fn details(&self) -> &Map<String, Value> {
        &self.details
    }

    pub fn detail(&self, key: &str) -> Option<&Value> {
        self.details.get(key)
    }

    pub fn context(&self) -> &ErrorContext {
        &self.context
    }

    pub fn timestamp(&self) -> OffsetDateTime {
        self.timestamp
    }

    pub fn kind(&self) -> ErrorKind {
        self.code.kind()
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    pub fn is_temporary(&self) -> bool {
        self.code.is_temporary()
    }

    pub fn requires_admin_notification(&self) -> bool {
        self.code.requires_admin_notification()
    }

    pub fn recovery_strategy(&self) -> RecoveryStrategy {
        self.code.recovery_strategy()
    }

    /// Emit a structured log event at the level implied by the code's severity.
    pub fn log(&self) {
        let code = self.code.as_str();
        let operation = self.context.operation.as_deref().unwrap_or("");
        let entity_id = self.context.entity_id.as_deref().unwrap_or("");
        let details = Value::Object(self.details.clone());
        let severity = self.severity();

        match severity {
            Severity::Critical | Severity::Error => error!(
                target: "clientbooks::domain::error",
                domain = C::DOMAIN,
                code,
                severity = severity.as_str(),
                operation,
                entity_id,
                admin_notify = self.requires_admin_notification(),
                details = %details,
                "{}",
                self.message
            ),
            Severity::Warning => warn!(
                target: "clientbooks::domain::error",
                domain = C::DOMAIN,
                code,
                operation,
                entity_id,
                details = %details,
                "{}",
                self.message
            ),
            Severity::Info => info!(
                target: "clientbooks::domain::error",
                domain = C::DOMAIN,
                code,
                operation,
                entity_id,
                "{}",
                self.message
            ),
        }
    }
}
