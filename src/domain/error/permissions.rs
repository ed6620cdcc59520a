//! Error codes raised while resolving screen permissions.

use std::fmt::{Display, Formatter};

use super::{DomainError, ErrorCatalog, ErrorKind, RecoveryStrategy};

pub type PermissionError = DomainError<PermissionErrorCode>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PermissionErrorCode {
    PermissionDenied,
    UserNotFound,
    GroupNotFound,
    ScreenNotFound,
    SessionExpired,
    InvalidPermissionLevel,
    DatabaseError,
    NetworkError,
    TimeoutError,
    ConfigurationError,
    UnknownError,
}

use PermissionErrorCode as P;

impl ErrorCatalog for PermissionErrorCode {
    const DOMAIN: &'static str = "permissions";

    const ALL: &'static [Self] = &[
        P::PermissionDenied,
        P::UserNotFound,
        P::GroupNotFound,
        P::ScreenNotFound,
        P::SessionExpired,
        P::InvalidPermissionLevel,
        P::DatabaseError,
        P::NetworkError,
        P::TimeoutError,
        P::ConfigurationError,
        P::UnknownError,
    ];

    const TEMPORARY: &'static [Self] = &[P::DatabaseError, P::NetworkError, P::TimeoutError];

    const CRITICAL: &'static [Self] = &[P::DatabaseError, P::ConfigurationError];

    const WARNING: &'static [Self] = &[P::GroupNotFound, P::ScreenNotFound, P::SessionExpired];

    const ADMIN_NOTIFY: &'static [Self] = &[
        P::DatabaseError,
        P::ConfigurationError,
        P::GroupNotFound,
    ];

    const RECOVERY: &'static [(Self, RecoveryStrategy)] = &[
        (P::PermissionDenied, RecoveryStrategy::Manual),
        (P::UserNotFound, RecoveryStrategy::Manual),
        (P::GroupNotFound, RecoveryStrategy::Manual),
        (P::ScreenNotFound, RecoveryStrategy::Manual),
        (P::SessionExpired, RecoveryStrategy::Manual),
        (P::DatabaseError, RecoveryStrategy::Retry),
        (P::NetworkError, RecoveryStrategy::Retry),
        (P::TimeoutError, RecoveryStrategy::Retry),
        (P::ConfigurationError, RecoveryStrategy::Manual),
    ];

    const MESSAGES: &'static [(Self, &'static str)] = &[
        (
            P::PermissionDenied,
            "Você não tem permissão para acessar este recurso.",
        ),
        (P::UserNotFound, "Usuário não encontrado."),
        (
            P::GroupNotFound,
            "Seu usuário não está associado a nenhum grupo de permissões.",
        ),
        (P::ScreenNotFound, "Tela não cadastrada no controle de acesso."),
        (
            P::SessionExpired,
            "Sua sessão expirou. Faça login novamente.",
        ),
        (P::InvalidPermissionLevel, "Nível de permissão inválido."),
        (
            P::DatabaseError,
            "Não foi possível verificar suas permissões no momento.",
        ),
        (
            P::NetworkError,
            "Falha de conexão ao verificar permissões.",
        ),
        (
            P::TimeoutError,
            "A verificação de permissões excedeu o tempo limite.",
        ),
        (
            P::ConfigurationError,
            "O controle de acesso não está configurado corretamente.",
        ),
    ];

    const ACTIONS: &'static [(Self, &'static str)] = &[
        (
            P::PermissionDenied,
            "Solicite acesso ao administrador do sistema.",
        ),
        (
            P::GroupNotFound,
            "Solicite ao administrador a associação do seu usuário a um grupo.",
        ),
        (P::SessionExpired, "Faça login novamente."),
        (P::DatabaseError, "Tente novamente em alguns instantes."),
        (P::NetworkError, "Verifique sua conexão e tente novamente."),
        (P::TimeoutError, "Tente novamente em alguns instantes."),
    ];

    const DATABASE: Self = P::DatabaseError;
    const TIMEOUT: Self = P::TimeoutError;
    const UNKNOWN: Self = P::UnknownError;

    fn as_str(self) -> &'static str {
        match self {
            P::PermissionDenied => "PERMISSION_DENIED",
            P::UserNotFound => "USER_NOT_FOUND",
            P::GroupNotFound => "GROUP_NOT_FOUND",
            P::ScreenNotFound => "SCREEN_NOT_FOUND",
            P::SessionExpired => "SESSION_EXPIRED",
            P::InvalidPermissionLevel => "INVALID_PERMISSION_LEVEL",
            P::DatabaseError => "DATABASE_ERROR",
            P::NetworkError => "NETWORK_ERROR",
            P::TimeoutError => "TIMEOUT_ERROR",
            P::ConfigurationError => "CONFIGURATION_ERROR",
            P::UnknownError => "UNKNOWN_ERROR",
        }
    }

    fn kind(self) -> ErrorKind {
        match self {
            P::PermissionDenied | P::SessionExpired => ErrorKind::Permission,
            P::UserNotFound | P::GroupNotFound | P::ScreenNotFound => ErrorKind::NotFound,
            P::InvalidPermissionLevel => ErrorKind::Validation,
            P::DatabaseError | P::NetworkError | P::TimeoutError => ErrorKind::Transient,
            P::ConfigurationError => ErrorKind::Configuration,
            P::UnknownError => ErrorKind::Internal,
        }
    }
}

impl Display for PermissionErrorCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
