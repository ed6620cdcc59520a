//! Error codes for companies, client contacts, specialists and book dispatch.

use std::fmt::{Display, Formatter};

use super::{DomainError, ErrorCatalog, ErrorKind, RecoveryStrategy};

pub type ClientBooksError = DomainError<ClientBooksErrorCode>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientBooksErrorCode {
    EmpresaNotFound,
    EmpresaInativa,
    ClienteNotFound,
    ClienteNomeRequired,
    ClienteEmailRequired,
    ClienteEmailInvalid,
    ClienteEmpresaRequired,
    ClienteEmailDuplicado,
    ClienteDescricaoStatusRequired,
    ClienteHasHistory,
    PrincipalContatoRestoreFailed,
    EspecialistaNotFound,
    EspecialistaNomeRequired,
    EspecialistaEmailInvalid,
    DisparoFailed,
    EmailServiceUnavailable,
    TemplateRenderFailed,
    DatabaseError,
    NetworkError,
    TimeoutError,
    RateLimitExceeded,
    PermissionDenied,
    ConfigurationError,
    UnknownError,
}

use ClientBooksErrorCode as C;

impl ErrorCatalog for ClientBooksErrorCode {
    const DOMAIN: &'static str = "client_books";

    const ALL: &'static [Self] = &[
        C::EmpresaNotFound,
        C::EmpresaInativa,
        C::ClienteNotFound,
        C::ClienteNomeRequired,
        C::ClienteEmailRequired,
        C::ClienteEmailInvalid,
        C::ClienteEmpresaRequired,
        C::ClienteEmailDuplicado,
        C::ClienteDescricaoStatusRequired,
        C::ClienteHasHistory,
        C::PrincipalContatoRestoreFailed,
        C::EspecialistaNotFound,
        C::EspecialistaNomeRequired,
        C::EspecialistaEmailInvalid,
        C::DisparoFailed,
        C::EmailServiceUnavailable,
        C::TemplateRenderFailed,
        C::DatabaseError,
        C::NetworkError,
        C::TimeoutError,
        C::RateLimitExceeded,
        C::PermissionDenied,
        C::ConfigurationError,
        C::UnknownError,
    ];

    const TEMPORARY: &'static [Self] = &[
        C::DatabaseError,
        C::NetworkError,
        C::TimeoutError,
        C::RateLimitExceeded,
        C::EmailServiceUnavailable,
        C::DisparoFailed,
    ];

    const CRITICAL: &'static [Self] = &[
        C::DatabaseError,
        C::ConfigurationError,
        C::PrincipalContatoRestoreFailed,
        C::TemplateRenderFailed,
    ];

    const WARNING: &'static [Self] = &[
        C::EmpresaInativa,
        C::ClienteEmailDuplicado,
        C::ClienteHasHistory,
        C::RateLimitExceeded,
    ];

    const ADMIN_NOTIFY: &'static [Self] = &[
        C::DatabaseError,
        C::ConfigurationError,
        C::PrincipalContatoRestoreFailed,
        C::TemplateRenderFailed,
        C::EmailServiceUnavailable,
    ];

    const RECOVERY: &'static [(Self, RecoveryStrategy)] = &[
        (C::EmpresaNotFound, RecoveryStrategy::Manual),
        (C::EmpresaInativa, RecoveryStrategy::Manual),
        (C::ClienteNotFound, RecoveryStrategy::Manual),
        (C::ClienteNomeRequired, RecoveryStrategy::Manual),
        (C::ClienteEmailRequired, RecoveryStrategy::Manual),
        (C::ClienteEmailInvalid, RecoveryStrategy::Manual),
        (C::ClienteEmpresaRequired, RecoveryStrategy::Manual),
        (C::ClienteEmailDuplicado, RecoveryStrategy::Manual),
        (C::ClienteDescricaoStatusRequired, RecoveryStrategy::Manual),
        (C::ClienteHasHistory, RecoveryStrategy::Ignore),
        (C::PrincipalContatoRestoreFailed, RecoveryStrategy::Manual),
        (C::EspecialistaNotFound, RecoveryStrategy::Manual),
        (C::DisparoFailed, RecoveryStrategy::Retry),
        (C::EmailServiceUnavailable, RecoveryStrategy::Fallback),
        (C::TemplateRenderFailed, RecoveryStrategy::Fallback),
        (C::DatabaseError, RecoveryStrategy::Retry),
        (C::NetworkError, RecoveryStrategy::Retry),
        (C::TimeoutError, RecoveryStrategy::Retry),
        (C::RateLimitExceeded, RecoveryStrategy::Retry),
        (C::PermissionDenied, RecoveryStrategy::Manual),
        (C::ConfigurationError, RecoveryStrategy::Manual),
    ];

    const MESSAGES: &'static [(Self, &'static str)] = &[
        (C::EmpresaNotFound, "Empresa não encontrada."),
        (
            C::EmpresaInativa,
            "A empresa está inativa e não pode receber novos clientes.",
        ),
        (C::ClienteNotFound, "Cliente não encontrado."),
        (C::ClienteNomeRequired, "Nome do cliente é obrigatório."),
        (C::ClienteEmailRequired, "E-mail do cliente é obrigatório."),
        (C::ClienteEmailInvalid, "E-mail do cliente é inválido."),
        (C::ClienteEmpresaRequired, "Empresa do cliente é obrigatória."),
        (
            C::ClienteEmailDuplicado,
            "Já existe um cliente com este e-mail nesta empresa.",
        ),
        (
            C::ClienteDescricaoStatusRequired,
            "Informe a descrição do status ao inativar o cliente.",
        ),
        (
            C::ClienteHasHistory,
            "O cliente possui histórico de disparos e não pode ser excluído.",
        ),
        (
            C::PrincipalContatoRestoreFailed,
            "Não foi possível restaurar o contato principal anterior.",
        ),
        (C::EspecialistaNotFound, "Especialista não encontrado."),
        (C::EspecialistaNomeRequired, "Nome do especialista é obrigatório."),
        (C::EspecialistaEmailInvalid, "E-mail do especialista é inválido."),
        (C::DisparoFailed, "Falha ao disparar o book."),
        (
            C::EmailServiceUnavailable,
            "Serviço de e-mail indisponível no momento.",
        ),
        (
            C::TemplateRenderFailed,
            "Não foi possível gerar o conteúdo do e-mail.",
        ),
        (
            C::DatabaseError,
            "Erro ao acessar o banco de dados. Tente novamente.",
        ),
        (
            C::NetworkError,
            "Erro de conexão. Verifique sua internet e tente novamente.",
        ),
        (
            C::TimeoutError,
            "A operação excedeu o tempo limite. Tente novamente.",
        ),
        (
            C::RateLimitExceeded,
            "Muitas requisições em sequência. Aguarde um momento.",
        ),
        (
            C::PermissionDenied,
            "Você não tem permissão para executar esta ação.",
        ),
        (
            C::ConfigurationError,
            "Configuração do sistema incompleta. Contate o administrador.",
        ),
    ];

    const ACTIONS: &'static [(Self, &'static str)] = &[
        (
            C::EmpresaInativa,
            "Reative a empresa antes de cadastrar novos clientes.",
        ),
        (
            C::ClienteEmailDuplicado,
            "Utilize o cadastro existente ou informe outro e-mail.",
        ),
        (
            C::ClienteHasHistory,
            "Inative o cliente em vez de excluí-lo.",
        ),
        (
            C::PrincipalContatoRestoreFailed,
            "Revise manualmente o contato principal da empresa.",
        ),
        (
            C::EmailServiceUnavailable,
            "Tente novamente mais tarde ou envie o book manualmente.",
        ),
        (C::DisparoFailed, "Tente reenviar o book."),
        (C::DatabaseError, "Aguarde alguns instantes e tente novamente."),
        (C::NetworkError, "Verifique sua conexão e tente novamente."),
        (C::TimeoutError, "Tente novamente em alguns instantes."),
        (C::RateLimitExceeded, "Aguarde um minuto antes de tentar de novo."),
        (
            C::PermissionDenied,
            "Solicite acesso ao administrador do sistema.",
        ),
    ];

    const DATABASE: Self = C::DatabaseError;
    const TIMEOUT: Self = C::TimeoutError;
    const UNKNOWN: Self = C::UnknownError;

    fn as_str(self) -> &'static str {
        match self {
            C::EmpresaNotFound => "EMPRESA_NOT_FOUND",
            C::EmpresaInativa => "EMPRESA_INATIVA",
            C::ClienteNotFound => "CLIENTE_NOT_FOUND",
            C::ClienteNomeRequired => "CLIENTE_NOME_REQUIRED",
            C::ClienteEmailRequired => "CLIENTE_EMAIL_REQUIRED",
            C::ClienteEmailInvalid => "CLIENTE_EMAIL_INVALID",
            C::ClienteEmpresaRequired => "CLIENTE_EMPRESA_REQUIRED",
            C::ClienteEmailDuplicado => "CLIENTE_EMAIL_DUPLICADO",
            C::ClienteDescricaoStatusRequired => "CLIENTE_DESCRICAO_STATUS_REQUIRED",
            C::ClienteHasHistory => "CLIENTE_HAS_HISTORY",
            C::PrincipalContatoRestoreFailed => "PRINCIPAL_CONTATO_RESTORE_FAILED",
            C::EspecialistaNotFound => "ESPECIALISTA_NOT_FOUND",
            C::EspecialistaNomeRequired => "ESPECIALISTA_NOME_REQUIRED",
            C::EspecialistaEmailInvalid => "ESPECIALISTA_EMAIL_INVALID",
            C::DisparoFailed => "DISPARO_FAILED",
            C::EmailServiceUnavailable => "EMAIL_SERVICE_UNAVAILABLE",
            C::TemplateRenderFailed => "TEMPLATE_RENDER_FAILED",
            C::DatabaseError => "DATABASE_ERROR",
            C::NetworkError => "NETWORK_ERROR",
            C::TimeoutError => "TIMEOUT_ERROR",
            C::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            C::PermissionDenied => "PERMISSION_DENIED",
            C::ConfigurationError => "CONFIGURATION_ERROR",
            C::UnknownError => "UNKNOWN_ERROR",
        }
    }

    fn kind(self) -> ErrorKind {
        match self {
            C::ClienteNomeRequired
            | C::ClienteEmailRequired
            | C::ClienteEmailInvalid
            | C::ClienteEmpresaRequired
            | C::ClienteDescricaoStatusRequired
            | C::EspecialistaNomeRequired
            | C::EspecialistaEmailInvalid => ErrorKind::Validation,
            C::EmpresaNotFound | C::ClienteNotFound | C::EspecialistaNotFound => {
                ErrorKind::NotFound
            }
            C::EmpresaInativa | C::ClienteEmailDuplicado | C::ClienteHasHistory => {
                ErrorKind::Conflict
            }
            C::DisparoFailed
            | C::EmailServiceUnavailable
            | C::DatabaseError
            | C::NetworkError
            | C::TimeoutError
            | C::RateLimitExceeded => ErrorKind::Transient,
            C::PermissionDenied => ErrorKind::Permission,
            C::PrincipalContatoRestoreFailed
            | C::TemplateRenderFailed
            | C::ConfigurationError => ErrorKind::Configuration,
            C::UnknownError => ErrorKind::Internal,
        }
    }
}

impl Display for ClientBooksErrorCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
