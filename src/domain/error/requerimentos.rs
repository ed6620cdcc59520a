//! Error codes for requirement registration, billing lifecycle and billing e-mails.

use std::fmt::{Display, Formatter};

use super::{DomainError, ErrorCatalog, ErrorKind, RecoveryStrategy};

pub type RequerimentoError = DomainError<RequerimentoErrorCode>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequerimentoErrorCode {
    ChamadoRequired,
    ChamadoInvalidFormat,
    ClienteRequired,
    ClienteNotFound,
    ModuloRequired,
    DescricaoRequired,
    DescricaoTooLong,
    DataEnvioRequired,
    DataAprovacaoRequired,
    DataAprovacaoInvalid,
    HorasRequired,
    HorasInvalid,
    LinguagemRequired,
    TipoCobrancaRequired,
    TipoCobrancaInvalid,
    MesCobrancaRequired,
    MesCobrancaInvalid,
    ObservacaoTooLong,
    HorasAnaliseEfInvalid,
    RequerimentoNotFound,
    RequerimentoAlreadySent,
    RequerimentoNotSent,
    RequerimentoLocked,
    DeleteNotAllowed,
    InvalidStatusTransition,
    FaturamentoDestinatariosRequired,
    FaturamentoDestinatariosInvalid,
    FaturamentoSemRequerimentos,
    FaturamentoEmailFailed,
    DatabaseError,
    NetworkError,
    TimeoutError,
    RateLimitExceeded,
    PermissionDenied,
    ConfigurationError,
    UnknownError,
}

use RequerimentoErrorCode as R;

impl ErrorCatalog for RequerimentoErrorCode {
    const DOMAIN: &'static str = "requerimentos";

    const ALL: &'static [Self] = &[
        R::ChamadoRequired,
        R::ChamadoInvalidFormat,
        R::ClienteRequired,
        R::ClienteNotFound,
        R::ModuloRequired,
        R::DescricaoRequired,
        R::DescricaoTooLong,
        R::DataEnvioRequired,
        R::DataAprovacaoRequired,
        R::DataAprovacaoInvalid,
        R::HorasRequired,
        R::HorasInvalid,
        R::LinguagemRequired,
        R::TipoCobrancaRequired,
        R::TipoCobrancaInvalid,
        R::MesCobrancaRequired,
        R::MesCobrancaInvalid,
        R::ObservacaoTooLong,
        R::HorasAnaliseEfInvalid,
        R::RequerimentoNotFound,
        R::RequerimentoAlreadySent,
        R::RequerimentoNotSent,
        R::RequerimentoLocked,
        R::DeleteNotAllowed,
        R::InvalidStatusTransition,
        R::FaturamentoDestinatariosRequired,
        R::FaturamentoDestinatariosInvalid,
        R::FaturamentoSemRequerimentos,
        R::FaturamentoEmailFailed,
        R::DatabaseError,
        R::NetworkError,
        R::TimeoutError,
        R::RateLimitExceeded,
        R::PermissionDenied,
        R::ConfigurationError,
        R::UnknownError,
    ];

    const TEMPORARY: &'static [Self] = &[
        R::DatabaseError,
        R::NetworkError,
        R::TimeoutError,
        R::RateLimitExceeded,
        R::FaturamentoEmailFailed,
    ];

    const CRITICAL: &'static [Self] = &[R::DatabaseError, R::ConfigurationError];

    const WARNING: &'static [Self] = &[
        R::RequerimentoAlreadySent,
        R::RequerimentoNotSent,
        R::FaturamentoSemRequerimentos,
        R::RateLimitExceeded,
    ];

    const ADMIN_NOTIFY: &'static [Self] = &[
        R::DatabaseError,
        R::ConfigurationError,
        R::FaturamentoEmailFailed,
    ];

    const RECOVERY: &'static [(Self, RecoveryStrategy)] = &[
        (R::ChamadoRequired, RecoveryStrategy::Manual),
        (R::ChamadoInvalidFormat, RecoveryStrategy::Manual),
        (R::ClienteRequired, RecoveryStrategy::Manual),
        (R::ClienteNotFound, RecoveryStrategy::Manual),
        (R::ModuloRequired, RecoveryStrategy::Manual),
        (R::DescricaoRequired, RecoveryStrategy::Manual),
        (R::DescricaoTooLong, RecoveryStrategy::Manual),
        (R::HorasRequired, RecoveryStrategy::Manual),
        (R::HorasInvalid, RecoveryStrategy::Manual),
        (R::DataAprovacaoInvalid, RecoveryStrategy::Manual),
        (R::MesCobrancaInvalid, RecoveryStrategy::Manual),
        (R::RequerimentoNotFound, RecoveryStrategy::Manual),
        (R::RequerimentoAlreadySent, RecoveryStrategy::Ignore),
        (R::RequerimentoNotSent, RecoveryStrategy::Ignore),
        (R::RequerimentoLocked, RecoveryStrategy::Manual),
        (R::DeleteNotAllowed, RecoveryStrategy::Manual),
        (R::InvalidStatusTransition, RecoveryStrategy::Ignore),
        (R::FaturamentoDestinatariosRequired, RecoveryStrategy::Manual),
        (R::FaturamentoDestinatariosInvalid, RecoveryStrategy::Manual),
        (R::FaturamentoSemRequerimentos, RecoveryStrategy::Ignore),
        (R::FaturamentoEmailFailed, RecoveryStrategy::Retry),
        (R::DatabaseError, RecoveryStrategy::Retry),
        (R::NetworkError, RecoveryStrategy::Retry),
        (R::TimeoutError, RecoveryStrategy::Retry),
        (R::RateLimitExceeded, RecoveryStrategy::Retry),
        (R::PermissionDenied, RecoveryStrategy::Manual),
        (R::ConfigurationError, RecoveryStrategy::Manual),
    ];

    const MESSAGES: &'static [(Self, &'static str)] = &[
        (R::ChamadoRequired, "Chamado é obrigatório."),
        (
            R::ChamadoInvalidFormat,
            "Chamado deve conter apenas letras, números e hífen.",
        ),
        (R::ClienteRequired, "Cliente é obrigatório."),
        (R::ClienteNotFound, "Cliente não encontrado."),
        (R::ModuloRequired, "Módulo é obrigatório."),
        (R::DescricaoRequired, "Descrição é obrigatória."),
        (
            R::DescricaoTooLong,
            "Descrição deve ter no máximo 500 caracteres.",
        ),
        (R::DataEnvioRequired, "Data de envio é obrigatória."),
        (R::DataAprovacaoRequired, "Data de aprovação é obrigatória."),
        (
            R::DataAprovacaoInvalid,
            "Data de aprovação deve ter ano entre 1000 e 9999.",
        ),
        (
            R::HorasRequired,
            "Informe horas funcionais ou técnicas maiores que zero.",
        ),
        (
            R::HorasInvalid,
            "Horas devem ser numéricas e maiores ou iguais a zero.",
        ),
        (R::LinguagemRequired, "Linguagem é obrigatória."),
        (R::TipoCobrancaRequired, "Tipo de cobrança é obrigatório."),
        (R::TipoCobrancaInvalid, "Tipo de cobrança inválido."),
        (R::MesCobrancaRequired, "Mês de cobrança é obrigatório."),
        (
            R::MesCobrancaInvalid,
            "Mês de cobrança deve estar no formato MM/AAAA.",
        ),
        (
            R::ObservacaoTooLong,
            "Observação deve ter no máximo 1000 caracteres.",
        ),
        (
            R::HorasAnaliseEfInvalid,
            "Horas de análise EF devem ser numéricas e maiores ou iguais a zero.",
        ),
        (R::RequerimentoNotFound, "Requerimento não encontrado."),
        (
            R::RequerimentoAlreadySent,
            "Requerimento já foi enviado para faturamento.",
        ),
        (
            R::RequerimentoNotSent,
            "Requerimento não está aguardando faturamento.",
        ),
        (
            R::RequerimentoLocked,
            "Requerimentos enviados para faturamento não podem ser alterados.",
        ),
        (
            R::DeleteNotAllowed,
            "Não é possível excluir um requerimento já enviado para faturamento.",
        ),
        (
            R::InvalidStatusTransition,
            "Transição de status não permitida para este requerimento.",
        ),
        (
            R::FaturamentoDestinatariosRequired,
            "Informe ao menos um destinatário.",
        ),
        (
            R::FaturamentoDestinatariosInvalid,
            "Existem destinatários com e-mail inválido.",
        ),
        (
            R::FaturamentoSemRequerimentos,
            "Nenhum requerimento aguardando faturamento no período.",
        ),
        (
            R::FaturamentoEmailFailed,
            "Não foi possível enviar o e-mail de faturamento.",
        ),
        (
            R::DatabaseError,
            "Erro ao acessar o banco de dados. Tente novamente.",
        ),
        (
            R::NetworkError,
            "Erro de conexão. Verifique sua internet e tente novamente.",
        ),
        (
            R::TimeoutError,
            "A operação excedeu o tempo limite. Tente novamente.",
        ),
        (
            R::RateLimitExceeded,
            "Muitas requisições em sequência. Aguarde um momento.",
        ),
        (
            R::PermissionDenied,
            "Você não tem permissão para executar esta ação.",
        ),
        (
            R::ConfigurationError,
            "Configuração do sistema incompleta. Contate o administrador.",
        ),
    ];

    const ACTIONS: &'static [(Self, &'static str)] = &[
        (
            R::ChamadoInvalidFormat,
            "Remova espaços e caracteres especiais do número do chamado.",
        ),
        (R::DescricaoTooLong, "Resuma a descrição em até 500 caracteres."),
        (
            R::MesCobrancaInvalid,
            "Edite o requerimento e informe o mês de cobrança no formato MM/AAAA.",
        ),
        (
            R::RequerimentoAlreadySent,
            "Consulte a aba de faturamento para acompanhar o requerimento.",
        ),
        (
            R::DeleteNotAllowed,
            "Rejeite o requerimento no faturamento antes de excluí-lo.",
        ),
        (
            R::RequerimentoLocked,
            "Rejeite o requerimento no faturamento para voltar a editá-lo.",
        ),
        (
            R::FaturamentoDestinatariosInvalid,
            "Corrija os e-mails destacados e tente novamente.",
        ),
        (
            R::FaturamentoEmailFailed,
            "Tente reenviar em alguns minutos.",
        ),
        (R::DatabaseError, "Aguarde alguns instantes e tente novamente."),
        (R::NetworkError, "Verifique sua conexão e tente novamente."),
        (R::TimeoutError, "Tente novamente em alguns instantes."),
        (R::RateLimitExceeded, "Aguarde um minuto antes de tentar de novo."),
        (
            R::PermissionDenied,
            "Solicite acesso ao administrador do sistema.",
        ),
    ];

    const DATABASE: Self = R::DatabaseError;
    const TIMEOUT: Self = R::TimeoutError;
    const UNKNOWN: Self = R::UnknownError;

    fn as_str(self) -> &'static str {
        match self {
            R::ChamadoRequired => "CHAMADO_REQUIRED",
            R::ChamadoInvalidFormat => "CHAMADO_INVALID_FORMAT",
            R::ClienteRequired => "CLIENTE_REQUIRED",
            R::ClienteNotFound => "CLIENTE_NOT_FOUND",
            R::ModuloRequired => "MODULO_REQUIRED",
            R::DescricaoRequired => "DESCRICAO_REQUIRED",
            R::DescricaoTooLong => "DESCRICAO_TOO_LONG",
            R::DataEnvioRequired => "DATA_ENVIO_REQUIRED",
            R::DataAprovacaoRequired => "DATA_APROVACAO_REQUIRED",
            R::DataAprovacaoInvalid => "DATA_APROVACAO_INVALID",
            R::HorasRequired => "HORAS_REQUIRED",
            R::HorasInvalid => "HORAS_INVALID",
            R::LinguagemRequired => "LINGUAGEM_REQUIRED",
            R::TipoCobrancaRequired => "TIPO_COBRANCA_REQUIRED",
            R::TipoCobrancaInvalid => "TIPO_COBRANCA_INVALID",
            R::MesCobrancaRequired => "MES_COBRANCA_REQUIRED",
            R::MesCobrancaInvalid => "MES_COBRANCA_INVALID",
            R::ObservacaoTooLong => "OBSERVACAO_TOO_LONG",
            R::HorasAnaliseEfInvalid => "HORAS_ANALISE_EF_INVALID",
            R::RequerimentoNotFound => "REQUERIMENTO_NOT_FOUND",
            R::RequerimentoAlreadySent => "REQUERIMENTO_ALREADY_SENT",
            R::RequerimentoNotSent => "REQUERIMENTO_NOT_SENT",
            R::RequerimentoLocked => "REQUERIMENTO_LOCKED",
            R::DeleteNotAllowed => "DELETE_NOT_ALLOWED",
            R::InvalidStatusTransition => "INVALID_STATUS_TRANSITION",
            R::FaturamentoDestinatariosRequired => "FATURAMENTO_DESTINATARIOS_REQUIRED",
            R::FaturamentoDestinatariosInvalid => "FATURAMENTO_DESTINATARIOS_INVALID",
            R::FaturamentoSemRequerimentos => "FATURAMENTO_SEM_REQUERIMENTOS",
            R::FaturamentoEmailFailed => "FATURAMENTO_EMAIL_FAILED",
            R::DatabaseError => "DATABASE_ERROR",
            R::NetworkError => "NETWORK_ERROR",
            R::TimeoutError => "TIMEOUT_ERROR",
            R::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            R::PermissionDenied => "PERMISSION_DENIED",
            R::ConfigurationError => "CONFIGURATION_ERROR",
            R::UnknownError => "UNKNOWN_ERROR",
        }
    }

    fn kind(self) -> ErrorKind {
        match self {
            R::ChamadoRequired
            | R::ChamadoInvalidFormat
            | R::ClienteRequired
            | R::ModuloRequired
            | R::DescricaoRequired
            | R::DescricaoTooLong
            | R::DataEnvioRequired
            | R::DataAprovacaoRequired
            | R::DataAprovacaoInvalid
            | R::HorasRequired
            | R::HorasInvalid
            | R::LinguagemRequired
            | R::TipoCobrancaRequired
            | R::TipoCobrancaInvalid
            | R::MesCobrancaRequired
            | R::MesCobrancaInvalid
            | R::ObservacaoTooLong
            | R::HorasAnaliseEfInvalid
            | R::FaturamentoDestinatariosRequired
            | R::FaturamentoDestinatariosInvalid => ErrorKind::Validation,
            R::ClienteNotFound | R::RequerimentoNotFound => ErrorKind::NotFound,
            R::RequerimentoAlreadySent
            | R::RequerimentoNotSent
            | R::RequerimentoLocked
            | R::DeleteNotAllowed
            | R::InvalidStatusTransition
            | R::FaturamentoSemRequerimentos => ErrorKind::Conflict,
            R::FaturamentoEmailFailed
            | R::DatabaseError
            | R::NetworkError
            | R::TimeoutError
            | R::RateLimitExceeded => ErrorKind::Transient,
            R::PermissionDenied => ErrorKind::Permission,
            R::ConfigurationError => ErrorKind::Configuration,
            R::UnknownError => ErrorKind::Internal,
        }
    }
}

impl Display for RequerimentoErrorCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
