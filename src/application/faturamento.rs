//! Billing summaries and the billing e-mail dispatch.

use std::collections::HashMap;
use std::sync::Arc;

use askama::Template;
use metrics::counter;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::application::email::{EmailMessage, EmailSender};
use crate::application::error::ServiceError;
use crate::application::repos::{EmpresasRepo, RequerimentoFilter, RequerimentosRepo};
use crate::domain::entities::RequerimentoRecord;
use crate::domain::error::{ErrorContext, RequerimentoError, RequerimentoErrorCode as Code};
use crate::domain::requerimentos::{MesCobranca, RequerimentoValidator};
use crate::domain::types::{RequerimentoStatus, TipoCobranca};

const TARGET: &str = "clientbooks::application::faturamento";
const METRIC_EMAIL_DISPATCH: &str = "clientbooks_email_dispatch_total";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrupoFaturamento {
    pub tipo_cobranca: TipoCobranca,
    pub quantidade: usize,
    pub horas_funcional: f64,
    pub horas_tecnico: f64,
    pub horas_total: f64,
}

impl GrupoFaturamento {
    fn empty(tipo_cobranca: TipoCobranca) -> Self {
        Self {
            tipo_cobranca,
            quantidade: 0,
            horas_funcional: 0.0,
            horas_tecnico: 0.0,
            horas_total: 0.0,
        }
    }
}

/// Requirements of one billing month grouped by billing type. Every billing type is
/// present, in report order, even when it has no requirement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DadosFaturamento {
    pub mes_cobranca: String,
    pub grupos: Vec<GrupoFaturamento>,
    pub total_requerimentos: usize,
    pub total_horas: f64,
    pub requerimentos: Vec<RequerimentoRecord>,
}

impl DadosFaturamento {
    pub fn from_records(mes: MesCobranca, requerimentos: Vec<RequerimentoRecord>) -> Self {
        let mut grupos: Vec<GrupoFaturamento> = TipoCobranca::all()
            .iter()
            .copied()
            .map(GrupoFaturamento::empty)
            .collect();

        for record in &requerimentos {
            if let Some(grupo) = grupos
                .iter_mut()
                .find(|grupo| grupo.tipo_cobranca == record.tipo_cobranca)
            {
                grupo.quantidade += 1;
                grupo.horas_funcional += record.horas_funcional;
                grupo.horas_tecnico += record.horas_tecnico;
                grupo.horas_total += record.horas_total();
            }
        }

        let total_horas = grupos.iter().map(|grupo| grupo.horas_total).sum();
        Self {
            mes_cobranca: mes.to_string(),
            total_requerimentos: requerimentos.len(),
            total_horas,
            grupos,
            requerimentos,
        }
    }

    /// Load the month's requirements awaiting billing and group them.
    pub async fn carregar(
        repo: &dyn RequerimentosRepo,
        mes: MesCobranca,
        operation: &'static str,
    ) -> Result<Self, RequerimentoError> {
        let filter = RequerimentoFilter {
            status: Some(RequerimentoStatus::EnviadoFaturamento),
            mes_cobranca: Some(mes.to_string()),
            ..RequerimentoFilter::default()
        };
        let records = repo
            .list_requerimentos(&filter)
            .await
            .map_err(|err| err.into_domain(operation))?;
        Ok(Self::from_records(mes, records))
    }

    pub fn grupo(&self, tipo: TipoCobranca) -> Option<&GrupoFaturamento> {
        self.grupos.iter().find(|grupo| grupo.tipo_cobranca == tipo)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DispararEmailCommand {
    pub mes_cobranca: String,
    pub destinatarios: Vec<String>,
    pub copia: Vec<String>,
    pub assunto: Option<String>,
    pub observacao: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisparoFaturamento {
    pub mes_cobranca: String,
    pub destinatarios: usize,
    pub requerimentos: usize,
    pub assunto: String,
}

struct LinhaResumo {
    tipo: &'static str,
    quantidade: usize,
    horas: String,
}

struct LinhaRequerimento {
    chamado: String,
    cliente: String,
    modulo: String,
    tipo: &'static str,
    horas: String,
}

#[derive(Template)]
#[template(path = "email/faturamento.html")]
struct FaturamentoEmailTemplate {
    titulo: String,
    mes_cobranca: String,
    observacao: Option<String>,
    resumo: Vec<LinhaResumo>,
    requerimentos: Vec<LinhaRequerimento>,
    total_requerimentos: usize,
    total_horas: String,
}

/// Hours in pt-BR notation with two decimals.
fn formatar_horas(horas: f64) -> String {
    format!("{horas:.2}").replace('.', ",")
}

fn render_email(
    titulo: &str,
    dados: &DadosFaturamento,
    empresas: &HashMap<Uuid, String>,
    observacao: Option<String>,
) -> Result<String, askama::Error> {
    let resumo = dados
        .grupos
        .iter()
        .map(|grupo| LinhaResumo {
            tipo: grupo.tipo_cobranca.as_str(),
            quantidade: grupo.quantidade,
            horas: formatar_horas(grupo.horas_total),
        })
        .collect();

    let requerimentos = dados
        .requerimentos
        .iter()
        .map(|record| LinhaRequerimento {
            chamado: record.chamado.clone(),
            cliente: empresas
                .get(&record.cliente_id)
                .cloned()
                .unwrap_or_else(|| record.cliente_id.to_string()),
            modulo: record.modulo.clone(),
            tipo: record.tipo_cobranca.as_str(),
            horas: formatar_horas(record.horas_total()),
        })
        .collect();

    FaturamentoEmailTemplate {
        titulo: titulo.to_string(),
        mes_cobranca: dados.mes_cobranca.clone(),
        observacao,
        resumo,
        requerimentos,
        total_requerimentos: dados.total_requerimentos,
        total_horas: formatar_horas(dados.total_horas),
    }
    .render()
}

#[derive(Clone)]
pub struct FaturamentoService {
    requerimentos: Arc<dyn RequerimentosRepo>,
    empresas: Arc<dyn EmpresasRepo>,
    sender: Arc<dyn EmailSender>,
}

impl FaturamentoService {
    pub fn new(
        requerimentos: Arc<dyn RequerimentosRepo>,
        empresas: Arc<dyn EmpresasRepo>,
        sender: Arc<dyn EmailSender>,
    ) -> Self {
        Self {
            requerimentos,
            empresas,
            sender,
        }
    }

    /// Validate recipients, render the month's billing summary and hand it to the e-mail
    /// boundary.
    pub async fn disparar_email(
        &self,
        actor: &str,
        command: DispararEmailCommand,
    ) -> Result<DisparoFaturamento, ServiceError<Code>> {
        let mes = MesCobranca::parse(&command.mes_cobranca).ok_or_else(|| {
            RequerimentoError::from_code(Code::MesCobrancaInvalid)
                .with_detail("field", "mes_cobranca")
                .with_detail("value", command.mes_cobranca.as_str())
        })?;

        let destinatarios = trimmed(&command.destinatarios);
        let copia = trimmed(&command.copia);
        let mut errors = RequerimentoValidator::validate_email_list(&destinatarios);
        if !copia.is_empty() {
            errors.extend(
                RequerimentoValidator::validate_email_list(&copia)
                    .into_iter()
                    .map(|err| err.with_detail("field", "copia")),
            );
        }
        if !errors.is_empty() {
            return Err(ServiceError::Invalid(errors));
        }

        let dados = DadosFaturamento::carregar(
            self.requerimentos.as_ref(),
            mes,
            "disparar_email_faturamento",
        )
        .await?;
        if dados.total_requerimentos == 0 {
            return Err(RequerimentoError::from_code(Code::FaturamentoSemRequerimentos)
                .with_detail("mes_cobranca", dados.mes_cobranca.as_str())
                .into());
        }

        let empresas: HashMap<Uuid, String> = self
            .empresas
            .list_empresas()
            .await
            .map_err(|err| err.into_domain::<Code>("disparar_email_faturamento"))?
            .into_iter()
            .map(|empresa| (empresa.id, empresa.nome_abreviado))
            .collect();

        let assunto = command
            .assunto
            .filter(|assunto| !assunto.trim().is_empty())
            .unwrap_or_else(|| format!("Faturamento de requerimentos - {mes}"));
        let observacao = command
            .observacao
            .filter(|observacao| !observacao.trim().is_empty());

        let html = render_email(&assunto, &dados, &empresas, observacao)
            .map_err(|err| email_failure("render", err.to_string()))?;

        let message = EmailMessage {
            to: destinatarios,
            cc: copia,
            subject: assunto.clone(),
            html,
            attachments: Vec::new(),
        };

        let result = self.sender.send(&message).await;
        let failure = match result {
            Ok(outcome) if outcome.success => None,
            Ok(outcome) => Some(email_failure(
                "provider",
                outcome.error.unwrap_or_else(|| "unknown".to_string()),
            )),
            Err(err) => Some(email_failure("transport", err.to_string())),
        };
        if let Some(error) = failure {
            counter!(METRIC_EMAIL_DISPATCH, "kind" => "faturamento", "result" => "failed")
                .increment(1);
            error.log();
            return Err(error.into());
        }
        counter!(METRIC_EMAIL_DISPATCH, "kind" => "faturamento", "result" => "sent").increment(1);

        info!(
            target: TARGET,
            actor,
            mes_cobranca = %mes,
            destinatarios = message.to.len(),
            copia = message.cc.len(),
            requerimentos = dados.total_requerimentos,
            "e-mail de faturamento enviado"
        );

        Ok(DisparoFaturamento {
            mes_cobranca: dados.mes_cobranca,
            destinatarios: message.to.len() + message.cc.len(),
            requerimentos: dados.total_requerimentos,
            assunto,
        })
    }
}

fn trimmed(emails: &[String]) -> Vec<String> {
    emails
        .iter()
        .map(|email| email.trim().to_string())
        .filter(|email| !email.is_empty())
        .collect()
}

fn email_failure(stage: &'static str, cause: String) -> RequerimentoError {
    RequerimentoError::from_code(Code::FaturamentoEmailFailed)
        .with_detail("stage", stage)
        .with_detail("cause", cause)
        .with_context(ErrorContext::operation("disparar_email_faturamento"))
}
