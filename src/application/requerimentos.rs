use std::sync::Arc;

use metrics::counter;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::{info, warn};
use uuid::Uuid;

use crate::application::error::ServiceError;
use crate::application::faturamento::DadosFaturamento;
use crate::application::repos::{
    CreateRequerimentoParams, EmpresasRepo, RepoError, RequerimentoFilter, RequerimentosRepo,
    RequerimentosWriteRepo, UpdateRequerimentoParams,
};
use crate::domain::entities::RequerimentoRecord;
use crate::domain::error::{
    ErrorCatalog, ErrorContext, RequerimentoError, RequerimentoErrorCode as Code,
};
use crate::domain::requerimentos::{
    FieldValue, MesCobranca, OBSERVACAO_ANALISE_EF, RequerimentoFormData, RequerimentoInput,
    RequerimentoValidator,
};
use crate::domain::types::{RequerimentoStatus, TipoCobranca};

const TARGET: &str = "clientbooks::application::requerimentos";
const METRIC_TRANSITIONS: &str = "clientbooks_requerimentos_transition_total";

pub type RequerimentoServiceError = ServiceError<Code>;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CriarRequerimentoCommand {
    #[serde(flatten)]
    pub form: RequerimentoFormData,
    /// Analysis hours of a rejected requirement, booked separately as hour bank.
    #[serde(default)]
    pub horas_analise_ef: Option<FieldValue>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CriarRequerimentoOutcome {
    pub requerimento: RequerimentoRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banco_de_horas: Option<RequerimentoRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FalhaLote {
    pub id: Uuid,
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ResultadoLote {
    pub enviados: Vec<RequerimentoRecord>,
    pub falhas: Vec<FalhaLote>,
}

#[derive(Clone)]
pub struct RequerimentoService {
    reader: Arc<dyn RequerimentosRepo>,
    writer: Arc<dyn RequerimentosWriteRepo>,
    empresas: Arc<dyn EmpresasRepo>,
}

impl RequerimentoService {
    pub fn new(
        reader: Arc<dyn RequerimentosRepo>,
        writer: Arc<dyn RequerimentosWriteRepo>,
        empresas: Arc<dyn EmpresasRepo>,
    ) -> Self {
        Self {
            reader,
            writer,
            empresas,
        }
    }

    pub async fn criar(
        &self,
        actor: &str,
        command: CriarRequerimentoCommand,
    ) -> Result<CriarRequerimentoOutcome, RequerimentoServiceError> {
        let (input, horas_analise) = match (
            RequerimentoValidator::parse(&command.form),
            parse_horas_analise(command.horas_analise_ef.as_ref()),
        ) {
            (Ok(input), Ok(horas)) => (input, horas),
            (Err(mut errors), Err(err)) => {
                errors.push(err);
                return Err(ServiceError::Invalid(errors));
            }
            (Err(errors), Ok(_)) => return Err(ServiceError::Invalid(errors)),
            (Ok(_), Err(err)) => return Err(ServiceError::Invalid(vec![err])),
        };

        self.ensure_cliente(input.cliente_id, "criar_requerimento").await?;

        let params = params_from_input(input);
        let spawn_banco = params.tipo_cobranca == TipoCobranca::Reprovado && horas_analise > 0.0;
        let banco_params = spawn_banco.then(|| CreateRequerimentoParams {
            horas_funcional: horas_analise,
            horas_tecnico: 0.0,
            tipo_cobranca: TipoCobranca::BancoDeHoras,
            observacao: Some(OBSERVACAO_ANALISE_EF.to_string()),
            ..params.clone()
        });

        let requerimento = self
            .writer
            .create_requerimento(params)
            .await
            .map_err(|err| repo_error(err, "criar_requerimento", None))?;

        info!(
            target: TARGET,
            actor,
            id = %requerimento.id,
            chamado = %requerimento.chamado,
            tipo_cobranca = %requerimento.tipo_cobranca,
            "requerimento criado"
        );

        let banco_de_horas = match banco_params {
            Some(params) => {
                let record = self.writer.create_requerimento(params).await.map_err(|err| {
                    let error: RequerimentoError =
                        repo_error(err, "criar_banco_de_horas", Some(requerimento.id))
                            .with_detail("requerimentoOrigemId", requerimento.id.to_string());
                    error.log();
                    error
                })?;
                info!(
                    target: TARGET,
                    actor,
                    id = %record.id,
                    origem = %requerimento.id,
                    horas = horas_analise,
                    "banco de horas de análise EF lançado"
                );
                Some(record)
            }
            None => None,
        };

        Ok(CriarRequerimentoOutcome {
            requerimento,
            banco_de_horas,
        })
    }

    /// Only requirements still in `lancado` can be edited.
    pub async fn atualizar(
        &self,
        actor: &str,
        id: Uuid,
        form: RequerimentoFormData,
    ) -> Result<RequerimentoRecord, RequerimentoServiceError> {
        let current = self.buscar(id).await?;
        if current.status != RequerimentoStatus::Lancado {
            return Err(
                lifecycle_error(Code::RequerimentoLocked, &current, "atualizar_requerimento").into(),
            );
        }

        let input = RequerimentoValidator::parse(&form)
            .map_err(ServiceError::Invalid)?;
        self.ensure_cliente(input.cliente_id, "atualizar_requerimento").await?;

        let record = match self
            .writer
            .update_requerimento(UpdateRequerimentoParams {
                id,
                fields: params_from_input(input),
            })
            .await
        {
            Ok(record) => record,
            Err(RepoError::NotFound) => {
                return Err(self
                    .write_rejected(id, Code::RequerimentoLocked, "atualizar_requerimento")
                    .await
                    .into());
            }
            Err(err) => return Err(repo_error(err, "atualizar_requerimento", Some(id)).into()),
        };

        info!(target: TARGET, actor, id = %id, "requerimento atualizado");
        Ok(record)
    }

    pub async fn buscar(&self, id: Uuid) -> Result<RequerimentoRecord, RequerimentoError> {
        self.reader
            .find_requerimento(id)
            .await
            .map_err(|err| repo_error(err, "buscar_requerimento", Some(id)))?
            .ok_or_else(|| not_found(id, "buscar_requerimento"))
    }

    pub async fn listar(
        &self,
        filter: &RequerimentoFilter,
    ) -> Result<Vec<RequerimentoRecord>, RequerimentoError> {
        if let Some(mes) = filter.mes_cobranca.as_deref()
            && MesCobranca::parse(mes).is_none()
        {
            return Err(RequerimentoError::from_code(Code::MesCobrancaInvalid)
                .with_detail("field", "mes_cobranca")
                .with_detail("value", mes));
        }

        self.reader
            .list_requerimentos(filter)
            .await
            .map_err(|err| err.into_domain("listar_requerimentos"))
    }

    /// `lancado` → `enviado_faturamento`. Requires billing type, a `MM/YYYY` billing month
    /// and an approval date.
    pub async fn enviar_para_faturamento(
        &self,
        actor: &str,
        id: Uuid,
    ) -> Result<RequerimentoRecord, RequerimentoError> {
        let current = self.buscar(id).await?;
        check_pode_enviar(&current)?;

        let record = match self
            .writer
            .mark_enviado_faturamento(id, OffsetDateTime::now_utc())
            .await
        {
            Ok(record) => record,
            Err(RepoError::NotFound) => {
                return Err(self
                    .write_rejected(id, Code::RequerimentoAlreadySent, "enviar_para_faturamento")
                    .await);
            }
            Err(err) => return Err(repo_error(err, "enviar_para_faturamento", Some(id))),
        };
        counter!(METRIC_TRANSITIONS, "to" => RequerimentoStatus::EnviadoFaturamento.as_str())
            .increment(1);

        info!(
            target: TARGET,
            actor,
            id = %id,
            mes_cobranca = record.mes_cobranca.as_deref().unwrap_or(""),
            "requerimento enviado para faturamento"
        );
        Ok(record)
    }

    /// Sends each id independently; one failure does not stop the batch.
    pub async fn enviar_lote_para_faturamento(
        &self,
        actor: &str,
        ids: &[Uuid],
    ) -> ResultadoLote {
        let mut resultado = ResultadoLote::default();
        for &id in ids {
            match self.enviar_para_faturamento(actor, id).await {
                Ok(record) => resultado.enviados.push(record),
                Err(err) => {
                    err.log();
                    resultado.falhas.push(FalhaLote {
                        id,
                        code: err.code().as_str(),
                        message: err.message().to_string(),
                    });
                }
            }
        }

        info!(
            target: TARGET,
            actor,
            enviados = resultado.enviados.len(),
            falhas = resultado.falhas.len(),
            "lote enviado para faturamento"
        );
        resultado
    }

    /// `enviado_faturamento` → `faturado`. Ids in any other state are left untouched.
    pub async fn marcar_como_faturados(
        &self,
        actor: &str,
        ids: &[Uuid],
    ) -> Result<Vec<RequerimentoRecord>, RequerimentoError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let records = self
            .writer
            .mark_faturados(ids, OffsetDateTime::now_utc())
            .await
            .map_err(|err| err.into_domain("marcar_como_faturados"))?;

        if records.len() < ids.len() {
            warn!(
                target: TARGET,
                actor,
                solicitados = ids.len(),
                faturados = records.len(),
                "requerimentos fora de enviado_faturamento ignorados"
            );
        }
        counter!(METRIC_TRANSITIONS, "to" => RequerimentoStatus::Faturado.as_str())
            .increment(records.len() as u64);
        info!(target: TARGET, actor, faturados = records.len(), "requerimentos faturados");
        Ok(records)
    }

    /// Back to `lancado` from either billing state.
    pub async fn rejeitar(
        &self,
        actor: &str,
        id: Uuid,
    ) -> Result<RequerimentoRecord, RequerimentoError> {
        let current = self.buscar(id).await?;
        if current.status == RequerimentoStatus::Lancado {
            return Err(lifecycle_error(
                Code::RequerimentoNotSent,
                &current,
                "rejeitar_requerimento",
            ));
        }

        let record = match self.writer.reset_to_lancado(id).await {
            Ok(record) => record,
            Err(RepoError::NotFound) => {
                return Err(self
                    .write_rejected(id, Code::RequerimentoNotSent, "rejeitar_requerimento")
                    .await);
            }
            Err(err) => return Err(repo_error(err, "rejeitar_requerimento", Some(id))),
        };
        counter!(METRIC_TRANSITIONS, "to" => RequerimentoStatus::Lancado.as_str()).increment(1);

        info!(
            target: TARGET,
            actor,
            id = %id,
            status_anterior = current.status.as_str(),
            "requerimento rejeitado"
        );
        Ok(record)
    }

    pub async fn deletar(&self, actor: &str, id: Uuid) -> Result<(), RequerimentoError> {
        let current = self.buscar(id).await?;
        if current.enviado_faturamento {
            return Err(lifecycle_error(
                Code::DeleteNotAllowed,
                &current,
                "deletar_requerimento",
            ));
        }

        match self.writer.delete_requerimento(id).await {
            Ok(()) => {}
            Err(RepoError::NotFound) => {
                return Err(self
                    .write_rejected(id, Code::DeleteNotAllowed, "deletar_requerimento")
                    .await);
            }
            Err(err) => return Err(repo_error(err, "deletar_requerimento", Some(id))),
        }

        info!(target: TARGET, actor, id = %id, "requerimento excluído");
        Ok(())
    }

    /// Requirements awaiting billing in `mes`, grouped by billing type.
    pub async fn gerar_dados_faturamento(
        &self,
        mes: MesCobranca,
    ) -> Result<DadosFaturamento, RequerimentoError> {
        DadosFaturamento::carregar(self.reader.as_ref(), mes, "gerar_dados_faturamento").await
    }

    /// A guarded write matched no row: the record changed state after it was read, or is gone.
    async fn write_rejected(
        &self,
        id: Uuid,
        code: Code,
        operation: &'static str,
    ) -> RequerimentoError {
        match self.reader.find_requerimento(id).await {
            Ok(Some(record)) => {
                warn!(
                    target: TARGET,
                    id = %id,
                    operation,
                    status = record.status.as_str(),
                    "requerimento alterado concorrentemente"
                );
                lifecycle_error(code, &record, operation)
            }
            Ok(None) => not_found(id, operation),
            Err(err) => err.into_domain(operation),
        }
    }

    async fn ensure_cliente(
        &self,
        cliente_id: Uuid,
        operation: &'static str,
    ) -> Result<(), RequerimentoError> {
        match self.empresas.find_empresa(cliente_id).await {
            Ok(Some(_)) => Ok(()),
            Ok(None) => Err(RequerimentoError::from_code(Code::ClienteNotFound)
                .with_detail("field", "cliente_id")
                .with_context(ErrorContext::operation(operation).with_entity(cliente_id))),
            Err(err) => Err(err.into_domain(operation)),
        }
    }
}

fn check_pode_enviar(record: &RequerimentoRecord) -> Result<(), RequerimentoError> {
    const OPERATION: &str = "enviar_para_faturamento";

    if record.enviado_faturamento || record.status != RequerimentoStatus::Lancado {
        return Err(lifecycle_error(Code::RequerimentoAlreadySent, record, OPERATION));
    }
    match record.mes_cobranca.as_deref() {
        None => return Err(lifecycle_error(Code::MesCobrancaRequired, record, OPERATION)),
        Some(mes) if MesCobranca::parse(mes).is_none() => {
            return Err(lifecycle_error(Code::MesCobrancaInvalid, record, OPERATION)
                .with_detail("value", mes));
        }
        Some(_) => {}
    }
    if record.data_aprovacao.is_none() {
        return Err(lifecycle_error(Code::DataAprovacaoRequired, record, OPERATION));
    }
    Ok(())
}

fn lifecycle_error(
    code: Code,
    record: &RequerimentoRecord,
    operation: &'static str,
) -> RequerimentoError {
    RequerimentoError::from_code(code)
        .with_detail("status", record.status.as_str())
        .with_context(ErrorContext::operation(operation).with_entity(record.id))
}

fn not_found(id: Uuid, operation: &'static str) -> RequerimentoError {
    RequerimentoError::from_code(Code::RequerimentoNotFound)
        .with_context(ErrorContext::operation(operation).with_entity(id))
}

const CLIENTE_FOREIGN_KEY: &str = "requerimentos_cliente_id_fkey";

fn repo_error(err: RepoError, operation: &'static str, id: Option<Uuid>) -> RequerimentoError {
    match (err, id) {
        (RepoError::NotFound, Some(id)) => not_found(id, operation),
        (RepoError::ForeignKey { constraint }, _) if constraint == CLIENTE_FOREIGN_KEY => {
            RequerimentoError::from_code(Code::ClienteNotFound)
                .with_detail("field", "cliente_id")
                .with_detail("constraint", constraint)
                .with_context(ErrorContext::operation(operation))
        }
        (other, _) => other.into_domain(operation),
    }
}

fn parse_horas_analise(value: Option<&FieldValue>) -> Result<f64, RequerimentoError> {
    let Some(value) = value.filter(|value| !value.is_blank()) else {
        return Ok(0.0);
    };
    match value.as_f64() {
        Some(hours) if hours >= 0.0 => Ok(hours),
        _ => Err(RequerimentoError::from_code(Code::HorasAnaliseEfInvalid)
            .with_detail("field", "horas_analise_ef")),
    }
}

fn params_from_input(input: RequerimentoInput) -> CreateRequerimentoParams {
    CreateRequerimentoParams {
        chamado: input.chamado,
        cliente_id: input.cliente_id,
        modulo: input.modulo,
        descricao: input.descricao,
        data_envio: input.data_envio,
        data_aprovacao: Some(input.data_aprovacao),
        horas_funcional: input.horas_funcional,
        horas_tecnico: input.horas_tecnico,
        linguagem: input.linguagem,
        tipo_cobranca: input.tipo_cobranca,
        mes_cobranca: Some(input.mes_cobranca.to_string()),
        observacao: input.observacao,
    }
}
