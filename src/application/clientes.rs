use std::future::Future;
use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::application::repos::{
    ClienteParams, ClientesRepo, ClientesWriteRepo, DisparosRepo, EmpresasRepo, RepoError,
};
use crate::domain::clientes::{ClienteFormData, ClienteInput, ClienteValidator};
use crate::domain::email::normalize_email;
use crate::domain::entities::{ClienteRecord, EmpresaRecord};
use crate::domain::error::{ClientBooksError, ClientBooksErrorCode as Code, ErrorContext};
use crate::domain::types::{ClienteStatus, EmpresaStatus};

const TARGET: &str = "clientbooks::application::clientes";

#[derive(Clone)]
pub struct ClienteService {
    reader: Arc<dyn ClientesRepo>,
    writer: Arc<dyn ClientesWriteRepo>,
    empresas: Arc<dyn EmpresasRepo>,
    disparos: Arc<dyn DisparosRepo>,
}

impl ClienteService {
    pub fn new(
        reader: Arc<dyn ClientesRepo>,
        writer: Arc<dyn ClientesWriteRepo>,
        empresas: Arc<dyn EmpresasRepo>,
        disparos: Arc<dyn DisparosRepo>,
    ) -> Self {
        Self {
            reader,
            writer,
            empresas,
            disparos,
        }
    }

    pub async fn criar(
        &self,
        actor: &str,
        form: ClienteFormData,
    ) -> Result<ClienteRecord, ClientBooksError> {
        let input = ClienteValidator::validate(&form)?;
        self.empresa_ativa(input.empresa_id).await?;
        self.ensure_email_livre(&input, None).await?;

        let empresa_id = input.empresa_id;
        let principal = input.principal_contato;
        let params = params_from_input(input);
        let write = move || async move {
            self.writer
                .create_cliente(params)
                .await
                .map_err(|err| write_error(err, ErrorContext::operation("criar_cliente")))
        };

        let record = if principal {
            self.trocar_contato_principal(empresa_id, None, write).await?
        } else {
            write().await?
        };

        info!(
            target: TARGET,
            actor,
            id = %record.id,
            empresa_id = %record.empresa_id,
            principal_contato = record.principal_contato,
            "cliente criado"
        );
        Ok(record)
    }

    pub async fn atualizar(
        &self,
        actor: &str,
        id: Uuid,
        form: ClienteFormData,
    ) -> Result<ClienteRecord, ClientBooksError> {
        let current = self.buscar(id).await?;
        let input = ClienteValidator::validate(&form)?;
        // Contacts of an inactive company are frozen, moved or not.
        self.empresa_ativa(input.empresa_id).await?;
        self.ensure_email_livre(&input, Some(id)).await?;

        let empresa_id = input.empresa_id;
        let promote = input.principal_contato
            && (!current.principal_contato || empresa_id != current.empresa_id);
        let params = params_from_input(input);
        let write = move || async move {
            self.writer.update_cliente(id, params).await.map_err(|err| {
                write_error(err, ErrorContext::operation("atualizar_cliente").with_entity(id))
            })
        };

        let record = if promote {
            self.trocar_contato_principal(empresa_id, Some(id), write)
                .await?
        } else {
            write().await?
        };

        info!(target: TARGET, actor, id = %id, "cliente atualizado");
        Ok(record)
    }

    /// Inactivation requires a status description.
    pub async fn alterar_status(
        &self,
        actor: &str,
        id: Uuid,
        status: ClienteStatus,
        descricao_status: Option<String>,
    ) -> Result<ClienteRecord, ClientBooksError> {
        let descricao_status = descricao_status
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        ClienteValidator::validate_status(status, descricao_status.as_deref())?;
        self.buscar(id).await?;

        let record = self
            .writer
            .update_cliente_status(id, status, descricao_status)
            .await
            .map_err(|err| {
                write_error(
                    err,
                    ErrorContext::operation("alterar_status_cliente").with_entity(id),
                )
            })?;

        info!(
            target: TARGET,
            actor,
            id = %id,
            status = ?record.status,
            "status do cliente alterado"
        );
        Ok(record)
    }

    pub async fn buscar(&self, id: Uuid) -> Result<ClienteRecord, ClientBooksError> {
        self.reader
            .find_cliente(id)
            .await
            .map_err(|err| err.into_domain("buscar_cliente"))?
            .ok_or_else(|| {
                ClientBooksError::from_code(Code::ClienteNotFound)
                    .with_context(ErrorContext::operation("buscar_cliente").with_entity(id))
            })
    }

    pub async fn listar_por_empresa(
        &self,
        empresa_id: Uuid,
    ) -> Result<Vec<ClienteRecord>, ClientBooksError> {
        self.empresa(empresa_id).await?;
        self.reader
            .list_clientes_by_empresa(empresa_id)
            .await
            .map_err(|err| err.into_domain("listar_clientes"))
    }

    /// Refused while any dispatch history references the contact.
    pub async fn deletar(&self, actor: &str, id: Uuid) -> Result<(), ClientBooksError> {
        self.buscar(id).await?;

        let historico = self
            .disparos
            .count_for_cliente(id)
            .await
            .map_err(|err| err.into_domain::<Code>("deletar_cliente"))?;
        if historico > 0 {
            return Err(ClientBooksError::from_code(Code::ClienteHasHistory)
                .with_detail("disparos", historico)
                .with_context(ErrorContext::operation("deletar_cliente").with_entity(id)));
        }

        self.writer
            .delete_cliente(id)
            .await
            .map_err(|err| {
                write_error(err, ErrorContext::operation("deletar_cliente").with_entity(id))
            })?;

        info!(target: TARGET, actor, id = %id, "cliente excluído");
        Ok(())
    }

    async fn empresa(&self, empresa_id: Uuid) -> Result<EmpresaRecord, ClientBooksError> {
        self.empresas
            .find_empresa(empresa_id)
            .await
            .map_err(|err| err.into_domain("buscar_empresa"))?
            .ok_or_else(|| {
                ClientBooksError::from_code(Code::EmpresaNotFound)
                    .with_context(ErrorContext::operation("buscar_empresa").with_entity(empresa_id))
            })
    }

    async fn empresa_ativa(&self, empresa_id: Uuid) -> Result<EmpresaRecord, ClientBooksError> {
        let empresa = self.empresa(empresa_id).await?;
        if empresa.status != EmpresaStatus::Ativo {
            return Err(ClientBooksError::from_code(Code::EmpresaInativa)
                .with_detail("empresa", empresa.nome_abreviado.as_str())
                .with_context(ErrorContext::operation("validar_empresa").with_entity(empresa_id)));
        }
        Ok(empresa)
    }

    async fn ensure_email_livre(
        &self,
        input: &ClienteInput,
        exceto: Option<Uuid>,
    ) -> Result<(), ClientBooksError> {
        let existente = self
            .reader
            .find_cliente_by_email(input.empresa_id, &normalize_email(&input.email))
            .await
            .map_err(|err| err.into_domain("verificar_email_cliente"))?;

        match existente {
            Some(cliente) if Some(cliente.id) != exceto => {
                Err(ClientBooksError::from_code(Code::ClienteEmailDuplicado)
                    .with_detail("field", "email")
                    .with_detail("clienteExistenteId", cliente.id.to_string()))
            }
            _ => Ok(()),
        }
    }

    /// Primary-contact switch as a compensating sequence: clear the current primaries, run
    /// `write`, and put the cleared flags back if anything after the first clear fails.
    async fn trocar_contato_principal<T, F, Fut>(
        &self,
        empresa_id: Uuid,
        exceto: Option<Uuid>,
        write: F,
    ) -> Result<T, ClientBooksError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ClientBooksError>>,
    {
        let anteriores: Vec<Uuid> = self
            .reader
            .list_principais(empresa_id)
            .await
            .map_err(|err| err.into_domain::<Code>("listar_contatos_principais"))?
            .into_iter()
            .map(|cliente| cliente.id)
            .filter(|id| Some(*id) != exceto)
            .collect();

        let mut limpos = Vec::with_capacity(anteriores.len());
        for id in anteriores {
            if let Err(err) = self.writer.set_principal_contato(id, false).await {
                self.restaurar_principais(&limpos).await;
                return Err(err.into_domain("limpar_contato_principal"));
            }
            limpos.push(id);
        }

        match write().await {
            Ok(value) => {
                if !limpos.is_empty() {
                    info!(
                        target: TARGET,
                        empresa_id = %empresa_id,
                        anteriores = limpos.len(),
                        "contato principal substituído"
                    );
                }
                Ok(value)
            }
            Err(err) => {
                self.restaurar_principais(&limpos).await;
                Err(err)
            }
        }
    }

    async fn restaurar_principais(&self, ids: &[Uuid]) {
        for &id in ids {
            if let Err(err) = self.writer.set_principal_contato(id, true).await {
                ClientBooksError::from_code(Code::PrincipalContatoRestoreFailed)
                    .with_detail("cause", err.to_string())
                    .with_context(
                        ErrorContext::operation("restaurar_contato_principal").with_entity(id),
                    )
                    .log();
            }
        }
    }
}

fn params_from_input(input: ClienteInput) -> ClienteParams {
    ClienteParams {
        nome_completo: input.nome_completo,
        email: input.email,
        funcao: input.funcao,
        empresa_id: input.empresa_id,
        status: input.status,
        descricao_status: input.descricao_status,
        principal_contato: input.principal_contato,
    }
}

fn write_error(err: RepoError, context: ErrorContext) -> ClientBooksError {
    match err {
        RepoError::Duplicate { constraint } => {
            ClientBooksError::from_code(Code::ClienteEmailDuplicado)
                .with_detail("constraint", constraint)
                .with_context(context)
        }
        RepoError::NotFound => {
            ClientBooksError::from_code(Code::ClienteNotFound).with_context(context)
        }
        other => {
            let operation = context.operation.clone().unwrap_or_default();
            other.into_domain(&operation).with_context(context)
        }
    }
}
