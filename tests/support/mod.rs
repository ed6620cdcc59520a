#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response};
use http_body_util::BodyExt;
use serde_json::Value;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tower::ServiceExt;
use uuid::Uuid;

use clientbooks::application::clientes::ClienteService;
use clientbooks::application::email::{EmailError, EmailMessage, EmailOutcome, EmailSender};
use clientbooks::application::especialistas::EspecialistaService;
use clientbooks::application::faturamento::FaturamentoService;
use clientbooks::application::permissions::PermissionService;
use clientbooks::application::repos::{
    ClienteParams, ClientesRepo, ClientesWriteRepo, CreateEspecialistaParams,
    CreateRequerimentoParams, DisparosRepo, EmpresasRepo, EspecialistasRepo, PermissionsRepo,
    RepoError, RequerimentoFilter, RequerimentosRepo, RequerimentosWriteRepo,
    UpdateRequerimentoParams, UserGroupRecord,
};
use clientbooks::application::requerimentos::RequerimentoService;
use clientbooks::application::retry::RetryPolicy;
use clientbooks::domain::entities::{
    ClienteRecord, EmpresaRecord, EspecialistaRecord, RequerimentoRecord,
};
use clientbooks::domain::types::{EmpresaStatus, PermissionLevel, RequerimentoStatus};
use clientbooks::infra::error::InfraError;
use clientbooks::infra::http::{self, ApiState, HealthCheck, USER_ID_HEADER};

/// In-memory stand-in for every Postgres repository.
#[derive(Default)]
pub struct MemoryStore {
    pub empresas: Mutex<HashMap<Uuid, EmpresaRecord>>,
    pub requerimentos: Mutex<HashMap<Uuid, RequerimentoRecord>>,
    pub clientes: Mutex<HashMap<Uuid, ClienteRecord>>,
    pub especialistas: Mutex<Vec<EspecialistaRecord>>,
    pub disparos: Mutex<HashMap<Uuid, u64>>,
    pub groups: Mutex<HashMap<Uuid, Uuid>>,
    pub grants: Mutex<HashMap<(Uuid, String), PermissionLevel>>,
    pub healthy: std::sync::atomic::AtomicBool,
}

pub const SCREENS: [&str; 4] = ["requerimentos", "faturamento", "clientes", "especialistas"];

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        let store = Self::default();
        store
            .healthy
            .store(true, std::sync::atomic::Ordering::SeqCst);
        Arc::new(store)
    }

    pub async fn add_empresa(&self, nome: &str, status: EmpresaStatus) -> Uuid {
        let now = OffsetDateTime::now_utc();
        let id = Uuid::new_v4();
        self.empresas.lock().await.insert(
            id,
            EmpresaRecord {
                id,
                nome_completo: format!("{nome} S.A."),
                nome_abreviado: nome.to_string(),
                status,
                created_at: now,
                updated_at: now,
            },
        );
        id
    }

    /// A user in a fresh group holding `level` on every screen.
    pub async fn add_user(&self, level: PermissionLevel) -> Uuid {
        let user = Uuid::new_v4();
        let group = Uuid::new_v4();
        self.groups.lock().await.insert(user, group);
        let mut grants = self.grants.lock().await;
        for screen in SCREENS {
            grants.insert((group, screen.to_string()), level);
        }
        user
    }

    pub async fn grant(&self, user: Uuid, screen: &str, level: PermissionLevel) {
        let group = self.groups.lock().await.get(&user).copied();
        if let Some(group) = group {
            self.grants
                .lock()
                .await
                .insert((group, screen.to_string()), level);
        }
    }
}

fn record_from_params(id: Uuid, params: CreateRequerimentoParams) -> RequerimentoRecord {
    let now = OffsetDateTime::now_utc();
    RequerimentoRecord {
        id,
        chamado: params.chamado,
        cliente_id: params.cliente_id,
        modulo: params.modulo,
        descricao: params.descricao,
        data_envio: params.data_envio,
        data_aprovacao: params.data_aprovacao,
        horas_funcional: params.horas_funcional,
        horas_tecnico: params.horas_tecnico,
        linguagem: params.linguagem,
        tipo_cobranca: params.tipo_cobranca,
        mes_cobranca: params.mes_cobranca,
        observacao: params.observacao,
        status: RequerimentoStatus::Lancado,
        enviado_faturamento: false,
        data_envio_faturamento: None,
        data_faturamento: None,
        created_at: now,
        updated_at: now,
    }
}

#[async_trait]
impl RequerimentosRepo for MemoryStore {
    async fn find_requerimento(&self, id: Uuid) -> Result<Option<RequerimentoRecord>, RepoError> {
        Ok(self.requerimentos.lock().await.get(&id).cloned())
    }

    async fn list_requerimentos(
        &self,
        filter: &RequerimentoFilter,
    ) -> Result<Vec<RequerimentoRecord>, RepoError> {
        let mut records: Vec<RequerimentoRecord> = self
            .requerimentos
            .lock()
            .await
            .values()
            .filter(|record| filter.status.is_none_or(|status| record.status == status))
            .filter(|record| filter.cliente_id.is_none_or(|id| record.cliente_id == id))
            .filter(|record| {
                filter
                    .tipo_cobranca
                    .is_none_or(|tipo| record.tipo_cobranca == tipo)
            })
            .filter(|record| {
                filter
                    .mes_cobranca
                    .as_ref()
                    .is_none_or(|mes| record.mes_cobranca.as_ref() == Some(mes))
            })
            .cloned()
            .collect();
        records.sort_by_key(|record| record.created_at);
        Ok(records)
    }
}

#[async_trait]
impl RequerimentosWriteRepo for MemoryStore {
    async fn create_requerimento(
        &self,
        params: CreateRequerimentoParams,
    ) -> Result<RequerimentoRecord, RepoError> {
        let record = record_from_params(Uuid::new_v4(), params);
        self.requerimentos
            .lock()
            .await
            .insert(record.id, record.clone());
        Ok(record)
    }

    async fn update_requerimento(
        &self,
        params: UpdateRequerimentoParams,
    ) -> Result<RequerimentoRecord, RepoError> {
        let mut records = self.requerimentos.lock().await;
        let current = records
            .get(&params.id)
            .filter(|record| editable(record))
            .ok_or(RepoError::NotFound)?;
        let record = RequerimentoRecord {
            created_at: current.created_at,
            ..record_from_params(params.id, params.fields)
        };
        records.insert(record.id, record.clone());
        Ok(record)
    }

    async fn mark_enviado_faturamento(
        &self,
        id: Uuid,
        at: OffsetDateTime,
    ) -> Result<RequerimentoRecord, RepoError> {
        let mut records = self.requerimentos.lock().await;
        let record = records
            .get_mut(&id)
            .filter(|record| editable(record))
            .ok_or(RepoError::NotFound)?;
        record.status = RequerimentoStatus::EnviadoFaturamento;
        record.enviado_faturamento = true;
        record.data_envio_faturamento = Some(at);
        Ok(record.clone())
    }

    async fn mark_faturados(
        &self,
        ids: &[Uuid],
        at: OffsetDateTime,
    ) -> Result<Vec<RequerimentoRecord>, RepoError> {
        let mut records = self.requerimentos.lock().await;
        let mut updated = Vec::new();
        for id in ids {
            if let Some(record) = records.get_mut(id)
                && record.status == RequerimentoStatus::EnviadoFaturamento
            {
                record.status = RequerimentoStatus::Faturado;
                record.data_faturamento = Some(at);
                updated.push(record.clone());
            }
        }
        Ok(updated)
    }

    async fn reset_to_lancado(&self, id: Uuid) -> Result<RequerimentoRecord, RepoError> {
        let mut records = self.requerimentos.lock().await;
        let record = records
            .get_mut(&id)
            .filter(|record| record.status != RequerimentoStatus::Lancado)
            .ok_or(RepoError::NotFound)?;
        record.status = RequerimentoStatus::Lancado;
        record.enviado_faturamento = false;
        record.data_envio_faturamento = None;
        record.data_faturamento = None;
        Ok(record.clone())
    }

    async fn delete_requerimento(&self, id: Uuid) -> Result<(), RepoError> {
        let mut records = self.requerimentos.lock().await;
        if records
            .get(&id)
            .is_none_or(|record| record.enviado_faturamento)
        {
            return Err(RepoError::NotFound);
        }
        records.remove(&id);
        Ok(())
    }
}

fn editable(record: &RequerimentoRecord) -> bool {
    record.status == RequerimentoStatus::Lancado && !record.enviado_faturamento
}

fn cliente_from_params(id: Uuid, params: ClienteParams) -> ClienteRecord {
    let now = OffsetDateTime::now_utc();
    ClienteRecord {
        id,
        nome_completo: params.nome_completo,
        email: params.email,
        funcao: params.funcao,
        empresa_id: params.empresa_id,
        status: params.status,
        descricao_status: params.descricao_status,
        principal_contato: params.principal_contato,
        created_at: now,
        updated_at: now,
    }
}

#[async_trait]
impl ClientesRepo for MemoryStore {
    async fn find_cliente(&self, id: Uuid) -> Result<Option<ClienteRecord>, RepoError> {
        Ok(self.clientes.lock().await.get(&id).cloned())
    }

    async fn list_clientes_by_empresa(
        &self,
        empresa_id: Uuid,
    ) -> Result<Vec<ClienteRecord>, RepoError> {
        let mut clientes: Vec<ClienteRecord> = self
            .clientes
            .lock()
            .await
            .values()
            .filter(|cliente| cliente.empresa_id == empresa_id)
            .cloned()
            .collect();
        clientes.sort_by(|a, b| a.nome_completo.cmp(&b.nome_completo));
        Ok(clientes)
    }

    async fn find_cliente_by_email(
        &self,
        empresa_id: Uuid,
        email: &str,
    ) -> Result<Option<ClienteRecord>, RepoError> {
        let needle = email.trim().to_lowercase();
        Ok(self
            .clientes
            .lock()
            .await
            .values()
            .find(|cliente| {
                cliente.empresa_id == empresa_id && cliente.email.trim().to_lowercase() == needle
            })
            .cloned())
    }

    async fn list_principais(&self, empresa_id: Uuid) -> Result<Vec<ClienteRecord>, RepoError> {
        Ok(self
            .clientes
            .lock()
            .await
            .values()
            .filter(|cliente| cliente.empresa_id == empresa_id && cliente.principal_contato)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ClientesWriteRepo for MemoryStore {
    async fn create_cliente(&self, params: ClienteParams) -> Result<ClienteRecord, RepoError> {
        let record = cliente_from_params(Uuid::new_v4(), params);
        self.clientes.lock().await.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update_cliente(
        &self,
        id: Uuid,
        params: ClienteParams,
    ) -> Result<ClienteRecord, RepoError> {
        let mut clientes = self.clientes.lock().await;
        if !clientes.contains_key(&id) {
            return Err(RepoError::NotFound);
        }
        let record = cliente_from_params(id, params);
        clientes.insert(id, record.clone());
        Ok(record)
    }

    async fn update_cliente_status(
        &self,
        id: Uuid,
        status: clientbooks::domain::types::ClienteStatus,
        descricao_status: Option<String>,
    ) -> Result<ClienteRecord, RepoError> {
        let mut clientes = self.clientes.lock().await;
        let record = clientes.get_mut(&id).ok_or(RepoError::NotFound)?;
        record.status = status;
        record.descricao_status = descricao_status;
        Ok(record.clone())
    }

    async fn set_principal_contato(&self, id: Uuid, principal: bool) -> Result<(), RepoError> {
        let mut clientes = self.clientes.lock().await;
        let record = clientes.get_mut(&id).ok_or(RepoError::NotFound)?;
        record.principal_contato = principal;
        Ok(())
    }

    async fn delete_cliente(&self, id: Uuid) -> Result<(), RepoError> {
        self.clientes
            .lock()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl EmpresasRepo for MemoryStore {
    async fn find_empresa(&self, id: Uuid) -> Result<Option<EmpresaRecord>, RepoError> {
        Ok(self.empresas.lock().await.get(&id).cloned())
    }

    async fn list_empresas(&self) -> Result<Vec<EmpresaRecord>, RepoError> {
        Ok(self.empresas.lock().await.values().cloned().collect())
    }
}

#[async_trait]
impl DisparosRepo for MemoryStore {
    async fn count_for_cliente(&self, cliente_id: Uuid) -> Result<u64, RepoError> {
        Ok(self
            .disparos
            .lock()
            .await
            .get(&cliente_id)
            .copied()
            .unwrap_or(0))
    }
}

#[async_trait]
impl PermissionsRepo for MemoryStore {
    async fn find_user_group(&self, user_id: Uuid) -> Result<Option<UserGroupRecord>, RepoError> {
        Ok(self
            .groups
            .lock()
            .await
            .get(&user_id)
            .map(|group| UserGroupRecord {
                user_id,
                group_id: Some(*group),
            }))
    }

    async fn screen_exists(&self, screen_key: &str) -> Result<bool, RepoError> {
        Ok(SCREENS.contains(&screen_key))
    }

    async fn find_screen_permission(
        &self,
        group_id: Uuid,
        screen_key: &str,
    ) -> Result<Option<PermissionLevel>, RepoError> {
        Ok(self
            .grants
            .lock()
            .await
            .get(&(group_id, screen_key.to_string()))
            .copied())
    }
}

#[async_trait]
impl EspecialistasRepo for MemoryStore {
    async fn list_active_especialistas(&self) -> Result<Vec<EspecialistaRecord>, RepoError> {
        Ok(self
            .especialistas
            .lock()
            .await
            .iter()
            .filter(|especialista| especialista.ativo)
            .cloned()
            .collect())
    }

    async fn create_especialista(
        &self,
        params: CreateEspecialistaParams,
    ) -> Result<EspecialistaRecord, RepoError> {
        let record = EspecialistaRecord {
            id: Uuid::new_v4(),
            nome: params.nome,
            email: params.email,
            ativo: true,
            created_at: OffsetDateTime::now_utc(),
        };
        self.especialistas.lock().await.push(record.clone());
        Ok(record)
    }

    async fn deactivate_especialista(&self, id: Uuid) -> Result<EspecialistaRecord, RepoError> {
        let mut especialistas = self.especialistas.lock().await;
        let record = especialistas
            .iter_mut()
            .find(|especialista| especialista.id == id)
            .ok_or(RepoError::NotFound)?;
        record.ativo = false;
        Ok(record.clone())
    }
}

#[async_trait]
impl HealthCheck for MemoryStore {
    async fn check(&self) -> Result<(), InfraError> {
        if self.healthy.load(std::sync::atomic::Ordering::SeqCst) {
            Ok(())
        } else {
            Err(InfraError::database("connection refused"))
        }
    }
}

/// Captures every message instead of delivering it.
#[derive(Default)]
pub struct RecordingSender {
    pub sent: Mutex<Vec<EmailMessage>>,
}

#[async_trait]
impl EmailSender for RecordingSender {
    async fn send(&self, message: &EmailMessage) -> Result<EmailOutcome, EmailError> {
        self.sent.lock().await.push(message.clone());
        Ok(EmailOutcome::sent())
    }
}

pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub sender: Arc<RecordingSender>,
    pub router: Router,
}

pub fn build_app() -> TestApp {
    let store = MemoryStore::new();
    let sender = Arc::new(RecordingSender::default());
    let retry = RetryPolicy {
        max_retries: 1,
        base_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(2),
    };

    let state = ApiState {
        requerimentos: Arc::new(RequerimentoService::new(
            store.clone(),
            store.clone(),
            store.clone(),
        )),
        faturamento: Arc::new(FaturamentoService::new(
            store.clone(),
            store.clone(),
            sender.clone(),
        )),
        clientes: Arc::new(ClienteService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
        )),
        especialistas: Arc::new(EspecialistaService::new(
            store.clone(),
            Duration::from_secs(60),
        )),
        permissions: Arc::new(PermissionService::new(store.clone(), retry)),
        health: store.clone(),
    };

    TestApp {
        store,
        sender,
        router: http::build_router(state),
    }
}

impl TestApp {
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        user: Option<Uuid>,
        body: Option<Value>,
    ) -> (u16, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header(USER_ID_HEADER, user.to_string());
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .expect("request"),
            None => builder.body(Body::empty()).expect("request"),
        };

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router response");
        read_json(response).await
    }
}

pub async fn read_json(response: Response<Body>) -> (u16, Value) {
    let status = response.status().as_u16();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("response body")
        .to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, value)
}
