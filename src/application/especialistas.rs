use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use tracing::{debug, info};
use uuid::Uuid;

use crate::application::cache::TtlCache;
use crate::application::repos::{CreateEspecialistaParams, EspecialistasRepo, RepoError};
use crate::domain::clientes::EspecialistaFormData;
use crate::domain::entities::EspecialistaRecord;
use crate::domain::error::{ClientBooksError, ClientBooksErrorCode as Code, ErrorContext};

const TARGET: &str = "clientbooks::application::especialistas";
const METRIC_CACHE_HIT: &str = "clientbooks_especialistas_cache_hit_total";
const METRIC_CACHE_MISS: &str = "clientbooks_especialistas_cache_miss_total";

/// Active specialists, served from a short-lived process cache.
#[derive(Clone)]
pub struct EspecialistaService {
    repo: Arc<dyn EspecialistasRepo>,
    cache: Arc<TtlCache<Vec<EspecialistaRecord>>>,
}

impl EspecialistaService {
    pub fn new(repo: Arc<dyn EspecialistasRepo>, ttl: Duration) -> Self {
        Self {
            repo,
            cache: Arc::new(TtlCache::new("especialistas", ttl)),
        }
    }

    pub async fn listar_ativos(&self) -> Result<Vec<EspecialistaRecord>, ClientBooksError> {
        if let Some(cached) = self.cache.get() {
            counter!(METRIC_CACHE_HIT).increment(1);
            return Ok(cached);
        }
        counter!(METRIC_CACHE_MISS).increment(1);

        let generation = self.cache.generation();
        let especialistas = self
            .repo
            .list_active_especialistas()
            .await
            .map_err(|err| err.into_domain("listar_especialistas"))?;
        if !self.cache.set_if_generation(generation, especialistas.clone()) {
            debug!(target: TARGET, "especialistas alterados durante a carga, cache não atualizado");
        }
        Ok(especialistas)
    }

    pub async fn criar(
        &self,
        actor: &str,
        form: EspecialistaFormData,
    ) -> Result<EspecialistaRecord, ClientBooksError> {
        let input = form.validate()?;
        let record = self
            .repo
            .create_especialista(CreateEspecialistaParams {
                nome: input.nome,
                email: input.email,
            })
            .await
            .map_err(|err| err.into_domain("criar_especialista"))?;
        self.cache.invalidate();

        info!(target: TARGET, actor, id = %record.id, "especialista criado");
        Ok(record)
    }

    pub async fn desativar(
        &self,
        actor: &str,
        id: Uuid,
    ) -> Result<EspecialistaRecord, ClientBooksError> {
        let record = self
            .repo
            .deactivate_especialista(id)
            .await
            .map_err(|err| match err {
                RepoError::NotFound => ClientBooksError::from_code(Code::EspecialistaNotFound)
                    .with_context(
                        ErrorContext::operation("desativar_especialista").with_entity(id),
                    ),
                other => other.into_domain("desativar_especialista"),
            })?;
        self.cache.invalidate();

        info!(target: TARGET, actor, id = %id, "especialista desativado");
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use async_trait::async_trait;
    use time::OffsetDateTime;
    use tokio::sync::Notify;

    use super::*;

    #[derive(Default)]
    struct Stub {
        rows: Mutex<Vec<EspecialistaRecord>>,
        list_calls: AtomicUsize,
        hold_next_list: AtomicBool,
        list_loaded: Notify,
        release_list: Notify,
    }

    #[async_trait]
    impl EspecialistasRepo for Stub {
        async fn list_active_especialistas(&self) -> Result<Vec<EspecialistaRecord>, RepoError> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            let snapshot: Vec<EspecialistaRecord> = self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|row| row.ativo)
                .cloned()
                .collect();
            if self.hold_next_list.swap(false, Ordering::SeqCst) {
                self.list_loaded.notify_one();
                self.release_list.notified().await;
            }
            Ok(snapshot)
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
            self.rows.lock().unwrap().push(record.clone());
            Ok(record)
        }

        async fn deactivate_especialista(
            &self,
            id: Uuid,
        ) -> Result<EspecialistaRecord, RepoError> {
            let mut rows = self.rows.lock().unwrap();
            let row = rows
                .iter_mut()
                .find(|row| row.id == id)
                .ok_or(RepoError::NotFound)?;
            row.ativo = false;
            Ok(row.clone())
        }
    }

    fn form(nome: &str) -> EspecialistaFormData {
        EspecialistaFormData {
            nome: Some(nome.into()),
            email: None,
        }
    }

    #[tokio::test]
    async fn listing_is_served_from_cache_until_invalidated() {
        let stub = Arc::new(Stub::default());
        let service = EspecialistaService::new(stub.clone(), Duration::from_secs(60));

        let carla = service.criar("ana", form("Carla")).await.unwrap();
        assert_eq!(service.listar_ativos().await.unwrap().len(), 1);
        assert_eq!(service.listar_ativos().await.unwrap().len(), 1);
        assert_eq!(stub.list_calls.load(Ordering::SeqCst), 1);

        service.criar("ana", form("Diego")).await.unwrap();
        assert_eq!(service.listar_ativos().await.unwrap().len(), 2);
        assert_eq!(stub.list_calls.load(Ordering::SeqCst), 2);

        service.desativar("ana", carla.id).await.unwrap();
        let ativos = service.listar_ativos().await.unwrap();
        assert_eq!(ativos.len(), 1);
        assert_eq!(ativos[0].nome, "Diego");
    }

    #[tokio::test]
    async fn load_racing_a_write_does_not_repopulate_the_cache() {
        let stub = Arc::new(Stub::default());
        stub.hold_next_list.store(true, Ordering::SeqCst);
        let service = EspecialistaService::new(stub.clone(), Duration::from_secs(60));

        let reader = tokio::spawn({
            let service = service.clone();
            async move { service.listar_ativos().await }
        });
        stub.list_loaded.notified().await;

        service.criar("ana", form("Carla")).await.unwrap();
        stub.release_list.notify_one();
        assert!(reader.await.unwrap().unwrap().is_empty());

        let ativos = service.listar_ativos().await.unwrap();
        assert_eq!(ativos.len(), 1);
        assert_eq!(ativos[0].nome, "Carla");
    }

    #[tokio::test]
    async fn expired_entries_are_reloaded() {
        let stub = Arc::new(Stub::default());
        let service = EspecialistaService::new(stub.clone(), Duration::ZERO);

        service.listar_ativos().await.unwrap();
        service.listar_ativos().await.unwrap();
        assert_eq!(stub.list_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn unknown_specialist_maps_to_not_found() {
        let service = EspecialistaService::new(Arc::new(Stub::default()), Duration::from_secs(60));
        let err = service.desativar("ana", Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.code(), Code::EspecialistaNotFound);
    }

    #[tokio::test]
    async fn invalid_form_is_rejected_before_persisting() {
        let stub = Arc::new(Stub::default());
        let service = EspecialistaService::new(stub.clone(), Duration::from_secs(60));
        let err = service.criar("ana", form("  ")).await.unwrap_err();
        assert_eq!(err.code(), Code::EspecialistaNomeRequired);
        assert!(stub.rows.lock().unwrap().is_empty());
    }
}
