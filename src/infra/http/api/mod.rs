pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod state;

pub use middleware::{Caller, USER_ID_HEADER};
pub use state::{ApiState, HealthCheck};

use axum::{
    Router, middleware as axum_middleware,
    routing::{delete, get, post},
};

pub fn build_api_router(state: ApiState) -> Router {
    Router::new()
        .route(
            "/api/v1/requerimentos",
            get(handlers::list_requerimentos).post(handlers::create_requerimento),
        )
        .route(
            "/api/v1/requerimentos/enviar-lote",
            post(handlers::send_batch_to_billing),
        )
        .route("/api/v1/requerimentos/faturar", post(handlers::mark_as_billed))
        .route(
            "/api/v1/requerimentos/{id}",
            get(handlers::get_requerimento)
                .put(handlers::update_requerimento)
                .delete(handlers::delete_requerimento),
        )
        .route(
            "/api/v1/requerimentos/{id}/enviar",
            post(handlers::send_requerimento_to_billing),
        )
        .route(
            "/api/v1/requerimentos/{id}/rejeitar",
            post(handlers::reject_requerimento),
        )
        .route("/api/v1/faturamento/resumo", get(handlers::billing_summary))
        .route(
            "/api/v1/faturamento/disparos",
            post(handlers::dispatch_billing_email),
        )
        .route("/api/v1/clientes", post(handlers::create_cliente))
        .route(
            "/api/v1/clientes/{id}",
            get(handlers::get_cliente)
                .put(handlers::update_cliente)
                .delete(handlers::delete_cliente),
        )
        .route(
            "/api/v1/clientes/{id}/status",
            post(handlers::update_cliente_status),
        )
        .route(
            "/api/v1/empresas/{id}/clientes",
            get(handlers::list_clientes_by_empresa),
        )
        .route(
            "/api/v1/especialistas",
            get(handlers::list_especialistas).post(handlers::create_especialista),
        )
        .route(
            "/api/v1/especialistas/{id}",
            delete(handlers::deactivate_especialista),
        )
        .with_state(state)
        .layer(axum_middleware::from_fn(middleware::require_caller))
}
