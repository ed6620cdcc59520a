pub mod api;
mod middleware;

pub use api::{ApiState, Caller, HealthCheck, USER_ID_HEADER, build_api_router};
pub use middleware::RequestContext;

use std::net::SocketAddr;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Router, middleware as axum_middleware, routing::get};
use tracing::info;

use crate::application::error::ErrorReport;
use crate::infra::error::InfraError;

/// Full application router: `/health` plus the versioned API, wrapped in request context and
/// response logging.
pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .with_state(state.clone())
        .merge(build_api_router(state))
        .layer(axum_middleware::from_fn(middleware::log_responses))
        .layer(axum_middleware::from_fn(middleware::set_request_context))
}

pub async fn serve(addr: SocketAddr, router: Router) -> Result<(), InfraError> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(target: "clientbooks::http", addr = %addr, "listening");
    axum::serve(listener, router.into_make_service()).await?;
    Ok(())
}

async fn health(State(state): State<ApiState>) -> Response {
    match state.health.check().await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            let mut response = StatusCode::SERVICE_UNAVAILABLE.into_response();
            ErrorReport::from_error(
                "infra::http::health",
                StatusCode::SERVICE_UNAVAILABLE,
                &err,
            )
            .attach(&mut response);
            response
        }
    }
}
