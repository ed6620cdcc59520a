use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use uuid::Uuid;

use crate::domain::clientes::ClienteFormData;
use crate::domain::types::PermissionLevel;

use super::{authorize, screens};
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::middleware::Caller;
use crate::infra::http::api::models::ClienteStatusRequest;
use crate::infra::http::api::state::ApiState;

pub async fn list_clientes_by_empresa(
    State(state): State<ApiState>,
    Extension(caller): Extension<Caller>,
    Path(empresa_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&state, &caller, screens::CLIENTES, PermissionLevel::View).await?;
    let clientes = state.clientes.listar_por_empresa(empresa_id).await?;
    Ok(Json(clientes))
}

pub async fn get_cliente(
    State(state): State<ApiState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&state, &caller, screens::CLIENTES, PermissionLevel::View).await?;
    let cliente = state.clientes.buscar(id).await?;
    Ok(Json(cliente))
}

pub async fn create_cliente(
    State(state): State<ApiState>,
    Extension(caller): Extension<Caller>,
    Json(form): Json<ClienteFormData>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&state, &caller, screens::CLIENTES, PermissionLevel::Edit).await?;
    let cliente = state.clientes.criar(&caller.actor(), form).await?;
    Ok((StatusCode::CREATED, Json(cliente)))
}

pub async fn update_cliente(
    State(state): State<ApiState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
    Json(form): Json<ClienteFormData>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&state, &caller, screens::CLIENTES, PermissionLevel::Edit).await?;
    let cliente = state.clientes.atualizar(&caller.actor(), id, form).await?;
    Ok(Json(cliente))
}

pub async fn update_cliente_status(
    State(state): State<ApiState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
    Json(request): Json<ClienteStatusRequest>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&state, &caller, screens::CLIENTES, PermissionLevel::Edit).await?;
    let cliente = state
        .clientes
        .alterar_status(&caller.actor(), id, request.status, request.descricao_status)
        .await?;
    Ok(Json(cliente))
}

pub async fn delete_cliente(
    State(state): State<ApiState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&state, &caller, screens::CLIENTES, PermissionLevel::Edit).await?;
    state.clientes.deletar(&caller.actor(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
