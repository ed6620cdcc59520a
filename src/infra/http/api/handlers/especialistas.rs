use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use uuid::Uuid;

use crate::domain::clientes::EspecialistaFormData;
use crate::domain::types::PermissionLevel;

use super::{authorize, screens};
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::middleware::Caller;
use crate::infra::http::api::state::ApiState;

pub async fn list_especialistas(
    State(state): State<ApiState>,
    Extension(caller): Extension<Caller>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&state, &caller, screens::ESPECIALISTAS, PermissionLevel::View).await?;
    let especialistas = state.especialistas.listar_ativos().await?;
    Ok(Json(especialistas))
}

pub async fn create_especialista(
    State(state): State<ApiState>,
    Extension(caller): Extension<Caller>,
    Json(form): Json<EspecialistaFormData>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&state, &caller, screens::ESPECIALISTAS, PermissionLevel::Edit).await?;
    let especialista = state.especialistas.criar(&caller.actor(), form).await?;
    Ok((StatusCode::CREATED, Json(especialista)))
}

pub async fn deactivate_especialista(
    State(state): State<ApiState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&state, &caller, screens::ESPECIALISTAS, PermissionLevel::Edit).await?;
    let especialista = state.especialistas.desativar(&caller.actor(), id).await?;
    Ok(Json(especialista))
}
