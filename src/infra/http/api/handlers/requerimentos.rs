use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use uuid::Uuid;

use crate::application::requerimentos::CriarRequerimentoCommand;
use crate::application::repos::RequerimentoFilter;
use crate::domain::requerimentos::RequerimentoFormData;
use crate::domain::types::PermissionLevel;

use super::{authorize, screens};
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::middleware::Caller;
use crate::infra::http::api::models::{IdsRequest, RequerimentoListQuery};
use crate::infra::http::api::state::ApiState;

pub async fn list_requerimentos(
    State(state): State<ApiState>,
    Extension(caller): Extension<Caller>,
    Query(query): Query<RequerimentoListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&state, &caller, screens::REQUERIMENTOS, PermissionLevel::View).await?;
    let filter = RequerimentoFilter::from(query);
    let records = state.requerimentos.listar(&filter).await?;
    Ok(Json(records))
}

pub async fn get_requerimento(
    State(state): State<ApiState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&state, &caller, screens::REQUERIMENTOS, PermissionLevel::View).await?;
    let record = state.requerimentos.buscar(id).await?;
    Ok(Json(record))
}

pub async fn create_requerimento(
    State(state): State<ApiState>,
    Extension(caller): Extension<Caller>,
    Json(command): Json<CriarRequerimentoCommand>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&state, &caller, screens::REQUERIMENTOS, PermissionLevel::Edit).await?;
    let outcome = state.requerimentos.criar(&caller.actor(), command).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

pub async fn update_requerimento(
    State(state): State<ApiState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
    Json(form): Json<RequerimentoFormData>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&state, &caller, screens::REQUERIMENTOS, PermissionLevel::Edit).await?;
    let record = state.requerimentos.atualizar(&caller.actor(), id, form).await?;
    Ok(Json(record))
}

pub async fn delete_requerimento(
    State(state): State<ApiState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&state, &caller, screens::REQUERIMENTOS, PermissionLevel::Edit).await?;
    state.requerimentos.deletar(&caller.actor(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn send_requerimento_to_billing(
    State(state): State<ApiState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&state, &caller, screens::REQUERIMENTOS, PermissionLevel::Edit).await?;
    let record = state
        .requerimentos
        .enviar_para_faturamento(&caller.actor(), id)
        .await?;
    Ok(Json(record))
}

pub async fn send_batch_to_billing(
    State(state): State<ApiState>,
    Extension(caller): Extension<Caller>,
    Json(request): Json<IdsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&state, &caller, screens::REQUERIMENTOS, PermissionLevel::Edit).await?;
    let resultado = state
        .requerimentos
        .enviar_lote_para_faturamento(&caller.actor(), &request.ids)
        .await;
    Ok(Json(resultado))
}

pub async fn reject_requerimento(
    State(state): State<ApiState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&state, &caller, screens::FATURAMENTO, PermissionLevel::Edit).await?;
    let record = state.requerimentos.rejeitar(&caller.actor(), id).await?;
    Ok(Json(record))
}

pub async fn mark_as_billed(
    State(state): State<ApiState>,
    Extension(caller): Extension<Caller>,
    Json(request): Json<IdsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&state, &caller, screens::FATURAMENTO, PermissionLevel::Edit).await?;
    let records = state
        .requerimentos
        .marcar_como_faturados(&caller.actor(), &request.ids)
        .await?;
    Ok(Json(records))
}
