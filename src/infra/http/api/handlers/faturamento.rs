use axum::Json;
use axum::extract::{Extension, Query, State};
use axum::response::IntoResponse;

use crate::application::faturamento::DispararEmailCommand;
use crate::domain::error::{RequerimentoError, RequerimentoErrorCode};
use crate::domain::requerimentos::MesCobranca;
use crate::domain::types::PermissionLevel;

use super::{authorize, screens};
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::middleware::Caller;
use crate::infra::http::api::models::MesQuery;
use crate::infra::http::api::state::ApiState;

pub async fn billing_summary(
    State(state): State<ApiState>,
    Extension(caller): Extension<Caller>,
    Query(query): Query<MesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&state, &caller, screens::FATURAMENTO, PermissionLevel::View).await?;
    let mes = MesCobranca::parse(query.mes.trim()).ok_or_else(|| {
        RequerimentoError::from_code(RequerimentoErrorCode::MesCobrancaInvalid)
            .with_detail("field", "mes")
            .with_detail("value", query.mes.as_str())
    })?;
    let dados = state.requerimentos.gerar_dados_faturamento(mes).await?;
    Ok(Json(dados))
}

pub async fn dispatch_billing_email(
    State(state): State<ApiState>,
    Extension(caller): Extension<Caller>,
    Json(command): Json<DispararEmailCommand>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&state, &caller, screens::FATURAMENTO, PermissionLevel::Edit).await?;
    let disparo = state
        .faturamento
        .disparar_email(&caller.actor(), command)
        .await?;
    Ok(Json(disparo))
}
