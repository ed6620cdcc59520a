//! API handlers grouped by resource. Every handler resolves the caller's screen permission
//! before touching a service.

mod clientes;
mod especialistas;
mod faturamento;
mod requerimentos;

pub use clientes::*;
pub use especialistas::*;
pub use faturamento::*;
pub use requerimentos::*;

use crate::domain::types::PermissionLevel;

use super::error::ApiError;
use super::middleware::Caller;
use super::state::ApiState;

pub(crate) mod screens {
    pub const REQUERIMENTOS: &str = "requerimentos";
    pub const FATURAMENTO: &str = "faturamento";
    pub const CLIENTES: &str = "clientes";
    pub const ESPECIALISTAS: &str = "especialistas";
}

async fn authorize(
    state: &ApiState,
    caller: &Caller,
    screen: &str,
    level: PermissionLevel,
) -> Result<(), ApiError> {
    state
        .permissions
        .exigir(caller.user_id, screen, level)
        .await
        .map_err(ApiError::from)
}
