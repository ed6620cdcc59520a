//! Screen-level permission checks.

use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::application::repos::{PermissionsRepo, RepoError};
use crate::application::retry::RetryPolicy;
use crate::domain::error::{ErrorContext, PermissionError, PermissionErrorCode as Code};
use crate::domain::types::PermissionLevel;

const TARGET: &str = "clientbooks::application::permissions";

#[derive(Clone)]
pub struct PermissionService {
    repo: Arc<dyn PermissionsRepo>,
    retry: RetryPolicy,
}

impl PermissionService {
    pub fn new(repo: Arc<dyn PermissionsRepo>, retry: RetryPolicy) -> Self {
        Self { repo, retry }
    }

    /// `Ok(false)` covers every denial: unknown user, user without group, unregistered screen
    /// and insufficient level. Only repository failures that outlive the retry budget are
    /// returned as errors.
    pub async fn verificar(
        &self,
        user_id: Uuid,
        screen_key: &str,
        required: PermissionLevel,
    ) -> Result<bool, PermissionError> {
        let group = self
            .retry
            .run(
                "permissions.find_user_group",
                || self.repo.find_user_group(user_id),
                RepoError::is_transient,
            )
            .await
            .map_err(|err| lift(err, "buscar_grupo_usuario", user_id))?;

        let Some(group_id) = group.and_then(|record| record.group_id) else {
            warn!(target: TARGET, user_id = %user_id, "user has no permission group");
            return Ok(false);
        };

        let exists = self
            .retry
            .run(
                "permissions.screen_exists",
                || self.repo.screen_exists(screen_key),
                RepoError::is_transient,
            )
            .await
            .map_err(|err| lift(err, "verificar_tela", user_id))?;
        if !exists {
            warn!(target: TARGET, screen = screen_key, "screen is not registered");
            return Ok(false);
        }

        let level = self
            .retry
            .run(
                "permissions.find_screen_permission",
                || self.repo.find_screen_permission(group_id, screen_key),
                RepoError::is_transient,
            )
            .await
            .map_err(|err| lift(err, "buscar_permissao_tela", user_id))?
            .unwrap_or(PermissionLevel::None);

        let allowed = level.satisfies(required);
        debug!(
            target: TARGET,
            user_id = %user_id,
            screen = screen_key,
            granted = level.as_str(),
            required = required.as_str(),
            allowed,
            "permission resolved"
        );
        Ok(allowed)
    }

    pub async fn exigir(
        &self,
        user_id: Uuid,
        screen_key: &str,
        required: PermissionLevel,
    ) -> Result<(), PermissionError> {
        if self.verificar(user_id, screen_key, required).await? {
            return Ok(());
        }
        Err(PermissionError::from_code(Code::PermissionDenied)
            .with_detail("screen", screen_key)
            .with_detail("required", required.as_str())
            .with_context(
                ErrorContext::operation("exigir_permissao").with_actor(user_id.to_string()),
            ))
    }
}

fn lift(err: RepoError, operation: &str, user_id: Uuid) -> PermissionError {
    err.into_domain::<Code>(operation)
        .with_context(ErrorContext::operation(operation).with_actor(user_id.to_string()))
}
