//! Role and ownership gates wrapped around protected operations.
//!
//! Every gate resolves the caller before the wrapped operation runs and
//! fails closed: an anonymous caller is `Unauthorized`, a caller whose
//! role record cannot be resolved is `Forbidden`.

use std::future::Future;
use std::sync::Arc;

use tracing::debug;

use panelist_core::{AppError, AppResult, UserIdentity};
use panelist_domain::{OwnedResource, PRIVILEGED_ROLES, Principal, Role, UserId};

use crate::UserRepository;

/// Application service evaluating access gates.
#[derive(Clone)]
pub struct AccessService {
    user_repository: Arc<dyn UserRepository>,
}

impl AccessService {
    /// Creates a new access service.
    #[must_use]
    pub fn new(user_repository: Arc<dyn UserRepository>) -> Self {
        Self { user_repository }
    }

    /// Resolves the session identity into a principal with its role.
    pub async fn resolve_principal(&self, identity: Option<&UserIdentity>) -> AppResult<Principal> {
        let identity = identity
            .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;
        let user_id = UserId::from_uuid(identity.user_id());

        self.user_repository
            .find_principal(user_id)
            .await?
            .ok_or_else(|| {
                debug!(%user_id, "no principal record for authenticated session");
                AppError::Forbidden(format!("no role is assigned to user '{user_id}'"))
            })
    }

    /// Resolves the caller and checks it against `allowed_roles`.
    pub async fn authorize_roles(
        &self,
        identity: Option<&UserIdentity>,
        allowed_roles: &[Role],
    ) -> AppResult<Principal> {
        let principal = self.resolve_principal(identity).await?;
        check_role(&principal, allowed_roles)?;
        Ok(principal)
    }

    /// Runs `operation` only when the caller holds one of `allowed_roles`.
    pub async fn role_required<T, F, Fut>(
        &self,
        identity: Option<&UserIdentity>,
        allowed_roles: &[Role],
        operation: F,
    ) -> AppResult<T>
    where
        F: FnOnce(Principal) -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        let principal = self.authorize_roles(identity, allowed_roles).await?;
        operation(principal).await
    }

    /// Runs `operation` only for admins, interviewers and superusers.
    pub async fn admin_or_privileged_required<T, F, Fut>(
        &self,
        identity: Option<&UserIdentity>,
        operation: F,
    ) -> AppResult<T>
    where
        F: FnOnce(Principal) -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        self.role_required(identity, PRIVILEGED_ROLES, operation)
            .await
    }

    /// Runs `operation` only when the caller owns the looked-up resource or
    /// holds a privileged role.
    ///
    /// A missing resource yields `NotFound` before ownership is evaluated.
    pub async fn owner_or_privileged_required<R, L, LFut, T, F, Fut>(
        &self,
        identity: Option<&UserIdentity>,
        lookup: L,
        operation: F,
    ) -> AppResult<T>
    where
        R: OwnedResource,
        L: FnOnce() -> LFut,
        LFut: Future<Output = AppResult<Option<R>>>,
        F: FnOnce(Principal, R) -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        let principal = self.resolve_principal(identity).await?;
        let resource = lookup()
            .await?
            .ok_or_else(|| AppError::NotFound("requested resource does not exist".to_owned()))?;

        check_object_permission(&principal, &resource)?;
        operation(principal, resource).await
    }
}

/// Checks a resolved principal against a role set.
pub fn check_role(principal: &Principal, allowed_roles: &[Role]) -> AppResult<()> {
    if principal.role_decision(allowed_roles).is_allowed() {
        return Ok(());
    }

    debug!(
        user_id = %principal.user_id(),
        role = ?principal.role(),
        "role gate denied"
    );
    Err(AppError::Forbidden(format!(
        "user '{}' is not allowed to perform this operation",
        principal.user_id()
    )))
}

/// Checks a resolved principal against an already-fetched resource.
///
/// Does not assume any earlier gate ran.
pub fn check_object_permission<R>(principal: &Principal, resource: &R) -> AppResult<()>
where
    R: OwnedResource,
{
    if principal.object_decision(resource).is_allowed() {
        return Ok(());
    }

    debug!(user_id = %principal.user_id(), "object permission denied");
    Err(AppError::Forbidden(format!(
        "user '{}' may not access this resource",
        principal.user_id()
    )))
}
