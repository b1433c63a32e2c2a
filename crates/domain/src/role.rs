//! Role model and the pure access decisions built on it.
//!
//! Every principal carries at most one role from a closed set. A missing
//! role means the role record could not be resolved and is always treated
//! as a denial, never as a default role.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use panelist_core::AppError;
use serde::{Deserialize, Serialize};

use crate::{AuditResource, Auditable, UserId};

/// Resource type tag used when a user account is the audited resource.
pub const USER_RESOURCE_TYPE: &str = "user";

/// Closed set of roles a principal can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full administrative access.
    Admin,
    /// Runs interviews and reviews candidate sessions.
    Interviewer,
    /// Practices interviews and owns their own sessions.
    Candidate,
}

/// Roles accepted by admin-only gates.
pub const ADMIN_ROLES: &[Role] = &[Role::Admin];

/// Roles accepted by admin-or-privileged gates.
pub const PRIVILEGED_ROLES: &[Role] = &[Role::Admin, Role::Interviewer];

impl Role {
    /// Returns a stable storage value for this role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Interviewer => "interviewer",
            Self::Candidate => "candidate",
        }
    }

    /// Returns all known roles.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Role] = &[Role::Admin, Role::Interviewer, Role::Candidate];

        ALL
    }

    /// Returns whether the role belongs to the privileged set.
    #[must_use]
    pub fn is_privileged(self) -> bool {
        match self {
            Self::Admin | Self::Interviewer => true,
            Self::Candidate => false,
        }
    }
}

impl Display for Role {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "admin" => Ok(Self::Admin),
            "interviewer" => Ok(Self::Interviewer),
            "candidate" => Ok(Self::Candidate),
            _ => Err(AppError::Validation(format!("unknown role value '{value}'"))),
        }
    }
}

/// Outcome of an access check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    /// The operation may proceed.
    Allow,
    /// The operation must not run.
    Deny,
}

impl AccessDecision {
    /// Returns whether the decision permits the operation.
    #[must_use]
    pub fn is_allowed(self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Resource with a recorded owner.
pub trait OwnedResource {
    /// Returns the owning user, if any.
    fn owner_id(&self) -> Option<UserId>;
}

/// Authenticated caller resolved from storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    user_id: UserId,
    email: String,
    role: Option<Role>,
    is_superuser: bool,
}

impl Principal {
    /// Creates a principal from its persisted attributes.
    #[must_use]
    pub fn new(
        user_id: UserId,
        email: impl Into<String>,
        role: Option<Role>,
        is_superuser: bool,
    ) -> Self {
        Self {
            user_id,
            email: email.into(),
            role,
            is_superuser,
        }
    }

    /// Returns the principal identifier.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the login email.
    #[must_use]
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Returns the resolved role, or `None` when no role record exists.
    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.role
    }

    /// Returns whether the principal bypasses role checks.
    #[must_use]
    pub fn is_superuser(&self) -> bool {
        self.is_superuser
    }

    /// Decides a role-gated operation.
    ///
    /// Superusers are always allowed. A principal without a resolvable role
    /// is always denied.
    #[must_use]
    pub fn role_decision(&self, allowed_roles: &[Role]) -> AccessDecision {
        if self.is_superuser {
            return AccessDecision::Allow;
        }

        match self.role {
            Some(role) if allowed_roles.contains(&role) => AccessDecision::Allow,
            Some(_) | None => AccessDecision::Deny,
        }
    }

    /// Decides access to an already-resolved resource.
    ///
    /// Superuser short-circuits, then ownership, then the privileged role set.
    #[must_use]
    pub fn object_decision(&self, resource: &impl OwnedResource) -> AccessDecision {
        if self.is_superuser {
            return AccessDecision::Allow;
        }

        if resource.owner_id() == Some(self.user_id) {
            return AccessDecision::Allow;
        }

        match self.role {
            Some(role) if role.is_privileged() => AccessDecision::Allow,
            Some(_) | None => AccessDecision::Deny,
        }
    }
}

impl Auditable for Principal {
    fn audit_resource(&self) -> AuditResource {
        AuditResource::new(USER_RESOURCE_TYPE, self.user_id.to_string())
    }
}
