//! The authorization gate.
//!
//! [`decide`] is a pure function over principal, action and resource. It is
//! evaluated on every request that needs it and never consults anything but
//! its arguments, so a role can only enter the decision through a
//! [`Principal`] built from the server-side profile record.
//!
//! Authentication is checked before authorization: an anonymous principal
//! is never compared against role rules, so it can only be denied as
//! [`Denial::Unauthenticated`].
//!
//! [`authorize`] wraps the decision into a [`Grant`] that write operations
//! take as an argument. A `Grant` cannot be built outside this module.

use serde::Serialize;
use uuid::Uuid;

use curricula_core::AppError;

use crate::roles::Role;

pub const NOT_AUTHENTICATED_MESSAGE: &str = "Not authenticated. Please log in.";

/// Who is asking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    Anonymous,
    /// A verified session. `role` is `None` when no profile exists yet or the
    /// stored role is not one of the known values.
    Authenticated { user_id: Uuid, role: Option<Role> },
}

impl Principal {
    pub fn role(&self) -> Option<Role> {
        match self {
            Principal::Anonymous => None,
            Principal::Authenticated { role, .. } => *role,
        }
    }

    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            Principal::Anonymous => None,
            Principal::Authenticated { user_id, .. } => Some(*user_id),
        }
    }

    /// Label used in logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Principal::Anonymous => "anonymous",
            Principal::Authenticated { role: None, .. } => "none",
            Principal::Authenticated {
                role: Some(role), ..
            } => role.as_str(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
}

impl Action {
    pub const ALL: [Action; 4] = [Action::Read, Action::Create, Action::Update, Action::Delete];

    pub fn is_write(self) -> bool {
        !matches!(self, Action::Read)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Curriculum,
    /// Role and scope assignments on user profiles.
    UserRole,
}

impl Resource {
    pub fn as_str(self) -> &'static str {
        match self {
            Resource::Curriculum => "curriculum",
            Resource::UserRole => "user_role",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    Unauthenticated,
    Forbidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(Denial),
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// Operations open to everyone, anonymous callers included.
fn is_public(action: Action, resource: Resource) -> bool {
    matches!((action, resource), (Action::Read, Resource::Curriculum))
}

fn allowed_roles(action: Action, resource: Resource) -> &'static [Role] {
    match (resource, action) {
        (Resource::Curriculum, Action::Read) => &Role::ALL,
        (Resource::Curriculum, _) => &[Role::Owner, Role::Administrator],
        (Resource::UserRole, Action::Read | Action::Update) => &[Role::Administrator],
        // profiles are bootstrapped by the sign-in flow only
        (Resource::UserRole, Action::Create | Action::Delete) => &[],
    }
}

pub fn decide(principal: &Principal, action: Action, resource: Resource) -> Decision {
    if is_public(action, resource) {
        return Decision::Allow;
    }

    let role = match principal {
        Principal::Anonymous => return Decision::Deny(Denial::Unauthenticated),
        Principal::Authenticated { role, .. } => *role,
    };

    match role {
        Some(role) if allowed_roles(action, resource).contains(&role) => Decision::Allow,
        _ => Decision::Deny(Denial::Forbidden),
    }
}

/// Proof that [`decide`] allowed `action` on `resource` for this request.
#[derive(Debug, Clone)]
pub struct Grant {
    action: Action,
    resource: Resource,
    user_id: Option<Uuid>,
}

impl Grant {
    pub fn action(&self) -> Action {
        self.action
    }

    pub fn resource(&self) -> Resource {
        self.resource
    }

    pub fn user_id(&self) -> Option<Uuid> {
        self.user_id
    }

    /// Fails if this grant was issued for a different operation.
    pub fn ensure(&self, action: Action, resource: Resource) -> Result<(), AppError> {
        if self.action == action && self.resource == resource {
            return Ok(());
        }
        Err(AppError::internal(anyhow::anyhow!(
            "Grant for {} {} used for {} {}",
            self.action.as_str(),
            self.resource.as_str(),
            action.as_str(),
            resource.as_str()
        )))
    }
}

fn forbidden_message(action: Action, resource: Resource) -> String {
    match resource {
        Resource::Curriculum => {
            let verb = match action {
                Action::Create => "add",
                Action::Update => "edit",
                Action::Delete => "delete",
                Action::Read => "view",
            };
            format!("Not authorized. Only administrators and owners can {verb} entries.")
        }
        Resource::UserRole => {
            "Not authorized. Only administrators can manage user roles.".to_string()
        }
    }
}

/// Runs [`decide`] and converts the outcome into a [`Grant`] or a typed error.
pub fn authorize(
    principal: &Principal,
    action: Action,
    resource: Resource,
) -> Result<Grant, AppError> {
    match decide(principal, action, resource) {
        Decision::Allow => Ok(Grant {
            action,
            resource,
            user_id: principal.user_id(),
        }),
        Decision::Deny(Denial::Unauthenticated) => {
            Err(AppError::unauthenticated(NOT_AUTHENTICATED_MESSAGE))
        }
        Decision::Deny(Denial::Forbidden) => {
            Err(AppError::forbidden(forbidden_message(action, resource)))
        }
    }
}
