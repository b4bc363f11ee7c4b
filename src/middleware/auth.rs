use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, request::Parts},
};
use uuid::Uuid;

use curricula_auth::{NOT_AUTHENTICATED_MESSAGE, Principal, Role, SessionClaims};
use curricula_core::AppError;
use curricula_models::Profile;

use crate::identity::{resolve_principal, session::resolve_session};
use crate::state::AppState;

/// The resolved caller of a request: session identity plus the profile the
/// role was read from. Anonymous callers are a normal value, not a rejection.
#[derive(Debug, Clone)]
pub struct Caller {
    pub principal: Principal,
    pub profile: Option<Profile>,
    pub claims: Option<SessionClaims>,
}

impl Caller {
    pub async fn resolve(headers: &HeaderMap, state: &AppState) -> Result<Self, AppError> {
        let claims = resolve_session(headers, &state.session_config);
        let (principal, profile) = resolve_principal(state.store.as_ref(), claims.as_ref()).await?;

        Ok(Self {
            principal,
            profile,
            claims,
        })
    }

    pub fn is_authenticated(&self) -> bool {
        !matches!(self.principal, Principal::Anonymous)
    }

    pub fn role(&self) -> Option<Role> {
        self.principal.role()
    }

    pub fn email(&self) -> Option<&str> {
        self.claims.as_ref().map(|claims| claims.email.as_str())
    }

    /// The caller's user id, or `AuthenticationRequired` for anonymous callers.
    pub fn require_user_id(&self) -> Result<Uuid, AppError> {
        self.principal
            .user_id()
            .ok_or_else(|| AppError::unauthenticated(NOT_AUTHENTICATED_MESSAGE))
    }
}

impl FromRequestParts<AppState> for Caller {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // one profile read per request, however many extractors ask
        if let Some(caller) = parts.extensions.get::<Caller>() {
            return Ok(caller.clone());
        }

        let caller = Caller::resolve(&parts.headers, state).await?;
        parts.extensions.insert(caller.clone());
        Ok(caller)
    }
}

/// Declares an extractor that admits only callers allowed to perform
/// `$action` on `$resource`, and hands the handler the resulting grant.
///
/// The decision is made on every request from the server-side profile; a
/// rejected caller never reaches the handler body.
#[macro_export]
macro_rules! require_access {
    ($name:ident, $action:expr, $resource:expr) => {
        #[derive(Debug, Clone)]
        pub struct $name {
            pub caller: $crate::middleware::auth::Caller,
            pub grant: curricula_auth::Grant,
        }

        impl axum::extract::FromRequestParts<$crate::state::AppState> for $name {
            type Rejection = curricula_core::AppError;

            async fn from_request_parts(
                parts: &mut axum::http::request::Parts,
                state: &$crate::state::AppState,
            ) -> Result<Self, Self::Rejection> {
                let caller = <$crate::middleware::auth::Caller as axum::extract::FromRequestParts<
                    $crate::state::AppState,
                >>::from_request_parts(parts, state)
                .await?;

                let action = $action;
                let resource = $resource;
                let result = curricula_auth::authorize(&caller.principal, action, resource);
                $crate::metrics::track_authorization_check(
                    action.as_str(),
                    resource.as_str(),
                    caller.principal.label(),
                    result.is_ok(),
                );

                match result {
                    Ok(grant) => Ok(Self { caller, grant }),
                    Err(err) => {
                        tracing::info!(
                            principal = caller.principal.label(),
                            action = action.as_str(),
                            resource = resource.as_str(),
                            code = %err.kind,
                            "Access denied"
                        );
                        Err(err)
                    }
                }
            }
        }
    };
}

// Curriculum writes
require_access!(
    CanCreateCurriculum,
    curricula_auth::Action::Create,
    curricula_auth::Resource::Curriculum
);
require_access!(
    CanUpdateCurriculum,
    curricula_auth::Action::Update,
    curricula_auth::Resource::Curriculum
);
require_access!(
    CanDeleteCurriculum,
    curricula_auth::Action::Delete,
    curricula_auth::Resource::Curriculum
);

// User-role administration
require_access!(
    CanReadUsers,
    curricula_auth::Action::Read,
    curricula_auth::Resource::UserRole
);
require_access!(
    CanUpdateUsers,
    curricula_auth::Action::Update,
    curricula_auth::Resource::UserRole
);

#[cfg(test)]
mod tests {
    use super::*;

    fn caller(principal: Principal) -> Caller {
        Caller {
            principal,
            profile: None,
            claims: None,
        }
    }

    #[test]
    fn test_anonymous_caller_has_no_user_id() {
        let anonymous = caller(Principal::Anonymous);

        assert!(!anonymous.is_authenticated());
        assert_eq!(anonymous.role(), None);
        let err = anonymous.require_user_id().unwrap_err();
        assert_eq!(err.kind, curricula_core::ErrorKind::AuthenticationRequired);
    }

    #[test]
    fn test_authenticated_caller_without_role() {
        let user_id = Uuid::new_v4();
        let signed_in = caller(Principal::Authenticated {
            user_id,
            role: None,
        });

        assert!(signed_in.is_authenticated());
        assert_eq!(signed_in.role(), None);
        assert_eq!(signed_in.require_user_id().unwrap(), user_id);
    }
}
