//! Identity resolution.
//!
//! Two steps turn an inbound request into a [`Principal`]:
//!
//! 1. [`session::resolve_session`] verifies the session cookie, falling back
//!    to an `Authorization: Bearer` token when the cookie is absent or
//!    invalid. No verifiable token yields `None`: anonymous is a normal state.
//! 2. [`resolve_principal`] does a single point read of the profile keyed by
//!    the session subject and attaches its role. A missing profile is the
//!    lowest-privilege state, not an error.
//!
//! The OAuth side of sign-in sits behind [`IdentityProvider`] so tests can
//! substitute a static provider.

use curricula_auth::{Principal, SessionClaims};
use curricula_core::{AppError, AppFuture};
use curricula_models::Profile;

use crate::store::Store;

pub mod oauth;
pub mod session;

pub use oauth::OAuthIdentityProvider;

/// Where to send the browser to start sign-in, plus the values that must
/// survive the round trip.
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    pub url: String,
    pub csrf_state: String,
    pub pkce_verifier: String,
}

/// The provider's view of a signed-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderIdentity {
    /// Stable provider user id.
    pub subject: String,
    pub email: String,
}

pub trait IdentityProvider: Send + Sync {
    fn authorization_request(&self) -> Result<AuthorizationRequest, AppError>;

    /// Exchanges an authorization code for the user's identity.
    fn exchange_code<'a>(
        &'a self,
        code: &'a str,
        pkce_verifier: &'a str,
    ) -> AppFuture<'a, ProviderIdentity>;
}

/// Role store lookup for a resolved session.
///
/// Returns the principal used by the authorization gate and the profile it
/// was derived from, when one exists.
pub async fn resolve_principal(
    store: &dyn Store,
    claims: Option<&SessionClaims>,
) -> Result<(Principal, Option<Profile>), AppError> {
    let Some(user_id) = claims.and_then(SessionClaims::user_id) else {
        return Ok((Principal::Anonymous, None));
    };

    let profile = store.find_profile(user_id).await?;
    let role = profile.as_ref().and_then(Profile::role);

    Ok((Principal::Authenticated { user_id, role }, profile))
}
