use tracing::{info, instrument, warn};

use curricula_auth::{Role, create_session_token};
use curricula_config::SessionConfig;
use curricula_core::AppError;
use curricula_models::{NewProfile, Profile};

use crate::identity::{IdentityProvider, session::parse_oauth_state};
use crate::metrics::{track_session_issued, track_sign_in_failure};
use crate::store::Store;

/// Where the provider should send the browser, and the state cookie value
/// that must come back with it.
#[derive(Debug)]
pub struct LoginRedirect {
    pub url: String,
    pub csrf_state: String,
    pub pkce_verifier: String,
}

/// A completed sign-in: the bootstrapped profile and its session token.
#[derive(Debug)]
pub struct SignedIn {
    pub profile: Profile,
    pub token: String,
}

pub struct AuthService;

impl AuthService {
    pub fn begin_login(identity: &dyn IdentityProvider) -> Result<LoginRedirect, AppError> {
        let request = identity.authorization_request()?;

        Ok(LoginRedirect {
            url: request.url,
            csrf_state: request.csrf_state,
            pkce_verifier: request.pkce_verifier,
        })
    }

    /// Verifies the CSRF state, exchanges the code, bootstraps the profile
    /// and issues a session token.
    ///
    /// New profiles start as [`Role::BOOTSTRAP`]; a returning user keeps the
    /// role an administrator gave them.
    #[instrument(skip_all)]
    pub async fn complete_login(
        store: &dyn Store,
        identity: &dyn IdentityProvider,
        session_config: &SessionConfig,
        code: &str,
        state: &str,
        state_cookie: Option<&str>,
    ) -> Result<SignedIn, AppError> {
        let (expected_state, pkce_verifier) = state_cookie
            .and_then(parse_oauth_state)
            .ok_or_else(|| {
                track_sign_in_failure("missing_state");
                AppError::unauthenticated("Sign-in state is missing or expired")
            })?;

        if expected_state != state {
            warn!("OAuth state mismatch");
            track_sign_in_failure("state_mismatch");
            return Err(AppError::unauthenticated("Sign-in state does not match"));
        }

        let provider_identity = identity
            .exchange_code(code, pkce_verifier)
            .await
            .inspect_err(|_| track_sign_in_failure("exchange"))?;

        let profile = store
            .bootstrap_profile(&NewProfile {
                provider_subject: provider_identity.subject,
                email: provider_identity.email,
                role: Role::BOOTSTRAP,
            })
            .await?;

        let token = create_session_token(profile.id, &profile.email, session_config)?;

        let role = profile.role.as_deref().unwrap_or("none");
        track_session_issued(role);
        info!(profile_id = %profile.id, role, "Session issued");

        Ok(SignedIn { profile, token })
    }
}
