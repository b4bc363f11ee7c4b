use axum::{
    extract::{Query, State},
    http::{HeaderMap, header},
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::{instrument, warn};
use utoipa::IntoParams;

use curricula_core::{AppError, ErrorResponse};

use crate::identity::session::{
    OAUTH_STATE_COOKIE, clear_oauth_state_cookie, clear_session_cookie, oauth_state_cookie,
    read_cookie, session_cookie,
};
use crate::middleware::routes::{LANDING_PATH, LOGIN_PATH};
use crate::modules::auth::service::AuthService;
use crate::state::AppState;

const SIGN_IN_ERROR_PATH: &str = "/login?error=auth";

#[derive(Debug, Deserialize, IntoParams)]
pub struct LoginQuery {
    /// Set when a previous sign-in attempt failed.
    pub error: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    /// Set by the provider when the user declined or the request was invalid.
    pub error: Option<String>,
}

/// Start sign-in with the identity provider
#[utoipa::path(
    get,
    path = "/login",
    params(LoginQuery),
    responses(
        (status = 303, description = "Redirect to the identity provider"),
        (status = 401, description = "The previous sign-in attempt failed", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state))]
pub async fn login(
    State(state): State<AppState>,
    Query(query): Query<LoginQuery>,
) -> Result<Response, AppError> {
    if query.error.is_some() {
        return Err(AppError::unauthenticated(
            "Sign-in failed. Please try again.",
        ));
    }

    let redirect = AuthService::begin_login(state.identity.as_ref())?;
    let cookie = oauth_state_cookie(
        &redirect.csrf_state,
        &redirect.pkce_verifier,
        state.session_config.cookie_secure,
    )?;

    Ok((
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Redirect::to(&redirect.url),
    )
        .into_response())
}

/// OAuth redirect target
#[utoipa::path(
    get,
    path = "/auth/callback",
    params(CallbackQuery),
    responses(
        (status = 303, description = "Session issued and redirected to the dashboard, or redirected back to login on failure")
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, headers, query))]
pub async fn callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<CallbackQuery>,
) -> Response {
    match finish_sign_in(&state, &headers, query).await {
        Ok(response) => response,
        Err(err) => {
            warn!(error = %err, "Sign-in failed");
            let clear = clear_oauth_state_cookie(state.session_config.cookie_secure);
            match clear {
                Ok(clear) => (
                    AppendHeaders([(header::SET_COOKIE, clear)]),
                    Redirect::to(SIGN_IN_ERROR_PATH),
                )
                    .into_response(),
                Err(_) => Redirect::to(SIGN_IN_ERROR_PATH).into_response(),
            }
        }
    }
}

async fn finish_sign_in(
    state: &AppState,
    headers: &HeaderMap,
    query: CallbackQuery,
) -> Result<Response, AppError> {
    if let Some(error) = query.error {
        return Err(AppError::unauthenticated(format!(
            "Identity provider returned an error: {error}"
        )));
    }

    let code = query
        .code
        .filter(|code| !code.is_empty())
        .ok_or_else(|| AppError::unauthenticated("Missing authorization code"))?;
    let csrf_state = query.state.unwrap_or_default();
    let state_cookie = read_cookie(headers, OAUTH_STATE_COOKIE);

    let signed_in = AuthService::complete_login(
        state.store.as_ref(),
        state.identity.as_ref(),
        &state.session_config,
        &code,
        &csrf_state,
        state_cookie.as_deref(),
    )
    .await?;

    let session = session_cookie(&signed_in.token, &state.session_config)?;
    let clear_state = clear_oauth_state_cookie(state.session_config.cookie_secure)?;

    Ok((
        AppendHeaders([
            (header::SET_COOKIE, session),
            (header::SET_COOKIE, clear_state),
        ]),
        Redirect::to(LANDING_PATH),
    )
        .into_response())
}

/// Sign out
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 303, description = "Session cookie cleared, redirected to login")
    ),
    tag = "Authentication"
)]
#[instrument(skip(state))]
pub async fn logout(State(state): State<AppState>) -> Result<Response, AppError> {
    let cleared = clear_session_cookie(&state.session_config)?;

    Ok((
        AppendHeaders([(header::SET_COOKIE, cleared)]),
        Redirect::to(LOGIN_PATH),
    )
        .into_response())
}
