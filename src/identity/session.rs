use axum::http::{HeaderMap, HeaderValue, header};
use axum_extra::extract::CookieJar;
use cookie::{Cookie, SameSite, time::Duration};
use tracing::debug;

use curricula_auth::{SessionClaims, verify_session_token};
use curricula_config::SessionConfig;
use curricula_core::AppError;

pub const OAUTH_STATE_COOKIE: &str = "oauth_state";
const OAUTH_STATE_MAX_AGE_SECS: i64 = 600;

pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    CookieJar::from_headers(headers)
        .get(name)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
}

pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

/// Candidate session tokens in the order they are tried: the session cookie,
/// then a Bearer header for API clients.
pub fn session_tokens(headers: &HeaderMap, config: &SessionConfig) -> Vec<String> {
    read_cookie(headers, &config.cookie_name)
        .into_iter()
        .chain(bearer_token(headers))
        .collect()
}

/// Verified session claims, or `None` for anonymous requests.
///
/// A cookie that fails verification does not hide a valid Bearer token.
pub fn resolve_session(headers: &HeaderMap, config: &SessionConfig) -> Option<SessionClaims> {
    session_tokens(headers, config)
        .into_iter()
        .find_map(|token| match verify_session_token(&token, config) {
            Ok(claims) => Some(claims),
            Err(err) => {
                debug!(error = %err, "Ignoring invalid session token");
                None
            }
        })
}

fn to_header(cookie: Cookie<'_>) -> Result<HeaderValue, AppError> {
    HeaderValue::from_str(&cookie.to_string()).map_err(AppError::internal)
}

fn build_cookie(name: String, value: String, max_age_secs: i64, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(Duration::seconds(max_age_secs))
        .secure(secure)
        .build()
}

pub fn session_cookie(token: &str, config: &SessionConfig) -> Result<HeaderValue, AppError> {
    to_header(build_cookie(
        config.cookie_name.clone(),
        token.to_string(),
        config.expiry,
        config.cookie_secure,
    ))
}

pub fn clear_session_cookie(config: &SessionConfig) -> Result<HeaderValue, AppError> {
    to_header(build_cookie(
        config.cookie_name.clone(),
        String::new(),
        0,
        config.cookie_secure,
    ))
}

/// Short-lived cookie carrying `{csrf}|{pkce_verifier}` through the provider redirect.
pub fn oauth_state_cookie(
    csrf_state: &str,
    pkce_verifier: &str,
    secure: bool,
) -> Result<HeaderValue, AppError> {
    to_header(build_cookie(
        OAUTH_STATE_COOKIE.to_string(),
        format!("{csrf_state}|{pkce_verifier}"),
        OAUTH_STATE_MAX_AGE_SECS,
        secure,
    ))
}

pub fn clear_oauth_state_cookie(secure: bool) -> Result<HeaderValue, AppError> {
    to_header(build_cookie(
        OAUTH_STATE_COOKIE.to_string(),
        String::new(),
        0,
        secure,
    ))
}

/// Splits an `oauth_state` cookie value into CSRF state and PKCE verifier.
pub fn parse_oauth_state(value: &str) -> Option<(&str, &str)> {
    value
        .split_once('|')
        .filter(|(csrf, verifier)| !csrf.is_empty() && !verifier.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use curricula_auth::create_session_token;
    use uuid::Uuid;

    fn config() -> SessionConfig {
        SessionConfig {
            secret: "session-test-secret-with-enough-length".to_string(),
            expiry: 3600,
            cookie_name: "sb-access-token".to_string(),
            cookie_secure: false,
        }
    }

    fn headers_with(name: header::HeaderName, value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(name, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_no_token_is_anonymous() {
        assert!(resolve_session(&HeaderMap::new(), &config()).is_none());
    }

    #[test]
    fn test_cookie_token_resolves() {
        let config = config();
        let user_id = Uuid::new_v4();
        let token = create_session_token(user_id, "a@b.c", &config).unwrap();
        let headers = headers_with(header::COOKIE, &format!("other=1; sb-access-token={token}"));

        let claims = resolve_session(&headers, &config).unwrap();
        assert_eq!(claims.user_id(), Some(user_id));
    }

    #[test]
    fn test_bearer_fallback() {
        let config = config();
        let token = create_session_token(Uuid::new_v4(), "a@b.c", &config).unwrap();
        let headers = headers_with(header::AUTHORIZATION, &format!("Bearer {token}"));

        assert!(resolve_session(&headers, &config).is_some());
    }

    #[test]
    fn test_stale_cookie_falls_back_to_bearer() {
        let config = config();
        let user_id = Uuid::new_v4();
        let token = create_session_token(user_id, "a@b.c", &config).unwrap();
        let mut headers = headers_with(header::COOKIE, "sb-access-token=expired.or.garbage");
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );

        assert_eq!(session_tokens(&headers, &config).len(), 2);
        let claims = resolve_session(&headers, &config).unwrap();
        assert_eq!(claims.user_id(), Some(user_id));
    }

    #[test]
    fn test_invalid_token_is_anonymous_not_error() {
        let headers = headers_with(header::COOKIE, "sb-access-token=forged");
        assert!(resolve_session(&headers, &config()).is_none());
    }

    #[test]
    fn test_session_cookie_attributes() {
        let value = session_cookie("abc", &config()).unwrap();
        let value = value.to_str().unwrap();

        assert!(value.starts_with("sb-access-token=abc"));
        assert!(value.contains("HttpOnly"));
        assert!(value.contains("SameSite=Lax"));
        assert!(value.contains("Path=/"));
    }

    #[test]
    fn test_parse_oauth_state() {
        assert_eq!(parse_oauth_state("csrf|verifier"), Some(("csrf", "verifier")));
        assert_eq!(parse_oauth_state("csrf"), None);
        assert_eq!(parse_oauth_state("|verifier"), None);
    }
}
