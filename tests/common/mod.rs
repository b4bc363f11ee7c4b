use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use tower::ServiceExt;
use uuid::Uuid;

use curricula::identity::{AuthorizationRequest, IdentityProvider, ProviderIdentity};
use curricula::router::init_router;
use curricula::state::AppState;
use curricula::store::memory::MemoryStore;
use curricula_auth::create_session_token;
use curricula_config::{CorsConfig, SessionConfig};
use curricula_core::{AppError, AppFuture};
use curricula_models::Profile;

pub const TEST_STATE: &str = "csrf-test-state";
pub const TEST_VERIFIER: &str = "pkce-test-verifier";
pub const GOOD_CODE: &str = "good-code";

/// Identity provider that accepts a single fixed code.
pub struct StaticIdentityProvider {
    pub identity: ProviderIdentity,
}

impl Default for StaticIdentityProvider {
    fn default() -> Self {
        Self {
            identity: ProviderIdentity {
                subject: "google|1001".to_string(),
                email: "new.teacher@district.org".to_string(),
            },
        }
    }
}

impl IdentityProvider for StaticIdentityProvider {
    fn authorization_request(&self) -> Result<AuthorizationRequest, AppError> {
        Ok(AuthorizationRequest {
            url: format!("https://accounts.example.com/authorize?state={TEST_STATE}"),
            csrf_state: TEST_STATE.to_string(),
            pkce_verifier: TEST_VERIFIER.to_string(),
        })
    }

    fn exchange_code<'a>(
        &'a self,
        code: &'a str,
        pkce_verifier: &'a str,
    ) -> AppFuture<'a, ProviderIdentity> {
        Box::pin(async move {
            if code != GOOD_CODE || pkce_verifier != TEST_VERIFIER {
                return Err(AppError::unauthenticated("Sign-in could not be completed"));
            }
            Ok(self.identity.clone())
        })
    }
}

pub fn test_session_config() -> SessionConfig {
    SessionConfig {
        secret: "integration-test-secret-at-least-32-chars".to_string(),
        expiry: 3600,
        cookie_name: "sb-access-token".to_string(),
        cookie_secure: false,
    }
}

pub fn test_state(store: Arc<MemoryStore>) -> AppState {
    AppState::new(
        store,
        Arc::new(StaticIdentityProvider::default()),
        test_session_config(),
        CorsConfig::default(),
    )
}

pub fn test_app() -> (Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let app = init_router(test_state(store.clone()));
    (app, store)
}

/// Creates a profile with the given stored role and returns it with a
/// session cookie header value for it.
pub async fn signed_in(store: &MemoryStore, role: Option<&str>) -> (Profile, String) {
    let email = generate_unique_email();
    let profile = store.add_profile(&email, role).await;
    let cookie = session_cookie_for(profile.id, &email);
    (profile, cookie)
}

/// A valid session for a user id that has no profile.
pub fn session_cookie_for(user_id: Uuid, email: &str) -> String {
    let config = test_session_config();
    let token = create_session_token(user_id, email, &config).unwrap();
    format!("{}={}", config.cookie_name, token)
}

pub fn generate_unique_email() -> String {
    format!("test-{}@district.org", Uuid::new_v4())
}

#[allow(dead_code)]
pub fn json_request(method: &str, uri: &str, cookie: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn get_request(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

/// Sends a request and returns status, headers and the body parsed as JSON
/// (`Value::Null` for an empty or non-JSON body).
pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, HeaderMap, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, headers, body)
}

#[allow(dead_code)]
pub fn set_cookies(headers: &HeaderMap) -> Vec<String> {
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .map(str::to_string)
        .collect()
}

#[allow(dead_code)]
pub fn location(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
}
