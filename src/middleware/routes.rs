//! Path-level guard for page navigation.
//!
//! Classifies the request path and redirects before any handler runs:
//! a protected page without a verified session goes to `/login`, and the
//! login page with a verified session goes to `/dashboard`. Session presence
//! means a token whose signature and expiry verify; a cookie that merely
//! exists is not enough. Role checks for `/admin` pages happen in the
//! handlers. API paths are public here and gated per handler.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::debug;

use crate::identity::session::resolve_session;
use crate::state::AppState;

pub const LOGIN_PATH: &str = "/login";
pub const LANDING_PATH: &str = "/dashboard";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    Public,
    Login,
    /// `/dashboard` and below.
    ProtectedSoft,
    /// `/admin` and below.
    ProtectedHard,
}

impl RouteClass {
    pub fn is_protected(self) -> bool {
        matches!(self, RouteClass::ProtectedSoft | RouteClass::ProtectedHard)
    }
}

fn is_under(path: &str, prefix: &str) -> bool {
    path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

pub fn classify_path(path: &str) -> RouteClass {
    if is_under(path, "/admin") {
        RouteClass::ProtectedHard
    } else if is_under(path, LANDING_PATH) {
        RouteClass::ProtectedSoft
    } else if is_under(path, LOGIN_PATH) {
        RouteClass::Login
    } else {
        RouteClass::Public
    }
}

pub async fn route_guard(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let class = classify_path(req.uri().path());
    if class == RouteClass::Public {
        return next.run(req).await;
    }

    let has_session = resolve_session(req.headers(), &state.session_config).is_some();

    if class.is_protected() && !has_session {
        debug!(path = %req.uri().path(), "No session for protected path, redirecting to login");
        return Redirect::to(LOGIN_PATH).into_response();
    }

    if class == RouteClass::Login && has_session {
        return Redirect::to(LANDING_PATH).into_response();
    }

    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_path() {
        assert_eq!(classify_path("/admin"), RouteClass::ProtectedHard);
        assert_eq!(classify_path("/admin/users"), RouteClass::ProtectedHard);
        assert_eq!(classify_path("/dashboard"), RouteClass::ProtectedSoft);
        assert_eq!(classify_path("/dashboard/settings"), RouteClass::ProtectedSoft);
        assert_eq!(classify_path("/login"), RouteClass::Login);
        assert_eq!(classify_path("/"), RouteClass::Public);
        assert_eq!(classify_path("/api/curriculum"), RouteClass::Public);
        assert_eq!(classify_path("/auth/callback"), RouteClass::Public);
    }

    #[test]
    fn test_prefix_must_end_at_segment() {
        assert_eq!(classify_path("/administrator"), RouteClass::Public);
        assert_eq!(classify_path("/dashboards"), RouteClass::Public);
        assert_eq!(classify_path("/api/admin"), RouteClass::Public);
    }
}
