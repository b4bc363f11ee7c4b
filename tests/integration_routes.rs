mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use axum::{Router, http::StatusCode, middleware, routing::get};
use uuid::Uuid;

use common::{
    get_request, location, send, session_cookie_for, signed_in, test_app, test_state,
};
use curricula::middleware::routes::route_guard;
use curricula::store::memory::MemoryStore;

/// A router whose `/admin` and `/dashboard` handlers record that they ran.
fn recording_app(store: Arc<MemoryStore>, invoked: Arc<AtomicBool>) -> Router {
    let state = test_state(store);
    let admin_flag = invoked.clone();
    let dashboard_flag = invoked;

    Router::new()
        .route(
            "/admin",
            get(move || async move {
                admin_flag.store(true, Ordering::SeqCst);
                "admin"
            }),
        )
        .route(
            "/dashboard",
            get(move || async move {
                dashboard_flag.store(true, Ordering::SeqCst);
                "dashboard"
            }),
        )
        .layer(middleware::from_fn_with_state(state.clone(), route_guard))
        .with_state(state)
}

#[tokio::test]
async fn test_protected_pages_redirect_before_handler_runs() {
    for path in ["/admin", "/dashboard"] {
        let invoked = Arc::new(AtomicBool::new(false));
        let app = recording_app(Arc::new(MemoryStore::new()), invoked.clone());

        let (status, headers, _) = send(app, get_request(path, None)).await;

        assert_eq!(status, StatusCode::SEE_OTHER, "{path}");
        assert_eq!(location(&headers), Some("/login"));
        assert!(!invoked.load(Ordering::SeqCst), "{path} handler ran");
    }
}

#[tokio::test]
async fn test_forged_cookie_is_not_a_session() {
    let invoked = Arc::new(AtomicBool::new(false));
    let app = recording_app(Arc::new(MemoryStore::new()), invoked.clone());

    let (status, headers, _) = send(
        app,
        get_request("/admin", Some("sb-access-token=forged.token.value")),
    )
    .await;

    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location(&headers), Some("/login"));
    assert!(!invoked.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_session_reaches_protected_handler() {
    let invoked = Arc::new(AtomicBool::new(false));
    let store = Arc::new(MemoryStore::new());
    let app = recording_app(store.clone(), invoked.clone());
    let (_, cookie) = signed_in(&store, Some("viewer")).await;

    let (status, _, _) = send(app, get_request("/admin", Some(&cookie))).await;

    assert_eq!(status, StatusCode::OK);
    assert!(invoked.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_login_with_session_redirects_to_dashboard() {
    let (app, store) = test_app();
    let (_, cookie) = signed_in(&store, Some("viewer")).await;

    let (status, headers, _) = send(app, get_request("/login", Some(&cookie))).await;

    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location(&headers), Some("/dashboard"));
}

#[tokio::test]
async fn test_dashboard_view_for_each_role() {
    let (app, store) = test_app();

    let (_, viewer) = signed_in(&store, Some("viewer")).await;
    let (status, _, body) = send(app.clone(), get_request("/dashboard", Some(&viewer))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"], "viewer");
    assert_eq!(body["data"]["can_write"], false);
    assert_eq!(body["data"]["can_manage_users"], false);

    let (_, owner) = signed_in(&store, Some("owner")).await;
    let (_, _, body) = send(app.clone(), get_request("/dashboard", Some(&owner))).await;
    assert_eq!(body["data"]["can_write"], true);
    assert_eq!(body["data"]["can_manage_users"], false);

    let (_, admin) = signed_in(&store, Some("administrator")).await;
    let (_, _, body) = send(app, get_request("/dashboard", Some(&admin))).await;
    assert_eq!(body["data"]["can_write"], true);
    assert_eq!(body["data"]["can_manage_users"], true);
}

#[tokio::test]
async fn test_admin_page_lists_columns() {
    let (app, store) = test_app();
    let (_, cookie) = signed_in(&store, Some("editor")).await;

    let (status, _, body) = send(app, get_request("/admin", Some(&cookie))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["columns"].as_array().unwrap().len(), 20);
    assert_eq!(body["data"]["can_write"], false);
}

#[tokio::test]
async fn test_admin_users_page_requires_administrator() {
    let (app, store) = test_app();

    let (_, owner) = signed_in(&store, Some("owner")).await;
    let (status, _, _) = send(app.clone(), get_request("/admin/users", Some(&owner))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, admin) = signed_in(&store, Some("administrator")).await;
    let (status, _, body) = send(app, get_request("/admin/users", Some(&admin))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["roles"].as_array().unwrap().len(), 4);
    assert_eq!(body["data"]["users"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_session_without_profile_sees_dashboard_without_role() {
    let (app, _) = test_app();
    let cookie = session_cookie_for(Uuid::new_v4(), "first.login@district.org");

    let (status, _, body) = send(app, get_request("/dashboard", Some(&cookie))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"], serde_json::Value::Null);
    assert_eq!(body["data"]["email"], "first.login@district.org");
    assert_eq!(body["data"]["can_write"], false);
}

#[tokio::test]
async fn test_public_paths_pass_through() {
    let (app, _) = test_app();

    let (status, _, body) = send(app.clone(), get_request("/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, _, _) = send(app, get_request("/api/curriculum", None)).await;
    assert_eq!(status, StatusCode::OK);
}
