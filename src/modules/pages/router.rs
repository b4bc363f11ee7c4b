use axum::{Router, routing::get};

use crate::modules::pages::controller::{admin, admin_users, dashboard};
use crate::state::AppState;

pub fn init_pages_router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/admin", get(admin))
        .route("/admin/users", get(admin_users))
}
