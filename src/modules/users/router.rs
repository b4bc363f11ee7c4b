use axum::{
    Router,
    routing::{get, put},
};

use crate::modules::users::controller::{get_me, list_users, update_user};
use crate::state::AppState;

/// User administration routes, mounted under `/api/users`.
pub fn init_users_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users))
        .route("/me", get(get_me))
        .route("/{id}", put(update_user))
}
