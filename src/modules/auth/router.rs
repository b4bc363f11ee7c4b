use axum::{
    Router,
    routing::{get, post},
};

use crate::modules::auth::controller::{callback, login, logout};
use crate::state::AppState;

pub fn init_auth_router() -> Router<AppState> {
    Router::new()
        .route("/login", get(login))
        .route("/auth/callback", get(callback))
        .route("/auth/logout", post(logout))
}
