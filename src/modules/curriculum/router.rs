use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    create_entry, delete_entry, get_entry, import_entries, list_entries, update_entry,
};

/// Curriculum routes, mounted under `/api`.
pub fn init_curriculum_router() -> Router<AppState> {
    Router::new()
        .route("/curriculum", get(list_entries))
        .route(
            "/curriculum/{id}",
            get(get_entry).put(update_entry).delete(delete_entry),
        )
        .route("/manual-entry", post(create_entry))
        .route("/upload-csv", post(import_entries))
}
