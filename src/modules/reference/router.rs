use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::{list_districts, list_grades, list_subjects};

pub fn init_reference_router() -> Router<AppState> {
    Router::new()
        .route("/districts", get(list_districts))
        .route("/grades", get(list_grades))
        .route("/subjects", get(list_subjects))
}
