//! Public lookups that populate the filter and profile dropdowns.

use axum::{Json, extract::State};
use tracing::instrument;

use curricula_core::{AppError, ErrorResponse};
use curricula_models::{District, Grade, ListResponse, Subject};

use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/districts",
    responses(
        (status = 200, description = "Districts ordered by name", body = ListResponse<District>),
        (status = 500, description = "Store failure", body = ErrorResponse)
    ),
    tag = "Reference"
)]
#[instrument(skip(state))]
pub async fn list_districts(
    State(state): State<AppState>,
) -> Result<Json<ListResponse<District>>, AppError> {
    let districts = state.store.list_districts().await?;
    Ok(Json(ListResponse::new(districts)))
}

#[utoipa::path(
    get,
    path = "/api/grades",
    responses(
        (status = 200, description = "Grades in teaching order", body = ListResponse<Grade>),
        (status = 500, description = "Store failure", body = ErrorResponse)
    ),
    tag = "Reference"
)]
#[instrument(skip(state))]
pub async fn list_grades(
    State(state): State<AppState>,
) -> Result<Json<ListResponse<Grade>>, AppError> {
    let grades = state.store.list_grades().await?;
    Ok(Json(ListResponse::new(grades)))
}

#[utoipa::path(
    get,
    path = "/api/subjects",
    responses(
        (status = 200, description = "Subjects ordered by name", body = ListResponse<Subject>),
        (status = 500, description = "Store failure", body = ErrorResponse)
    ),
    tag = "Reference"
)]
#[instrument(skip(state))]
pub async fn list_subjects(
    State(state): State<AppState>,
) -> Result<Json<ListResponse<Subject>>, AppError> {
    let subjects = state.store.list_subjects().await?;
    Ok(Json(ListResponse::new(subjects)))
}
