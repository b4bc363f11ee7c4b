use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use tracing::instrument;

use curricula_core::{AppError, ErrorResponse};
use curricula_models::{
    CurriculumEntry, CurriculumFields, CurriculumFilterParams, DataResponse, ImportRequest,
    ListResponse, MessageResponse,
};

use crate::middleware::auth::{CanCreateCurriculum, CanDeleteCurriculum, CanUpdateCurriculum};
use crate::modules::curriculum::service::CurriculumService;
use crate::state::AppState;
use crate::validator::{IdPath, JsonBody};

#[utoipa::path(
    get,
    path = "/api/curriculum",
    params(CurriculumFilterParams),
    responses(
        (status = 200, description = "Matching entries, newest first", body = ListResponse<CurriculumEntry>),
        (status = 500, description = "Store failure", body = ErrorResponse)
    ),
    tag = "Curriculum"
)]
#[instrument(skip(state))]
pub async fn list_entries(
    State(state): State<AppState>,
    Query(filters): Query<CurriculumFilterParams>,
) -> Result<Json<ListResponse<CurriculumEntry>>, AppError> {
    let entries = CurriculumService::list(state.store.as_ref(), &filters).await?;
    Ok(Json(ListResponse::new(entries)))
}

#[utoipa::path(
    get,
    path = "/api/curriculum/{id}",
    params(
        ("id" = uuid::Uuid, Path, description = "Entry ID")
    ),
    responses(
        (status = 200, description = "Entry details", body = DataResponse<CurriculumEntry>),
        (status = 404, description = "Entry not found", body = ErrorResponse)
    ),
    tag = "Curriculum"
)]
#[instrument(skip(state))]
pub async fn get_entry(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<Json<DataResponse<CurriculumEntry>>, AppError> {
    let entry = CurriculumService::get(state.store.as_ref(), id).await?;
    Ok(Json(DataResponse::new(entry)))
}

#[utoipa::path(
    post,
    path = "/api/manual-entry",
    request_body = CurriculumFields,
    responses(
        (status = 201, description = "Entry created", body = DataResponse<CurriculumEntry>),
        (status = 400, description = "Empty or unknown fields", body = ErrorResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 403, description = "Requires owner or administrator", body = ErrorResponse)
    ),
    tag = "Curriculum",
    security(("session_cookie" = []), ("bearer_auth" = []))
)]
#[instrument(skip(state, access, fields))]
pub async fn create_entry(
    State(state): State<AppState>,
    access: CanCreateCurriculum,
    JsonBody(fields): JsonBody<CurriculumFields>,
) -> Result<(StatusCode, Json<DataResponse<CurriculumEntry>>), AppError> {
    let entry = CurriculumService::create(state.store.as_ref(), &access.grant, &fields).await?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(entry))))
}

#[utoipa::path(
    put,
    path = "/api/curriculum/{id}",
    params(
        ("id" = uuid::Uuid, Path, description = "Entry ID")
    ),
    request_body = CurriculumFields,
    responses(
        (status = 200, description = "Entry updated", body = DataResponse<CurriculumEntry>),
        (status = 400, description = "Empty or unknown fields", body = ErrorResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 403, description = "Requires owner or administrator", body = ErrorResponse),
        (status = 404, description = "Entry not found", body = ErrorResponse)
    ),
    tag = "Curriculum",
    security(("session_cookie" = []), ("bearer_auth" = []))
)]
#[instrument(skip(state, access, fields))]
pub async fn update_entry(
    State(state): State<AppState>,
    access: CanUpdateCurriculum,
    IdPath(id): IdPath,
    JsonBody(fields): JsonBody<CurriculumFields>,
) -> Result<Json<DataResponse<CurriculumEntry>>, AppError> {
    let entry =
        CurriculumService::update(state.store.as_ref(), &access.grant, id, &fields).await?;
    Ok(Json(DataResponse::new(entry)))
}

#[utoipa::path(
    delete,
    path = "/api/curriculum/{id}",
    params(
        ("id" = uuid::Uuid, Path, description = "Entry ID")
    ),
    responses(
        (status = 200, description = "Entry deleted", body = MessageResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 403, description = "Requires owner or administrator", body = ErrorResponse),
        (status = 404, description = "Entry not found", body = ErrorResponse)
    ),
    tag = "Curriculum",
    security(("session_cookie" = []), ("bearer_auth" = []))
)]
#[instrument(skip(state, access))]
pub async fn delete_entry(
    State(state): State<AppState>,
    access: CanDeleteCurriculum,
    IdPath(id): IdPath,
) -> Result<Json<MessageResponse>, AppError> {
    CurriculumService::delete(state.store.as_ref(), &access.grant, id).await?;
    Ok(Json(MessageResponse::new("Entry deleted successfully")))
}

#[utoipa::path(
    post,
    path = "/api/upload-csv",
    request_body = ImportRequest,
    responses(
        (status = 201, description = "All rows imported", body = ListResponse<CurriculumEntry>),
        (status = 400, description = "Malformed CSV or invalid row; nothing imported", body = ErrorResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 403, description = "Requires owner or administrator", body = ErrorResponse),
        (status = 500, description = "Store failed part-way; committed rows are reported", body = ErrorResponse)
    ),
    tag = "Curriculum",
    security(("session_cookie" = []), ("bearer_auth" = []))
)]
#[instrument(skip(state, access, request))]
pub async fn import_entries(
    State(state): State<AppState>,
    access: CanCreateCurriculum,
    JsonBody(request): JsonBody<ImportRequest>,
) -> Result<(StatusCode, Json<ListResponse<CurriculumEntry>>), AppError> {
    let entries =
        CurriculumService::import(state.store.as_ref(), &access.grant, &request).await?;
    Ok((StatusCode::CREATED, Json(ListResponse::new(entries))))
}
