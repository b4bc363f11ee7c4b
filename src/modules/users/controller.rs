use axum::{Json, extract::State};
use tracing::instrument;

use curricula_core::{AppError, ErrorResponse};
use curricula_models::{DataResponse, ListResponse, Profile, UpdateProfileDto};

use crate::middleware::auth::{CanReadUsers, CanUpdateUsers, Caller};
use crate::modules::users::service::UserService;
use crate::state::AppState;
use crate::validator::{IdPath, ValidatedJson};

/// The signed-in user's own profile
#[utoipa::path(
    get,
    path = "/api/users/me",
    responses(
        (status = 200, description = "Own profile", body = DataResponse<Profile>),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 404, description = "No profile exists for this identity", body = ErrorResponse)
    ),
    tag = "Users",
    security(("session_cookie" = []), ("bearer_auth" = []))
)]
#[instrument(skip(caller))]
pub async fn get_me(caller: Caller) -> Result<Json<DataResponse<Profile>>, AppError> {
    let profile = UserService::me(&caller)?;
    Ok(Json(DataResponse::new(profile)))
}

#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "All profiles, newest first", body = ListResponse<Profile>),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 403, description = "Requires administrator", body = ErrorResponse)
    ),
    tag = "Users",
    security(("session_cookie" = []), ("bearer_auth" = []))
)]
#[instrument(skip(state, access))]
pub async fn list_users(
    State(state): State<AppState>,
    access: CanReadUsers,
) -> Result<Json<ListResponse<Profile>>, AppError> {
    let profiles = UserService::list(state.store.as_ref(), &access.grant).await?;
    Ok(Json(ListResponse::new(profiles)))
}

/// Change a user's role or scope assignments
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    params(
        ("id" = uuid::Uuid, Path, description = "Profile ID")
    ),
    request_body = UpdateProfileDto,
    responses(
        (status = 200, description = "Profile updated", body = DataResponse<Profile>),
        (status = 400, description = "Empty body or unknown role, subject or grade", body = ErrorResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 403, description = "Requires administrator", body = ErrorResponse),
        (status = 404, description = "Profile not found", body = ErrorResponse)
    ),
    tag = "Users",
    security(("session_cookie" = []), ("bearer_auth" = []))
)]
#[instrument(skip(state, access, changes))]
pub async fn update_user(
    State(state): State<AppState>,
    access: CanUpdateUsers,
    IdPath(id): IdPath,
    ValidatedJson(changes): ValidatedJson<UpdateProfileDto>,
) -> Result<Json<DataResponse<Profile>>, AppError> {
    let profile = UserService::update(state.store.as_ref(), &access.grant, id, &changes).await?;
    Ok(Json(DataResponse::new(profile)))
}
