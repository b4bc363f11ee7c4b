//! View data for the server-rendered pages. The route guard has already
//! required a verified session; role checks happen here.

use axum::{Json, extract::State};
use serde::Serialize;
use tracing::instrument;

use curricula_auth::{Action, Resource, Role, decide};
use curricula_core::AppError;
use curricula_models::{CURRICULUM_COLUMNS, CurriculumColumn, DataResponse, Profile};

use crate::middleware::auth::{CanReadUsers, Caller};
use crate::modules::users::UserService;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct DashboardView {
    pub email: Option<String>,
    pub role: Option<Role>,
    pub can_write: bool,
    pub can_manage_users: bool,
}

#[derive(Debug, Serialize)]
pub struct AdminView {
    pub columns: &'static [CurriculumColumn],
    pub can_write: bool,
}

#[derive(Debug, Serialize)]
pub struct RoleInfo {
    pub role: Role,
    pub description: &'static str,
}

#[derive(Debug, Serialize)]
pub struct AdminUsersView {
    pub roles: Vec<RoleInfo>,
    pub users: Vec<Profile>,
}

fn can_write(caller: &Caller) -> bool {
    decide(&caller.principal, Action::Create, Resource::Curriculum).is_allowed()
}

#[instrument(skip(caller))]
pub async fn dashboard(caller: Caller) -> Result<Json<DataResponse<DashboardView>>, AppError> {
    caller.require_user_id()?;

    Ok(Json(DataResponse::new(DashboardView {
        email: caller.email().map(str::to_string),
        role: caller.role(),
        can_write: can_write(&caller),
        can_manage_users: decide(&caller.principal, Action::Update, Resource::UserRole)
            .is_allowed(),
    })))
}

/// Manual entry and CSV upload page. Viewing is open to any signed-in user;
/// the form posts are gated per request.
#[instrument(skip(caller))]
pub async fn admin(caller: Caller) -> Result<Json<DataResponse<AdminView>>, AppError> {
    caller.require_user_id()?;

    Ok(Json(DataResponse::new(AdminView {
        columns: CURRICULUM_COLUMNS,
        can_write: can_write(&caller),
    })))
}

#[instrument(skip(state, access))]
pub async fn admin_users(
    State(state): State<AppState>,
    access: CanReadUsers,
) -> Result<Json<DataResponse<AdminUsersView>>, AppError> {
    let users = UserService::list(state.store.as_ref(), &access.grant).await?;

    Ok(Json(DataResponse::new(AdminUsersView {
        roles: Role::ALL
            .into_iter()
            .map(|role| RoleInfo {
                role,
                description: role.description(),
            })
            .collect(),
        users,
    })))
}
