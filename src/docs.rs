use utoipa::openapi::security::{
    ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme,
};
use utoipa::{Modify, OpenApi};

use curricula_auth::Role;
use curricula_config::session::DEFAULT_SESSION_COOKIE;
use curricula_core::{ErrorKind, ErrorResponse};
use curricula_models::{
    CurriculumEntry, CurriculumFields, District, Grade, GradeLevel, ImportRequest,
    MessageResponse, Profile, Subject, SubjectArea, UpdateProfileDto,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::curriculum::controller::list_entries,
        crate::modules::curriculum::controller::get_entry,
        crate::modules::curriculum::controller::create_entry,
        crate::modules::curriculum::controller::update_entry,
        crate::modules::curriculum::controller::delete_entry,
        crate::modules::curriculum::controller::import_entries,
        crate::modules::reference::controller::list_districts,
        crate::modules::reference::controller::list_grades,
        crate::modules::reference::controller::list_subjects,
        crate::modules::users::controller::get_me,
        crate::modules::users::controller::list_users,
        crate::modules::users::controller::update_user,
        crate::modules::auth::controller::login,
        crate::modules::auth::controller::callback,
        crate::modules::auth::controller::logout,
    ),
    components(
        schemas(
            CurriculumEntry,
            CurriculumFields,
            ImportRequest,
            Profile,
            UpdateProfileDto,
            Role,
            SubjectArea,
            GradeLevel,
            District,
            Grade,
            Subject,
            MessageResponse,
            ErrorResponse,
            ErrorKind,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Curriculum", description = "Curriculum entries: public browsing, gated writes and bulk import"),
        (name = "Reference", description = "Districts, grades and subjects"),
        (name = "Users", description = "Own profile and administrator role management"),
        (name = "Authentication", description = "OAuth sign-in and sign-out")
    ),
    info(
        title = "Curricula API",
        version = "0.1.0",
        description = "Curriculum management with role-based access control, built with Rust, Axum and PostgreSQL.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
            components.add_security_scheme(
                "session_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(DEFAULT_SESSION_COOKIE))),
            );
        }
    }
}
