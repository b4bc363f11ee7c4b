//! Request-level access control.
//!
//! - [`auth`]: the [`Caller`](auth::Caller) extractor (identity resolution plus
//!   role store lookup) and the per-operation gate extractors built with
//!   [`require_access!`](crate::require_access)
//! - [`routes`]: the path-level route guard for page navigation
//!
//! # Request Flow
//!
//! 1. `route_guard` redirects page navigation without a verified session
//! 2. The handler's gate extractor resolves the caller and runs
//!    [`authorize`](curricula_auth::authorize)
//! 3. The handler receives a [`Grant`](curricula_auth::Grant) and passes it
//!    to the service, which checks it before touching the store
//!
//! Extractors implementing `FromRequestParts` run before the body
//! extractor, so an anonymous write is answered with 401 even when its body
//! is malformed.
//!
//! ```ignore
//! use crate::middleware::auth::CanCreateCurriculum;
//!
//! async fn create_entry(
//!     State(state): State<AppState>,
//!     access: CanCreateCurriculum,
//!     JsonBody(fields): JsonBody<CurriculumFields>,
//! ) -> Result<impl IntoResponse, AppError> {
//!     CurriculumService::create(state.store.as_ref(), &access.grant, &fields).await
//! }
//! ```

pub mod auth;
pub mod routes;
