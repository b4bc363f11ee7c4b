//! # Curricula Auth
//!
//! Session tokens and the role-based authorization gate.
//!
//! - [`claims`]: the session token payload (identity only, no role)
//! - [`jwt`]: session token signing and verification
//! - [`roles`]: the four staff roles
//! - [`gate`]: the pure `decide` function and the [`Grant`] witness
//!
//! # Example
//!
//! ```ignore
//! use curricula_auth::{Action, Principal, Resource, Role, authorize};
//!
//! let principal = Principal::Authenticated { user_id, role: Some(Role::Owner) };
//! let grant = authorize(&principal, Action::Create, Resource::Curriculum)?;
//! ```

pub mod claims;
pub mod gate;
pub mod jwt;
pub mod roles;

pub use claims::SessionClaims;
pub use gate::{
    Action, Decision, Denial, Grant, NOT_AUTHENTICATED_MESSAGE, Principal, Resource, authorize,
    decide,
};
pub use jwt::{create_session_token, verify_session_token};
pub use roles::{Role, UnknownRole};
