//! # Curricula Core
//!
//! Foundational types shared by every crate in the workspace:
//!
//! - [`errors`]: [`AppError`] and its [`ErrorKind`] taxonomy, with HTTP response conversion
//! - [`serde`]: deserialization helpers for query filters and partial updates

pub mod errors;
pub mod serde;

pub use errors::{AppError, AppFuture, ErrorKind, ErrorResponse};
