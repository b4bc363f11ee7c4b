//! Application error type shared by every layer of the service.
//!
//! Every fallible operation returns [`AppError`], which pairs a failure class
//! ([`ErrorKind`]) with the underlying [`anyhow::Error`]. Handlers propagate it
//! with `?` and axum turns it into a JSON body at the endpoint boundary:
//!
//! ```json
//! { "error": "Not authenticated. Please log in.", "code": "not_authenticated" }
//! ```
//!
//! Store and internal failures are logged with their full cause and answered
//! with a generic message so raw database text never reaches a client.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use anyhow::{Error, anyhow};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Boxed future returned by object-safe async traits (stores, identity providers).
pub type AppFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, AppError>> + Send + 'a>>;

const STORE_FAILURE_MESSAGE: &str = "The data store could not complete the request";
const INTERNAL_FAILURE_MESSAGE: &str = "Internal server error";

/// Failure classes, distinguishable by status code and by the `code` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// No resolved identity for an operation that needs one.
    #[serde(rename = "not_authenticated")]
    AuthenticationRequired,
    /// Identity resolved, but the role does not permit the operation.
    NotAuthorized,
    ValidationError,
    NotFound,
    UpstreamStoreError,
    InternalError,
}

impl ErrorKind {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorKind::AuthenticationRequired => StatusCode::UNAUTHORIZED,
            ErrorKind::NotAuthorized => StatusCode::FORBIDDEN,
            ErrorKind::ValidationError => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::UpstreamStoreError | ErrorKind::InternalError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::AuthenticationRequired => "not_authenticated",
            ErrorKind::NotAuthorized => "not_authorized",
            ErrorKind::ValidationError => "validation_error",
            ErrorKind::NotFound => "not_found",
            ErrorKind::UpstreamStoreError => "upstream_store_error",
            ErrorKind::InternalError => "internal_error",
        }
    }

    /// Whether the underlying cause may be shown to the caller verbatim.
    fn exposes_cause(self) -> bool {
        !matches!(
            self,
            ErrorKind::UpstreamStoreError | ErrorKind::InternalError
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wire shape of every error response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub code: ErrorKind,
}

#[derive(Debug)]
pub struct AppError {
    pub kind: ErrorKind,
    pub error: Error,
    public_message: Option<String>,
}

impl AppError {
    pub fn new<E>(kind: ErrorKind, err: E) -> Self
    where
        E: Into<Error>,
    {
        Self {
            kind,
            error: err.into(),
            public_message: None,
        }
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AuthenticationRequired, anyhow!(message.into()))
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotAuthorized, anyhow!(message.into()))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ValidationError, anyhow!(message.into()))
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, anyhow!(message.into()))
    }

    pub fn store<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::UpstreamStoreError, err)
    }

    pub fn internal<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::InternalError, err)
    }

    /// Replaces the generic message sent for store and internal failures.
    pub fn with_public_message(mut self, message: impl Into<String>) -> Self {
        self.public_message = Some(message.into());
        self
    }

    pub fn status(&self) -> StatusCode {
        self.kind.status()
    }

    /// The message a caller sees in the `error` field.
    pub fn message(&self) -> String {
        if let Some(message) = &self.public_message {
            return message.clone();
        }
        if self.kind.exposes_cause() {
            return self.error.to_string();
        }
        match self.kind {
            ErrorKind::UpstreamStoreError => STORE_FAILURE_MESSAGE.to_string(),
            _ => INTERNAL_FAILURE_MESSAGE.to_string(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.error)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if !self.kind.exposes_cause() {
            tracing::error!(code = %self.kind, error = ?self.error, "Request failed");
        }

        let body = Json(ErrorResponse {
            error: self.message(),
            code: self.kind,
        });

        (self.status(), body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<Error>,
{
    fn from(err: E) -> Self {
        AppError::internal(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_status_per_kind() {
        assert_eq!(
            AppError::unauthenticated("x").status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AppError::forbidden("x").status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::validation("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::not_found("x").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::store(anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_client_errors_expose_message_and_code() {
        let (status, body) = body_json(AppError::forbidden("Not authorized.")).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "Not authorized.");
        assert_eq!(body["code"], "not_authorized");

        let (_, body) = body_json(AppError::unauthenticated("Log in")).await;
        assert_eq!(body["code"], "not_authenticated");
    }

    #[tokio::test]
    async fn test_store_errors_hide_raw_cause() {
        let err = AppError::store(anyhow!("relation \"curriculum_entries\" does not exist"));
        let (status, body) = body_json(err).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], "upstream_store_error");
        assert!(!body["error"].as_str().unwrap().contains("relation"));
    }

    #[tokio::test]
    async fn test_public_message_overrides_generic_text() {
        let err = AppError::store(anyhow!("connection reset"))
            .with_public_message("Import stopped after 2 of 5 rows were committed");
        let (_, body) = body_json(err).await;

        assert_eq!(
            body["error"],
            "Import stopped after 2 of 5 rows were committed"
        );
    }

    #[test]
    fn test_blanket_from_is_internal() {
        let err: AppError = std::io::Error::other("disk").into();
        assert_eq!(err.kind, ErrorKind::InternalError);
    }
}
