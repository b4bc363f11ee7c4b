use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Path, Request, rejection::JsonRejection},
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use curricula_core::AppError;

fn format_errors(errors: &ValidationErrors) -> String {
    errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().filter_map(move |error| {
                error
                    .message
                    .as_ref()
                    .map(|msg| msg.to_string())
                    .or_else(|| Some(format!("{} is invalid", field)))
            })
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Text between the first pair of backticks in a serde message.
fn quoted_name(message: &str, marker: &str) -> Option<String> {
    message
        .split(marker)
        .nth(1)
        .and_then(|s| s.split('`').next())
        .map(str::to_string)
}

fn map_rejection(rejection: JsonRejection) -> AppError {
    if matches!(rejection, JsonRejection::MissingJsonContentType(_)) {
        return AppError::validation("Missing 'Content-Type: application/json' header");
    }

    let error_msg = rejection.body_text();

    if let Some(field) = quoted_name(&error_msg, "missing field `") {
        return AppError::validation(format!("{} is required", field));
    }

    if let Some(field) = quoted_name(&error_msg, "unknown field `") {
        return AppError::validation(format!("Unknown field `{}`", field));
    }

    if error_msg.contains("unknown variant") {
        return AppError::validation(
            error_msg
                .split(": ")
                .last()
                .unwrap_or("Invalid value in request")
                .to_string(),
        );
    }

    if error_msg.contains("invalid type") {
        return AppError::validation("Invalid field type in request");
    }

    if matches!(rejection, JsonRejection::JsonDataError(_)) {
        return AppError::validation(error_msg);
    }

    AppError::validation("Invalid request body")
}

/// `Json<T>` whose rejections are reported as `ValidationError`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(map_rejection)?;

        Ok(JsonBody(value))
    }
}

/// [`JsonBody`] that also runs the `validator` rules of `T`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let JsonBody(value) = JsonBody::<T>::from_request(req, state).await?;

        value
            .validate()
            .map_err(|errors| AppError::validation(format_errors(&errors)))?;

        Ok(ValidatedJson(value))
    }
}

/// A single `{id}` path segment parsed as a UUID; malformed ids are a
/// `ValidationError` rather than axum's plain-text rejection.
#[derive(Debug, Clone, Copy)]
pub struct IdPath(pub Uuid);

impl<S> FromRequestParts<S> for IdPath
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<Uuid>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::validation("Invalid id"))?;

        Ok(IdPath(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::header};
    use curricula_core::ErrorKind;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Validate)]
    #[serde(deny_unknown_fields)]
    struct Payload {
        #[validate(length(min = 1, message = "Name must not be empty"))]
        name: String,
    }

    fn json_request(body: &str) -> Request {
        Request::builder()
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn extract(req: Request) -> Result<ValidatedJson<Payload>, AppError> {
        ValidatedJson::<Payload>::from_request(req, &()).await
    }

    #[tokio::test]
    async fn test_valid_body() {
        let ValidatedJson(payload) = extract(json_request(r#"{"name":"x"}"#)).await.unwrap();
        assert_eq!(payload.name, "x");
    }

    #[tokio::test]
    async fn test_rejections_are_validation_errors() {
        let cases = [
            (r#"{}"#, "name is required"),
            (r#"{"name":"x","colour":"red"}"#, "Unknown field `colour`"),
            (r#"{"name":7}"#, "Invalid field type in request"),
            (r#"{"name":""}"#, "Name must not be empty"),
        ];

        for (body, message) in cases {
            let err = extract(json_request(body)).await.unwrap_err();
            assert_eq!(err.kind, ErrorKind::ValidationError, "{body}");
            assert_eq!(err.message(), message, "{body}");
        }
    }

    #[tokio::test]
    async fn test_missing_content_type() {
        let req = Request::builder()
            .body(Body::from(r#"{"name":"x"}"#))
            .unwrap();
        let err = extract(req).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::ValidationError);
    }
}
