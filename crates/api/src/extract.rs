//! Extractors whose rejections answer with the same bodies as handler errors.

use axum::{
    Json, RequestPartsExt, async_trait,
    extract::{
        FromRequest, FromRequestParts, Path, Request,
        rejection::{JsonRejection, PathRejection},
    },
    http::request::Parts,
};
use mfc_core::errors::{FieldErrors, MfcError, NON_FIELD_ERRORS};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::middleware::error_handling::AppError;

const DATA_ERROR_PREFIX: &str = "Failed to deserialize the JSON body into the target type: ";

/// A JSON body. Payloads that do not fit the target type become validation
/// errors keyed on the offending field.
pub struct ValidJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(ValidJson(value))
    }
}

/// The `:id` segment. A value that is not a UUID cannot name any record.
pub struct IdPath(pub Uuid);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for IdPath {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = parts.extract::<Path<Uuid>>().await?;
        Ok(IdPath(id))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        let errors = match rejection {
            JsonRejection::JsonDataError(err) => data_errors(&err.body_text()),
            JsonRejection::JsonSyntaxError(_) => {
                FieldErrors::single(NON_FIELD_ERRORS, "Malformed JSON body")
            }
            JsonRejection::MissingJsonContentType(_) => {
                FieldErrors::single(NON_FIELD_ERRORS, "Expected a JSON body")
            }
            _ => FieldErrors::single(NON_FIELD_ERRORS, "Unable to read the request body"),
        };
        AppError(MfcError::Validation(errors))
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        match rejection {
            PathRejection::FailedToDeserializePathParams(err) => {
                AppError(MfcError::NotFound(err.body_text()))
            }
            other => AppError(MfcError::Internal(Box::new(other))),
        }
    }
}

/// Maps a deserialization failure (`<path>: <reason>`) to its top-level field.
fn data_errors(text: &str) -> FieldErrors {
    let detail = text.strip_prefix(DATA_ERROR_PREFIX).unwrap_or(text);

    if let Some(field) = detail
        .strip_prefix("missing field `")
        .and_then(|rest| rest.split('`').next())
    {
        return FieldErrors::single(field, "This field is required");
    }

    let field = detail
        .split_once(": ")
        .map(|(path, _)| path)
        .filter(|path| !path.contains(' '))
        .and_then(|path| path.split(['.', '[']).next())
        .filter(|field| !field.is_empty());

    match field {
        Some(field) => FieldErrors::single(field, "Invalid value"),
        None => FieldErrors::single(NON_FIELD_ERRORS, "Invalid request body"),
    }
}
