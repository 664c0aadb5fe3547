//! Extractors that report malformed input in the API error format.
//!
//! Axum's stock rejections answer with plain text; these wrap `Json`,
//! `Query` and `Path` so that bad payloads, unknown enum values and
//! malformed IDs come back as `VALIDATION_ERROR`.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, FromRequestParts, Path, Query, Request};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use worktrack_core::error::AppError;

use crate::error::ApiError;

/// A JSON body that passed `validator` checks.
#[derive(Debug, Clone)]
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(json_rejection)?;
        value.validate().map_err(first_field_error)?;
        Ok(Self(value))
    }
}

/// Query string parameters.
#[derive(Debug, Clone)]
pub struct ApiQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::validation(rejection.body_text()))?;
        Ok(Self(value))
    }
}

/// Path parameters.
#[derive(Debug, Clone)]
pub struct ApiPath<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::validation(rejection.body_text()))?;
        Ok(Self(value))
    }
}

/// Map a body rejection to a validation error, naming the field when serde
/// reported where deserialization failed.
fn json_rejection(rejection: JsonRejection) -> ApiError {
    let message = rejection.body_text();
    let field = match rejection {
        JsonRejection::JsonDataError(_) => data_error_field(&message),
        _ => None,
    };
    match field {
        Some(field) => AppError::invalid_field(field, message).into(),
        None => AppError::validation(message).into(),
    }
}

/// Top-level field of a data error such as
/// `... target type: status: unknown variant ...` or
/// `... target type: missing field `title` ...`.
fn data_error_field(message: &str) -> Option<String> {
    let detail = message
        .split_once("target type: ")
        .map_or(message, |(_, detail)| detail);
    if let Some(rest) = detail.strip_prefix("missing field `") {
        return rest.split('`').next().map(camel_case);
    }
    let (path, _) = detail.split_once(": ")?;
    let head = path.split(['.', '[']).next()?;
    if head.is_empty() || head.contains(char::is_whitespace) {
        return None;
    }
    Some(camel_case(head))
}

/// Collapse validator output into one field error, picking the
/// alphabetically first field so responses are stable.
fn first_field_error(errors: ValidationErrors) -> ApiError {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    let Some((field, errs)) = fields.into_iter().next() else {
        return AppError::validation("Invalid request body").into();
    };
    let field = camel_case(&field);
    let message = errs
        .iter()
        .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| format!("Invalid value for {field}"));
    AppError::invalid_field(field, message).into()
}

fn camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = false;
    for c in name.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}
