//! Error taxonomy of the form service and its mapping onto HTTP responses.
//!
//! Every handler returns `Result<HttpResponse, FormError>`; actix turns the
//! error side into a JSON body through the `ResponseError` impl below:
//!
//! ```json
//! { "kind": "validation", "message": "...", "fields": [{ "field_id": "...", "message": "..." }] }
//! ```
//!
//! Caller-input errors (not found, bad request, validation) are final for the
//! request. Storage failures are logged here and reported with a generic body.

use crate::store::StoreError;
use crate::validation::{FieldError, ValidationErrors};
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};
use log::error;
use serde::Serialize;
use thiserror::Error;

/// JSON extractor settings shared by the server and its tests: bodies that do
/// not parse become a `bad_request` error body instead of actix's plain text.
pub fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(|err, _req| FormError::BadRequest(err.to_string()).into())
}

#[derive(Debug, Error)]
pub enum FormError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),
    #[error("invalid response for field {field_id}")]
    InvalidResponse { field_id: String },
    /// No caller identity was attached to the request.
    #[error("missing caller identity")]
    Unauthenticated,
    /// The caller is known but does not own the target form.
    #[error("caller does not own this form")]
    Unauthorized,
    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl FormError {
    pub fn kind(&self) -> &'static str {
        match self {
            FormError::NotFound(_) => "not_found",
            FormError::BadRequest(_) => "bad_request",
            FormError::Validation(_) => "validation",
            FormError::InvalidResponse { .. } => "invalid_response",
            FormError::Unauthenticated => "unauthenticated",
            FormError::Unauthorized => "unauthorized",
            FormError::Storage(StoreError::Conflict(_)) => "conflict",
            FormError::Storage(_) => "storage",
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    kind: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    field_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<&'a [FieldError]>,
}

impl ResponseError for FormError {
    fn status_code(&self) -> StatusCode {
        match self {
            FormError::NotFound(_) => StatusCode::NOT_FOUND,
            FormError::BadRequest(_)
            | FormError::Validation(_)
            | FormError::InvalidResponse { .. } => StatusCode::BAD_REQUEST,
            FormError::Unauthenticated => StatusCode::UNAUTHORIZED,
            FormError::Unauthorized => StatusCode::FORBIDDEN,
            FormError::Storage(StoreError::Conflict(_)) => StatusCode::CONFLICT,
            FormError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            FormError::Storage(StoreError::Conflict(_)) => self.to_string(),
            FormError::Storage(err) => {
                error!("storage failure: {}", err);
                "Internal storage error".to_string()
            }
            other => other.to_string(),
        };
        let (field_id, fields) = match self {
            FormError::InvalidResponse { field_id } => (Some(field_id.as_str()), None),
            FormError::Validation(errors) => (None, Some(errors.as_slice())),
            _ => (None, None),
        };
        HttpResponse::build(self.status_code()).json(ErrorBody {
            kind: self.kind(),
            message,
            field_id,
            fields,
        })
    }
}
