//! JSON body extraction with `validator` rules applied after parsing.

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::AppError;

/// JSON body extractor that runs the body's `Validate` derive.
///
/// An empty body is parsed as `{}` so missing fields surface as the
/// `required` messages rather than parse errors.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|err| AppError::BadRequest(err.body_text()))?;

        let body: &[u8] = if bytes.iter().all(u8::is_ascii_whitespace) {
            b"{}"
        } else {
            &bytes
        };

        let payload: T = serde_json::from_slice(body)
            .map_err(|err| AppError::BadRequest(format!("Invalid request body: {err}")))?;
        payload.validate()?;

        Ok(ValidatedJson(payload))
    }
}

/// Unwraps a field the `required` rule has already checked.
pub fn required<T>(value: Option<T>, field: &str) -> Result<T, AppError> {
    value.ok_or_else(|| AppError::BadRequest(format!("The {field} field is required.")))
}
