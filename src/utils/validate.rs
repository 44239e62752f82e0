//! Extractors that decode and validate request payloads in one step.

use axum::extract::{FromRequest, Json, Request, rejection::JsonRejection};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::{AppError, AppResult};

/// JSON body extractor that runs `validator` rules after decoding.
///
/// Any decoding failure (bad syntax, wrong types, missing fields, wrong
/// content type) becomes `InvalidInput` with the message "invalid JSON format".
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> AppResult<Self> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                AppError::invalid_input("invalid JSON format").with_details(rejection.body_text())
            })?;
        value.validate()?;
        Ok(ValidatedJson(value))
    }
}
