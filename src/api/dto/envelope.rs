//! Uniform response envelope shared by every endpoint.

use serde::Serialize;
use utoipa::ToSchema;

use crate::error::AppError;

/// Envelope wrapping every JSON response body.
///
/// Exactly one of `data` and `error` is non-null; both are always present
/// in the serialized form.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub data: Option<T>,
    pub error: Option<ErrorBody>,
    pub success: bool,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
            success: true,
        }
    }
}

impl ApiResponse<()> {
    pub fn failure(error: ErrorBody) -> Self {
        Self {
            data: None,
            error: Some(error),
            success: false,
        }
    }
}

/// Error payload carried by a failed response.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[schema(example = json!({
    "code": "NOT_FOUND",
    "message": "player not found",
    "details": "player with given ID does not exist"
}))]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorBody {
    /// Creates a new error body with code and message.
    pub fn new(code: &str, message: &str) -> Self {
        Self {
            code: code.to_string(),
            message: message.to_string(),
            details: None,
        }
    }

    /// Adds details to the error body.
    pub fn with_details(mut self, details: &str) -> Self {
        self.details = Some(details.to_string());
        self
    }
}

impl From<&AppError> for ErrorBody {
    fn from(error: &AppError) -> Self {
        Self {
            code: error.code().to_string(),
            message: error.public_message(),
            details: error.details().map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_envelope_shape() {
        let value = serde_json::to_value(ApiResponse::success(vec![1, 2])).unwrap();
        assert_eq!(
            value,
            json!({"data": [1, 2], "error": null, "success": true})
        );
    }

    #[test]
    fn test_failure_envelope_omits_missing_details() {
        let body = ErrorBody::new("INTERNAL_ERROR", "failed to retrieve players");
        let value = serde_json::to_value(ApiResponse::failure(body)).unwrap();
        assert_eq!(
            value,
            json!({
                "data": null,
                "error": {"code": "INTERNAL_ERROR", "message": "failed to retrieve players"},
                "success": false
            })
        );
    }

    #[test]
    fn test_error_body_from_app_error() {
        let error = AppError::already_exists("player", "player with this username already exists");
        let body = ErrorBody::from(&error);
        assert_eq!(body.code, "ALREADY_EXISTS");
        assert_eq!(body.message, "player already exists");
        assert_eq!(
            body.details.as_deref(),
            Some("player with this username already exists")
        );
    }
}
