use thiserror::Error;

/// Application-wide error taxonomy.
///
/// Each variant maps to a stable machine-readable code (see [`AppError::code`]).
/// The wrapped `source` of an internal error is for server-side logging only
/// and is never part of a response body.
#[derive(Error, Debug)]
pub enum AppError {
    /// Requested resource does not exist
    #[error("{entity} not found")]
    NotFound {
        entity: String,
        details: Option<String>,
    },

    /// Resource conflicts with an existing one (unique constraint)
    #[error("{entity} already exists")]
    AlreadyExists {
        entity: String,
        details: Option<String>,
    },

    /// Request shape or field validation failed at the boundary
    #[error("Invalid input: {message}")]
    InvalidInput {
        message: String,
        details: Option<String>,
    },

    /// Authentication required
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    /// Authenticated but not allowed
    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    /// Internal error for unexpected failures
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl AppError {
    pub fn not_found(entity: impl Into<String>, details: impl Into<String>) -> Self {
        AppError::NotFound {
            entity: entity.into(),
            details: Some(details.into()),
        }
    }

    pub fn already_exists(entity: impl Into<String>, details: impl Into<String>) -> Self {
        AppError::AlreadyExists {
            entity: entity.into(),
            details: Some(details.into()),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        AppError::InvalidInput {
            message: message.into(),
            details: None,
        }
    }

    pub fn internal(message: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        AppError::Internal {
            message: message.into(),
            source: source.into(),
        }
    }

    /// Attaches details to variants that carry them; no-op otherwise.
    pub fn with_details(mut self, value: impl Into<String>) -> Self {
        match &mut self {
            AppError::NotFound { details, .. }
            | AppError::AlreadyExists { details, .. }
            | AppError::InvalidInput { details, .. } => *details = Some(value.into()),
            _ => {}
        }
        self
    }

    /// Machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound { .. } => "NOT_FOUND",
            AppError::AlreadyExists { .. } => "ALREADY_EXISTS",
            AppError::InvalidInput { .. } => "INVALID_INPUT",
            AppError::Unauthorized { .. } => "UNAUTHORIZED",
            AppError::Forbidden { .. } => "FORBIDDEN",
            AppError::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// Human-readable message that is safe to send to clients.
    pub fn public_message(&self) -> String {
        match self {
            AppError::NotFound { entity, .. } => format!("{} not found", entity),
            AppError::AlreadyExists { entity, .. } => format!("{} already exists", entity),
            AppError::InvalidInput { message, .. }
            | AppError::Unauthorized { message }
            | AppError::Forbidden { message }
            | AppError::Internal { message, .. } => message.clone(),
        }
    }

    pub fn details(&self) -> Option<&str> {
        match self {
            AppError::NotFound { details, .. }
            | AppError::AlreadyExists { details, .. }
            | AppError::InvalidInput { details, .. } => details.as_deref(),
            _ => None,
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        AppError::internal("An unexpected error occurred", error)
    }
}

impl From<crate::config::error::ConfigError> for AppError {
    fn from(error: crate::config::error::ConfigError) -> Self {
        AppError::internal("Invalid configuration", error)
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<(String, String)> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |err| {
                    let message = err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{} is invalid", field));
                    (field.to_string(), message)
                })
            })
            .collect();
        messages.sort();

        let message = messages
            .first()
            .map(|(_, message)| message.clone())
            .unwrap_or_else(|| "request validation failed".to_string());
        // A single failure is fully described by the message
        let details = (messages.len() > 1).then(|| {
            messages
                .iter()
                .map(|(field, message)| format!("{}: {}", field, message))
                .collect::<Vec<_>>()
                .join("; ")
        });

        AppError::InvalidInput { message, details }
    }
}

/// Type alias for Result with AppError to simplify function signatures
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use validator::{ValidationError, ValidationErrors};

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(AppError::not_found("player", "x").code(), "NOT_FOUND");
        assert_eq!(AppError::already_exists("player", "x").code(), "ALREADY_EXISTS");
        assert_eq!(AppError::invalid_input("bad").code(), "INVALID_INPUT");
        assert_eq!(
            AppError::Unauthorized {
                message: "no token".to_string()
            }
            .code(),
            "UNAUTHORIZED"
        );
        assert_eq!(
            AppError::Forbidden {
                message: "nope".to_string()
            }
            .code(),
            "FORBIDDEN"
        );
        assert_eq!(
            AppError::internal("boom", anyhow::anyhow!("db down")).code(),
            "INTERNAL_ERROR"
        );
    }

    #[test]
    fn test_public_message_hides_internal_cause() {
        let error = AppError::internal("failed to retrieve players", anyhow::anyhow!("password=hunter2"));
        assert_eq!(error.public_message(), "failed to retrieve players");
        assert!(error.details().is_none());
        assert!(!error.public_message().contains("hunter2"));
    }

    #[test]
    fn test_not_found_message_and_details() {
        let error = AppError::not_found("player", "player with given ID does not exist");
        assert_eq!(error.public_message(), "player not found");
        assert_eq!(error.details(), Some("player with given ID does not exist"));
    }

    #[test]
    fn test_with_details_on_invalid_input() {
        let error = AppError::invalid_input("invalid player id").with_details("not a uuid");
        assert_eq!(error.details(), Some("not a uuid"));
    }

    #[test]
    fn test_validation_errors_conversion_is_sorted() {
        let mut errors = ValidationErrors::new();
        errors.add(
            "username",
            ValidationError::new("length").with_message("username must be at least 3 characters".into()),
        );
        errors.add(
            "planet_name",
            ValidationError::new("required").with_message("planet name is required".into()),
        );

        let error = AppError::from(errors);
        assert_eq!(error.code(), "INVALID_INPUT");
        assert_eq!(error.public_message(), "planet name is required");
        assert_eq!(
            error.details(),
            Some("planet_name: planet name is required; username: username must be at least 3 characters")
        );
    }

    #[test]
    fn test_single_validation_error_has_no_details() {
        let mut errors = ValidationErrors::new();
        errors.add(
            "__all__",
            ValidationError::new("required").with_message("username is required".into()),
        );

        let error = AppError::from(errors);
        assert_eq!(error.public_message(), "username is required");
        assert!(error.details().is_none());
    }
}
