use crate::error::{ConstraintParser, StoreError};
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};

/// Utility for converting Diesel errors into tagged `StoreError` values.
///
/// Classification relies on the driver's `DatabaseErrorKind`. Message text is
/// consulted only to fill in entity/field details, or as a last resort for
/// errors the driver reports as `Unknown`.
pub struct DatabaseErrorConverter;

impl DatabaseErrorConverter {
    /// Converts a Diesel error to a `StoreError`.
    ///
    /// # Arguments
    /// * `error` - The Diesel error to convert
    /// * `operation` - Description of the database operation that failed
    pub fn convert_diesel_error(error: DieselError, operation: &str) -> StoreError {
        match error {
            DieselError::DatabaseError(kind, info) => {
                Self::convert_database_error(kind, info, operation)
            }
            other => StoreError::query(operation, other),
        }
    }

    fn convert_database_error(
        kind: DatabaseErrorKind,
        info: Box<dyn DatabaseErrorInformation + Send + Sync>,
        operation: &str,
    ) -> StoreError {
        let text = Self::full_message(info.as_ref());
        let constraint_name = info.constraint_name();

        match kind {
            DatabaseErrorKind::UniqueViolation => Self::unique_violation(&text, constraint_name),
            DatabaseErrorKind::Unknown if ConstraintParser::looks_like_unique_violation(&text) => {
                Self::unique_violation(&text, constraint_name)
            }
            DatabaseErrorKind::ForeignKeyViolation => {
                match ConstraintParser::parse_foreign_key_violation(&text, constraint_name) {
                    Some(parsed) => StoreError::ForeignKeyViolation {
                        entity: parsed.entity,
                        field: parsed.field,
                    },
                    None => StoreError::ForeignKeyViolation {
                        entity: "resource".to_string(),
                        field: "unknown".to_string(),
                    },
                }
            }
            _ => StoreError::query(
                operation,
                anyhow::Error::msg(format!("Database error: {}", text)),
            ),
        }
    }

    fn unique_violation(text: &str, constraint_name: Option<&str>) -> StoreError {
        match ConstraintParser::parse_unique_violation(text, constraint_name) {
            Some(parsed) => StoreError::UniqueViolation {
                entity: parsed.entity,
                field: parsed.field,
                value: parsed.value,
            },
            None => StoreError::UniqueViolation {
                entity: "resource".to_string(),
                field: "unknown".to_string(),
                value: None,
            },
        }
    }

    /// Joins the primary message with the DETAIL line, where PostgreSQL puts
    /// the "Key (field)=(value)" fragment.
    fn full_message(info: &(dyn DatabaseErrorInformation + Send + Sync)) -> String {
        match info.details() {
            Some(details) => format!("{}\nDETAIL: {}", info.message(), details),
            None => info.message().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    // Mock database error information for testing
    struct MockDatabaseErrorInfo {
        message: String,
        details: Option<String>,
        constraint_name: Option<String>,
    }

    impl DatabaseErrorInformation for MockDatabaseErrorInfo {
        fn message(&self) -> &str {
            &self.message
        }

        fn details(&self) -> Option<&str> {
            self.details.as_deref()
        }

        fn hint(&self) -> Option<&str> {
            None
        }

        fn table_name(&self) -> Option<&str> {
            None
        }

        fn column_name(&self) -> Option<&str> {
            None
        }

        fn constraint_name(&self) -> Option<&str> {
            self.constraint_name.as_deref()
        }

        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    fn db_error(
        kind: DatabaseErrorKind,
        message: &str,
        details: Option<&str>,
        constraint_name: Option<&str>,
    ) -> DieselError {
        DieselError::DatabaseError(
            kind,
            Box::new(MockDatabaseErrorInfo {
                message: message.to_string(),
                details: details.map(str::to_string),
                constraint_name: constraint_name.map(str::to_string),
            }),
        )
    }

    #[test]
    fn test_convert_unique_violation_with_constraint_name() {
        let error = db_error(
            DatabaseErrorKind::UniqueViolation,
            "duplicate key value violates unique constraint \"players_username_key\"",
            Some("Key (username)=(ann) already exists."),
            Some("players_username_key"),
        );

        match DatabaseErrorConverter::convert_diesel_error(error, "insert player") {
            StoreError::UniqueViolation {
                entity,
                field,
                value,
            } => {
                assert_eq!(entity, "players");
                assert_eq!(field, "username");
                assert_eq!(value.as_deref(), Some("ann"));
            }
            other => panic!("Expected UniqueViolation, got: {:?}", other),
        }
    }

    #[test]
    fn test_convert_unique_violation_without_details_is_still_tagged() {
        let error = db_error(
            DatabaseErrorKind::UniqueViolation,
            "some proxy rewrote this message",
            None,
            None,
        );

        let result = DatabaseErrorConverter::convert_diesel_error(error, "insert player");
        assert!(result.is_unique_violation());
    }

    #[test]
    fn test_convert_untagged_duplicate_key_message() {
        let error = db_error(
            DatabaseErrorKind::Unknown,
            "ERROR: Duplicate Key value violates unique constraint \"players_username_key\"",
            None,
            None,
        );

        let result = DatabaseErrorConverter::convert_diesel_error(error, "insert player");
        assert!(result.is_unique_violation());
    }

    #[test]
    fn test_convert_foreign_key_violation() {
        let error = db_error(
            DatabaseErrorKind::ForeignKeyViolation,
            "insert or update on table \"planets\" violates foreign key constraint \"planets_player_id_fkey\"",
            Some("Key (player_id)=(7f0c3b9e-0000-4000-8000-000000000000) is not present in table \"players\"."),
            Some("planets_player_id_fkey"),
        );

        match DatabaseErrorConverter::convert_diesel_error(error, "insert planet") {
            StoreError::ForeignKeyViolation { entity, field } => {
                assert_eq!(entity, "planets");
                assert_eq!(field, "player_id");
            }
            other => panic!("Expected ForeignKeyViolation, got: {:?}", other),
        }
    }

    #[test]
    fn test_convert_other_database_error_is_query_failure() {
        let error = db_error(
            DatabaseErrorKind::SerializationFailure,
            "could not serialize access due to concurrent update",
            None,
            None,
        );

        match DatabaseErrorConverter::convert_diesel_error(error, "commit transaction") {
            StoreError::Query { operation, .. } => assert_eq!(operation, "commit transaction"),
            other => panic!("Expected Query error, got: {:?}", other),
        }
    }

    #[test]
    fn test_convert_not_found_is_query_failure() {
        let result = DatabaseErrorConverter::convert_diesel_error(DieselError::NotFound, "load");
        assert!(matches!(result, StoreError::Query { .. }));
    }
}
