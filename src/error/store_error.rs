use thiserror::Error;

/// Failure reported by a store adapter.
///
/// Uniqueness conflicts are tagged explicitly so the repository can classify
/// them without inspecting driver messages.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A unique constraint rejected the write
    #[error("Unique constraint violation: {entity}.{field}")]
    UniqueViolation {
        entity: String,
        field: String,
        value: Option<String>,
    },

    /// A foreign key rejected the write
    #[error("Foreign key violation: {entity}.{field}")]
    ForeignKeyViolation { entity: String, field: String },

    /// No connection could be obtained from the pool
    #[error("Store connection unavailable")]
    Connection {
        #[source]
        source: anyhow::Error,
    },

    /// Any other failure while running a statement
    #[error("Store operation failed: {operation}")]
    Query {
        operation: String,
        #[source]
        source: anyhow::Error,
    },
}

impl StoreError {
    pub fn query(operation: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        StoreError::Query {
            operation: operation.into(),
            source: source.into(),
        }
    }

    pub fn is_unique_violation(&self) -> bool {
        matches!(self, StoreError::UniqueViolation { .. })
    }
}

impl From<diesel_async::pooled_connection::bb8::RunError> for StoreError {
    fn from(error: diesel_async::pooled_connection::bb8::RunError) -> Self {
        StoreError::Connection {
            source: anyhow::Error::from(error),
        }
    }
}

/// Type alias for store adapter results
pub type StoreResult<T> = Result<T, StoreError>;
