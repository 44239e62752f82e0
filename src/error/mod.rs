mod app_error;
mod constraint_parser;
mod database_converter;
mod store_error;

pub use app_error::{AppError, AppResult};
pub use constraint_parser::{ConstraintParser, ParsedConstraint};
pub use database_converter::DatabaseErrorConverter;
pub use store_error::{StoreError, StoreResult};
