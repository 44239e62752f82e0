//! Middleware components for request processing.
//!
//! Request ID tracking, request logging, and the envelope-wrapping error
//! handler.

mod error_handler;
mod logging;
mod request_id;

pub use error_handler::{envelope_response, global_error_handler, not_found_fallback, status_for_code};
pub use logging::logging_middleware;
pub use request_id::{REQUEST_ID_HEADER, RequestId, request_id_middleware};
