//! HTTP surface: router, handlers, errors and request validation.

pub mod errors;
pub mod handlers;
pub mod server;
pub mod validation;

pub use errors::{ApiError, ApiResult};
pub use server::{create_router, AppState};
