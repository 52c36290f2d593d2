//! # ts-api
//!
//! HTTP layer for Timesheet RS: axum handlers, authentication extractors,
//! API error mapping, and the route tree.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod routes;

pub use error::{ApiError, ApiResult};
pub use extractors::AppState;
pub use routes::router;
