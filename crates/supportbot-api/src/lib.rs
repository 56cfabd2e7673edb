//! Support bot API crate - axum HTTP server and route handlers.
//!
//! Serves the embedded chat page, the chat and FAQ endpoints used by it,
//! and a health check.

pub mod error;
pub mod handlers;
pub mod page;
pub mod rate_limit;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::{create_router, start_server};
pub use state::AppState;
