//! HTTP adapter: axum router, handlers and wire DTOs.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::AppState;
pub use routes::api_routes;
