//! HTTP API module: health check and the refresh trigger.

pub mod handlers;
pub mod routes;

pub use handlers::AppState;
pub use routes::create_router;
