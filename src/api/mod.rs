//! API layer - HTTP handlers and middleware
//!
//! Everything transport-specific lives here: handlers, authentication
//! middleware, extractors and the router.

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use routes::create_router;
pub use state::AppState;
