//! service-core: Shared infrastructure for the crosspost web services.
pub mod error;
pub mod middleware;
pub mod observability;

pub use axum;
pub use tracing;
