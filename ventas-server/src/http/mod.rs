//! HTTP layer: error mapping, extractors, routes, server runner

pub mod error;
pub mod extractors;
pub mod routes;
pub mod server;

pub use error::ApiError;
pub use server::{run_server, AppState, ServerConfig, ServerError};
