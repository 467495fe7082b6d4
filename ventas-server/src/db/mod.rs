//! Database access: pool construction, schema bootstrap, repositories

pub mod migrations;
pub mod pool;
pub mod repos;

pub use pool::{connect, create_pool, create_pool_with_options};
