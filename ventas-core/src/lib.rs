//! ventas-core: shared configuration and error types for the ventas backend
//!
//! Resolves database credentials from the supported sources (secret vault,
//! environment variables, `DATABASE_URL`, local SQLite fallback) and
//! assembles the connection URL the server pools against.

pub mod config;
pub mod error;

pub use config::{CredentialSource, DbSettings, VaultClient};
pub use error::{ConfigError, Result};
