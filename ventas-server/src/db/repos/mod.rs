//! Repository implementations for database access
//!
//! Each repository follows these patterns:
//! - Handles duplicates via ON CONFLICT upserts (no check-then-insert)
//! - Uses transactions for multi-step operations
//! - Maps rows to typed records explicitly; UUIDs, timestamps, and JSON
//!   blobs live in TEXT columns and are decoded here

use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::any::AnyRow;
use sqlx::Row;
use uuid::Uuid;

pub mod clients;
pub mod conversations;
pub mod leads;
pub mod messages;
pub mod orders;
pub mod products;
pub mod users;

pub use clients::{Client, ClientRepo};
pub use conversations::{Conversation, ConversationRepo};
pub use leads::{Lead, LeadRepo};
pub use messages::{Message, MessageRepo};
pub use orders::{Order, OrderRepo};
pub use products::{Product, ProductRepo};
pub use users::{ClientUser, UserRepo};

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(sqlx::Error),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    #[error("conflict: {detail}")]
    Conflict { detail: String },

    #[error("corrupt value in column '{column}': {reason}")]
    Decode { column: &'static str, reason: String },
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            // Losing a race on a unique constraint is a client-visible
            // conflict, not an internal failure.
            sqlx::Error::Database(db) if db.is_unique_violation() => Self::Conflict {
                detail: db.message().to_owned(),
            },
            _ => Self::Sqlx(err),
        }
    }
}

/// Current time in the fixed-width RFC 3339 form stored in TEXT columns.
///
/// Microsecond precision with a `Z` suffix keeps lexical and chronological
/// order identical, which the message listing relies on.
pub(crate) fn now_utc() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Decode a UUID stored as TEXT.
pub(crate) fn get_uuid(row: &AnyRow, column: &'static str) -> Result<Uuid, DbError> {
    let raw: String = row.try_get(column).map_err(DbError::from)?;
    Uuid::parse_str(&raw).map_err(|err| DbError::Decode {
        column,
        reason: err.to_string(),
    })
}

/// Decode a nullable UUID stored as TEXT.
pub(crate) fn get_opt_uuid(row: &AnyRow, column: &'static str) -> Result<Option<Uuid>, DbError> {
    let raw: Option<String> = row.try_get(column).map_err(DbError::from)?;
    raw.map(|value| {
        Uuid::parse_str(&value).map_err(|err| DbError::Decode {
            column,
            reason: err.to_string(),
        })
    })
    .transpose()
}

/// Decode an RFC 3339 timestamp stored as TEXT.
pub(crate) fn get_timestamp(row: &AnyRow, column: &'static str) -> Result<DateTime<Utc>, DbError> {
    let raw: String = row.try_get(column).map_err(DbError::from)?;
    parse_timestamp(column, &raw)
}

/// Decode a nullable RFC 3339 timestamp stored as TEXT.
pub(crate) fn get_opt_timestamp(
    row: &AnyRow,
    column: &'static str,
) -> Result<Option<DateTime<Utc>>, DbError> {
    let raw: Option<String> = row.try_get(column).map_err(DbError::from)?;
    raw.map(|value| parse_timestamp(column, &value)).transpose()
}

/// Decode a JSON blob stored as TEXT.
pub(crate) fn get_json(
    row: &AnyRow,
    column: &'static str,
) -> Result<Option<serde_json::Value>, DbError> {
    let raw: Option<String> = row.try_get(column).map_err(DbError::from)?;
    raw.map(|value| {
        serde_json::from_str(&value).map_err(|err| DbError::Decode {
            column,
            reason: err.to_string(),
        })
    })
    .transpose()
}

fn parse_timestamp(column: &'static str, raw: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|err| DbError::Decode {
            column,
            reason: err.to_string(),
        })
}
