//! Client (tenant) repository
//!
//! The tenant row is resolved-or-created on demand; concurrent creation
//! races are settled by the unique name constraint plus an upsert.

use chrono::{DateTime, Utc};
use sqlx::any::AnyRow;
use sqlx::AnyPool;
use uuid::Uuid;

use super::{get_json, get_timestamp, get_uuid, now_utc, DbError};

/// Client record from database
#[derive(Debug, Clone)]
pub struct Client {
    pub client_id: Uuid,
    pub name: String,
    pub industry: Option<String>,
    pub config: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Client {
    fn from_row(row: &AnyRow) -> Result<Self, DbError> {
        use sqlx::Row;

        Ok(Self {
            client_id: get_uuid(row, "client_id")?,
            name: row.try_get("name").map_err(DbError::from)?,
            industry: row.try_get("industry").map_err(DbError::from)?,
            config: get_json(row, "config")?,
            created_at: get_timestamp(row, "created_at")?,
            updated_at: get_timestamp(row, "updated_at")?,
        })
    }
}

/// Client repository
pub struct ClientRepo<'a> {
    pool: &'a AnyPool,
}

impl<'a> ClientRepo<'a> {
    pub fn new(pool: &'a AnyPool) -> Self {
        Self { pool }
    }

    /// Get-or-create the client with this name (idempotent).
    ///
    /// A concurrent loser of the insert race lands on the DO UPDATE arm
    /// and gets the winner's row back.
    pub async fn ensure(&self, name: &str) -> Result<Client, DbError> {
        let row = sqlx::query(
            r#"
            INSERT INTO clients (client_id, name, password_hash, created_at, updated_at)
            VALUES ($1, $2, '', $3, $3)
            ON CONFLICT (name) DO UPDATE SET name = excluded.name
            RETURNING client_id, name, industry, config, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(name)
        .bind(now_utc())
        .fetch_one(self.pool)
        .await?;

        Client::from_row(&row)
    }

    /// Look up a client by its unique name.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<Client>, DbError> {
        let row = sqlx::query(
            r#"
            SELECT client_id, name, industry, config, created_at, updated_at
            FROM clients
            WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(self.pool)
        .await?;

        row.as_ref().map(Client::from_row).transpose()
    }
}
