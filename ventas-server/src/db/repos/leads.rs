//! Lead repository

use chrono::{DateTime, Utc};
use sqlx::any::AnyRow;
use sqlx::{AnyPool, Row};
use uuid::Uuid;

use crate::models::{LeadStatus, Paginated, Pagination};

use super::{get_opt_uuid, get_timestamp, get_uuid, now_utc, DbError};

/// Lead record from database
#[derive(Debug, Clone)]
pub struct Lead {
    pub lead_id: Uuid,
    pub client_id: Uuid,
    pub user_id: Uuid,
    pub conversation_id: Option<Uuid>,
    pub status: LeadStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const LEAD_COLUMNS: &str =
    "lead_id, client_id, user_id, conversation_id, status, created_at, updated_at";

impl Lead {
    fn from_row(row: &AnyRow) -> Result<Self, DbError> {
        let status: String = row.try_get("status").map_err(DbError::from)?;

        Ok(Self {
            lead_id: get_uuid(row, "lead_id")?,
            client_id: get_uuid(row, "client_id")?,
            user_id: get_uuid(row, "user_id")?,
            conversation_id: get_opt_uuid(row, "conversation_id")?,
            status: LeadStatus::parse(&status).map_err(|err| DbError::Decode {
                column: "status",
                reason: err.to_string(),
            })?,
            created_at: get_timestamp(row, "created_at")?,
            updated_at: get_timestamp(row, "updated_at")?,
        })
    }
}

/// Lead repository
pub struct LeadRepo<'a> {
    pool: &'a AnyPool,
}

impl<'a> LeadRepo<'a> {
    pub fn new(pool: &'a AnyPool) -> Self {
        Self { pool }
    }

    /// Open a lead for a user, optionally tied to the conversation it
    /// came out of.
    pub async fn create(
        &self,
        client_id: Uuid,
        user_id: Uuid,
        conversation_id: Option<Uuid>,
    ) -> Result<Lead, DbError> {
        let user_row =
            sqlx::query("SELECT user_id FROM client_users WHERE user_id = $1 AND client_id = $2")
                .bind(user_id.to_string())
                .bind(client_id.to_string())
                .fetch_optional(self.pool)
                .await?;
        if user_row.is_none() {
            return Err(DbError::NotFound {
                resource: "user",
                id: user_id.to_string(),
            });
        }

        if let Some(conversation_id) = conversation_id {
            let conversation_row = sqlx::query(
                "SELECT conversation_id FROM conversations WHERE conversation_id = $1 AND client_id = $2",
            )
            .bind(conversation_id.to_string())
            .bind(client_id.to_string())
            .fetch_optional(self.pool)
            .await?;
            if conversation_row.is_none() {
                return Err(DbError::NotFound {
                    resource: "conversation",
                    id: conversation_id.to_string(),
                });
            }
        }

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO leads (lead_id, client_id, user_id, conversation_id, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, 'new', $5, $5)
            RETURNING {LEAD_COLUMNS}
            "#,
        ))
        .bind(Uuid::new_v4().to_string())
        .bind(client_id.to_string())
        .bind(user_id.to_string())
        .bind(conversation_id.map(|id| id.to_string()))
        .bind(now_utc())
        .fetch_one(self.pool)
        .await?;

        Lead::from_row(&row)
    }

    /// Transition a lead's status.
    pub async fn set_status(&self, lead_id: Uuid, status: LeadStatus) -> Result<Lead, DbError> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE leads
            SET status = $2, updated_at = $3
            WHERE lead_id = $1
            RETURNING {LEAD_COLUMNS}
            "#,
        ))
        .bind(lead_id.to_string())
        .bind(status.as_str())
        .bind(now_utc())
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::NotFound {
            resource: "lead",
            id: lead_id.to_string(),
        })?;

        Lead::from_row(&row)
    }

    /// List a tenant's leads, newest first.
    pub async fn list_for_client(
        &self,
        client_id: Uuid,
        page: Pagination,
    ) -> Result<Paginated<Lead>, DbError> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {LEAD_COLUMNS}, COUNT(*) OVER() AS total
            FROM leads
            WHERE client_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        ))
        .bind(client_id.to_string())
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(self.pool)
        .await?;

        let total = rows
            .first()
            .map(|r| r.try_get::<i64, _>("total"))
            .transpose()
            .map_err(DbError::from)?
            .unwrap_or(0);
        let items = rows
            .iter()
            .map(Lead::from_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Paginated {
            items,
            total,
            page: page.page,
            per_page: page.per_page,
        })
    }
}
