//! Conversation repository

use chrono::{DateTime, Utc};
use sqlx::any::AnyRow;
use sqlx::AnyPool;
use uuid::Uuid;

use crate::models::ConversationStatus;

use super::{get_opt_timestamp, get_timestamp, get_uuid, now_utc, DbError};

/// Conversation record from database
#[derive(Debug, Clone)]
pub struct Conversation {
    pub conversation_id: Uuid,
    pub client_id: Uuid,
    pub user_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub status: ConversationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const CONVERSATION_COLUMNS: &str =
    "conversation_id, client_id, user_id, started_at, ended_at, status, created_at, updated_at";

impl Conversation {
    fn from_row(row: &AnyRow) -> Result<Self, DbError> {
        use sqlx::Row;

        let status: String = row.try_get("status").map_err(DbError::from)?;
        Ok(Self {
            conversation_id: get_uuid(row, "conversation_id")?,
            client_id: get_uuid(row, "client_id")?,
            user_id: get_uuid(row, "user_id")?,
            started_at: get_timestamp(row, "started_at")?,
            ended_at: get_opt_timestamp(row, "ended_at")?,
            status: ConversationStatus::parse(&status).map_err(|err| DbError::Decode {
                column: "status",
                reason: err.to_string(),
            })?,
            created_at: get_timestamp(row, "created_at")?,
            updated_at: get_timestamp(row, "updated_at")?,
        })
    }
}

/// Conversation repository
pub struct ConversationRepo<'a> {
    pool: &'a AnyPool,
}

impl<'a> ConversationRepo<'a> {
    pub fn new(pool: &'a AnyPool) -> Self {
        Self { pool }
    }

    /// Open a conversation for a user of this tenant.
    pub async fn create(&self, client_id: Uuid, user_id: Uuid) -> Result<Conversation, DbError> {
        // Verify the user exists and belongs to the tenant
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

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO conversations
                (conversation_id, client_id, user_id, started_at, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, 'open', $4, $4)
            RETURNING {CONVERSATION_COLUMNS}
            "#,
        ))
        .bind(Uuid::new_v4().to_string())
        .bind(client_id.to_string())
        .bind(user_id.to_string())
        .bind(now_utc())
        .fetch_one(self.pool)
        .await?;

        Conversation::from_row(&row)
    }

    /// Transition a conversation's status; closing also stamps `ended_at`.
    pub async fn set_status(
        &self,
        conversation_id: Uuid,
        status: ConversationStatus,
    ) -> Result<Conversation, DbError> {
        let now = now_utc();

        let query = if status == ConversationStatus::Closed {
            format!(
                r#"
                UPDATE conversations
                SET status = $2, ended_at = $3, updated_at = $3
                WHERE conversation_id = $1
                RETURNING {CONVERSATION_COLUMNS}
                "#,
            )
        } else {
            format!(
                r#"
                UPDATE conversations
                SET status = $2, ended_at = NULL, updated_at = $3
                WHERE conversation_id = $1
                RETURNING {CONVERSATION_COLUMNS}
                "#,
            )
        };

        let row = sqlx::query(&query)
            .bind(conversation_id.to_string())
            .bind(status.as_str())
            .bind(now)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::NotFound {
                resource: "conversation",
                id: conversation_id.to_string(),
            })?;

        Conversation::from_row(&row)
    }

    /// Get a conversation by id.
    pub async fn get(&self, conversation_id: Uuid) -> Result<Conversation, DbError> {
        let row = sqlx::query(&format!(
            "SELECT {CONVERSATION_COLUMNS} FROM conversations WHERE conversation_id = $1",
        ))
        .bind(conversation_id.to_string())
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::NotFound {
            resource: "conversation",
            id: conversation_id.to_string(),
        })?;

        Conversation::from_row(&row)
    }
}
