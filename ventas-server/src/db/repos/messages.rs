//! Message repository
//!
//! Appends are transactional: the message insert and the owning
//! conversation's timestamp refresh commit together.

use chrono::{DateTime, Utc};
use sqlx::any::AnyRow;
use sqlx::{AnyPool, Row};
use uuid::Uuid;

use crate::models::{MessageDirection, MessageSender, Paginated, Pagination};

use super::{get_timestamp, get_uuid, now_utc, DbError};

/// Message record from database
#[derive(Debug, Clone)]
pub struct Message {
    pub message_id: Uuid,
    pub conversation_id: Uuid,
    pub client_id: Uuid,
    pub sender: MessageSender,
    pub direction: MessageDirection,
    pub content: Option<String>,
    pub content_type: Option<String>,
    pub timestamp: DateTime<Utc>,
}

const MESSAGE_COLUMNS: &str =
    "message_id, conversation_id, client_id, sender, direction, content, content_type, timestamp";

impl Message {
    fn from_row(row: &AnyRow) -> Result<Self, DbError> {
        let sender: String = row.try_get("sender").map_err(DbError::from)?;
        let direction: String = row.try_get("direction").map_err(DbError::from)?;

        Ok(Self {
            message_id: get_uuid(row, "message_id")?,
            conversation_id: get_uuid(row, "conversation_id")?,
            client_id: get_uuid(row, "client_id")?,
            sender: MessageSender::parse(&sender).map_err(|err| DbError::Decode {
                column: "sender",
                reason: err.to_string(),
            })?,
            direction: MessageDirection::parse(&direction).map_err(|err| DbError::Decode {
                column: "direction",
                reason: err.to_string(),
            })?,
            content: row.try_get("content").map_err(DbError::from)?,
            content_type: row.try_get("content_type").map_err(DbError::from)?,
            timestamp: get_timestamp(row, "timestamp")?,
        })
    }
}

/// Message repository
pub struct MessageRepo<'a> {
    pool: &'a AnyPool,
}

impl<'a> MessageRepo<'a> {
    pub fn new(pool: &'a AnyPool) -> Self {
        Self { pool }
    }

    /// Append a message to a conversation.
    ///
    /// The owning client is read off the conversation row, so a message
    /// can never land under a different tenant than its conversation.
    pub async fn append(
        &self,
        conversation_id: Uuid,
        sender: MessageSender,
        direction: MessageDirection,
        content: Option<String>,
        content_type: Option<String>,
    ) -> Result<Message, DbError> {
        let conversation =
            sqlx::query("SELECT client_id FROM conversations WHERE conversation_id = $1")
                .bind(conversation_id.to_string())
                .fetch_optional(self.pool)
                .await?
                .ok_or_else(|| DbError::NotFound {
                    resource: "conversation",
                    id: conversation_id.to_string(),
                })?;
        let client_id: String = conversation.try_get("client_id").map_err(DbError::from)?;

        let now = now_utc();
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO messages
                (message_id, conversation_id, client_id, sender, direction,
                 content, content_type, timestamp, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
            RETURNING {MESSAGE_COLUMNS}
            "#,
        ))
        .bind(Uuid::new_v4().to_string())
        .bind(conversation_id.to_string())
        .bind(&client_id)
        .bind(sender.as_str())
        .bind(direction.as_str())
        .bind(content.as_deref())
        .bind(content_type.as_deref())
        .bind(&now)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE conversations SET updated_at = $2 WHERE conversation_id = $1")
            .bind(conversation_id.to_string())
            .bind(&now)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Message::from_row(&row)
    }

    /// List messages for a conversation, oldest first, with pagination.
    ///
    /// Uses a window function for the total count in a single query.
    pub async fn list_for_conversation(
        &self,
        conversation_id: Uuid,
        page: Pagination,
    ) -> Result<Paginated<Message>, DbError> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {MESSAGE_COLUMNS}, COUNT(*) OVER() AS total
            FROM messages
            WHERE conversation_id = $1
            ORDER BY timestamp ASC
            LIMIT $2 OFFSET $3
            "#,
        ))
        .bind(conversation_id.to_string())
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
            .map(Message::from_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Paginated {
            items,
            total,
            page: page.page,
            per_page: page.per_page,
        })
    }
}
