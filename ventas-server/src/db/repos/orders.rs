//! Order repository
//!
//! Placing an order reads the product price and writes the order in one
//! transaction so the stored total always reflects the price at order
//! time.

use chrono::{DateTime, Utc};
use sqlx::any::AnyRow;
use sqlx::{AnyPool, Row};
use uuid::Uuid;

use crate::models::OrderStatus;

use super::{get_timestamp, get_uuid, now_utc, DbError};

/// Order record from database
#[derive(Debug, Clone)]
pub struct Order {
    pub order_id: Uuid,
    pub client_id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i64,
    pub status: OrderStatus,
    pub total: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const ORDER_COLUMNS: &str =
    "order_id, client_id, user_id, product_id, quantity, status, total, created_at, updated_at";

impl Order {
    fn from_row(row: &AnyRow) -> Result<Self, DbError> {
        let status: String = row.try_get("status").map_err(DbError::from)?;

        Ok(Self {
            order_id: get_uuid(row, "order_id")?,
            client_id: get_uuid(row, "client_id")?,
            user_id: get_uuid(row, "user_id")?,
            product_id: get_uuid(row, "product_id")?,
            quantity: row.try_get("quantity").map_err(DbError::from)?,
            status: OrderStatus::parse(&status).map_err(|err| DbError::Decode {
                column: "status",
                reason: err.to_string(),
            })?,
            total: row.try_get("total").map_err(DbError::from)?,
            created_at: get_timestamp(row, "created_at")?,
            updated_at: get_timestamp(row, "updated_at")?,
        })
    }
}

/// Order repository
pub struct OrderRepo<'a> {
    pool: &'a AnyPool,
}

impl<'a> OrderRepo<'a> {
    pub fn new(pool: &'a AnyPool) -> Self {
        Self { pool }
    }

    /// Place an order for `quantity` units of a product.
    pub async fn place(
        &self,
        client_id: Uuid,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i64,
    ) -> Result<Order, DbError> {
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

        let mut tx = self.pool.begin().await?;

        let product_row =
            sqlx::query("SELECT price FROM products WHERE product_id = $1 AND client_id = $2")
                .bind(product_id.to_string())
                .bind(client_id.to_string())
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| DbError::NotFound {
                    resource: "product",
                    id: product_id.to_string(),
                })?;
        let price: f64 = product_row.try_get("price").map_err(DbError::from)?;

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO orders
                (order_id, client_id, user_id, product_id, quantity, status, total,
                 created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, 'pending', $6, $7, $7)
            RETURNING {ORDER_COLUMNS}
            "#,
        ))
        .bind(Uuid::new_v4().to_string())
        .bind(client_id.to_string())
        .bind(user_id.to_string())
        .bind(product_id.to_string())
        .bind(quantity)
        .bind(price * quantity as f64)
        .bind(now_utc())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Order::from_row(&row)
    }

    /// Transition an order's status.
    pub async fn set_status(&self, order_id: Uuid, status: OrderStatus) -> Result<Order, DbError> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE orders
            SET status = $2, updated_at = $3
            WHERE order_id = $1
            RETURNING {ORDER_COLUMNS}
            "#,
        ))
        .bind(order_id.to_string())
        .bind(status.as_str())
        .bind(now_utc())
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::NotFound {
            resource: "order",
            id: order_id.to_string(),
        })?;

        Order::from_row(&row)
    }

    /// Get an order by id.
    pub async fn get(&self, order_id: Uuid) -> Result<Order, DbError> {
        let row = sqlx::query(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE order_id = $1",
        ))
        .bind(order_id.to_string())
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::NotFound {
            resource: "order",
            id: order_id.to_string(),
        })?;

        Order::from_row(&row)
    }
}
