//! Product repository

use chrono::{DateTime, Utc};
use sqlx::any::AnyRow;
use sqlx::{AnyPool, Row};
use uuid::Uuid;

use crate::models::{Paginated, Pagination};

use super::{get_json, get_timestamp, get_uuid, now_utc, DbError};

/// Product record from database
#[derive(Debug, Clone)]
pub struct Product {
    pub product_id: Uuid,
    pub client_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub image_url: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const PRODUCT_COLUMNS: &str =
    "product_id, client_id, name, description, price, image_url, metadata, created_at, updated_at";

impl Product {
    fn from_row(row: &AnyRow) -> Result<Self, DbError> {
        Ok(Self {
            product_id: get_uuid(row, "product_id")?,
            client_id: get_uuid(row, "client_id")?,
            name: row.try_get("name").map_err(DbError::from)?,
            description: row.try_get("description").map_err(DbError::from)?,
            price: row.try_get("price").map_err(DbError::from)?,
            image_url: row.try_get("image_url").map_err(DbError::from)?,
            metadata: get_json(row, "metadata")?,
            created_at: get_timestamp(row, "created_at")?,
            updated_at: get_timestamp(row, "updated_at")?,
        })
    }
}

/// Product repository
pub struct ProductRepo<'a> {
    pool: &'a AnyPool,
}

impl<'a> ProductRepo<'a> {
    pub fn new(pool: &'a AnyPool) -> Self {
        Self { pool }
    }

    /// Add a product to the tenant's catalog.
    ///
    /// Price is validated at the edge; the CHECK constraint is the
    /// backstop for rows written by other processes.
    pub async fn create(
        &self,
        client_id: Uuid,
        name: &str,
        description: Option<&str>,
        price: f64,
        image_url: Option<&str>,
        metadata: Option<&serde_json::Value>,
    ) -> Result<Product, DbError> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO products
                (product_id, client_id, name, description, price, image_url, metadata,
                 created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
            RETURNING {PRODUCT_COLUMNS}
            "#,
        ))
        .bind(Uuid::new_v4().to_string())
        .bind(client_id.to_string())
        .bind(name)
        .bind(description)
        .bind(price)
        .bind(image_url)
        .bind(metadata.map(|value| value.to_string()))
        .bind(now_utc())
        .fetch_one(self.pool)
        .await?;

        Product::from_row(&row)
    }

    /// List a tenant's catalog, newest first.
    pub async fn list_for_client(
        &self,
        client_id: Uuid,
        page: Pagination,
    ) -> Result<Paginated<Product>, DbError> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS}, COUNT(*) OVER() AS total
            FROM products
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
            .map(Product::from_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Paginated {
            items,
            total,
            page: page.page,
            per_page: page.per_page,
        })
    }

    /// Get a product by id.
    pub async fn get(&self, product_id: Uuid) -> Result<Product, DbError> {
        let row = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE product_id = $1",
        ))
        .bind(product_id.to_string())
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::NotFound {
            resource: "product",
            id: product_id.to_string(),
        })?;

        Product::from_row(&row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repos::ClientRepo;
    use crate::db::testing::test_pool;

    #[tokio::test]
    async fn create_and_get() {
        let (_dir, pool) = test_pool().await;
        let client = ClientRepo::new(&pool).ensure("cafe arenillo").await.unwrap();
        let repo = ProductRepo::new(&pool);

        let metadata = serde_json::json!({"size": "12oz"});
        let product = repo
            .create(
                client.client_id,
                "americano",
                Some("double shot"),
                2.5,
                None,
                Some(&metadata),
            )
            .await
            .unwrap();

        let fetched = repo.get(product.product_id).await.unwrap();
        assert_eq!(fetched.name, "americano");
        assert_eq!(fetched.price, 2.5);
        assert_eq!(fetched.metadata, Some(metadata));
    }

    #[tokio::test]
    async fn listing_pages_catalog() {
        let (_dir, pool) = test_pool().await;
        let client = ClientRepo::new(&pool).ensure("cafe arenillo").await.unwrap();
        let repo = ProductRepo::new(&pool);

        for (name, price) in [("americano", 2.5), ("latte", 3.0), ("mocha", 3.5)] {
            repo.create(client.client_id, name, None, price, None, None)
                .await
                .unwrap();
        }

        let page = repo
            .list_for_client(client.client_id, Pagination::new(1, 2))
            .await
            .unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.items.len(), 2);
    }
}
