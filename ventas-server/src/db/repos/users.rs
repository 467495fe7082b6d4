//! Client-user repository
//!
//! End customers of a tenant, keyed by (client_id, phone) and
//! (client_id, email). Registration is an idempotent upsert: a duplicate
//! phone returns the already-stored row unchanged.

use chrono::{DateTime, Utc};
use sqlx::any::AnyRow;
use sqlx::AnyPool;
use uuid::Uuid;

use crate::models::PhoneNumber;

use super::{get_json, get_timestamp, get_uuid, now_utc, DbError};

/// Client-user record from database
#[derive(Debug, Clone)]
pub struct ClientUser {
    pub user_id: Uuid,
    pub client_id: Uuid,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<serde_json::Value>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const USER_COLUMNS: &str =
    "user_id, client_id, name, phone, email, address, metadata, created_at, updated_at";

impl ClientUser {
    fn from_row(row: &AnyRow) -> Result<Self, DbError> {
        use sqlx::Row;

        Ok(Self {
            user_id: get_uuid(row, "user_id")?,
            client_id: get_uuid(row, "client_id")?,
            name: row.try_get("name").map_err(DbError::from)?,
            phone: row.try_get("phone").map_err(DbError::from)?,
            email: row.try_get("email").map_err(DbError::from)?,
            address: get_json(row, "address")?,
            metadata: get_json(row, "metadata")?,
            created_at: get_timestamp(row, "created_at")?,
            updated_at: get_timestamp(row, "updated_at")?,
        })
    }
}

/// Client-user repository
pub struct UserRepo<'a> {
    pool: &'a AnyPool,
}

impl<'a> UserRepo<'a> {
    pub fn new(pool: &'a AnyPool) -> Self {
        Self { pool }
    }

    /// Find a user of this tenant by phone.
    ///
    /// Absence is a normal result, not an error.
    pub async fn find_by_phone(
        &self,
        client_id: Uuid,
        phone: &PhoneNumber,
    ) -> Result<Option<ClientUser>, DbError> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM client_users WHERE client_id = $1 AND phone = $2",
        ))
        .bind(client_id.to_string())
        .bind(phone.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.as_ref().map(ClientUser::from_row).transpose()
    }

    /// Register a user, returning the existing row unchanged when the
    /// (client, phone) pair is already taken.
    ///
    /// The upsert settles concurrent duplicate registrations at the
    /// storage layer; the loser reads back the winner's row.
    pub async fn register(
        &self,
        client_id: Uuid,
        name: &str,
        phone: &PhoneNumber,
    ) -> Result<ClientUser, DbError> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO client_users (user_id, client_id, name, phone, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            ON CONFLICT (client_id, phone) DO UPDATE SET phone = excluded.phone
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(Uuid::new_v4().to_string())
        .bind(client_id.to_string())
        .bind(name)
        .bind(phone.as_str())
        .bind(now_utc())
        .fetch_one(self.pool)
        .await?;

        ClientUser::from_row(&row)
    }

    /// Get a user by id.
    pub async fn get(&self, user_id: Uuid) -> Result<ClientUser, DbError> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM client_users WHERE user_id = $1",
        ))
        .bind(user_id.to_string())
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::NotFound {
            resource: "user",
            id: user_id.to_string(),
        })?;

        ClientUser::from_row(&row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repos::ClientRepo;
    use crate::db::testing::test_pool;

    async fn tenant(pool: &AnyPool) -> Uuid {
        ClientRepo::new(pool)
            .ensure("cafe arenillo")
            .await
            .unwrap()
            .client_id
    }

    #[tokio::test]
    async fn register_then_find_by_phone() {
        let (_dir, pool) = test_pool().await;
        let client_id = tenant(&pool).await;
        let repo = UserRepo::new(&pool);
        let phone = PhoneNumber::new("987").unwrap();

        let registered = repo.register(client_id, "Bob", &phone).await.unwrap();
        assert_eq!(registered.name.as_deref(), Some("Bob"));
        assert_eq!(registered.client_id, client_id);

        let found = repo
            .find_by_phone(client_id, &phone)
            .await
            .unwrap()
            .expect("user should exist");
        assert_eq!(found.user_id, registered.user_id);
        assert_eq!(found.name.as_deref(), Some("Bob"));
    }

    #[tokio::test]
    async fn duplicate_registration_returns_original_unchanged() {
        let (_dir, pool) = test_pool().await;
        let client_id = tenant(&pool).await;
        let repo = UserRepo::new(&pool);
        let phone = PhoneNumber::new("987").unwrap();

        let first = repo.register(client_id, "Bob", &phone).await.unwrap();
        let second = repo.register(client_id, "Robert", &phone).await.unwrap();

        // Same row, original name kept
        assert_eq!(first.user_id, second.user_id);
        assert_eq!(second.name.as_deref(), Some("Bob"));
        assert_eq!(second.updated_at, first.updated_at);
    }

    #[tokio::test]
    async fn unknown_phone_is_a_clean_miss() {
        let (_dir, pool) = test_pool().await;
        let client_id = tenant(&pool).await;
        let repo = UserRepo::new(&pool);

        let missing = repo
            .find_by_phone(client_id, &PhoneNumber::new("000").unwrap())
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn same_phone_under_two_tenants_is_allowed() {
        let (_dir, pool) = test_pool().await;
        let clients = ClientRepo::new(&pool);
        let cafe = clients.ensure("cafe arenillo").await.unwrap().client_id;
        let bakery = clients.ensure("panaderia sol").await.unwrap().client_id;

        let repo = UserRepo::new(&pool);
        let phone = PhoneNumber::new("987").unwrap();

        let a = repo.register(cafe, "Bob", &phone).await.unwrap();
        let b = repo.register(bakery, "Bob", &phone).await.unwrap();

        assert_ne!(a.user_id, b.user_id);
    }
}
