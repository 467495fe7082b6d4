//! Schema bootstrap for the sales tables
//!
//! Create-if-absent only, run once at startup; safe to re-run. The DDL is
//! restricted to the dialect both backends share: UUIDs and timestamps are
//! TEXT (values are generated in the application), statuses are TEXT with
//! CHECK constraints, JSON blobs are TEXT.

use sqlx::AnyPool;

/// Run all schema bootstrap statements.
pub async fn run(pool: &AnyPool) -> Result<(), sqlx::Error> {
    tracing::info!("Running schema bootstrap...");

    // Tenant root; every other table hangs off client_id
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS clients (
            client_id TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            industry TEXT,
            config TEXT,
            password_hash TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS client_users (
            user_id TEXT PRIMARY KEY,
            client_id TEXT NOT NULL REFERENCES clients(client_id),
            name TEXT,
            phone TEXT,
            email TEXT,
            address TEXT,
            metadata TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE (client_id, phone),
            UNIQUE (client_id, email)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS conversations (
            conversation_id TEXT PRIMARY KEY,
            client_id TEXT NOT NULL REFERENCES clients(client_id),
            user_id TEXT NOT NULL REFERENCES client_users(user_id),
            started_at TEXT NOT NULL,
            ended_at TEXT,
            status TEXT NOT NULL DEFAULT 'open'
                CHECK (status IN ('open', 'pending', 'closed')),
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS messages (
            message_id TEXT PRIMARY KEY,
            conversation_id TEXT NOT NULL REFERENCES conversations(conversation_id),
            client_id TEXT NOT NULL REFERENCES clients(client_id),
            sender TEXT NOT NULL CHECK (sender IN ('user', 'agent', 'system')),
            direction TEXT NOT NULL CHECK (direction IN ('incoming', 'outgoing')),
            content TEXT,
            content_type TEXT,
            timestamp TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS leads (
            lead_id TEXT PRIMARY KEY,
            client_id TEXT NOT NULL REFERENCES clients(client_id),
            user_id TEXT NOT NULL REFERENCES client_users(user_id),
            conversation_id TEXT REFERENCES conversations(conversation_id),
            status TEXT NOT NULL DEFAULT 'new'
                CHECK (status IN ('new', 'contacted', 'qualified', 'won', 'lost')),
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS products (
            product_id TEXT PRIMARY KEY,
            client_id TEXT NOT NULL REFERENCES clients(client_id),
            name TEXT NOT NULL,
            description TEXT,
            price DOUBLE PRECISION NOT NULL CHECK (price >= 0),
            image_url TEXT,
            metadata TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS orders (
            order_id TEXT PRIMARY KEY,
            client_id TEXT NOT NULL REFERENCES clients(client_id),
            user_id TEXT NOT NULL REFERENCES client_users(user_id),
            product_id TEXT NOT NULL REFERENCES products(product_id),
            quantity BIGINT NOT NULL CHECK (quantity >= 1),
            status TEXT NOT NULL DEFAULT 'pending'
                CHECK (status IN ('pending', 'confirmed', 'shipped', 'delivered', 'cancelled')),
            total DOUBLE PRECISION NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    create_indexes(pool).await?;

    tracing::info!("Schema bootstrap complete");
    Ok(())
}

async fn create_indexes(pool: &AnyPool) -> Result<(), sqlx::Error> {
    // (client_id, phone) and (client_id, email) lookups ride the unique
    // constraints' indexes; these cover the remaining access paths.
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_conversations_user ON conversations(user_id)",
    )
    .execute(pool)
    .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_messages_conversation ON messages(conversation_id)",
    )
    .execute(pool)
    .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_leads_client ON leads(client_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_products_client ON products(client_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_orders_client ON orders(client_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_orders_user ON orders(user_id)")
        .execute(pool)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::db::testing::test_pool;

    #[tokio::test]
    async fn bootstrap_is_idempotent() {
        let (_dir, pool) = test_pool().await;

        // test_pool already ran the bootstrap once; run again
        super::run(&pool).await.expect("second run failed");
    }
}
