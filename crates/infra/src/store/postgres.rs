//! Postgres-backed inventory store.
//!
//! One row per `(user_id, name)`. A `CHECK (quantity > 0)` constraint backs
//! the delete-on-zero rule at the storage level too.

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use stockscan_core::UserId;
use stockscan_inventory::InventoryItem;

use super::{InventoryStore, StoreError, ensure_positive};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS inventory_items (
    user_id    UUID        NOT NULL,
    name       TEXT        NOT NULL,
    quantity   BIGINT      NOT NULL CHECK (quantity > 0),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    PRIMARY KEY (user_id, name)
)
"#;

/// Postgres store over a shared connection pool.
///
/// Every query is scoped by `user_id`, so cross-user access is impossible
/// through this type.
#[derive(Debug, Clone)]
pub struct PostgresInventoryStore {
    pool: PgPool,
}

fn backend(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            StoreError::Unavailable(err.to_string())
        }
        other => StoreError::Backend(other.to_string()),
    }
}

impl PostgresInventoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect and make sure the table exists.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(database_url).await.map_err(backend)?;
        let store = Self::new(pool);
        store.ensure_schema().await?;
        Ok(store)
    }

    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(())
    }
}

fn to_db_quantity(name: &str, quantity: u64) -> Result<i64, StoreError> {
    i64::try_from(quantity)
        .map_err(|_| StoreError::InvalidRecord(format!("quantity for '{name}' exceeds storage range")))
}

#[async_trait]
impl InventoryStore for PostgresInventoryStore {
    async fn list(&self, user: UserId) -> Result<Vec<InventoryItem>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT name, quantity
            FROM inventory_items
            WHERE user_id = $1
            ORDER BY name
            "#,
        )
        .bind(user.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        rows.iter()
            .map(|row| -> Result<InventoryItem, StoreError> {
                let name: String = row.try_get("name").map_err(backend)?;
                let quantity: i64 = row.try_get("quantity").map_err(backend)?;
                let quantity = u64::try_from(quantity)
                    .map_err(|_| StoreError::InvalidRecord(format!("negative quantity stored for '{name}'")))?;
                Ok(InventoryItem::new(name, quantity))
            })
            .collect()
    }

    async fn get(&self, user: UserId, name: &str) -> Result<Option<u64>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT quantity
            FROM inventory_items
            WHERE user_id = $1 AND name = $2
            "#,
        )
        .bind(user.as_uuid())
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        match row {
            Some(row) => {
                let quantity: i64 = row.try_get("quantity").map_err(backend)?;
                let quantity = u64::try_from(quantity)
                    .map_err(|_| StoreError::InvalidRecord(format!("negative quantity stored for '{name}'")))?;
                Ok(Some(quantity))
            }
            None => Ok(None),
        }
    }

    async fn set(&self, user: UserId, name: &str, quantity: u64) -> Result<(), StoreError> {
        ensure_positive(name, quantity)?;
        let quantity = to_db_quantity(name, quantity)?;

        sqlx::query(
            r#"
            INSERT INTO inventory_items (user_id, name, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, name)
            DO UPDATE SET
                quantity = EXCLUDED.quantity,
                updated_at = NOW()
            "#,
        )
        .bind(user.as_uuid())
        .bind(name)
        .bind(quantity)
        .execute(&self.pool)
        .await
        .map_err(backend)?;
        Ok(())
    }

    async fn delete(&self, user: UserId, name: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM inventory_items WHERE user_id = $1 AND name = $2")
            .bind(user.as_uuid())
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(())
    }
}
