use async_trait::async_trait;
use chrono::NaiveDate;
use fitfriend_core::catalog::{CatalogEntry, CatalogKind, canonical_name};
use fitfriend_core::ledger::{DailyLedger, LedgerEntry};
use fitfriend_core::user::User;
use sqlx::PgPool;

use super::{Store, StoreError};

/// Postgres-backed store. Records are kept as JSONB documents under their
/// natural keys; see `migrations/`.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn get_user(&self, user_id: &str) -> Result<Option<User>, StoreError> {
        let data = sqlx::query_scalar::<_, serde_json::Value>(
            "SELECT data FROM users WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(data.map(serde_json::from_value).transpose()?)
    }

    async fn put_user(&self, user: &User) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO users (user_id, data, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (user_id) DO UPDATE SET data = EXCLUDED.data, updated_at = NOW()
            "#,
        )
        .bind(&user.user_id)
        .bind(serde_json::to_value(user)?)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_ledger(
        &self,
        user_id: &str,
        day: NaiveDate,
    ) -> Result<Option<DailyLedger>, StoreError> {
        let data = sqlx::query_scalar::<_, serde_json::Value>(
            "SELECT data FROM daily_ledgers WHERE user_id = $1 AND day = $2",
        )
        .bind(user_id)
        .bind(day)
        .fetch_optional(&self.pool)
        .await?;

        Ok(data.map(serde_json::from_value).transpose()?)
    }

    async fn create_ledger(&self, ledger: &DailyLedger) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO daily_ledgers (user_id, day, data)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, day) DO NOTHING
            "#,
        )
        .bind(&ledger.user_id)
        .bind(ledger.day)
        .bind(serde_json::to_value(ledger)?)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn put_ledger(&self, ledger: &DailyLedger) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO daily_ledgers (user_id, day, data)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, day) DO UPDATE SET data = EXCLUDED.data, updated_at = NOW()
            "#,
        )
        .bind(&ledger.user_id)
        .bind(ledger.day)
        .bind(serde_json::to_value(ledger)?)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn append_entry(&self, entry: &LedgerEntry) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO ledger_entries (id, user_id, day, recorded_at, kind, data)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(entry.id)
        .bind(&entry.user_id)
        .bind(entry.day)
        .bind(entry.recorded_at)
        .bind(entry.record.kind())
        .bind(serde_json::to_value(entry)?)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn entries_for_day(
        &self,
        user_id: &str,
        day: NaiveDate,
    ) -> Result<Vec<LedgerEntry>, StoreError> {
        let rows = sqlx::query_scalar::<_, serde_json::Value>(
            r#"
            SELECT data FROM ledger_entries
            WHERE user_id = $1 AND day = $2
            ORDER BY recorded_at, id
            "#,
        )
        .bind(user_id)
        .bind(day)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|data| serde_json::from_value(data).map_err(StoreError::from))
            .collect()
    }

    async fn get_catalog_entry(
        &self,
        kind: CatalogKind,
        owner: &str,
        name: &str,
    ) -> Result<Option<CatalogEntry>, StoreError> {
        let data = sqlx::query_scalar::<_, serde_json::Value>(
            "SELECT data FROM catalog_entries WHERE owner = $1 AND kind = $2 AND name = $3",
        )
        .bind(owner)
        .bind(kind.as_str())
        .bind(canonical_name(name))
        .fetch_optional(&self.pool)
        .await?;

        Ok(data.map(serde_json::from_value).transpose()?)
    }

    async fn put_catalog_entry(&self, entry: &CatalogEntry) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO catalog_entries (owner, kind, name, data)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (owner, kind, name) DO NOTHING
            "#,
        )
        .bind(&entry.owner)
        .bind(entry.kind().as_str())
        .bind(canonical_name(&entry.name))
        .bind(serde_json::to_value(entry)?)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }
}
