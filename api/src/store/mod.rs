//! Persistence seam. Point reads and writes by key only: users by id,
//! ledgers by (user, day), catalog entries by (kind, owner, name), and an
//! append-only log of ledger entries.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use chrono::NaiveDate;
use fitfriend_core::catalog::{CatalogEntry, CatalogKind, universal_exercises};
use fitfriend_core::ledger::{DailyLedger, LedgerEntry};
use fitfriend_core::user::User;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("stored record could not be (de)serialized: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait Store: Send + Sync {
    async fn get_user(&self, user_id: &str) -> Result<Option<User>, StoreError>;

    async fn put_user(&self, user: &User) -> Result<(), StoreError>;

    async fn get_ledger(
        &self,
        user_id: &str,
        day: NaiveDate,
    ) -> Result<Option<DailyLedger>, StoreError>;

    /// Inserts the ledger unless one already exists for its (user, day).
    /// Returns true only for the caller that created it.
    async fn create_ledger(&self, ledger: &DailyLedger) -> Result<bool, StoreError>;

    /// Overwrites the remaining-budget snapshot of an existing ledger.
    async fn put_ledger(&self, ledger: &DailyLedger) -> Result<(), StoreError>;

    async fn append_entry(&self, entry: &LedgerEntry) -> Result<(), StoreError>;

    /// Entries for one (user, day) ordered by `recorded_at`.
    async fn entries_for_day(
        &self,
        user_id: &str,
        day: NaiveDate,
    ) -> Result<Vec<LedgerEntry>, StoreError>;

    async fn get_catalog_entry(
        &self,
        kind: CatalogKind,
        owner: &str,
        name: &str,
    ) -> Result<Option<CatalogEntry>, StoreError>;

    /// Inserts unless (kind, owner, name) is taken. Entries are immutable, so
    /// a false return leaves the existing entry as it was.
    async fn put_catalog_entry(&self, entry: &CatalogEntry) -> Result<bool, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

/// Writes the standard lifts into the universal catalog. Safe to run on
/// every start.
pub async fn seed_universal_catalog(store: &dyn Store) -> Result<usize, StoreError> {
    let mut inserted = 0;
    for entry in universal_exercises() {
        if store.put_catalog_entry(&entry).await? {
            inserted += 1;
        }
    }
    Ok(inserted)
}
