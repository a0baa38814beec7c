use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::NaiveDate;
use fitfriend_core::catalog::{CatalogEntry, CatalogKind, canonical_name};
use fitfriend_core::ledger::{DailyLedger, LedgerEntry};
use fitfriend_core::user::User;

use super::{Store, StoreError};

#[derive(Default)]
struct Tables {
    users: HashMap<String, User>,
    ledgers: HashMap<(String, NaiveDate), DailyLedger>,
    entries: Vec<LedgerEntry>,
    catalog: HashMap<(CatalogKind, String, String), CatalogEntry>,
}

/// Process-local store for development and tests. Nothing survives a restart.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>, StoreError> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get_user(&self, user_id: &str) -> Result<Option<User>, StoreError> {
        Ok(self.tables()?.users.get(user_id).cloned())
    }

    async fn put_user(&self, user: &User) -> Result<(), StoreError> {
        self.tables()?
            .users
            .insert(user.user_id.clone(), user.clone());
        Ok(())
    }

    async fn get_ledger(
        &self,
        user_id: &str,
        day: NaiveDate,
    ) -> Result<Option<DailyLedger>, StoreError> {
        Ok(self
            .tables()?
            .ledgers
            .get(&(user_id.to_string(), day))
            .cloned())
    }

    async fn create_ledger(&self, ledger: &DailyLedger) -> Result<bool, StoreError> {
        let mut tables = self.tables()?;
        let key = (ledger.user_id.clone(), ledger.day);
        if tables.ledgers.contains_key(&key) {
            return Ok(false);
        }
        tables.ledgers.insert(key, ledger.clone());
        Ok(true)
    }

    async fn put_ledger(&self, ledger: &DailyLedger) -> Result<(), StoreError> {
        self.tables()?
            .ledgers
            .insert((ledger.user_id.clone(), ledger.day), ledger.clone());
        Ok(())
    }

    async fn append_entry(&self, entry: &LedgerEntry) -> Result<(), StoreError> {
        self.tables()?.entries.push(entry.clone());
        Ok(())
    }

    async fn entries_for_day(
        &self,
        user_id: &str,
        day: NaiveDate,
    ) -> Result<Vec<LedgerEntry>, StoreError> {
        let mut entries: Vec<LedgerEntry> = self
            .tables()?
            .entries
            .iter()
            .filter(|entry| entry.user_id == user_id && entry.day == day)
            .cloned()
            .collect();
        entries.sort_by_key(|entry| entry.recorded_at);
        Ok(entries)
    }

    async fn get_catalog_entry(
        &self,
        kind: CatalogKind,
        owner: &str,
        name: &str,
    ) -> Result<Option<CatalogEntry>, StoreError> {
        Ok(self
            .tables()?
            .catalog
            .get(&(kind, owner.to_string(), canonical_name(name)))
            .cloned())
    }

    async fn put_catalog_entry(&self, entry: &CatalogEntry) -> Result<bool, StoreError> {
        let mut tables = self.tables()?;
        let key = (entry.kind(), entry.owner.clone(), canonical_name(&entry.name));
        if tables.catalog.contains_key(&key) {
            return Ok(false);
        }
        tables.catalog.insert(key, entry.clone());
        Ok(true)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.tables().map(|_| ())
    }
}
