use fitfriend_core::catalog::{CatalogEntry, CatalogKind, UNIVERSAL_OWNER};

use crate::store::{Store, StoreError};

/// Read-only existence checks against the universal catalog, then the
/// user's private one.
pub struct CatalogValidator<'a> {
    store: &'a dyn Store,
}

impl<'a> CatalogValidator<'a> {
    pub fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// First hit wins; a private entry never shadows a universal one.
    pub async fn lookup(
        &self,
        kind: CatalogKind,
        name: &str,
        user_id: &str,
    ) -> Result<Option<CatalogEntry>, StoreError> {
        for owner in [UNIVERSAL_OWNER, user_id] {
            if let Some(entry) = self.store.get_catalog_entry(kind, owner, name).await? {
                return Ok(Some(entry));
            }
        }
        Ok(None)
    }

    pub async fn exists(
        &self,
        kind: CatalogKind,
        name: &str,
        user_id: &str,
    ) -> Result<bool, StoreError> {
        Ok(self.lookup(kind, name, user_id).await?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use fitfriend_core::catalog::{ExerciseDetails, MuscleGroup};

    use super::*;
    use crate::store::MemoryStore;

    fn exercise(owner: &str, name: &str, how_to: Option<&str>) -> CatalogEntry {
        CatalogEntry::exercise(
            owner,
            name,
            ExerciseDetails {
                muscle_group: MuscleGroup::Legs,
                how_to: how_to.map(str::to_string),
            },
        )
    }

    #[tokio::test]
    async fn private_only_entries_validate() {
        let store = MemoryStore::new();
        store
            .put_catalog_entry(&exercise("u1", "zercher squat", None))
            .await
            .unwrap();
        let validator = CatalogValidator::new(&store);

        assert!(validator.exists(CatalogKind::Exercise, "Zercher Squat", "u1").await.unwrap());
        assert!(!validator.exists(CatalogKind::Exercise, "zercher squat", "u2").await.unwrap());
        assert!(!validator.exists(CatalogKind::Exercise, "pistol squat", "u1").await.unwrap());
    }

    #[tokio::test]
    async fn universal_entry_is_checked_first() {
        let store = MemoryStore::new();
        store
            .put_catalog_entry(&exercise(UNIVERSAL_OWNER, "squat", Some("https://video")))
            .await
            .unwrap();
        store
            .put_catalog_entry(&exercise("u1", "squat", None))
            .await
            .unwrap();

        let found = CatalogValidator::new(&store)
            .lookup(CatalogKind::Exercise, "squat", "u1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.owner, UNIVERSAL_OWNER);
    }
}
