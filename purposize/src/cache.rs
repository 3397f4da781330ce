// SPDX-License-Identifier: MIT OR Apache-2.0

//! Memoizing decorator for metadata lookups.
use std::collections::{BTreeSet, HashMap};

use purposize_core::{PurposeDefinition, PurposeId};
use purposize_store::MetadataStore;
use tokio::sync::Mutex;
use tracing::{debug, trace};

/// Caches the results of a `MetadataStore`.
///
/// Authorizing a single request can run the same lookups multiple times, and metadata rarely
/// changes after bootstrap. Every lookup table is guarded by its own lock which is held while the
/// backing store is queried, concurrent identical lookups therefore wait for the first one instead
/// of hitting the backing store again.
///
/// Call `invalidate` after changing the metadata of the backing store.
#[derive(Debug)]
pub struct CachedMetadata<M> {
    inner: M,
    purposes: Mutex<Option<Vec<PurposeDefinition>>>,
    personal_fields: Mutex<HashMap<String, Vec<String>>>,
    granted_fields: Mutex<HashMap<(BTreeSet<PurposeId>, String), Vec<String>>>,
}

impl<M> CachedMetadata<M> {
    pub fn new(inner: M) -> Self {
        Self {
            inner,
            purposes: Mutex::new(None),
            personal_fields: Mutex::new(HashMap::new()),
            granted_fields: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the backing store.
    pub fn inner(&self) -> &M {
        &self.inner
    }

    /// Drops all cached lookups.
    pub async fn invalidate(&self) {
        *self.purposes.lock().await = None;
        self.personal_fields.lock().await.clear();
        self.granted_fields.lock().await.clear();
        debug!("invalidated metadata cache");
    }
}

impl<M> MetadataStore for CachedMetadata<M>
where
    M: MetadataStore,
{
    type Error = M::Error;

    async fn purpose(&self, id: &PurposeId) -> Result<Option<PurposeDefinition>, Self::Error> {
        let purposes = self.purposes().await?;
        Ok(purposes.into_iter().find(|definition| &definition.id == id))
    }

    async fn purposes(&self) -> Result<Vec<PurposeDefinition>, Self::Error> {
        let mut cached = self.purposes.lock().await;
        if let Some(purposes) = cached.as_ref() {
            trace!("purposes cache hit");
            return Ok(purposes.clone());
        }

        debug!("purposes cache miss");
        let purposes = self.inner.purposes().await?;
        *cached = Some(purposes.clone());
        Ok(purposes)
    }

    async fn personal_fields(&self, table: &str) -> Result<Vec<String>, Self::Error> {
        let mut cached = self.personal_fields.lock().await;
        if let Some(fields) = cached.get(table) {
            trace!(table, "personal fields cache hit");
            return Ok(fields.clone());
        }

        debug!(table, "personal fields cache miss");
        let fields = self.inner.personal_fields(table).await?;
        cached.insert(table.to_string(), fields.clone());
        Ok(fields)
    }

    async fn granted_fields(
        &self,
        purposes: &[PurposeId],
        table: &str,
    ) -> Result<Vec<String>, Self::Error> {
        // The order and multiplicity of purposes doesn't change the result.
        let key = (
            purposes.iter().cloned().collect::<BTreeSet<_>>(),
            table.to_string(),
        );

        let mut cached = self.granted_fields.lock().await;
        if let Some(fields) = cached.get(&key) {
            trace!(table, ?purposes, "granted fields cache hit");
            return Ok(fields.clone());
        }

        debug!(table, ?purposes, "granted fields cache miss");
        let fields = self.inner.granted_fields(purposes, table).await?;
        cached.insert(key, fields.clone());
        Ok(fields)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use purposize_core::{PersonalDataField, PurposeDefinition, PurposeGrant, PurposeId};
    use purposize_store::{MemoryStore, MemoryStoreError, MetadataStore, MetadataWriter};

    use super::CachedMetadata;

    /// Counts every lookup reaching the backing store.
    #[derive(Clone, Default)]
    struct CountingStore {
        store: MemoryStore,
        lookups: Rc<Cell<usize>>,
    }

    impl MetadataStore for CountingStore {
        type Error = MemoryStoreError;

        async fn purpose(&self, id: &PurposeId) -> Result<Option<PurposeDefinition>, Self::Error> {
            self.lookups.set(self.lookups.get() + 1);
            self.store.purpose(id).await
        }

        async fn purposes(&self) -> Result<Vec<PurposeDefinition>, Self::Error> {
            self.lookups.set(self.lookups.get() + 1);
            self.store.purposes().await
        }

        async fn personal_fields(&self, table: &str) -> Result<Vec<String>, Self::Error> {
            self.lookups.set(self.lookups.get() + 1);
            self.store.personal_fields(table).await
        }

        async fn granted_fields(
            &self,
            purposes: &[PurposeId],
            table: &str,
        ) -> Result<Vec<String>, Self::Error> {
            self.lookups.set(self.lookups.get() + 1);
            self.store.granted_fields(purposes, table).await
        }
    }

    #[tokio::test]
    async fn repeated_lookups_hit_the_cache() {
        let backing = CountingStore::default();
        backing
            .store
            .insert_purpose(PurposeDefinition::new("ORDER"))
            .await
            .unwrap();
        backing
            .store
            .insert_personal_field(PersonalDataField::new("Customers", "eMail"))
            .await
            .unwrap();
        backing
            .store
            .insert_grant(PurposeGrant::new("ORDER", "Customers", "eMail"))
            .await
            .unwrap();

        let cache = CachedMetadata::new(backing.clone());
        let order = PurposeId::new("ORDER");

        for _ in 0..3 {
            assert!(cache.purpose(&order).await.unwrap().is_some());
            assert_eq!(cache.personal_fields("Customers").await.unwrap(), vec!["eMail"]);
            assert_eq!(
                cache
                    .granted_fields(&[order.clone(), order.clone()], "Customers")
                    .await
                    .unwrap(),
                vec!["eMail"]
            );
        }

        // One lookup each for purposes, personal fields and grants.
        assert_eq!(backing.lookups.get(), 3);

        // Equal sets of purposes share their cache entry.
        cache
            .granted_fields(&[order.clone()], "Customers")
            .await
            .unwrap();
        assert_eq!(backing.lookups.get(), 3);

        // Different arguments are separate entries.
        assert!(cache.personal_fields("Orders").await.unwrap().is_empty());
        assert_eq!(backing.lookups.get(), 4);
    }

    #[tokio::test]
    async fn invalidate_picks_up_changes() {
        let backing = CountingStore::default();
        let cache = CachedMetadata::new(backing.clone());

        assert!(cache.purposes().await.unwrap().is_empty());

        backing
            .store
            .insert_purpose(PurposeDefinition::new("ORDER"))
            .await
            .unwrap();

        // Stale until invalidated.
        assert!(cache.purposes().await.unwrap().is_empty());

        cache.invalidate().await;
        assert_eq!(cache.purposes().await.unwrap().len(), 1);
        assert_eq!(backing.lookups.get(), 2);
    }
}
