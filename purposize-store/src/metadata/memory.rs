// SPDX-License-Identifier: MIT OR Apache-2.0

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use purposize_core::{PersonalDataField, PurposeDefinition, PurposeGrant, PurposeId};

use crate::memory::{MemoryStore, MemoryStoreError};
use crate::metadata::{MetadataStore, MetadataWriter};

#[derive(Clone, Debug, Default)]
pub struct MetadataMemoryStore {
    purposes: Rc<RefCell<BTreeMap<PurposeId, PurposeDefinition>>>,
    personal_fields: Rc<RefCell<BTreeSet<PersonalDataField>>>,
    grants: Rc<RefCell<BTreeSet<PurposeGrant>>>,
}

impl MetadataStore for MemoryStore {
    type Error = MemoryStoreError;

    async fn purpose(&self, id: &PurposeId) -> Result<Option<PurposeDefinition>, Self::Error> {
        Ok(self.metadata.purposes.borrow().get(id).cloned())
    }

    async fn purposes(&self) -> Result<Vec<PurposeDefinition>, Self::Error> {
        Ok(self.metadata.purposes.borrow().values().cloned().collect())
    }

    async fn personal_fields(&self, table: &str) -> Result<Vec<String>, Self::Error> {
        let personal_fields = self.metadata.personal_fields.borrow();
        Ok(personal_fields
            .iter()
            .filter(|declaration| declaration.table == table)
            .map(|declaration| declaration.field.clone())
            .collect())
    }

    async fn granted_fields(
        &self,
        purposes: &[PurposeId],
        table: &str,
    ) -> Result<Vec<String>, Self::Error> {
        let grants = self.metadata.grants.borrow();

        // Grants of different purposes can overlap, every field is only returned once.
        let fields: BTreeSet<String> = grants
            .iter()
            .filter(|grant| grant.table == table && purposes.contains(&grant.purpose))
            .map(|grant| grant.field.clone())
            .collect();

        Ok(fields.into_iter().collect())
    }
}

impl MetadataWriter for MemoryStore {
    type Error = MemoryStoreError;

    async fn insert_purpose(&self, definition: PurposeDefinition) -> Result<bool, Self::Error> {
        let mut purposes = self.metadata.purposes.borrow_mut();
        if purposes.contains_key(&definition.id) {
            return Ok(false);
        }
        purposes.insert(definition.id.clone(), definition);
        Ok(true)
    }

    async fn insert_personal_field(&self, field: PersonalDataField) -> Result<bool, Self::Error> {
        Ok(self.metadata.personal_fields.borrow_mut().insert(field))
    }

    async fn insert_grant(&self, grant: PurposeGrant) -> Result<bool, Self::Error> {
        Ok(self.metadata.grants.borrow_mut().insert(grant))
    }
}
