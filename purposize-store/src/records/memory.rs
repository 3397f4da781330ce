// SPDX-License-Identifier: MIT OR Apache-2.0

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use purposize_core::{Join, PurposeId, Query, Record, RecordId, TableSchema, Value};

use crate::memory::{MemoryStore, MemoryStoreError};
use crate::records::RecordStore;
use crate::validation::{validate_query, validate_record, validate_schema};

type TableRows = BTreeMap<RecordId, Record>;

#[derive(Clone, Debug, Default)]
pub struct RecordMemoryStore {
    tables: Rc<RefCell<HashMap<String, TableRows>>>,
    attachments: Rc<RefCell<HashMap<(String, RecordId), Vec<PurposeId>>>>,
}

impl RecordMemoryStore {
    /// Returns `true` if the record satisfies all joins.
    fn matches_joins(&self, record: &Record, joins: &[Join]) -> bool {
        let attachments = self.attachments.borrow();
        joins.iter().all(|join| match join {
            Join::AttachedPurposes { any_of } => {
                let Some(id) = record.id else {
                    return false;
                };
                attachments
                    .get(&(record.table.clone(), id))
                    .is_some_and(|attached| attached.iter().any(|purpose| any_of.contains(purpose)))
            }
        })
    }
}

impl RecordStore for MemoryStore {
    type Error = MemoryStoreError;

    async fn create_table(&self, schema: &TableSchema) -> Result<(), Self::Error> {
        validate_schema(schema)?;
        self.records
            .tables
            .borrow_mut()
            .entry(schema.name.clone())
            .or_default();
        Ok(())
    }

    async fn find_all(
        &self,
        schema: &TableSchema,
        query: &Query,
    ) -> Result<Vec<Record>, Self::Error> {
        validate_query(schema, query)?;

        let tables = self.records.tables.borrow();
        let Some(rows) = tables.get(&schema.name) else {
            return Ok(Vec::new());
        };

        let records = rows
            .values()
            .filter(|record| {
                query
                    .filter
                    .iter()
                    .all(|(field, constraint)| constraint.matches(record.get(field)))
            })
            .filter(|record| self.records.matches_joins(record, &query.include))
            .take(query.limit.unwrap_or(usize::MAX))
            .map(|record| {
                let mut record = record.clone();
                if let Some(attributes) = &query.attributes {
                    record.project(attributes);
                }
                record
            })
            .collect();

        Ok(records)
    }

    async fn find_one(
        &self,
        schema: &TableSchema,
        query: &Query,
    ) -> Result<Option<Record>, Self::Error> {
        let query = query.clone().limit(1);
        let records = self.find_all(schema, &query).await?;
        Ok(records.into_iter().next())
    }

    async fn save(&self, schema: &TableSchema, record: Record) -> Result<Record, Self::Error> {
        validate_record(schema, &record)?;

        let mut tables = self.records.tables.borrow_mut();
        let rows = tables.entry(schema.name.clone()).or_default();

        match record.id {
            Some(id) => {
                let Some(existing) = rows.get_mut(&id) else {
                    return Err(MemoryStoreError::RecordNotFound(schema.name.clone(), id));
                };
                existing.values.extend(record.values);
                Ok(existing.clone())
            }
            None => {
                let id = rows.keys().next_back().map_or(1, |last| last + 1);

                // Fields which were not given are persisted as `Null`, like a database would do.
                let mut persisted = Record::new(&schema.name).with_id(id);
                for field in schema.field_names() {
                    let value = record.get(field).cloned().unwrap_or(Value::Null);
                    persisted.set(field, value);
                }

                rows.insert(id, persisted.clone());
                Ok(persisted)
            }
        }
    }

    async fn attached_purposes(
        &self,
        table: &str,
        id: RecordId,
    ) -> Result<Vec<PurposeId>, Self::Error> {
        let attachments = self.records.attachments.borrow();
        Ok(attachments
            .get(&(table.to_string(), id))
            .cloned()
            .unwrap_or_default())
    }

    async fn attach_purpose(
        &self,
        table: &str,
        id: RecordId,
        purpose: &PurposeId,
    ) -> Result<bool, Self::Error> {
        let mut attachments = self.records.attachments.borrow_mut();
        let attached = attachments.entry((table.to_string(), id)).or_default();
        if attached.contains(purpose) {
            return Ok(false);
        }
        attached.push(purpose.clone());
        Ok(true)
    }
}
