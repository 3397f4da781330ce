// SPDX-License-Identifier: MIT OR Apache-2.0

use std::error::Error;

use purposize_core::{PurposeId, Query, Record, RecordId, TableSchema};

/// Interface of the underlying record store.
///
/// Stores execute queries exactly as they are given to them, they do not know anything about
/// personal data. Queries and records referring to fields which are not declared in the schema
/// are rejected with an error.
pub trait RecordStore {
    type Error: Error;

    /// Prepares the store to hold records of this table. Calling it again for an existing table
    /// does nothing.
    fn create_table(&self, schema: &TableSchema) -> impl Future<Output = Result<(), Self::Error>>;

    /// Returns all records matching the query, ordered by their id.
    ///
    /// All filter constraints need to match. `Join::AttachedPurposes` only keeps records which
    /// have at least one of the given purposes attached.
    fn find_all(
        &self,
        schema: &TableSchema,
        query: &Query,
    ) -> impl Future<Output = Result<Vec<Record>, Self::Error>>;

    /// Returns the first record matching the query or `None`.
    fn find_one(
        &self,
        schema: &TableSchema,
        query: &Query,
    ) -> impl Future<Output = Result<Option<Record>, Self::Error>>;

    /// Inserts a new record (when it does not have an id yet) or updates the fields given in the
    /// record of an existing one.
    ///
    /// Returns the persisted record including its id.
    fn save(
        &self,
        schema: &TableSchema,
        record: Record,
    ) -> impl Future<Output = Result<Record, Self::Error>>;

    /// Returns the purposes attached to a record, in the order they were attached.
    fn attached_purposes(
        &self,
        table: &str,
        id: RecordId,
    ) -> impl Future<Output = Result<Vec<PurposeId>, Self::Error>>;

    /// Attaches a purpose to a record.
    ///
    /// Returns `true` if the purpose was newly attached and `false` if it was attached already.
    /// Attachments are never removed.
    fn attach_purpose(
        &self,
        table: &str,
        id: RecordId,
        purpose: &PurposeId,
    ) -> impl Future<Output = Result<bool, Self::Error>>;
}
