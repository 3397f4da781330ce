// SPDX-License-Identifier: MIT OR Apache-2.0

use std::error::Error;

use purposize_core::{PersonalDataField, PurposeDefinition, PurposeGrant, PurposeId};

/// Read interface for the three metadata relations: purpose definitions, personal data field
/// declarations and purpose-to-field grants.
///
/// Authorization performs many of these lookups for every single request, implementations are
/// usually wrapped in a cache.
pub trait MetadataStore {
    type Error: Error;

    /// Returns the definition of a purpose or `None` if it is unknown.
    fn purpose(
        &self,
        id: &PurposeId,
    ) -> impl Future<Output = Result<Option<PurposeDefinition>, Self::Error>>;

    /// Returns all known purpose definitions.
    fn purposes(&self) -> impl Future<Output = Result<Vec<PurposeDefinition>, Self::Error>>;

    /// Returns the names of all fields declared as personal data for this table.
    fn personal_fields(&self, table: &str)
    -> impl Future<Output = Result<Vec<String>, Self::Error>>;

    /// Returns the names of all fields of this table granted to at least one of the given
    /// purposes. Every field is only returned once.
    fn granted_fields(
        &self,
        purposes: &[PurposeId],
        table: &str,
    ) -> impl Future<Output = Result<Vec<String>, Self::Error>>;
}

/// Write interface for the metadata relations, used during bootstrap.
///
/// All methods return `true` if a new entry got inserted or `false` if an identical entry
/// already existed.
pub trait MetadataWriter {
    type Error: Error;

    /// Inserts a purpose definition together with its outgoing compatibility edges.
    fn insert_purpose(
        &self,
        definition: PurposeDefinition,
    ) -> impl Future<Output = Result<bool, Self::Error>>;

    fn insert_personal_field(
        &self,
        field: PersonalDataField,
    ) -> impl Future<Output = Result<bool, Self::Error>>;

    fn insert_grant(&self, grant: PurposeGrant) -> impl Future<Output = Result<bool, Self::Error>>;
}
