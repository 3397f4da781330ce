// SPDX-License-Identifier: MIT OR Apache-2.0

use purposize_core::{FieldSchema, PurposeId, Record, TableSchema};
use purposize_store::MetadataStore;

/// Classifies the fields of a table as personal or non-personal and computes which of them a
/// purpose may access.
///
/// Classification is table-scoped: a field is personal if the schema marks it as personal or it
/// was declared as personal data for its table in the metadata store. All returned field lists
/// follow the order of the schema.
#[derive(Debug)]
pub struct FieldClassifier<'a, M> {
    metadata: &'a M,
}

impl<'a, M> FieldClassifier<'a, M>
where
    M: MetadataStore,
{
    pub fn new(metadata: &'a M) -> Self {
        Self { metadata }
    }

    /// Splits the schema's fields into personal and non-personal ones.
    async fn partition(
        &self,
        schema: &TableSchema,
    ) -> Result<(Vec<String>, Vec<String>), M::Error> {
        let declared = self.metadata.personal_fields(&schema.name).await?;
        let (personal, non_personal): (Vec<&FieldSchema>, Vec<&FieldSchema>) = schema
            .fields
            .iter()
            .partition(|field| field.personal || declared.contains(&field.name));
        Ok((field_names(personal), field_names(non_personal)))
    }

    /// Returns the schema's fields which contain personal data.
    pub async fn personal_fields(&self, schema: &TableSchema) -> Result<Vec<String>, M::Error> {
        let (personal, _) = self.partition(schema).await?;
        Ok(personal)
    }

    /// Returns every field of the schema which does not contain personal data. These are readable
    /// without any purpose.
    pub async fn non_personal_fields(&self, schema: &TableSchema) -> Result<Vec<String>, M::Error> {
        let (_, non_personal) = self.partition(schema).await?;
        Ok(non_personal)
    }

    /// Returns the personal fields granted to at least one of the purposes. Without any purpose
    /// nothing is granted.
    pub async fn purpose_allowed_personal_fields(
        &self,
        purposes: &[PurposeId],
        schema: &TableSchema,
    ) -> Result<Vec<String>, M::Error> {
        if purposes.is_empty() {
            return Ok(Vec::new());
        }

        let granted = self.metadata.granted_fields(purposes, &schema.name).await?;
        let personal = self.personal_fields(schema).await?;

        // Grants for fields which are not personal or not part of the schema don't widen access.
        Ok(personal
            .into_iter()
            .filter(|field| granted.contains(field))
            .collect())
    }

    /// Returns all fields the purposes may access: every non-personal field plus the granted
    /// personal ones.
    pub async fn allowed_fields(
        &self,
        purposes: &[PurposeId],
        schema: &TableSchema,
    ) -> Result<Vec<String>, M::Error> {
        let non_personal = self.non_personal_fields(schema).await?;
        let granted = self.purpose_allowed_personal_fields(purposes, schema).await?;

        Ok(schema
            .field_names()
            .filter(|field| {
                non_personal.iter().any(|allowed| allowed == field)
                    || granted.iter().any(|allowed| allowed == field)
            })
            .map(str::to_string)
            .collect())
    }

    /// Returns the personal fields the record carries a non-null value for.
    pub async fn sensitive_fields(
        &self,
        schema: &TableSchema,
        record: &Record,
    ) -> Result<Vec<String>, M::Error> {
        let personal = self.personal_fields(schema).await?;
        Ok(personal
            .into_iter()
            .filter(|field| record.has_value(field))
            .collect())
    }
}

fn field_names(fields: Vec<&FieldSchema>) -> Vec<String> {
    fields.into_iter().map(|field| field.name.clone()).collect()
}
