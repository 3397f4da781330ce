// SPDX-License-Identifier: MIT OR Apache-2.0

use std::error::Error;

use purposize_core::{PurposeId, PurposeInput, Record, TableSchema};
use purposize_store::{MetadataStore, RecordStore};
use tracing::{debug, warn};

use crate::audit::AuditSink;
use crate::engine::Purposize;
use crate::error::{AuthorizationError, PolicyError, PurposizeError};
use crate::request::WriteOptions;

/// Writes which are checked against the purpose policy.
pub trait AuthorizedWrite {
    type Error: Error;

    /// Inserts or updates a record.
    ///
    /// The returned record never contains personal data.
    fn save(
        &self,
        schema: &TableSchema,
        record: Record,
        options: WriteOptions,
    ) -> impl Future<Output = Result<Record, Self::Error>>;
}

/// A write which passed all checks.
#[derive(Clone, Debug, PartialEq)]
pub struct WritePlan {
    pub record: Record,

    /// Personal fields the record carries a value for.
    pub sensitive_fields: Vec<String>,

    /// All purposes of the record after the write: the ones attached already followed by the new
    /// ones.
    pub purposes: Vec<PurposeId>,

    /// Given purposes which are not attached to the record yet.
    pub new_purposes: Vec<PurposeId>,
}

impl<M, S, A> Purposize<M, S, A>
where
    M: MetadataStore,
    S: RecordStore,
    A: AuditSink,
{
    /// Checks a write without persisting anything.
    pub async fn authorize_write(
        &self,
        schema: &TableSchema,
        record: Record,
        options: WriteOptions,
    ) -> Result<WritePlan, PurposizeError<M::Error, S::Error>> {
        let classifier = self.classifier();

        let sensitive_fields = classifier
            .sensitive_fields(schema, &record)
            .await
            .map_err(PurposizeError::Metadata)?;

        // Records without personal data are written as they are.
        if sensitive_fields.is_empty() {
            return Ok(WritePlan {
                record,
                sensitive_fields,
                purposes: Vec::new(),
                new_purposes: Vec::new(),
            });
        }

        let attached = match record.id {
            Some(id) => self
                .store
                .attached_purposes(&schema.name, id)
                .await
                .map_err(PurposizeError::Store)?,
            None => Vec::new(),
        };

        let result = self
            .check_write(schema, &sensitive_fields, attached, options.purpose)
            .await;
        let (purposes, new_purposes) = match result {
            Ok(purposes) => purposes,
            Err(AuthorizationError::Policy(err)) => {
                warn!(table = %schema.name, reason = %err, "rejected write");
                return Err(err.into());
            }
            Err(err) => return Err(err.into()),
        };

        debug!(table = %schema.name, ?purposes, "accepted write");

        Ok(WritePlan {
            record,
            sensitive_fields,
            purposes,
            new_purposes,
        })
    }

    /// Returns all purposes of the record and the newly given ones.
    async fn check_write(
        &self,
        schema: &TableSchema,
        sensitive_fields: &[String],
        attached: Vec<PurposeId>,
        given: Option<PurposeInput>,
    ) -> Result<(Vec<PurposeId>, Vec<PurposeId>), AuthorizationError<M::Error>> {
        let mut purposes = attached;
        let mut new_purposes = Vec::new();
        for purpose in given.map(PurposeInput::into_purposes).unwrap_or_default() {
            if !purposes.contains(&purpose) {
                purposes.push(purpose.clone());
                new_purposes.push(purpose);
            }
        }

        if purposes.is_empty() {
            return Err(PolicyError::PurposeRequired.into());
        }

        self.resolver().validate_purposes(&purposes).await?;

        let allowed = self
            .classifier()
            .purpose_allowed_personal_fields(&purposes, schema)
            .await
            .map_err(AuthorizationError::Metadata)?;

        if let Some(field) = sensitive_fields
            .iter()
            .find(|field| !allowed.contains(field))
        {
            return Err(PolicyError::incompatible_field(field, &purposes).into());
        }

        Ok((purposes, new_purposes))
    }

    /// Removes every personal field carrying a value.
    async fn redact(
        &self,
        schema: &TableSchema,
        mut record: Record,
    ) -> Result<Record, PurposizeError<M::Error, S::Error>> {
        let sensitive_fields = self
            .classifier()
            .sensitive_fields(schema, &record)
            .await
            .map_err(PurposizeError::Metadata)?;
        for field in sensitive_fields {
            record.remove(&field);
        }
        Ok(record)
    }
}

impl<M, S, A> AuthorizedWrite for Purposize<M, S, A>
where
    M: MetadataStore,
    S: RecordStore,
    A: AuditSink,
{
    type Error = PurposizeError<M::Error, S::Error>;

    async fn save(
        &self,
        schema: &TableSchema,
        record: Record,
        options: WriteOptions,
    ) -> Result<Record, Self::Error> {
        let plan = self.authorize_write(schema, record, options).await?;

        let persisted = self
            .store
            .save(schema, plan.record)
            .await
            .map_err(PurposizeError::Store)?;

        if !plan.new_purposes.is_empty() {
            let id = persisted
                .id
                .ok_or_else(|| PurposizeError::MissingRecordId(schema.name.clone()))?;
            for purpose in &plan.new_purposes {
                self.store
                    .attach_purpose(&schema.name, id, purpose)
                    .await
                    .map_err(PurposizeError::Store)?;
            }
        }

        self.redact(schema, persisted).await
    }
}
