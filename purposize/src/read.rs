// SPDX-License-Identifier: MIT OR Apache-2.0

use std::error::Error;

use purposize_core::{Join, PurposeDefinition, PurposeId, PurposeInput, Query, Record, TableSchema};
use purposize_store::{MetadataStore, RecordStore};
use tracing::{debug, trace, warn};

use crate::audit::AuditSink;
use crate::engine::Purposize;
use crate::error::{AuthorizationError, PolicyError, PurposizeError};
use crate::request::ReadRequest;

/// Operation name audit sinks receive for both `find_all` and `find_one`.
pub const READ_OPERATION: &str = "read";

/// Reads which are checked against the purpose policy.
pub trait AuthorizedRead {
    type Error: Error;

    /// Returns all records matching the request.
    fn find_all(
        &self,
        schema: &TableSchema,
        request: ReadRequest,
    ) -> impl Future<Output = Result<Vec<Record>, Self::Error>>;

    /// Returns the first record matching the request.
    fn find_one(
        &self,
        schema: &TableSchema,
        request: ReadRequest,
    ) -> impl Future<Output = Result<Option<Record>, Self::Error>>;
}

/// A read request which passed all checks, rewritten to be executed by the record store.
#[derive(Clone, Debug, PartialEq)]
pub struct AuthorizedQuery {
    /// Query with its projection narrowed to the allowed fields and scoped to records of
    /// compatible purposes.
    pub query: Query,

    /// Purpose the read happens under.
    pub purpose: Option<PurposeDefinition>,

    /// Fields the purpose may read.
    pub allowed_fields: Vec<String>,

    /// Whether results of this read get audited.
    pub audited: bool,
}

impl<M, S, A> Purposize<M, S, A>
where
    M: MetadataStore,
    S: RecordStore,
    A: AuditSink,
{
    /// Checks a read request and rewrites its query without touching the record store.
    pub async fn authorize_read(
        &self,
        schema: &TableSchema,
        request: ReadRequest,
    ) -> Result<AuthorizedQuery, PurposizeError<M::Error, S::Error>> {
        let result = self.authorize_read_inner(schema, request).await;
        if let Err(AuthorizationError::Policy(err)) = &result {
            warn!(table = %schema.name, reason = %err, "rejected read");
        }
        Ok(result?)
    }

    async fn authorize_read_inner(
        &self,
        schema: &TableSchema,
        request: ReadRequest,
    ) -> Result<AuthorizedQuery, AuthorizationError<M::Error>> {
        let resolver = self.resolver();
        let classifier = self.classifier();

        let purpose = match &request.purpose {
            None => None,
            Some(PurposeInput::Single(id)) => Some(resolver.validate_purpose(id).await?),
            Some(PurposeInput::Many(_)) => {
                return Err(PolicyError::InvalidPurposeFormat(
                    "reads accept a single purpose only".into(),
                )
                .into());
            }
        };
        let purposes: Vec<PurposeId> = purpose.iter().map(|purpose| purpose.id.clone()).collect();

        let allowed_fields = classifier
            .allowed_fields(&purposes, schema)
            .await
            .map_err(AuthorizationError::Metadata)?;

        let mut query = request.query;

        if let Some(field) = query
            .filter
            .keys()
            .find(|field| !allowed_fields.contains(field))
        {
            return Err(PolicyError::incompatible_field(field, &purposes).into());
        }

        if let Some(field) = query
            .attributes
            .iter()
            .flatten()
            .find(|field| !allowed_fields.contains(field))
        {
            return Err(PolicyError::incompatible_field(field, &purposes).into());
        }

        if query.attributes.is_none() {
            trace!(table = %schema.name, fields = ?allowed_fields, "default projection");
            query.attributes = Some(allowed_fields.clone());
        }

        if let Some(purpose) = &purpose {
            let compatible = resolver.transitive_compatible(&purpose.id).await?;
            query.include.push(Join::AttachedPurposes {
                any_of: compatible
                    .into_iter()
                    .map(|definition| definition.id)
                    .collect(),
            });
        }

        let audited = purpose
            .as_ref()
            .is_some_and(|purpose| purpose.logging_level.is_audited())
            && request.logging.unwrap_or(self.config.logging);

        debug!(
            table = %schema.name,
            purpose = ?purpose.as_ref().map(|purpose| purpose.id.as_str()),
            "accepted read"
        );

        Ok(AuthorizedQuery {
            query,
            purpose,
            allowed_fields,
            audited,
        })
    }

    fn audit(&self, authorized: &AuthorizedQuery, records: &[Record]) {
        if let (true, Some(purpose)) = (authorized.audited, &authorized.purpose) {
            self.audit.log(records, &purpose.id, READ_OPERATION, &self.log_fn);
        }
    }
}

impl<M, S, A> AuthorizedRead for Purposize<M, S, A>
where
    M: MetadataStore,
    S: RecordStore,
    A: AuditSink,
{
    type Error = PurposizeError<M::Error, S::Error>;

    async fn find_all(
        &self,
        schema: &TableSchema,
        request: ReadRequest,
    ) -> Result<Vec<Record>, Self::Error> {
        let authorized = self.authorize_read(schema, request).await?;
        let records = self
            .store
            .find_all(schema, &authorized.query)
            .await
            .map_err(PurposizeError::Store)?;
        self.audit(&authorized, &records);
        Ok(records)
    }

    async fn find_one(
        &self,
        schema: &TableSchema,
        request: ReadRequest,
    ) -> Result<Option<Record>, Self::Error> {
        let authorized = self.authorize_read(schema, request).await?;
        let record = self
            .store
            .find_one(schema, &authorized.query)
            .await
            .map_err(PurposizeError::Store)?;
        if let Some(record) = &record {
            self.audit(&authorized, std::slice::from_ref(record));
        }
        Ok(record)
    }
}
