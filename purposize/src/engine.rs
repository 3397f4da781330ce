// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::Arc;

use purposize_core::TableSchema;
use purposize_store::{MetadataStore, MetadataWriter, RecordStore};

use crate::audit::{AuditSink, LogFn, RecordAuditSink, default_log_function};
use crate::bootstrap::{self, BootstrapError, PurposesConfig};
use crate::cache::CachedMetadata;
use crate::classifier::FieldClassifier;
use crate::config::Config;
use crate::error::PurposizeError;
use crate::resolver::PurposeResolver;

/// Purpose-based access control in front of a record store.
///
/// Reads (`AuthorizedRead`) and writes (`AuthorizedWrite`) are checked against the purposes
/// stored in the metadata store before they are passed on to the record store. Rejected requests
/// never reach the record store.
///
/// Metadata lookups are cached, see `CachedMetadata`.
pub struct Purposize<M, S, A = RecordAuditSink> {
    pub(crate) metadata: CachedMetadata<M>,
    pub(crate) store: S,
    pub(crate) audit: A,
    pub(crate) log_fn: LogFn,
    pub(crate) config: Config,
}

impl<M, S> Purposize<M, S>
where
    M: MetadataStore,
    S: RecordStore,
{
    pub fn new(metadata: M, store: S) -> Self {
        Self {
            metadata: CachedMetadata::new(metadata),
            store,
            audit: RecordAuditSink,
            log_fn: default_log_function(),
            config: Config::default(),
        }
    }
}

impl<M, S, A> Purposize<M, S, A>
where
    M: MetadataStore,
    S: RecordStore,
    A: AuditSink,
{
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Replaces the sink receiving audited reads.
    pub fn with_audit_sink<B>(self, audit: B) -> Purposize<M, S, B>
    where
        B: AuditSink,
    {
        Purposize {
            metadata: self.metadata,
            store: self.store,
            audit,
            log_fn: self.log_fn,
            config: self.config,
        }
    }

    /// Replaces the callback the audit sink writes to.
    pub fn with_log_function<F>(mut self, log_fn: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.log_fn = Arc::new(log_fn);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn metadata(&self) -> &CachedMetadata<M> {
        &self.metadata
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn audit_sink(&self) -> &A {
        &self.audit
    }

    pub fn classifier(&self) -> FieldClassifier<'_, CachedMetadata<M>> {
        FieldClassifier::new(&self.metadata)
    }

    pub fn resolver(&self) -> PurposeResolver<'_, CachedMetadata<M>> {
        PurposeResolver::new(&self.metadata)
    }
}

impl<M, S, A> Purposize<M, S, A>
where
    M: MetadataStore + MetadataWriter<Error = <M as MetadataStore>::Error>,
    S: RecordStore,
    A: AuditSink,
{
    /// Creates the table in the record store and declares its personal fields.
    pub async fn register_table(
        &self,
        schema: &TableSchema,
    ) -> Result<(), PurposizeError<<M as MetadataStore>::Error, S::Error>> {
        self.store
            .create_table(schema)
            .await
            .map_err(PurposizeError::Store)?;
        bootstrap::register_table(self.metadata.inner(), schema)
            .await
            .map_err(PurposizeError::Metadata)?;
        self.metadata.invalidate().await;
        Ok(())
    }

    /// Loads purpose definitions and their grants, see `bootstrap::load_purposes`.
    pub async fn load_purposes(
        &self,
        config: &PurposesConfig,
    ) -> Result<usize, BootstrapError<<M as MetadataStore>::Error>> {
        let inserted = bootstrap::load_purposes(self.metadata.inner(), config).await?;
        self.metadata.invalidate().await;
        Ok(inserted)
    }

    /// Loads the purpose configuration file named in the config, if there is one.
    pub async fn load_configured_purposes(
        &self,
    ) -> Result<usize, BootstrapError<<M as MetadataStore>::Error>> {
        let Some(path) = &self.config.purposes_path else {
            return Ok(0);
        };
        let inserted = bootstrap::load_purposes_file(self.metadata.inner(), path).await?;
        self.metadata.invalidate().await;
        Ok(inserted)
    }
}
