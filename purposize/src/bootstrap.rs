// SPDX-License-Identifier: MIT OR Apache-2.0

//! Loading purpose definitions and personal data declarations into the metadata store.
//!
//! Purposes are described in a JSON document:
//!
//! ```json
//! {
//!   "purposes": [
//!     {
//!       "purpose": "ORDER",
//!       "loggingLevel": "ACCESS",
//!       "compatibleWith": ["DELIVERY"],
//!       "fields": { "Customers": ["eMail", "postalAddress"] }
//!     }
//!   ]
//! }
//! ```
//!
//! `loggingLevel` defaults to `NONE`, `compatibleWith` and `fields` are optional.
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use purposize_core::{LoggingLevel, PurposeDefinition, PurposeGrant, PurposeId, TableSchema};
use purposize_store::MetadataWriter;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Purpose configuration document.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurposesConfig {
    pub purposes: Vec<PurposeConfig>,
}

/// A single purpose with the personal data fields it is granted, per table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurposeConfig {
    pub purpose: PurposeId,

    #[serde(default)]
    pub logging_level: LoggingLevel,

    #[serde(default)]
    pub compatible_with: Vec<PurposeId>,

    #[serde(default)]
    pub fields: BTreeMap<String, Vec<String>>,
}

impl PurposeConfig {
    fn definition(&self) -> PurposeDefinition {
        PurposeDefinition {
            id: self.purpose.clone(),
            logging_level: self.logging_level,
            compatible_with: self.compatible_with.iter().cloned().collect(),
        }
    }

    fn grants(&self) -> impl Iterator<Item = PurposeGrant> + '_ {
        self.fields.iter().flat_map(move |(table, fields)| {
            fields
                .iter()
                .map(move |field| PurposeGrant::new(self.purpose.as_str(), table, field))
        })
    }
}

impl PurposesConfig {
    pub fn from_json(json: &str) -> Result<Self, PurposesConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, PurposesConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Checks that purpose identifiers are unique and that all compatibility edges point at
    /// purposes of this document.
    pub fn validate(&self) -> Result<(), PurposesConfigError> {
        let mut ids = HashSet::new();
        for purpose in &self.purposes {
            if !ids.insert(&purpose.purpose) {
                return Err(PurposesConfigError::DuplicatePurpose(
                    purpose.purpose.clone(),
                ));
            }
        }

        for purpose in &self.purposes {
            if let Some(unknown) = purpose
                .compatible_with
                .iter()
                .find(|compatible| !ids.contains(compatible))
            {
                return Err(PurposesConfigError::UnknownCompatiblePurpose {
                    purpose: purpose.purpose.clone(),
                    compatible_with: unknown.clone(),
                });
            }
        }

        Ok(())
    }
}

/// Inserts all purposes of the configuration together with their grants.
///
/// Purposes which exist already are left untouched. Returns the number of newly inserted
/// purposes.
pub async fn load_purposes<W>(
    writer: &W,
    config: &PurposesConfig,
) -> Result<usize, BootstrapError<W::Error>>
where
    W: MetadataWriter,
{
    config.validate()?;

    let mut inserted = 0;
    for purpose in &config.purposes {
        if writer
            .insert_purpose(purpose.definition())
            .await
            .map_err(BootstrapError::Store)?
        {
            inserted += 1;
        }
    }

    let mut grants = 0;
    for purpose in &config.purposes {
        for grant in purpose.grants() {
            if writer
                .insert_grant(grant)
                .await
                .map_err(BootstrapError::Store)?
            {
                grants += 1;
            }
        }
    }

    debug!(purposes = inserted, grants, "loaded purposes");
    Ok(inserted)
}

/// Reads the configuration file and loads its purposes, see `load_purposes`.
pub async fn load_purposes_file<W>(
    writer: &W,
    path: impl AsRef<Path>,
) -> Result<usize, BootstrapError<W::Error>>
where
    W: MetadataWriter,
{
    let config = PurposesConfig::from_file(path)?;
    load_purposes(writer, &config).await
}

/// Declares the personal fields of the schema in the metadata store.
///
/// Returns the number of newly declared fields.
pub async fn register_table<W>(writer: &W, schema: &TableSchema) -> Result<usize, W::Error>
where
    W: MetadataWriter,
{
    let mut inserted = 0;
    for field in schema.personal_data_fields() {
        if writer.insert_personal_field(field).await? {
            inserted += 1;
        }
    }

    debug!(table = %schema.name, fields = inserted, "registered personal data fields");
    Ok(inserted)
}

#[derive(Debug, Error)]
pub enum PurposesConfigError {
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("purpose {0} is defined more than once")]
    DuplicatePurpose(PurposeId),

    #[error("purpose {purpose} is compatible with unknown purpose {compatible_with}")]
    UnknownCompatiblePurpose {
        purpose: PurposeId,
        compatible_with: PurposeId,
    },
}

#[derive(Debug, Error)]
pub enum BootstrapError<E> {
    #[error(transparent)]
    Config(#[from] PurposesConfigError),

    #[error("{0}")]
    Store(E),
}
