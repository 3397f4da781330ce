// SPDX-License-Identifier: MIT OR Apache-2.0

use purposize_core::RecordId;
use thiserror::Error;

use crate::metadata::MetadataMemoryStore;
use crate::records::RecordMemoryStore;
use crate::validation::SchemaError;

/// In-memory store.
///
/// This does not persist data permamently, all changes are lost when the process ends. Use this
/// only in development or test contexts.
///
/// Cloned instances share the same state.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    pub metadata: MetadataMemoryStore,
    pub records: RecordMemoryStore,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

// Trait implementations are in the regarding modules, see for example `metadata` or `records`.

#[derive(Debug, Error)]
pub enum MemoryStoreError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("record {1} does not exist in table '{0}'")]
    RecordNotFound(String, RecordId),
}
