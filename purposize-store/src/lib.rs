// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence for purpose-based access control.
//!
//! Two kinds of data are stored: the metadata relations describing purposes and which personal
//! data fields they may touch (see `MetadataStore`) and the application records themselves,
//! together with the purposes they were collected for (see `RecordStore`).
//!
//! Every interface comes with an in-memory and an SQLite implementation.
#[cfg(feature = "memory")]
pub mod memory;
pub mod metadata;
pub mod records;
#[cfg(feature = "sqlite")]
pub mod sqlite;
#[cfg(any(test, feature = "test_utils"))]
mod test_utils;
pub mod validation;

#[cfg(feature = "memory")]
pub use memory::{MemoryStore, MemoryStoreError};
pub use metadata::{MetadataStore, MetadataWriter};
pub use records::RecordStore;
#[cfg(feature = "sqlite")]
pub use sqlite::{SqliteError, SqliteStore, SqliteStoreBuilder};
pub use validation::SchemaError;
