// SPDX-License-Identifier: MIT OR Apache-2.0

//! Purpose definitions, personal data field declarations and grants.
#[cfg(feature = "memory")]
mod memory;
#[cfg(feature = "sqlite")]
mod sqlite;
mod traits;

#[cfg(feature = "memory")]
pub use memory::MetadataMemoryStore;
pub use traits::{MetadataStore, MetadataWriter};
