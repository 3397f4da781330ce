// SPDX-License-Identifier: MIT OR Apache-2.0

//! Application records and the purposes attached to them.
#[cfg(feature = "memory")]
mod memory;
#[cfg(feature = "sqlite")]
mod sqlite;
#[cfg(test)]
mod tests;
mod traits;

#[cfg(feature = "memory")]
pub use memory::RecordMemoryStore;
pub use traits::RecordStore;
