// SPDX-License-Identifier: MIT OR Apache-2.0

//! Purpose-based access control for personal data fields.
//!
//! Fields of a table can be declared as personal data. Reading or writing them requires a
//! purpose which was granted access to them, following the "purpose limitation" principle of the
//! GDPR. Fields which are not personal can be read without any purpose.
//!
//! `Purposize` sits in front of a `RecordStore` and checks every request before passing it on:
//!
//! - Reads (`AuthorizedRead`) may only filter by and select fields allowed for their purpose.
//!   Without an explicit selection they return exactly the allowed fields. Under a purpose only
//!   records collected for a compatible purpose are returned, compatibility between purposes is
//!   resolved transitively.
//! - Writes (`AuthorizedWrite`) carrying personal data need to name purposes covering every
//!   personal field. These purposes are attached to the record and stay with it. Personal data is
//!   removed from the returned record.
//!
//! Purposes, personal field declarations and grants live in a `MetadataStore` and are usually
//! loaded with the `bootstrap` module.
pub mod audit;
pub mod bootstrap;
pub mod cache;
pub mod classifier;
pub mod config;
mod engine;
mod error;
pub mod graph;
mod read;
pub mod request;
pub mod resolver;
#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;
mod write;

pub use audit::{AuditSink, LogFn, RecordAuditSink};
pub use cache::CachedMetadata;
pub use classifier::FieldClassifier;
pub use config::Config;
pub use engine::Purposize;
pub use error::{AuthorizationError, PolicyError, PurposizeError};
pub use read::{AuthorizedQuery, AuthorizedRead, READ_OPERATION};
pub use request::{ReadRequest, WriteOptions};
pub use resolver::PurposeResolver;
pub use write::{AuthorizedWrite, WritePlan};
