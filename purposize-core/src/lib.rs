// SPDX-License-Identifier: MIT OR Apache-2.0

//! Data types for purpose-based access control of personal data.
//!
//! Tables are described by a `TableSchema` which marks some of their fields as personal data.
//! Access to personal data is only granted for a declared purpose (`PurposeDefinition`), which
//! is linked to the fields it may expose through `PurposeGrant`s.
pub mod metadata;
pub mod purpose;
pub mod query;
pub mod record;
pub mod schema;
pub mod value;

pub use metadata::{PersonalDataField, PurposeGrant};
pub use purpose::{LoggingLevel, LoggingLevelError, PurposeDefinition, PurposeId, PurposeInput};
pub use query::{Constraint, Join, Query};
pub use record::{Record, RecordId};
pub use schema::{FieldSchema, FieldType, TableSchema};
pub use value::Value;
