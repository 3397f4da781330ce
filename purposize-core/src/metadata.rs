// SPDX-License-Identifier: MIT OR Apache-2.0

use serde::{Deserialize, Serialize};

use crate::purpose::PurposeId;

/// Marks a field of a table as containing personal data.
///
/// Classification is scoped to the table: a field named "eMail" can be personal in one table and
/// non-personal in another one.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PersonalDataField {
    pub table: String,
    pub field: String,
}

impl PersonalDataField {
    pub fn new(table: &str, field: &str) -> Self {
        Self {
            table: table.to_string(),
            field: field.to_string(),
        }
    }
}

/// Records accessed or written under `purpose` may expose or carry `field` of `table`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PurposeGrant {
    pub purpose: PurposeId,
    pub table: String,
    pub field: String,
}

impl PurposeGrant {
    pub fn new(purpose: &str, table: &str, field: &str) -> Self {
        Self {
            purpose: PurposeId::new(purpose),
            table: table.to_string(),
            field: field.to_string(),
        }
    }
}
