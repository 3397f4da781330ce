// SPDX-License-Identifier: MIT OR Apache-2.0

//! Explicit table schemas.
//!
//! Every table which is protected needs to be described up-front: which fields it declares, what
//! type they have and whether they contain personal data. Field names which are not part of the
//! schema are never accepted by the stores.
use serde::{Deserialize, Serialize};

use crate::metadata::PersonalDataField;
use crate::value::Value;

/// Type of a field value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Integer,
    Real,
    Boolean,
}

impl FieldType {
    /// Returns `true` if the value can be stored in a field of this type.
    ///
    /// `Null` is accepted for every type.
    pub fn accepts(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (_, Value::Null)
                | (FieldType::Text, Value::Text(_))
                | (FieldType::Integer, Value::Integer(_))
                | (FieldType::Real, Value::Real(_))
                | (FieldType::Real, Value::Integer(_))
                | (FieldType::Boolean, Value::Boolean(_))
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSchema {
    pub name: String,
    pub field_type: FieldType,
    #[serde(default)]
    pub personal: bool,
}

/// Declared fields of a table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub name: String,
    pub fields: Vec<FieldSchema>,
}

impl TableSchema {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            fields: Vec::new(),
        }
    }

    /// Add a field which does not contain personal data.
    pub fn field(mut self, name: &str, field_type: FieldType) -> Self {
        self.fields.push(FieldSchema {
            name: name.to_string(),
            field_type,
            personal: false,
        });
        self
    }

    /// Add a field which contains personal data.
    pub fn personal_field(mut self, name: &str, field_type: FieldType) -> Self {
        self.fields.push(FieldSchema {
            name: name.to_string(),
            field_type,
            personal: true,
        });
        self
    }

    /// Returns the names of all declared fields in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|field| field.name.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Returns the personal data declarations of this table, as registered in the metadata store
    /// during bootstrap.
    pub fn personal_data_fields(&self) -> Vec<PersonalDataField> {
        self.fields
            .iter()
            .filter(|field| field.personal)
            .map(|field| PersonalDataField::new(&self.name, &field.name))
            .collect()
    }
}
