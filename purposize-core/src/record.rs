// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Primary key of a record, assigned by the record store on first insertion.
pub type RecordId = i64;

/// One row of a table.
///
/// The purposes a record was created or updated under are _not_ part of this struct. They are a
/// durable relation kept by the record store, see `attached_purposes`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub table: String,
    pub id: Option<RecordId>,
    pub values: BTreeMap<String, Value>,
}

impl Record {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            id: None,
            values: BTreeMap::new(),
        }
    }

    pub fn with_id(mut self, id: RecordId) -> Self {
        self.id = Some(id);
        self
    }

    /// Set a field value, builder-style.
    pub fn with(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.set(field, value);
        self
    }

    pub fn set(&mut self, field: &str, value: impl Into<Value>) {
        self.values.insert(field.to_string(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    /// Returns `true` if the record carries a value other than `Null` for this field.
    pub fn has_value(&self, field: &str) -> bool {
        self.get(field).is_some_and(|value| !value.is_null())
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.values.remove(field)
    }

    /// Names of all fields present on this record.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(|field| field.as_str())
    }

    /// Keep only the given fields.
    pub fn project(&mut self, fields: &[String]) {
        self.values.retain(|field, _| fields.contains(field));
    }
}

#[cfg(test)]
mod tests {
    use super::Record;
    use crate::Value;

    #[test]
    fn values() {
        let record = Record::new("Customers")
            .with("eMail", "bob@email.com")
            .with("postalAddress", Value::Null)
            .with("unfulfilledOrders", 2);

        assert!(record.has_value("eMail"));
        assert!(!record.has_value("postalAddress"));
        assert!(!record.has_value("phone"));
    }

    #[test]
    fn projection() {
        let mut record = Record::new("Customers")
            .with_id(1)
            .with("eMail", "bob@email.com")
            .with("unfulfilledOrders", 2);

        record.project(&["unfulfilledOrders".to_string()]);
        assert_eq!(record.fields().collect::<Vec<_>>(), vec!["unfulfilledOrders"]);
        assert_eq!(record.id, Some(1));
    }
}
