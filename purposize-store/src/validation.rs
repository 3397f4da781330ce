// SPDX-License-Identifier: MIT OR Apache-2.0

//! Schema checks shared by all record store implementations.
use purposize_core::{Constraint, FieldType, Query, Record, TableSchema, Value};
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Error)]
pub enum SchemaError {
    #[error("table '{0}' does not declare a field '{1}'")]
    UnknownField(String, String),

    #[error("value {value} can't be stored in {field_type:?} field '{field}' of table '{table}'")]
    InvalidValue {
        table: String,
        field: String,
        field_type: FieldType,
        value: Value,
    },

    #[error("record of table '{0}' can't be stored in table '{1}'")]
    TableMismatch(String, String),

    #[error("field name '{1}' of table '{0}' is reserved for the record id")]
    ReservedField(String, String),

    #[error("table '{0}' declares field '{1}' more than once")]
    DuplicateField(String, String),
}

/// Name of the primary key column every record table carries next to its declared fields.
pub const ID_FIELD: &str = "id";

/// Checks that a schema can be turned into a table.
pub fn validate_schema(schema: &TableSchema) -> Result<(), SchemaError> {
    let mut seen = std::collections::HashSet::new();
    for field in schema.field_names() {
        if field == ID_FIELD {
            return Err(SchemaError::ReservedField(
                schema.name.clone(),
                field.to_string(),
            ));
        }

        if !seen.insert(field) {
            return Err(SchemaError::DuplicateField(
                schema.name.clone(),
                field.to_string(),
            ));
        }
    }
    Ok(())
}

/// Checks that all fields referenced by the query are declared in the schema and that filter
/// values match the declared field types.
pub fn validate_query(schema: &TableSchema, query: &Query) -> Result<(), SchemaError> {
    for field in query.attributes.iter().flatten() {
        if !schema.has_field(field) {
            return Err(SchemaError::UnknownField(
                schema.name.clone(),
                field.to_string(),
            ));
        }
    }

    for (field, constraint) in &query.filter {
        let Some(field_schema) = schema.get(field) else {
            return Err(SchemaError::UnknownField(schema.name.clone(), field.clone()));
        };

        let values = match constraint {
            Constraint::In(values) => values.as_slice(),
            Constraint::Eq(value)
            | Constraint::Ne(value)
            | Constraint::Gt(value)
            | Constraint::Gte(value)
            | Constraint::Lt(value)
            | Constraint::Lte(value) => std::slice::from_ref(value),
        };

        if let Some(value) = values
            .iter()
            .find(|value| !field_schema.field_type.accepts(value))
        {
            return Err(SchemaError::InvalidValue {
                table: schema.name.clone(),
                field: field.clone(),
                field_type: field_schema.field_type,
                value: value.clone(),
            });
        }
    }

    Ok(())
}

/// Checks that the record belongs to this table and all its values match the declared types.
pub fn validate_record(schema: &TableSchema, record: &Record) -> Result<(), SchemaError> {
    if record.table != schema.name {
        return Err(SchemaError::TableMismatch(
            record.table.clone(),
            schema.name.clone(),
        ));
    }

    for (field, value) in &record.values {
        let Some(field_schema) = schema.get(field) else {
            return Err(SchemaError::UnknownField(schema.name.clone(), field.clone()));
        };

        if !field_schema.field_type.accepts(value) {
            return Err(SchemaError::InvalidValue {
                table: schema.name.clone(),
                field: field.clone(),
                field_type: field_schema.field_type,
                value: value.clone(),
            });
        }
    }

    Ok(())
}
