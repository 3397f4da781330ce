// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read requests and write options, either built in code or parsed from JSON.
//!
//! JSON read requests look like this:
//!
//! ```json
//! {
//!   "where": { "eMail": "bob@email.com", "unfulfilledOrders": { "gt": 0 } },
//!   "attributes": ["eMail"],
//!   "purpose": "ORDER",
//!   "limit": 10
//! }
//! ```
//!
//! Filter values are either plain values (equality), lists (membership) or an object with a
//! single operator out of `eq`, `ne`, `in`, `gt`, `gte`, `lt` and `lte`. Joins are managed by the
//! engine and can't be requested.
use purposize_core::{Constraint, PurposeId, PurposeInput, Query, Value};
use serde_json::Value as JsonValue;

use crate::error::PolicyError;

/// A read of records, optionally under a purpose.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReadRequest {
    pub query: Query,
    pub purpose: Option<PurposeInput>,
    /// Overrides the configured audit logging for this read.
    pub logging: Option<bool>,
}

impl ReadRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_query(query: Query) -> Self {
        Self {
            query,
            ..Self::default()
        }
    }

    pub fn purpose(mut self, purpose: impl Into<PurposeInput>) -> Self {
        self.purpose = Some(purpose.into());
        self
    }

    pub fn logging(mut self, enabled: bool) -> Self {
        self.logging = Some(enabled);
        self
    }

    pub fn filter(mut self, field: &str, constraint: Constraint) -> Self {
        self.query = self.query.filter(field, constraint);
        self
    }

    pub fn attributes<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.query = self.query.attributes(fields);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.query = self.query.limit(limit);
        self
    }

    /// Parses a JSON read request.
    pub fn from_json(json: &JsonValue) -> Result<Self, PolicyError> {
        let object = json
            .as_object()
            .ok_or_else(|| PolicyError::InvalidRequest("read request must be an object".into()))?;

        let mut request = ReadRequest::new();
        for (key, value) in object {
            match key.as_str() {
                "where" => {
                    let filter = value.as_object().ok_or_else(|| {
                        PolicyError::InvalidRequest("\"where\" must be an object".into())
                    })?;
                    for (field, constraint) in filter {
                        let constraint = parse_constraint(constraint)?;
                        request.query.filter.insert(field.clone(), constraint);
                    }
                }
                "attributes" => {
                    let attributes = value
                        .as_array()
                        .and_then(|fields| {
                            fields
                                .iter()
                                .map(|field| field.as_str().map(str::to_string))
                                .collect::<Option<Vec<String>>>()
                        })
                        .ok_or_else(|| {
                            PolicyError::InvalidRequest(
                                "\"attributes\" must be a list of field names".into(),
                            )
                        })?;
                    request.query.attributes = Some(attributes);
                }
                "purpose" => request.purpose = Some(parse_purpose(value)?),
                "limit" => {
                    let limit = value
                        .as_u64()
                        .and_then(|limit| usize::try_from(limit).ok())
                        .ok_or_else(|| {
                            PolicyError::InvalidRequest("\"limit\" must be a positive integer".into())
                        })?;
                    request.query.limit = Some(limit);
                }
                "logging" => {
                    let logging = value.as_bool().ok_or_else(|| {
                        PolicyError::InvalidRequest("\"logging\" must be a boolean".into())
                    })?;
                    request.logging = Some(logging);
                }
                "include" => {
                    return Err(PolicyError::InvalidRequest(
                        "\"include\" is managed by the engine".into(),
                    ));
                }
                other => {
                    return Err(PolicyError::InvalidRequest(format!(
                        "unknown key \"{other}\""
                    )));
                }
            }
        }

        Ok(request)
    }
}

/// Purposes given to a write.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WriteOptions {
    pub purpose: Option<PurposeInput>,
}

impl WriteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn purpose(mut self, purpose: impl Into<PurposeInput>) -> Self {
        self.purpose = Some(purpose.into());
        self
    }

    /// Parses JSON write options, `{ "purpose": "ORDER" }` or `{ "purpose": ["ORDER", "NEWSLETTER"] }`.
    pub fn from_json(json: &JsonValue) -> Result<Self, PolicyError> {
        let object = json
            .as_object()
            .ok_or_else(|| PolicyError::InvalidRequest("write options must be an object".into()))?;

        let mut options = WriteOptions::new();
        for (key, value) in object {
            match key.as_str() {
                "purpose" => options.purpose = Some(parse_purpose(value)?),
                other => {
                    return Err(PolicyError::InvalidRequest(format!(
                        "unknown key \"{other}\""
                    )));
                }
            }
        }

        Ok(options)
    }
}

/// Parses a purpose given as a single identifier or a list of identifiers.
///
/// Any other shape fails with `InvalidPurposeFormat`. Whether a list is accepted depends on the
/// operation, reads only take a single purpose.
pub fn parse_purpose(value: &JsonValue) -> Result<PurposeInput, PolicyError> {
    match value {
        JsonValue::String(id) => Ok(PurposeInput::Single(PurposeId::new(id))),
        JsonValue::Array(ids) => ids
            .iter()
            .map(|id| match id {
                JsonValue::String(id) => Ok(PurposeId::new(id)),
                other => Err(PolicyError::InvalidPurposeFormat(format!(
                    "expected a purpose identifier in list, got {other}"
                ))),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(PurposeInput::Many),
        other => Err(PolicyError::InvalidPurposeFormat(format!(
            "expected a purpose identifier or a list of them, got {other}"
        ))),
    }
}

fn parse_value(value: &JsonValue) -> Result<Value, PolicyError> {
    match value {
        JsonValue::Null => Ok(Value::Null),
        JsonValue::Bool(value) => Ok(Value::Boolean(*value)),
        JsonValue::Number(number) => match number.as_i64() {
            Some(value) => Ok(Value::Integer(value)),
            None => number.as_f64().map(Value::Real).ok_or_else(|| {
                PolicyError::InvalidRequest(format!("unsupported number {number}"))
            }),
        },
        JsonValue::String(value) => Ok(Value::Text(value.clone())),
        other => Err(PolicyError::InvalidRequest(format!(
            "unsupported filter value {other}"
        ))),
    }
}

fn parse_values(value: &JsonValue) -> Result<Vec<Value>, PolicyError> {
    value
        .as_array()
        .ok_or_else(|| PolicyError::InvalidRequest(format!("expected a list, got {value}")))?
        .iter()
        .map(parse_value)
        .collect()
}

fn parse_constraint(value: &JsonValue) -> Result<Constraint, PolicyError> {
    match value {
        JsonValue::Array(_) => Ok(Constraint::In(parse_values(value)?)),
        JsonValue::Object(operators) => {
            let mut operators = operators.iter();
            let (Some((operator, operand)), None) = (operators.next(), operators.next()) else {
                return Err(PolicyError::InvalidRequest(
                    "filter objects need exactly one operator".into(),
                ));
            };

            match operator.as_str() {
                "eq" => Ok(Constraint::Eq(parse_value(operand)?)),
                "ne" => Ok(Constraint::Ne(parse_value(operand)?)),
                "in" => Ok(Constraint::In(parse_values(operand)?)),
                "gt" => Ok(Constraint::Gt(parse_value(operand)?)),
                "gte" => Ok(Constraint::Gte(parse_value(operand)?)),
                "lt" => Ok(Constraint::Lt(parse_value(operand)?)),
                "lte" => Ok(Constraint::Lte(parse_value(operand)?)),
                other => Err(PolicyError::InvalidRequest(format!(
                    "unknown operator \"{other}\""
                ))),
            }
        }
        value => Ok(Constraint::Eq(parse_value(value)?)),
    }
}
