// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read queries as they are handed to record stores.
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::purpose::PurposeId;
use crate::value::Value;

/// Condition a single field value needs to fulfill.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Constraint {
    /// Equal to the value. `Eq(Null)` matches fields without a value.
    Eq(Value),
    /// Not equal to the value. `Ne(Null)` matches fields with a value.
    Ne(Value),
    In(Vec<Value>),
    Gt(Value),
    Gte(Value),
    Lt(Value),
    Lte(Value),
}

impl Constraint {
    pub fn equals(value: impl Into<Value>) -> Self {
        Constraint::Eq(value.into())
    }

    /// Returns `true` if the given field value satisfies this constraint. Missing values are
    /// treated as `Null`.
    pub fn matches(&self, value: Option<&Value>) -> bool {
        let value = value.unwrap_or(&Value::Null);

        match self {
            Constraint::Eq(Value::Null) => value.is_null(),
            Constraint::Ne(Value::Null) => !value.is_null(),
            Constraint::Eq(expected) => value.compare(expected) == Some(Ordering::Equal),
            Constraint::Ne(expected) => matches!(
                value.compare(expected),
                Some(Ordering::Less | Ordering::Greater)
            ),
            Constraint::In(candidates) => candidates
                .iter()
                .any(|candidate| value.compare(candidate) == Some(Ordering::Equal)),
            Constraint::Gt(bound) => value.compare(bound) == Some(Ordering::Greater),
            Constraint::Gte(bound) => matches!(
                value.compare(bound),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            Constraint::Lt(bound) => value.compare(bound) == Some(Ordering::Less),
            Constraint::Lte(bound) => {
                matches!(value.compare(bound), Some(Ordering::Less | Ordering::Equal))
            }
        }
    }
}

/// Joins on relations kept by the record store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Join {
    /// Only keep records which have at least one of these purposes attached.
    AttachedPurposes { any_of: BTreeSet<PurposeId> },
}

/// Filter, projection and joins of a read.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub filter: BTreeMap<String, Constraint>,
    /// Fields to return, `None` returns every field.
    pub attributes: Option<Vec<String>>,
    pub include: Vec<Join>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, field: &str, constraint: Constraint) -> Self {
        self.filter.insert(field.to_string(), constraint);
        self
    }

    pub fn attributes<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn include(mut self, join: Join) -> Self {
        self.include.push(join);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}
