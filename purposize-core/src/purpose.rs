// SPDX-License-Identifier: MIT OR Apache-2.0

//! Purposes are named legal or business justifications for accessing personal data.
use std::borrow::Borrow;
use std::collections::BTreeSet;
use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unique identifier of a purpose, for example "ORDER" or "NEWSLETTER".
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PurposeId(String);

impl PurposeId {
    pub fn new(id: &str) -> Self {
        Self(id.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for PurposeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PurposeId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for PurposeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Borrow<str> for PurposeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Determines whether reads under a purpose are written to the audit log.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LoggingLevel {
    /// Reads are never audited.
    #[default]
    None,

    /// Every read access is audited.
    Access,

    /// Every read access is audited. Reserved to additionally cover writes.
    All,
}

impl LoggingLevel {
    /// Returns `true` if read access under this level needs to be audited.
    pub fn is_audited(&self) -> bool {
        matches!(self, LoggingLevel::Access | LoggingLevel::All)
    }
}

impl Display for LoggingLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LoggingLevel::None => "NONE",
            LoggingLevel::Access => "ACCESS",
            LoggingLevel::All => "ALL",
        };

        write!(f, "{}", s)
    }
}

impl FromStr for LoggingLevel {
    type Err = LoggingLevelError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "NONE" => Ok(LoggingLevel::None),
            "ACCESS" => Ok(LoggingLevel::Access),
            "ALL" => Ok(LoggingLevel::All),
            other => Err(LoggingLevelError::Unknown(other.to_string())),
        }
    }
}

#[derive(Debug, Error)]
pub enum LoggingLevelError {
    #[error("unknown logging level '{0}', expected NONE, ACCESS or ALL")]
    Unknown(String),
}

/// Definition of a purpose as created during bootstrap.
///
/// `compatible_with` holds the _outgoing_ edges of the directed purpose compatibility graph:
/// records written under this purpose may also be read under the listed purposes. The relation
/// is neither assumed to be symmetric nor transitive, the closure is computed when resolving.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurposeDefinition {
    pub id: PurposeId,
    pub logging_level: LoggingLevel,
    pub compatible_with: BTreeSet<PurposeId>,
}

impl PurposeDefinition {
    pub fn new(id: &str) -> Self {
        Self {
            id: PurposeId::new(id),
            logging_level: LoggingLevel::default(),
            compatible_with: BTreeSet::new(),
        }
    }

    pub fn with_logging_level(mut self, logging_level: LoggingLevel) -> Self {
        self.logging_level = logging_level;
        self
    }

    /// Declare another purpose as directly compatible with this one.
    pub fn compatible_with(mut self, id: &str) -> Self {
        self.compatible_with.insert(PurposeId::new(id));
        self
    }
}

/// Purpose(s) supplied by a caller alongside a read or write request.
///
/// Reads only ever accept a single purpose while writes can attach multiple ones at once.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PurposeInput {
    Single(PurposeId),
    Many(Vec<PurposeId>),
}

impl PurposeInput {
    /// Returns all given purposes in their original order.
    pub fn into_purposes(self) -> Vec<PurposeId> {
        match self {
            PurposeInput::Single(id) => vec![id],
            PurposeInput::Many(ids) => ids,
        }
    }
}

impl From<&str> for PurposeInput {
    fn from(value: &str) -> Self {
        PurposeInput::Single(PurposeId::new(value))
    }
}

impl From<PurposeId> for PurposeInput {
    fn from(value: PurposeId) -> Self {
        PurposeInput::Single(value)
    }
}

impl From<Vec<&str>> for PurposeInput {
    fn from(value: Vec<&str>) -> Self {
        PurposeInput::Many(value.into_iter().map(PurposeId::new).collect())
    }
}

impl<const N: usize> From<[&str; N]> for PurposeInput {
    fn from(value: [&str; N]) -> Self {
        PurposeInput::Many(value.into_iter().map(PurposeId::new).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::{LoggingLevel, PurposeDefinition, PurposeId, PurposeInput};

    #[test]
    fn logging_level_serde() {
        let level: LoggingLevel = serde_json::from_str("\"ACCESS\"").unwrap();
        assert_eq!(level, LoggingLevel::Access);
        assert_eq!("ALL".parse::<LoggingLevel>().unwrap(), LoggingLevel::All);
        assert!("access".parse::<LoggingLevel>().is_err());

        assert!(!LoggingLevel::None.is_audited());
        assert!(LoggingLevel::Access.is_audited());
        assert!(LoggingLevel::All.is_audited());
    }

    #[test]
    fn purpose_definition_from_json() {
        let definition: PurposeDefinition = serde_json::from_str(
            r#"{ "id": "ORDER", "loggingLevel": "ALL", "compatibleWith": ["DELIVERY"] }"#,
        )
        .unwrap();

        assert_eq!(
            definition,
            PurposeDefinition::new("ORDER")
                .with_logging_level(LoggingLevel::All)
                .compatible_with("DELIVERY")
        );
    }

    #[test]
    fn purpose_input_keeps_order() {
        let input = PurposeInput::from(["ORDER", "NEWSLETTER"]);
        assert_eq!(
            input.into_purposes(),
            vec![PurposeId::new("ORDER"), PurposeId::new("NEWSLETTER")]
        );

        let input: PurposeInput = serde_json::from_str("\"ORDER\"").unwrap();
        assert_eq!(input, PurposeInput::Single(PurposeId::new("ORDER")));
    }
}
