// SPDX-License-Identifier: MIT OR Apache-2.0

use purposize_core::PurposeId;
use thiserror::Error;

/// Rejections of the purpose policy.
///
/// Requests failing with one of these never reach the record store.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("Unknown purpose: {0}")]
    UnknownPurpose(PurposeId),

    #[error("Incorrect purpose format: {0}")]
    InvalidPurposeFormat(String),

    #[error("Please specify a purpose when creating a new instance that contains personal data!")]
    PurposeRequired,

    #[error("{}", incompatible_field_message(field, purposes))]
    IncompatibleField {
        field: String,
        purposes: Vec<PurposeId>,
    },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl PolicyError {
    pub(crate) fn incompatible_field(field: &str, purposes: &[PurposeId]) -> Self {
        Self::IncompatibleField {
            field: field.to_string(),
            purposes: purposes.to_vec(),
        }
    }
}

fn incompatible_field_message(field: &str, purposes: &[PurposeId]) -> String {
    if purposes.is_empty() {
        format!(
            "Please specify a purpose when querying for personal data fields such as \"{field}\""
        )
    } else {
        let purposes: Vec<&str> = purposes.iter().map(PurposeId::as_str).collect();
        format!(
            "Field \"{field}\" is incompatible with purpose(s): {}",
            purposes.join(", ")
        )
    }
}

/// Error of checks which only consult the metadata store.
#[derive(Debug, Error)]
pub enum AuthorizationError<E> {
    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error("{0}")]
    Metadata(E),
}

/// Error returned by the authorized read and write methods.
///
/// `M` is the error of the metadata store and `S` the error of the record store. Store errors are
/// passed through as-is.
#[derive(Debug, Error)]
pub enum PurposizeError<M, S> {
    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error("{0}")]
    Metadata(M),

    #[error("{0}")]
    Store(S),

    /// The record store persisted a record without handing out its id, purposes can't be
    /// attached to it.
    #[error("record store returned a record of table {0} without id")]
    MissingRecordId(String),
}

impl<M, S> PurposizeError<M, S> {
    /// Returns the policy rejection if this error is one.
    pub fn policy(&self) -> Option<&PolicyError> {
        match self {
            PurposizeError::Policy(err) => Some(err),
            _ => None,
        }
    }
}

impl<M, S> From<AuthorizationError<M>> for PurposizeError<M, S> {
    fn from(err: AuthorizationError<M>) -> Self {
        match err {
            AuthorizationError::Policy(err) => PurposizeError::Policy(err),
            AuthorizationError::Metadata(err) => PurposizeError::Metadata(err),
        }
    }
}
