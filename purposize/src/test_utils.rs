// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixtures shared by unit and integration tests.
use std::sync::{Arc, Mutex};

use purposize_core::{FieldType, PurposeId, Record, TableSchema};

use crate::audit::{AuditSink, LogFn};

/// Purposes used throughout the tests.
///
/// - `ORDER` may read and write `eMail` and `postalAddress`, reads are audited. Its data can also
///   be used for `DELIVERY`.
/// - `NEWSLETTER` may only touch `eMail`.
/// - `DELIVERY` may only touch `postalAddress`, everything is audited.
/// - `ANALYTICS` isn't granted any personal field.
pub const PURPOSES_JSON: &str = r#"{
    "purposes": [
        {
            "purpose": "ORDER",
            "loggingLevel": "ACCESS",
            "compatibleWith": ["DELIVERY"],
            "fields": { "Customers": ["eMail", "postalAddress"] }
        },
        {
            "purpose": "NEWSLETTER",
            "loggingLevel": "NONE",
            "fields": { "Customers": ["eMail"] }
        },
        {
            "purpose": "DELIVERY",
            "loggingLevel": "ALL",
            "fields": { "Customers": ["postalAddress"] }
        },
        {
            "purpose": "ANALYTICS"
        }
    ]
}"#;

/// `Customers` table with the personal fields `eMail` and `postalAddress`.
pub fn customers() -> TableSchema {
    TableSchema::new("Customers")
        .personal_field("eMail", FieldType::Text)
        .personal_field("postalAddress", FieldType::Text)
        .field("unfulfilledOrders", FieldType::Integer)
        .field("isVip", FieldType::Boolean)
}

/// Install a `tracing` subscriber when `RUST_LOG` is set.
pub fn setup_logging() {
    if std::env::var("RUST_LOG").is_ok() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    }
}

/// A single call of an audit sink.
#[derive(Clone, Debug, PartialEq)]
pub struct AuditEntry {
    pub records: Vec<Record>,
    pub purpose: PurposeId,
    pub operation: String,
}

/// Audit sink remembering every call.
#[derive(Clone, Debug, Default)]
pub struct RecordingAuditSink {
    entries: Arc<Mutex<Vec<AuditEntry>>>,
}

impl RecordingAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().expect("lock not poisoned").clone()
    }
}

impl AuditSink for RecordingAuditSink {
    fn log(&self, records: &[Record], purpose: &PurposeId, operation: &str, _log_fn: &LogFn) {
        self.entries
            .lock()
            .expect("lock not poisoned")
            .push(AuditEntry {
                records: records.to_vec(),
                purpose: purpose.clone(),
                operation: operation.to_string(),
            });
    }
}
