// SPDX-License-Identifier: MIT OR Apache-2.0

//! Audit trail of personal data accessed under a purpose.
use std::fmt;
use std::sync::Arc;

use purposize_core::{PurposeId, Record};
use tracing::info;

/// Callback receiving audit lines.
pub type LogFn = Arc<dyn Fn(&str) + Send + Sync>;

/// Returns the default log function which emits every line as a `tracing` event with the
/// `purposize::audit` target.
pub fn default_log_function() -> LogFn {
    Arc::new(|line: &str| info!(target: "purposize::audit", "{line}"))
}

/// Receives the results of reads under purposes with an audited logging level.
pub trait AuditSink {
    fn log(&self, records: &[Record], purpose: &PurposeId, operation: &str, log_fn: &LogFn);
}

/// Writes one line per record through the log function, listing the returned fields:
///
/// ```text
/// read Customers#2 for purpose ORDER: eMail, postalAddress, unfulfilledOrders
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct RecordAuditSink;

impl AuditSink for RecordAuditSink {
    fn log(&self, records: &[Record], purpose: &PurposeId, operation: &str, log_fn: &LogFn) {
        for record in records {
            log_fn(&AuditLine::new(record, purpose, operation).to_string());
        }
    }
}

struct AuditLine<'a> {
    record: &'a Record,
    purpose: &'a PurposeId,
    operation: &'a str,
}

impl<'a> AuditLine<'a> {
    fn new(record: &'a Record, purpose: &'a PurposeId, operation: &'a str) -> Self {
        Self {
            record,
            purpose,
            operation,
        }
    }
}

impl fmt::Display for AuditLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}#", self.operation, self.record.table)?;
        match self.record.id {
            Some(id) => write!(f, "{id}")?,
            None => write!(f, "?")?,
        }
        let fields: Vec<&str> = self.record.fields().collect();
        write!(f, " for purpose {}: {}", self.purpose, fields.join(", "))
    }
}
