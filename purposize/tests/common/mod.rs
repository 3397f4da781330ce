// SPDX-License-Identifier: MIT OR Apache-2.0

#![allow(dead_code)]

use purposize::bootstrap::PurposesConfig;
use purposize::test_utils::{PURPOSES_JSON, RecordingAuditSink, customers, setup_logging};
use purposize::{AuthorizedWrite, Purposize, WriteOptions};
use purposize_core::Record;
use purposize_store::{MetadataStore, MetadataWriter, RecordStore};

pub type Engine<T> = Purposize<T, T, RecordingAuditSink>;

/// Engine with the `Customers` table and all fixture purposes, using the same store for metadata
/// and records.
pub async fn engine<T>(store: T) -> Engine<T>
where
    T: Clone + MetadataStore + MetadataWriter<Error = <T as MetadataStore>::Error> + RecordStore,
{
    setup_logging();

    let engine = Purposize::new(store.clone(), store).with_audit_sink(RecordingAuditSink::new());
    engine.register_table(&customers()).await.unwrap();
    engine
        .load_purposes(&PurposesConfig::from_json(PURPOSES_JSON).unwrap())
        .await
        .unwrap();
    engine
}

/// Inserts alice (purpose `ORDER`) and bob (purposes `ORDER` and `NEWSLETTER`).
pub async fn insert_customers<T>(engine: &Engine<T>)
where
    T: MetadataStore + RecordStore,
{
    engine
        .save(
            &customers(),
            Record::new("Customers")
                .with("eMail", "alice@email.com")
                .with("postalAddress", "1234 Shoppington")
                .with("unfulfilledOrders", 1),
            WriteOptions::new().purpose("ORDER"),
        )
        .await
        .unwrap();

    engine
        .save(
            &customers(),
            Record::new("Customers")
                .with("eMail", "bob@email.com")
                .with("postalAddress", "1234 Buytown")
                .with("unfulfilledOrders", 2),
            WriteOptions::new().purpose(vec!["ORDER", "NEWSLETTER"]),
        )
        .await
        .unwrap();
}

/// Runs the test body against an engine backed by `MemoryStore` and one backed by `SqliteStore`.
macro_rules! assert_all_engines {
    (|$engine:ident| $test_body:expr) => {
        {
            let $engine = common::engine(purposize_store::MemoryStore::new()).await;
            $test_body.await;
        }

        {
            let $engine = common::engine(purposize_store::SqliteStore::temporary().await).await;
            $test_body.await;
        }
    };
}
