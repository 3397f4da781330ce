// SPDX-License-Identifier: MIT OR Apache-2.0

/// Macro to run the same test logic against all store backend implementations.
///
/// This macro takes a closure that will be executed against each store type:
/// - In-memory store (`MemoryStore`)
/// - SQLite store (`SqliteStore`)
///
/// ## Example
///
/// ```rust
/// # use purposize_core::{PersonalDataField};
/// # use purposize_store::metadata::{MetadataStore, MetadataWriter};
/// # use purposize_store::assert_all_stores;
/// # async fn run() {
/// assert_all_stores!(|store| async {
///     let field = PersonalDataField::new("Customers", "eMail");
///     assert!(store.insert_personal_field(field).await.unwrap());
///     assert_eq!(store.personal_fields("Customers").await.unwrap(), vec!["eMail"]);
/// });
/// # }
/// ```
#[macro_export]
macro_rules! assert_all_stores {
    (|$store:ident| $test_body:expr) => {
        // Test with MemoryStore.
        {
            let $store = $crate::memory::MemoryStore::default();
            $test_body.await;
        }

        // Test with SqliteStore.
        {
            let $store = $crate::sqlite::SqliteStoreBuilder::new()
                .random_memory_url()
                // We're running in a single test thread and can't have more parallel connections.
                .max_connections(1)
                .build()
                .await
                .unwrap();
            $test_body.await;
        }
    };
}
