// SPDX-License-Identifier: MIT OR Apache-2.0

#[macro_use]
mod common;

use purposize::test_utils::customers;
use purposize::{AuthorizedRead, AuthorizedWrite, PolicyError, ReadRequest, WriteOptions};
use purposize_core::{PurposeId, Record, Value};
use purposize_store::RecordStore;
use serde_json::json;

#[tokio::test]
async fn create_with_purposes() {
    assert_all_engines!(|engine| async {
        let bob = engine
            .save(
                &customers(),
                Record::new("Customers")
                    .with("eMail", "bob@x.com")
                    .with("postalAddress", "1234 Buytown")
                    .with("unfulfilledOrders", 2),
                WriteOptions::from_json(&json!({ "purpose": ["ORDER", "NEWSLETTER"] })).unwrap(),
            )
            .await
            .unwrap();

        // Personal data never leaves a write.
        let id = bob.id.unwrap();
        assert_eq!(bob.get("eMail"), None);
        assert_eq!(bob.get("postalAddress"), None);
        assert_eq!(bob.get("unfulfilledOrders"), Some(&Value::Integer(2)));

        assert_eq!(
            engine.store().attached_purposes("Customers", id).await.unwrap(),
            vec![PurposeId::new("ORDER"), PurposeId::new("NEWSLETTER")]
        );

        // NEWSLETTER may read the e-mail address but not the postal address.
        let err = engine
            .find_all(
                &customers(),
                ReadRequest::new()
                    .purpose("NEWSLETTER")
                    .attributes(["postalAddress"]),
            )
            .await
            .unwrap_err();
        assert!(matches!(err.policy(), Some(PolicyError::IncompatibleField { .. })));

        let records = engine
            .find_all(
                &customers(),
                ReadRequest::new().purpose("NEWSLETTER").attributes(["eMail"]),
            )
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].fields().collect::<Vec<_>>(), vec!["eMail"]);
        assert_eq!(records[0].get("eMail"), Some(&Value::from("bob@x.com")));
    });
}

#[tokio::test]
async fn rejected_writes_persist_nothing() {
    assert_all_engines!(|engine| async {
        let alice = Record::new("Customers")
            .with("eMail", "alice@email.com")
            .with("postalAddress", "1234 Shoppington");

        let err = engine
            .save(&customers(), alice.clone(), WriteOptions::new())
            .await
            .unwrap_err();
        assert_eq!(err.policy(), Some(&PolicyError::PurposeRequired));

        let err = engine
            .save(&customers(), alice.clone(), WriteOptions::new().purpose("TEST"))
            .await
            .unwrap_err();
        assert_eq!(
            err.policy(),
            Some(&PolicyError::UnknownPurpose(PurposeId::new("TEST")))
        );

        let err = engine
            .save(
                &customers(),
                alice.clone(),
                WriteOptions::new().purpose("NEWSLETTER"),
            )
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Field \"postalAddress\" is incompatible with purpose(s): NEWSLETTER"
        );

        let err = WriteOptions::from_json(&json!({ "purpose": { "name": "ORDER" } })).unwrap_err();
        assert!(matches!(err, PolicyError::InvalidPurposeFormat(_)));

        assert!(
            engine
                .find_all(&customers(), ReadRequest::new())
                .await
                .unwrap()
                .is_empty()
        );
    });
}

#[tokio::test]
async fn non_personal_writes_need_no_purpose() {
    assert_all_engines!(|engine| async {
        let record = engine
            .save(
                &customers(),
                Record::new("Customers")
                    .with("unfulfilledOrders", 5)
                    .with("isVip", true)
                    .with("eMail", Value::Null),
                WriteOptions::new(),
            )
            .await
            .unwrap();
        let id = record.id.unwrap();
        assert_eq!(record.get("isVip"), Some(&Value::Boolean(true)));
        assert!(
            engine
                .store()
                .attached_purposes("Customers", id)
                .await
                .unwrap()
                .is_empty()
        );

        // Adding personal data later on requires a purpose.
        let err = engine
            .save(
                &customers(),
                Record::new("Customers")
                    .with_id(id)
                    .with("eMail", "carol@email.com"),
                WriteOptions::new(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.policy(), Some(&PolicyError::PurposeRequired));

        engine
            .save(
                &customers(),
                Record::new("Customers")
                    .with_id(id)
                    .with("eMail", "carol@email.com"),
                WriteOptions::new().purpose("NEWSLETTER"),
            )
            .await
            .unwrap();

        // Updates covered by attached purposes don't need them again.
        let updated = engine
            .save(
                &customers(),
                Record::new("Customers")
                    .with_id(id)
                    .with("eMail", "carol@example.com")
                    .with("unfulfilledOrders", 4),
                WriteOptions::new(),
            )
            .await
            .unwrap();
        assert_eq!(updated.get("eMail"), None);
        assert_eq!(updated.get("unfulfilledOrders"), Some(&Value::Integer(4)));

        let record = engine
            .find_one(&customers(), ReadRequest::new().purpose("NEWSLETTER"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.get("eMail"), Some(&Value::from("carol@example.com")));
    });
}
