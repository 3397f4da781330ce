// SPDX-License-Identifier: MIT OR Apache-2.0

use purposize_core::{
    Constraint, FieldType, Join, PurposeDefinition, PurposeId, Query, Record, TableSchema, Value,
};

use crate::assert_all_stores;
use crate::metadata::MetadataWriter;
use crate::records::RecordStore;

fn customers() -> TableSchema {
    TableSchema::new("Customers")
        .field("unfulfilledOrders", FieldType::Integer)
        .personal_field("eMail", FieldType::Text)
        .personal_field("postalAddress", FieldType::Text)
        .field("isVip", FieldType::Boolean)
}

fn any_of(purposes: &[&str]) -> Join {
    Join::AttachedPurposes {
        any_of: purposes.iter().map(|id| PurposeId::new(id)).collect(),
    }
}

#[tokio::test]
async fn insert_and_update() {
    assert_all_stores!(|store| async {
        let schema = customers();
        store.create_table(&schema).await.unwrap();
        // Creating the same table again is fine.
        store.create_table(&schema).await.unwrap();

        // 1. Inserted records get consecutive ids, missing fields are persisted as `Null`.
        let alice = store
            .save(
                &schema,
                Record::new("Customers")
                    .with("eMail", "alice@example.com")
                    .with("unfulfilledOrders", 2),
            )
            .await
            .unwrap();
        assert_eq!(alice.id, Some(1));
        assert_eq!(alice.get("postalAddress"), Some(&Value::Null));
        assert_eq!(alice.get("isVip"), Some(&Value::Null));

        let bob = store
            .save(&schema, Record::new("Customers").with("isVip", true))
            .await
            .unwrap();
        assert_eq!(bob.id, Some(2));
        assert_eq!(bob.get("isVip"), Some(&Value::Boolean(true)));

        // 2. Updates only touch the given fields.
        let alice = store
            .save(
                &schema,
                Record::new("Customers")
                    .with_id(1)
                    .with("postalAddress", "Alice Street 1"),
            )
            .await
            .unwrap();
        assert_eq!(alice.get("eMail"), Some(&Value::from("alice@example.com")));
        assert_eq!(alice.get("postalAddress"), Some(&Value::from("Alice Street 1")));
        assert_eq!(alice.get("unfulfilledOrders"), Some(&Value::Integer(2)));

        // 3. Updating a record which doesn't exist fails.
        assert!(
            store
                .save(&schema, Record::new("Customers").with_id(42).with("isVip", false))
                .await
                .is_err()
        );

        // 4. Unknown fields and wrongly typed values are rejected.
        assert!(
            store
                .save(&schema, Record::new("Customers").with("age", 32))
                .await
                .is_err()
        );
        assert!(
            store
                .save(&schema, Record::new("Customers").with("isVip", "yes"))
                .await
                .is_err()
        );
    });
}

#[tokio::test]
async fn filter_and_project() {
    assert_all_stores!(|store| async {
        let schema = customers();
        store.create_table(&schema).await.unwrap();

        for (email, orders) in [
            ("alice@example.com", Value::Integer(0)),
            ("bob@example.com", Value::Integer(3)),
            ("carol@example.com", Value::Null),
        ] {
            store
                .save(
                    &schema,
                    Record::new("Customers")
                        .with("eMail", email)
                        .with("unfulfilledOrders", orders),
                )
                .await
                .unwrap();
        }

        // 1. Without any filter all records are returned, ordered by id.
        let all = store.find_all(&schema, &Query::new()).await.unwrap();
        assert_eq!(
            all.iter().map(|record| record.id).collect::<Vec<_>>(),
            vec![Some(1), Some(2), Some(3)]
        );

        // 2. Comparisons.
        let query = Query::new().filter("unfulfilledOrders", Constraint::Gt(Value::Integer(0)));
        let found = store.find_all(&schema, &query).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].get("eMail"), Some(&Value::from("bob@example.com")));

        let query = Query::new().filter("unfulfilledOrders", Constraint::equals(Value::Null));
        let found = store.find_all(&schema, &query).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, Some(3));

        let query = Query::new().filter("unfulfilledOrders", Constraint::Ne(Value::Null));
        assert_eq!(store.find_all(&schema, &query).await.unwrap().len(), 2);

        let query = Query::new().filter(
            "eMail",
            Constraint::In(vec!["alice@example.com".into(), "carol@example.com".into()]),
        );
        assert_eq!(store.find_all(&schema, &query).await.unwrap().len(), 2);

        let query = Query::new().filter("eMail", Constraint::In(vec![]));
        assert!(store.find_all(&schema, &query).await.unwrap().is_empty());

        // 3. Filters are combined.
        let query = Query::new()
            .filter("unfulfilledOrders", Constraint::Lte(Value::Integer(3)))
            .filter("eMail", Constraint::Ne("alice@example.com".into()));
        let found = store.find_all(&schema, &query).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, Some(2));

        // 4. Projection keeps the id and the selected fields only.
        let query = Query::new().attributes(["unfulfilledOrders"]).limit(2);
        let found = store.find_all(&schema, &query).await.unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[1].id, Some(2));
        assert_eq!(found[1].fields().collect::<Vec<_>>(), vec!["unfulfilledOrders"]);

        // 5. Find one returns the first match.
        let query = Query::new().filter("unfulfilledOrders", Constraint::Gte(Value::Integer(0)));
        let found = store.find_one(&schema, &query).await.unwrap().unwrap();
        assert_eq!(found.id, Some(1));

        let query = Query::new().filter("eMail", Constraint::equals("dave@example.com"));
        assert!(store.find_one(&schema, &query).await.unwrap().is_none());

        // 6. Unknown fields are rejected.
        let query = Query::new().attributes(["age"]);
        assert!(store.find_all(&schema, &query).await.is_err());
        let query = Query::new().filter("age", Constraint::equals(32));
        assert!(store.find_one(&schema, &query).await.is_err());
    });
}

#[tokio::test]
async fn attached_purposes() {
    assert_all_stores!(|store| async {
        let schema = customers();
        store.create_table(&schema).await.unwrap();

        for purpose in ["ORDER", "NEWSLETTER", "DELIVERY"] {
            store
                .insert_purpose(PurposeDefinition::new(purpose))
                .await
                .unwrap();
        }

        for email in ["alice@example.com", "bob@example.com"] {
            store
                .save(&schema, Record::new("Customers").with("eMail", email))
                .await
                .unwrap();
        }

        let order = PurposeId::new("ORDER");
        let newsletter = PurposeId::new("NEWSLETTER");

        // 1. Attach purposes, attaching the same purpose twice does nothing.
        assert!(store.attach_purpose("Customers", 1, &newsletter).await.unwrap());
        assert!(store.attach_purpose("Customers", 1, &order).await.unwrap());
        assert!(!store.attach_purpose("Customers", 1, &newsletter).await.unwrap());
        assert!(store.attach_purpose("Customers", 2, &order).await.unwrap());

        // 2. Purposes are returned in the order they got attached.
        assert_eq!(
            store.attached_purposes("Customers", 1).await.unwrap(),
            vec![newsletter.clone(), order.clone()]
        );
        assert!(store.attached_purposes("Customers", 3).await.unwrap().is_empty());

        // 3. Join on attached purposes.
        let query = Query::new().include(any_of(&["NEWSLETTER"]));
        let found = store.find_all(&schema, &query).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, Some(1));

        let query = Query::new().include(any_of(&["NEWSLETTER", "ORDER"]));
        assert_eq!(store.find_all(&schema, &query).await.unwrap().len(), 2);

        let query = Query::new().include(any_of(&["DELIVERY"]));
        assert!(store.find_all(&schema, &query).await.unwrap().is_empty());

        // An empty set of purposes matches nothing.
        let query = Query::new().include(any_of(&[]));
        assert!(store.find_all(&schema, &query).await.unwrap().is_empty());
    });
}
