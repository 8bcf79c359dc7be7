//! Mutation guarantees against a real `PostgreSQL` database.
//!
//! These tests require:
//! - A running `PostgreSQL` database
//! - `CRM_DATABASE_URL` pointing at it (migrations are applied on connect)
//!
//! Run with: cargo test -p crm-integration-tests -- --ignored

#![allow(clippy::unwrap_used)]

use crm::models::{CustomerInput, OrderInput, ProductInput};
use crm::{ErrorKind, MutationError};
use crm_core::ProductId;
use crm_integration_tests::{dec, pg_engine, unique_email};

#[tokio::test]
#[ignore = "Requires PostgreSQL (CRM_DATABASE_URL)"]
async fn test_duplicate_email_is_rejected() {
    let engine = pg_engine().await;
    let email = unique_email("dup");

    let customer = engine
        .create_customer(&CustomerInput::new("Ann", &email, Some("+1234567890")))
        .await
        .unwrap();
    assert_eq!(customer.email.as_str(), email);

    let err = engine
        .create_customer(&CustomerInput::new("Ann", email.to_uppercase(), None))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EmailExists);

    engine.delete_customer(customer.id).await.unwrap();
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (CRM_DATABASE_URL)"]
async fn test_concurrent_creates_race_on_unique_constraint() {
    let engine = pg_engine().await;
    let email = unique_email("race");
    let input = CustomerInput::new("Racer", &email, None);

    let (a, b) = tokio::join!(engine.create_customer(&input), engine.create_customer(&input));

    let created: Vec<_> = [&a, &b].into_iter().filter_map(|r| r.as_ref().ok()).collect();
    assert_eq!(created.len(), 1);
    let err = a.as_ref().err().or(b.as_ref().err()).unwrap();
    assert_eq!(err.kind(), ErrorKind::EmailExists);

    for customer in created {
        engine.delete_customer(customer.id).await.unwrap();
    }
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (CRM_DATABASE_URL)"]
async fn test_bulk_import_survives_failed_rows() {
    let engine = pg_engine().await;
    let first = unique_email("bulk");
    let second = unique_email("bulk");
    let rows = vec![
        CustomerInput::new("One", &first, None),
        CustomerInput::new("Again", &first, None),
        CustomerInput::new("Bad", unique_email("bulk"), Some("12")),
        CustomerInput::new("Two", &second, Some("555-123-4567")),
    ];

    let result = engine.bulk_create_customers(&rows).await.unwrap();

    let created: Vec<&str> = result.customers.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(created, ["One", "Two"]);
    assert_eq!(
        result.errors,
        [
            format!("Row 2: Email '{first}' already exists"),
            "Row 3: Invalid phone format for '12'".to_owned(),
        ]
    );

    for customer in &result.customers {
        engine.delete_customer(customer.id).await.unwrap();
    }
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (CRM_DATABASE_URL)"]
async fn test_order_lifecycle() {
    let engine = pg_engine().await;
    let customer = engine
        .create_customer(&CustomerInput::new("Buyer", unique_email("order"), None))
        .await
        .unwrap();
    let a = engine
        .create_product(&ProductInput::new("A", dec("10.00"), Some(1)))
        .await
        .unwrap();
    let b = engine
        .create_product(&ProductInput::new("B", dec("25.00"), Some(1)))
        .await
        .unwrap();

    let order = engine
        .create_order(&OrderInput {
            customer_id: customer.id,
            product_ids: vec![b.id, a.id, b.id],
            order_date: None,
        })
        .await
        .unwrap();
    assert_eq!(order.total_amount, dec("35.00"));
    assert_eq!(order.product_ids, vec![a.id, b.id]);

    engine.update_product_price(a.id, dec("11.00")).await.unwrap();
    assert_eq!(
        engine.get_order(order.id).await.unwrap().total_amount,
        dec("35.00")
    );

    let err = engine
        .create_order(&OrderInput {
            customer_id: customer.id,
            product_ids: vec![a.id, ProductId::new(i32::MAX)],
            order_date: None,
        })
        .await
        .unwrap_err();
    assert_eq!(
        err,
        MutationError::InvalidProductIds {
            missing: vec![ProductId::new(i32::MAX)]
        }
    );

    engine.delete_customer(customer.id).await.unwrap();
    assert_eq!(
        engine.get_order(order.id).await.unwrap_err().kind(),
        ErrorKind::NotFound
    );
}
