//! Mutation engine scenarios over the in-memory store.

#![allow(clippy::unwrap_used)]

use crm::models::{CustomerInput, OrderInput, ProductInput};
use crm::{CrmStore, CrmTransaction, ErrorKind, MutationError};
use crm_core::{MAX_PRICE, ProductId};
use crm_integration_tests::{dec, memory_engine, test_now};

#[tokio::test]
async fn test_same_email_twice_yields_one_customer() {
    let engine = memory_engine();
    let input = CustomerInput::new("Ann", "ann@example.com", None);

    let first = engine.create_customer(&input).await;
    let second = engine.create_customer(&input).await;

    assert!(first.is_ok());
    assert_eq!(second.unwrap_err().kind(), ErrorKind::EmailExists);

    let mut tx = engine.store().begin().await.unwrap();
    assert_eq!(tx.summary().await.unwrap().customers, 1);
}

#[tokio::test]
async fn test_concurrent_creates_with_same_email() {
    let engine = memory_engine();
    let input = CustomerInput::new("Ann", "ann@example.com", None);

    let (a, b) = tokio::join!(engine.create_customer(&input), engine.create_customer(&input));

    assert_eq!(usize::from(a.is_ok()) + usize::from(b.is_ok()), 1);
    let err = a.err().or(b.err()).unwrap();
    assert_eq!(err.kind(), ErrorKind::EmailExists);
}

#[tokio::test]
async fn test_bulk_preserves_row_order() {
    let engine = memory_engine();
    let rows = vec![
        CustomerInput::new("Ok", "ok1@example.com", None),
        CustomerInput::new("Dup", "ok1@example.com", None),
        CustomerInput::new("Bad Phone", "bad@example.com", Some("123")),
    ];

    let result = engine.bulk_create_customers(&rows).await.unwrap();

    assert_eq!(result.customers.len(), 1);
    assert_eq!(result.customers.first().map(|c| c.name.as_str()), Some("Ok"));
    assert_eq!(
        result.errors,
        [
            "Row 2: Email 'ok1@example.com' already exists",
            "Row 3: Invalid phone format for '123'",
        ]
    );
}

#[tokio::test]
async fn test_order_total_is_exact_and_frozen() {
    let engine = memory_engine();
    let customer = engine
        .create_customer(&CustomerInput::new("Ann", "ann@example.com", None))
        .await
        .unwrap();
    let cheap = engine
        .create_product(&ProductInput::new("Cheap", dec("10.00"), Some(3)))
        .await
        .unwrap();
    let dear = engine
        .create_product(&ProductInput::new("Dear", dec("25.00"), Some(3)))
        .await
        .unwrap();

    let order = engine
        .create_order(&OrderInput {
            customer_id: customer.id,
            product_ids: vec![cheap.id, dear.id],
            order_date: None,
        })
        .await
        .unwrap();
    assert_eq!(order.total_amount, dec("35.00"));
    assert_eq!(order.total_amount.to_string(), "35.00");
    assert_eq!(order.order_date, test_now());

    engine
        .update_product_price(dear.id, dec("99.99"))
        .await
        .unwrap();
    let stored = engine.get_order(order.id).await.unwrap();
    assert_eq!(stored.total_amount, dec("35.00"));
}

#[tokio::test]
async fn test_failed_orders_persist_nothing() {
    let engine = memory_engine();
    let customer = engine
        .create_customer(&CustomerInput::new("Ann", "ann@example.com", None))
        .await
        .unwrap();
    let product = engine
        .create_product(&ProductInput::new("Pen", dec("1.50"), None))
        .await
        .unwrap();

    let empty = engine
        .create_order(&OrderInput {
            customer_id: customer.id,
            product_ids: vec![],
            order_date: None,
        })
        .await
        .unwrap_err();
    assert_eq!(empty, MutationError::EmptyProductList);

    let partial = engine
        .create_order(&OrderInput {
            customer_id: customer.id,
            product_ids: vec![product.id, ProductId::new(404)],
            order_date: None,
        })
        .await
        .unwrap_err();
    assert_eq!(partial.kind(), ErrorKind::InvalidProductIds);

    let mut tx = engine.store().begin().await.unwrap();
    assert_eq!(tx.summary().await.unwrap().orders, 0);
}

#[tokio::test]
async fn test_zero_price_is_invalid() {
    let engine = memory_engine();
    let err = engine
        .create_product(&ProductInput::new("Free", dec("0"), Some(1)))
        .await
        .unwrap_err();

    let payload = serde_json::to_value(err.payload()).unwrap();
    assert_eq!(
        payload,
        serde_json::json!({ "kind": "InvalidPrice", "message": "Price must be positive" })
    );
}

#[tokio::test]
async fn test_deleting_customer_removes_orders_only() {
    let engine = memory_engine();
    let customer = engine
        .create_customer(&CustomerInput::new("Ann", "ann@example.com", None))
        .await
        .unwrap();
    let product = engine
        .create_product(&ProductInput::new("Pen", dec("1.50"), Some(2)))
        .await
        .unwrap();
    let order = engine
        .create_order(&OrderInput {
            customer_id: customer.id,
            product_ids: vec![product.id],
            order_date: None,
        })
        .await
        .unwrap();

    engine.delete_customer(customer.id).await.unwrap();

    assert_eq!(
        engine.get_order(order.id).await.unwrap_err().kind(),
        ErrorKind::NotFound
    );
    let mut tx = engine.store().begin().await.unwrap();
    let ids = std::collections::BTreeSet::from([product.id]);
    assert_eq!(tx.get_products_by_ids(&ids).await.unwrap(), vec![product]);
}

#[tokio::test]
async fn test_oversized_prices_never_reach_an_order() {
    let engine = memory_engine();
    let customer = engine
        .create_customer(&CustomerInput::new("Ann", "ann@example.com", None))
        .await
        .unwrap();

    let err = engine
        .create_product(&ProductInput::new("Planet", dec("50000000000000000000000000000"), Some(1)))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidPrice);
    assert_eq!(err.to_string(), "Price cannot exceed 99999999.99");

    let mut ids = Vec::new();
    for name in ["Yacht", "Jet"] {
        let product = engine
            .create_product(&ProductInput::new(name, MAX_PRICE, Some(1)))
            .await
            .unwrap();
        ids.push(product.id);
    }

    let order = engine
        .create_order(&OrderInput {
            customer_id: customer.id,
            product_ids: ids,
            order_date: None,
        })
        .await
        .unwrap();
    assert_eq!(order.total_amount, dec("199999999.98"));

    let mut tx = engine.store().begin().await.unwrap();
    assert_eq!(tx.summary().await.unwrap().revenue, dec("199999999.98"));
}
