//! Order mutations.

use std::collections::BTreeSet;

use tracing::{debug, info};

use crm_core::{OrderId, ProductId};

use super::MutationEngine;
use crate::clock::Clock;
use crate::db::{CrmStore, CrmTransaction};
use crate::error::MutationError;
use crate::models::{Order, OrderInput};
use crate::repository::EntityRepository;

impl<S: CrmStore, C: Clock> MutationEngine<S, C> {
    /// Create an order for an existing customer.
    ///
    /// The total is the sum of the distinct products' current prices; a
    /// product listed twice is linked and charged once. The order date
    /// defaults to the engine clock's "now".
    ///
    /// # Errors
    ///
    /// Checked in order: [`MutationError::InvalidCustomerId`],
    /// [`MutationError::EmptyProductList`], [`MutationError::InvalidProductIds`].
    pub async fn create_order(&self, input: &OrderInput) -> Result<Order, MutationError> {
        let order_date = input.order_date.unwrap_or_else(|| self.clock.now());

        let mut tx = self.store.begin().await?;
        let mut repo = EntityRepository::new(&mut tx);

        let customer = match repo.get_customer(input.customer_id).await {
            Ok(customer) => customer,
            Err(MutationError::NotFound { .. }) => {
                debug!(customer_id = %input.customer_id, "Order for unknown customer");
                return Err(MutationError::InvalidCustomerId {
                    customer_id: input.customer_id,
                });
            }
            Err(e) => return Err(e),
        };

        if input.product_ids.is_empty() {
            return Err(MutationError::EmptyProductList);
        }

        let requested: BTreeSet<ProductId> = input.product_ids.iter().copied().collect();
        let products = repo.get_products_by_ids(&requested).await?;
        if products.len() != requested.len() {
            let found: BTreeSet<ProductId> = products.iter().map(|p| p.id).collect();
            let missing: Vec<ProductId> = requested.difference(&found).copied().collect();
            debug!(?missing, "Order references unknown products");
            return Err(MutationError::InvalidProductIds { missing });
        }

        let order = repo.create_order(&customer, &products, order_date).await?;
        tx.commit().await?;

        info!(
            order_id = %order.id,
            customer_id = %order.customer_id,
            total_amount = %order.total_amount,
            "Order created"
        );
        Ok(order)
    }

    /// Get an order by ID.
    ///
    /// # Errors
    ///
    /// Returns [`MutationError::NotFound`] if it does not exist.
    pub async fn get_order(&self, id: OrderId) -> Result<Order, MutationError> {
        let mut tx = self.store.begin().await?;
        EntityRepository::new(&mut tx).get_order(id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    use crm_core::CustomerId;

    use super::*;
    use crate::clock::FixedClock;
    use crate::db::MemoryStore;
    use crate::models::{Customer, CustomerInput, Product, ProductInput};

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    async fn setup() -> (MutationEngine<MemoryStore, FixedClock>, Customer, Vec<Product>) {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let engine = MutationEngine::with_clock(MemoryStore::new(), FixedClock(now));
        let customer = engine
            .create_customer(&CustomerInput::new("Ann", "ann@example.com", None))
            .await
            .unwrap();
        let mut products = Vec::new();
        for (name, price) in [("A", "10.00"), ("B", "25.00")] {
            products.push(
                engine
                    .create_product(&ProductInput::new(name, dec(price), Some(5)))
                    .await
                    .unwrap(),
            );
        }
        (engine, customer, products)
    }

    fn ids(products: &[Product]) -> Vec<ProductId> {
        products.iter().map(|p| p.id).collect()
    }

    #[tokio::test]
    async fn test_create_order_sums_prices_and_defaults_date() {
        let (engine, customer, products) = setup().await;
        let order = engine
            .create_order(&OrderInput {
                customer_id: customer.id,
                product_ids: ids(&products),
                order_date: None,
            })
            .await
            .unwrap();

        assert_eq!(order.total_amount, dec("35.00"));
        assert_eq!(order.order_date, engine.clock().now());
        assert_eq!(engine.get_order(order.id).await.unwrap(), order);
    }

    #[tokio::test]
    async fn test_duplicate_product_ids_count_once() {
        let (engine, customer, products) = setup().await;
        let mut product_ids = ids(&products);
        product_ids.extend(ids(&products));

        let order = engine
            .create_order(&OrderInput {
                customer_id: customer.id,
                product_ids,
                order_date: None,
            })
            .await
            .unwrap();
        assert_eq!(order.total_amount, dec("35.00"));
        assert_eq!(order.product_ids, ids(&products));
    }

    #[tokio::test]
    async fn test_total_is_a_snapshot() {
        let (engine, customer, products) = setup().await;
        let order = engine
            .create_order(&OrderInput {
                customer_id: customer.id,
                product_ids: ids(&products),
                order_date: None,
            })
            .await
            .unwrap();

        for product in &products {
            engine
                .update_product_price(product.id, dec("1.00"))
                .await
                .unwrap();
        }
        assert_eq!(
            engine.get_order(order.id).await.unwrap().total_amount,
            dec("35.00")
        );
    }

    #[tokio::test]
    async fn test_validation_order() {
        let (engine, customer, products) = setup().await;

        let err = engine
            .create_order(&OrderInput {
                customer_id: CustomerId::new(999),
                product_ids: vec![],
                order_date: None,
            })
            .await
            .unwrap_err();
        assert_eq!(
            err,
            MutationError::InvalidCustomerId {
                customer_id: CustomerId::new(999)
            }
        );

        let err = engine
            .create_order(&OrderInput {
                customer_id: customer.id,
                product_ids: vec![],
                order_date: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err, MutationError::EmptyProductList);

        let mut product_ids = ids(&products);
        product_ids.push(ProductId::new(999));
        let err = engine
            .create_order(&OrderInput {
                customer_id: customer.id,
                product_ids,
                order_date: None,
            })
            .await
            .unwrap_err();
        assert_eq!(
            err,
            MutationError::InvalidProductIds {
                missing: vec![ProductId::new(999)]
            }
        );
        assert_eq!(err.to_string(), "One or more product IDs are invalid");
    }

    #[tokio::test]
    async fn test_rejected_order_is_not_persisted() {
        let (engine, customer, _) = setup().await;
        let result = engine
            .create_order(&OrderInput {
                customer_id: customer.id,
                product_ids: vec![ProductId::new(42)],
                order_date: None,
            })
            .await;
        assert!(result.is_err());

        let mut tx = engine.store().begin().await.unwrap();
        assert_eq!(tx.summary().await.unwrap().orders, 0);
    }
}
