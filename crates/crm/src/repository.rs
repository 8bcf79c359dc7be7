//! Validated entity access inside one transaction.
//!
//! [`EntityRepository`] turns raw caller input into validated inserts and
//! maps row-store failures onto [`MutationError`]. It never commits; the
//! caller owns the transaction and decides when its writes become visible.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::debug;

use crm_core::{
    CustomerId, Email, MAX_PRICE, OrderId, Phone, ProductId, validate_price, validate_stock,
};

use crate::db::{CrmTransaction, RepositoryError};
use crate::error::MutationError;
use crate::models::{
    Customer, CustomerInput, NewCustomer, NewOrder, NewProduct, Order, Product, ProductInput,
};
use crate::totals::{MAX_ORDER_TOTAL, order_total};

/// Entity operations bound to an open transaction.
pub struct EntityRepository<'a, T> {
    tx: &'a mut T,
}

impl<'a, T: CrmTransaction> EntityRepository<'a, T> {
    /// Wrap an open transaction.
    pub const fn new(tx: &'a mut T) -> Self {
        Self { tx }
    }

    /// Validate and insert a customer.
    ///
    /// Checks run in a fixed order: email syntax, email uniqueness, phone,
    /// name. The first failing check decides the error.
    ///
    /// # Errors
    ///
    /// Returns the first violated rule, or [`MutationError::StorageFailure`].
    pub async fn create_customer(
        &mut self,
        input: &CustomerInput,
    ) -> Result<Customer, MutationError> {
        let email = Email::parse(&input.email).map_err(|_| MutationError::InvalidEmail {
            email: input.email.clone(),
        })?;

        if self.tx.find_customer_by_email(&email).await?.is_some() {
            return Err(MutationError::EmailExists {
                email: input.email.clone(),
            });
        }

        let phone = Phone::parse_optional(input.phone.as_deref()).map_err(|_| {
            MutationError::InvalidPhone {
                phone: input.phone.clone().unwrap_or_default(),
            }
        })?;

        let name = input.name.trim();
        if name.is_empty() {
            return Err(MutationError::EmptyName);
        }

        let new_customer = NewCustomer {
            name: name.to_owned(),
            email,
            phone,
        };

        // A concurrent insert can win the race past the lookup above.
        self.tx
            .insert_customer(&new_customer)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => MutationError::EmailExists {
                    email: input.email.clone(),
                },
                other => other.into(),
            })
    }

    /// Validate and insert a product. Missing stock defaults to 0.
    ///
    /// # Errors
    ///
    /// Returns [`MutationError::InvalidPrice`] or [`MutationError::InvalidStock`].
    /// Prices must lie in `(0, MAX_PRICE]` after rounding.
    pub async fn create_product(&mut self, input: &ProductInput) -> Result<Product, MutationError> {
        let price = checked_price(input.price)?;

        let stock = input.stock.unwrap_or(0);
        if !validate_stock(stock) {
            return Err(MutationError::InvalidStock { stock });
        }

        let product = self
            .tx
            .insert_product(&NewProduct {
                name: input.name.clone(),
                price,
                stock,
            })
            .await?;
        Ok(product)
    }

    /// Get a customer by ID.
    ///
    /// # Errors
    ///
    /// Returns [`MutationError::NotFound`] if no such customer exists.
    pub async fn get_customer(&mut self, id: CustomerId) -> Result<Customer, MutationError> {
        self.tx
            .get_customer(id)
            .await
            .map_err(|e| not_found(e, "Customer", id.as_i32()))
    }

    /// Get an order by ID.
    ///
    /// # Errors
    ///
    /// Returns [`MutationError::NotFound`] if no such order exists.
    pub async fn get_order(&mut self, id: OrderId) -> Result<Order, MutationError> {
        self.tx
            .get_order(id)
            .await
            .map_err(|e| not_found(e, "Order", id.as_i32()))
    }

    /// Fetch the products whose IDs are in `ids`, skipping unknown IDs.
    ///
    /// # Errors
    ///
    /// Returns [`MutationError::StorageFailure`] if the store fails.
    pub async fn get_products_by_ids(
        &mut self,
        ids: &BTreeSet<ProductId>,
    ) -> Result<Vec<Product>, MutationError> {
        Ok(self.tx.get_products_by_ids(ids).await?)
    }

    /// Insert an order for `customer` linking `products`, priced from their
    /// current prices.
    ///
    /// # Errors
    ///
    /// Returns [`MutationError::EmptyProductList`] if `products` is empty.
    pub async fn create_order(
        &mut self,
        customer: &Customer,
        products: &[Product],
        order_date: DateTime<Utc>,
    ) -> Result<Order, MutationError> {
        if products.is_empty() {
            return Err(MutationError::EmptyProductList);
        }

        let product_ids: BTreeSet<ProductId> = products.iter().map(|p| p.id).collect();
        let total_amount = order_total(products)
            .filter(|total| *total <= MAX_ORDER_TOTAL)
            .ok_or_else(|| {
                MutationError::StorageFailure(format!(
                    "order total exceeds {MAX_ORDER_TOTAL}"
                ))
            })?;
        debug!(customer_id = %customer.id, %total_amount, "Inserting order");

        let order = self
            .tx
            .insert_order(&NewOrder {
                customer_id: customer.id,
                product_ids: product_ids.into_iter().collect(),
                total_amount,
                order_date,
            })
            .await?;
        Ok(order)
    }

    /// Change a product's price. Existing orders keep their totals.
    ///
    /// # Errors
    ///
    /// Returns [`MutationError::InvalidPrice`] or [`MutationError::NotFound`].
    pub async fn update_product_price(
        &mut self,
        id: ProductId,
        price: Decimal,
    ) -> Result<Product, MutationError> {
        let price = checked_price(price)?;

        self.tx
            .update_product_price(id, price)
            .await
            .map_err(|e| not_found(e, "Product", id.as_i32()))
    }

    /// Delete a customer and its orders.
    ///
    /// # Errors
    ///
    /// Returns [`MutationError::NotFound`] if no such customer exists.
    pub async fn delete_customer(&mut self, id: CustomerId) -> Result<(), MutationError> {
        if self.tx.delete_customer(id).await? {
            Ok(())
        } else {
            Err(MutationError::NotFound {
                entity: "Customer",
                id: id.as_i32(),
            })
        }
    }
}

/// Round a price to cents, halves away from zero.
fn round_price(price: Decimal) -> Decimal {
    price.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn checked_price(price: Decimal) -> Result<Decimal, MutationError> {
    let price = round_price(price);
    if validate_price(price) && price <= MAX_PRICE {
        Ok(price)
    } else {
        Err(MutationError::InvalidPrice { price })
    }
}

fn not_found(err: RepositoryError, entity: &'static str, id: i32) -> MutationError {
    match err {
        RepositoryError::NotFound => MutationError::NotFound { entity, id },
        other => other.into(),
    }
}
