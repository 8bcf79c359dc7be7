//! In-memory row store.
//!
//! Mirrors the `PostgreSQL` schema constraints (unique email, foreign keys,
//! cascade on customer delete) without a database.
//! Transactions are serialized: [`MemoryStore::begin`] waits for the previous
//! transaction to finish, then works on a staged copy of the state that is
//! published on commit and discarded on drop.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crm_core::{CustomerId, Email, OrderId, ProductId};

use super::{CrmStore, CrmTransaction, RepositoryError};
use crate::models::{
    CrmSummary, Customer, NewCustomer, NewOrder, NewProduct, Order, OrderReminder, Product,
};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    customers: BTreeMap<CustomerId, Customer>,
    products: BTreeMap<ProductId, Product>,
    orders: BTreeMap<OrderId, Order>,
    last_customer_id: i32,
    last_product_id: i32,
    last_order_id: i32,
    /// Emails whose inserts fail with a storage fault.
    failing_emails: HashSet<Email>,
    /// Emails whose lookups fail with a storage fault.
    failing_lookups: HashSet<Email>,
}

/// Row store held entirely in process memory.
///
/// Cloning the store shares the underlying state.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every future insert of a customer with `email` fail with
    /// [`RepositoryError::Storage`], as a lost connection would.
    pub async fn fail_customer_inserts_for(&self, email: Email) {
        self.state.lock().await.failing_emails.insert(email);
    }

    /// Make every future lookup of `email` fail with
    /// [`RepositoryError::Storage`], as a query timeout would.
    pub async fn fail_customer_lookups_for(&self, email: Email) {
        self.state.lock().await.failing_lookups.insert(email);
    }
}

impl CrmStore for MemoryStore {
    type Tx<'a>
        = MemoryTransaction
    where
        Self: 'a;

    async fn begin(&self) -> Result<MemoryTransaction, RepositoryError> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let staged = guard.clone();
        Ok(MemoryTransaction { guard, staged })
    }
}

/// An open in-memory transaction.
///
/// Holds the store lock until committed or dropped.
#[derive(Debug)]
pub struct MemoryTransaction {
    guard: OwnedMutexGuard<MemoryState>,
    staged: MemoryState,
}

fn next_id(last: &mut i32) -> Result<i32, RepositoryError> {
    *last = last
        .checked_add(1)
        .ok_or_else(|| RepositoryError::Storage("id sequence exhausted".to_owned()))?;
    Ok(*last)
}

impl CrmTransaction for MemoryTransaction {
    async fn find_customer_by_email(
        &mut self,
        email: &Email,
    ) -> Result<Option<Customer>, RepositoryError> {
        if self.staged.failing_lookups.contains(email) {
            return Err(RepositoryError::Storage(format!(
                "query timed out looking up {email}"
            )));
        }

        Ok(self
            .staged
            .customers
            .values()
            .find(|c| &c.email == email)
            .cloned())
    }

    async fn get_customer(&mut self, id: CustomerId) -> Result<Customer, RepositoryError> {
        self.staged
            .customers
            .get(&id)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn insert_customer(&mut self, input: &NewCustomer) -> Result<Customer, RepositoryError> {
        if self.staged.failing_emails.contains(&input.email) {
            return Err(RepositoryError::Storage(format!(
                "connection lost while inserting {}",
                input.email
            )));
        }

        if self.staged.customers.values().any(|c| c.email == input.email) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        let id = CustomerId::new(next_id(&mut self.staged.last_customer_id)?);
        let customer = Customer {
            id,
            name: input.name.clone(),
            email: input.email.clone(),
            phone: input.phone.clone(),
        };
        self.staged.customers.insert(id, customer.clone());
        Ok(customer)
    }

    async fn delete_customer(&mut self, id: CustomerId) -> Result<bool, RepositoryError> {
        if self.staged.customers.remove(&id).is_none() {
            return Ok(false);
        }
        self.staged.orders.retain(|_, order| order.customer_id != id);
        Ok(true)
    }

    async fn insert_product(&mut self, input: &NewProduct) -> Result<Product, RepositoryError> {
        let id = ProductId::new(next_id(&mut self.staged.last_product_id)?);
        let product = Product {
            id,
            name: input.name.clone(),
            price: input.price,
            stock: input.stock,
        };
        self.staged.products.insert(id, product.clone());
        Ok(product)
    }

    async fn find_product_by_name(&mut self, name: &str) -> Result<Option<Product>, RepositoryError> {
        Ok(self
            .staged
            .products
            .values()
            .find(|p| p.name == name)
            .cloned())
    }

    async fn get_products_by_ids(
        &mut self,
        ids: &BTreeSet<ProductId>,
    ) -> Result<Vec<Product>, RepositoryError> {
        Ok(ids
            .iter()
            .filter_map(|id| self.staged.products.get(id).cloned())
            .collect())
    }

    async fn update_product_price(
        &mut self,
        id: ProductId,
        price: Decimal,
    ) -> Result<Product, RepositoryError> {
        let product = self
            .staged
            .products
            .get_mut(&id)
            .ok_or(RepositoryError::NotFound)?;
        product.price = price;
        Ok(product.clone())
    }

    async fn restock_low_stock(
        &mut self,
        threshold: i32,
        increment: i32,
    ) -> Result<Vec<Product>, RepositoryError> {
        // Compute every new stock first so an overflow changes nothing.
        let mut updated = Vec::new();
        for product in self.staged.products.values() {
            if product.stock < threshold {
                let stock = product.stock.checked_add(increment).ok_or_else(|| {
                    RepositoryError::Storage(format!("stock overflow for product {}", product.id))
                })?;
                updated.push(Product {
                    stock,
                    ..product.clone()
                });
            }
        }

        for product in &updated {
            self.staged.products.insert(product.id, product.clone());
        }
        Ok(updated)
    }

    async fn insert_order(&mut self, input: &NewOrder) -> Result<Order, RepositoryError> {
        if !self.staged.customers.contains_key(&input.customer_id) {
            return Err(RepositoryError::Conflict(format!(
                "customer {} does not exist",
                input.customer_id
            )));
        }
        if let Some(missing) = input
            .product_ids
            .iter()
            .find(|id| !self.staged.products.contains_key(*id))
        {
            return Err(RepositoryError::Conflict(format!(
                "product {missing} does not exist"
            )));
        }

        let id = OrderId::new(next_id(&mut self.staged.last_order_id)?);
        let product_ids: BTreeSet<ProductId> = input.product_ids.iter().copied().collect();
        let order = Order {
            id,
            customer_id: input.customer_id,
            product_ids: product_ids.into_iter().collect(),
            total_amount: input.total_amount,
            order_date: input.order_date,
        };
        self.staged.orders.insert(id, order.clone());
        Ok(order)
    }

    async fn get_order(&mut self, id: OrderId) -> Result<Order, RepositoryError> {
        self.staged
            .orders
            .get(&id)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn orders_placed_between(
        &mut self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<OrderReminder>, RepositoryError> {
        let mut reminders = Vec::new();
        for order in self.staged.orders.values() {
            if order.order_date < start || order.order_date > end {
                continue;
            }
            let customer = self
                .staged
                .customers
                .get(&order.customer_id)
                .ok_or_else(|| {
                    RepositoryError::DataCorruption(format!(
                        "order {} references missing customer {}",
                        order.id, order.customer_id
                    ))
                })?;
            reminders.push(OrderReminder {
                order_id: order.id,
                customer_email: customer.email.clone(),
                order_date: order.order_date,
            });
        }
        reminders.sort_by_key(|r| (r.order_date, r.order_id));
        Ok(reminders)
    }

    async fn summary(&mut self) -> Result<CrmSummary, RepositoryError> {
        let customers = i64::try_from(self.staged.customers.len())
            .map_err(|e| RepositoryError::Storage(e.to_string()))?;
        let orders = i64::try_from(self.staged.orders.len())
            .map_err(|e| RepositoryError::Storage(e.to_string()))?;
        let revenue = self
            .staged
            .orders
            .values()
            .try_fold(Decimal::ZERO, |total, o| total.checked_add(o.total_amount))
            .ok_or_else(|| RepositoryError::Storage("revenue overflowed".to_owned()))?;

        Ok(CrmSummary {
            customers,
            orders,
            revenue,
        })
    }

    async fn ping(&mut self) -> Result<(), RepositoryError> {
        Ok(())
    }

    async fn commit(mut self) -> Result<(), RepositoryError> {
        *self.guard = self.staged;
        Ok(())
    }
}
