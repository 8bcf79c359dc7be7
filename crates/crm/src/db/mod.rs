//! Row stores for CRM data.
//!
//! # Database: `crm` schema
//!
//! ## Tables
//!
//! - `customers` - Customers (`email` UNIQUE)
//! - `products` - Products with price and stock
//! - `orders` - Orders owned by a customer (cascade on customer delete)
//! - `order_products` - Order to product junction table
//!
//! # Backends
//!
//! - [`PgStore`] - `PostgreSQL` via sqlx
//! - [`MemoryStore`] - In-process store with the same constraints, for tests
//!
//! Both implement [`CrmStore`]. All reads and writes go through a
//! [`CrmTransaction`]; nothing is visible to other callers until
//! [`CrmTransaction::commit`] succeeds, and dropping a transaction rolls it
//! back. A failed write rolls back only itself, so a bulk caller may keep
//! using the transaction afterwards.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/crm/migrations/`, embedded in
//! [`MIGRATOR`], and run via:
//! ```bash
//! cargo run -p crm-cli -- migrate
//! ```

pub mod memory;
pub mod postgres;

use std::collections::BTreeSet;
use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use crm_core::{CustomerId, Email, OrderId, ProductId};

use crate::models::{
    CrmSummary, Customer, NewCustomer, NewOrder, NewProduct, Order, OrderReminder, Product,
};

pub use memory::{MemoryStore, MemoryTransaction};
pub use postgres::{PgStore, PgTransaction};

/// Embedded `crm` schema migrations.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Errors that can occur during row-store operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the store is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// Backend fault outside sqlx.
    #[error("storage error: {0}")]
    Storage(String),
}

/// A transactional store of customers, products and orders.
pub trait CrmStore: Send + Sync {
    /// Transaction handle produced by [`CrmStore::begin`].
    type Tx<'a>: CrmTransaction + 'a
    where
        Self: 'a;

    /// Open a new transaction.
    fn begin(&self) -> impl Future<Output = Result<Self::Tx<'_>, RepositoryError>> + Send;
}

/// Operations available inside one store transaction.
pub trait CrmTransaction: Send {
    /// Look up a customer by normalized email.
    fn find_customer_by_email(
        &mut self,
        email: &Email,
    ) -> impl Future<Output = Result<Option<Customer>, RepositoryError>> + Send;

    /// Get a customer by ID.
    ///
    /// Fails with [`RepositoryError::NotFound`] if it does not exist.
    fn get_customer(
        &mut self,
        id: CustomerId,
    ) -> impl Future<Output = Result<Customer, RepositoryError>> + Send;

    /// Insert a customer.
    ///
    /// Fails with [`RepositoryError::Conflict`] if the email is taken.
    fn insert_customer(
        &mut self,
        input: &NewCustomer,
    ) -> impl Future<Output = Result<Customer, RepositoryError>> + Send;

    /// Delete a customer and every order it owns.
    ///
    /// Returns `false` if the customer did not exist.
    fn delete_customer(
        &mut self,
        id: CustomerId,
    ) -> impl Future<Output = Result<bool, RepositoryError>> + Send;

    /// Insert a product.
    fn insert_product(
        &mut self,
        input: &NewProduct,
    ) -> impl Future<Output = Result<Product, RepositoryError>> + Send;

    /// Look up the lowest-ID product named exactly `name`.
    fn find_product_by_name(
        &mut self,
        name: &str,
    ) -> impl Future<Output = Result<Option<Product>, RepositoryError>> + Send;

    /// Fetch exactly the products whose IDs are in `ids`, ascending by ID.
    ///
    /// Unknown IDs are silently skipped; callers compare cardinalities.
    fn get_products_by_ids(
        &mut self,
        ids: &BTreeSet<ProductId>,
    ) -> impl Future<Output = Result<Vec<Product>, RepositoryError>> + Send;

    /// Change a product's price.
    ///
    /// Fails with [`RepositoryError::NotFound`] if it does not exist.
    fn update_product_price(
        &mut self,
        id: ProductId,
        price: Decimal,
    ) -> impl Future<Output = Result<Product, RepositoryError>> + Send;

    /// Add `increment` to the stock of every product with stock below
    /// `threshold`. Returns the updated products, ascending by ID.
    fn restock_low_stock(
        &mut self,
        threshold: i32,
        increment: i32,
    ) -> impl Future<Output = Result<Vec<Product>, RepositoryError>> + Send;

    /// Insert an order and its product links.
    fn insert_order(
        &mut self,
        input: &NewOrder,
    ) -> impl Future<Output = Result<Order, RepositoryError>> + Send;

    /// Get an order by ID.
    ///
    /// Fails with [`RepositoryError::NotFound`] if it does not exist.
    fn get_order(&mut self, id: OrderId)
    -> impl Future<Output = Result<Order, RepositoryError>> + Send;

    /// Orders with `start <= order_date <= end`, by date then ID.
    fn orders_placed_between(
        &mut self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> impl Future<Output = Result<Vec<OrderReminder>, RepositoryError>> + Send;

    /// Store-wide customer count, order count and revenue.
    fn summary(&mut self) -> impl Future<Output = Result<CrmSummary, RepositoryError>> + Send;

    /// Cheap liveness check.
    fn ping(&mut self) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    /// Make every write in this transaction visible atomically.
    fn commit(self) -> impl Future<Output = Result<(), RepositoryError>> + Send;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
/// * `max_connections` - Upper bound on pooled connections
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(
    database_url: &secrecy::SecretString,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    pool_options(max_connections)
        .connect(database_url.expose_secret())
        .await
}

/// Like [`create_pool`], but connects on first use instead of up front.
///
/// # Errors
///
/// Returns `sqlx::Error` only if the connection string cannot be parsed.
pub fn create_lazy_pool(
    database_url: &secrecy::SecretString,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    pool_options(max_connections).connect_lazy(database_url.expose_secret())
}

fn pool_options(max_connections: u32) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
}
