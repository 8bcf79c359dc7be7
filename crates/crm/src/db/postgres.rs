//! `PostgreSQL` row store.
//!
//! Queries use the runtime `query_as` API with private row types that are
//! converted into domain models. Every write, and the per-row email lookup of
//! a bulk import, runs inside a savepoint so that a failed statement leaves
//! the enclosing transaction usable.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Acquire, PgPool, Postgres, Transaction};

use crm_core::{CustomerId, Email, OrderId, Phone, ProductId};

use super::{CrmStore, CrmTransaction, RepositoryError};
use crate::models::{
    CrmSummary, Customer, NewCustomer, NewOrder, NewProduct, Order, OrderReminder, Product,
};

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for customer queries.
#[derive(Debug, sqlx::FromRow)]
struct CustomerRow {
    id: i32,
    name: String,
    email: String,
    phone: Option<String>,
}

impl TryFrom<CustomerRow> for Customer {
    type Error = RepositoryError;

    fn try_from(row: CustomerRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let phone = Phone::parse_optional(row.phone.as_deref()).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid phone in database: {e}"))
        })?;

        Ok(Self {
            id: CustomerId::new(row.id),
            name: row.name,
            email,
            phone,
        })
    }
}

/// Internal row type for product queries.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i32,
    name: String,
    price: Decimal,
    stock: i32,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: ProductId::new(row.id),
            name: row.name,
            price: row.price,
            stock: row.stock,
        }
    }
}

/// Internal row type for order queries (product links are fetched separately).
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i32,
    customer_id: i32,
    total_amount: Decimal,
    order_date: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self, product_ids: Vec<ProductId>) -> Order {
        Order {
            id: OrderId::new(self.id),
            customer_id: CustomerId::new(self.customer_id),
            product_ids,
            total_amount: self.total_amount,
            order_date: self.order_date,
        }
    }
}

/// Internal row type for reminder queries.
#[derive(Debug, sqlx::FromRow)]
struct ReminderRow {
    order_id: i32,
    customer_email: String,
    order_date: DateTime<Utc>,
}

impl TryFrom<ReminderRow> for OrderReminder {
    type Error = RepositoryError;

    fn try_from(row: ReminderRow) -> Result<Self, Self::Error> {
        let customer_email = Email::parse(&row.customer_email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            order_id: OrderId::new(row.order_id),
            customer_email,
            order_date: row.order_date,
        })
    }
}

/// Internal row type for the summary query.
#[derive(Debug, sqlx::FromRow)]
struct SummaryRow {
    customers: i64,
    orders: i64,
    revenue: Decimal,
}

fn map_customer_insert_error(e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict("email already exists".to_owned());
    }
    RepositoryError::Database(e)
}

// =============================================================================
// Store
// =============================================================================

/// Row store backed by a `PostgreSQL` pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Create a new store over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl CrmStore for PgStore {
    type Tx<'a>
        = PgTransaction
    where
        Self: 'a;

    async fn begin(&self) -> Result<PgTransaction, RepositoryError> {
        let tx = self.pool.begin().await?;
        Ok(PgTransaction { tx })
    }
}

/// An open `PostgreSQL` transaction.
///
/// Dropping it without calling [`CrmTransaction::commit`] rolls back.
pub struct PgTransaction {
    tx: Transaction<'static, Postgres>,
}

impl PgTransaction {
    async fn product_ids_for_order(&mut self, id: i32) -> Result<Vec<ProductId>, RepositoryError> {
        let ids = sqlx::query_scalar::<_, i32>(
            r"
            SELECT product_id
            FROM crm.order_products
            WHERE order_id = $1
            ORDER BY product_id
            ",
        )
        .bind(id)
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(ids.into_iter().map(ProductId::new).collect())
    }
}

impl CrmTransaction for PgTransaction {
    async fn find_customer_by_email(
        &mut self,
        email: &Email,
    ) -> Result<Option<Customer>, RepositoryError> {
        // A bulk import looks up every row; a failed lookup must not abort the batch.
        let mut savepoint = self.tx.begin().await?;

        let row = sqlx::query_as::<_, CustomerRow>(
            r"
            SELECT id, name, email, phone
            FROM crm.customers
            WHERE email = $1
            ",
        )
        .bind(email.as_str())
        .fetch_optional(&mut *savepoint)
        .await?;

        savepoint.commit().await?;

        row.map(Customer::try_from).transpose()
    }

    async fn get_customer(&mut self, id: CustomerId) -> Result<Customer, RepositoryError> {
        let row = sqlx::query_as::<_, CustomerRow>(
            r"
            SELECT id, name, email, phone
            FROM crm.customers
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .fetch_optional(&mut *self.tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    async fn insert_customer(&mut self, input: &NewCustomer) -> Result<Customer, RepositoryError> {
        let mut savepoint = self.tx.begin().await?;

        let row = sqlx::query_as::<_, CustomerRow>(
            r"
            INSERT INTO crm.customers (name, email, phone)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, phone
            ",
        )
        .bind(&input.name)
        .bind(input.email.as_str())
        .bind(input.phone.as_ref().map(Phone::as_str))
        .fetch_one(&mut *savepoint)
        .await
        .map_err(map_customer_insert_error)?;

        savepoint.commit().await?;

        row.try_into()
    }

    async fn delete_customer(&mut self, id: CustomerId) -> Result<bool, RepositoryError> {
        let mut savepoint = self.tx.begin().await?;

        // Orders and their product links go with the customer (ON DELETE CASCADE)
        let result = sqlx::query(
            r"
            DELETE FROM crm.customers
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .execute(&mut *savepoint)
        .await?;

        savepoint.commit().await?;

        Ok(result.rows_affected() > 0)
    }

    async fn insert_product(&mut self, input: &NewProduct) -> Result<Product, RepositoryError> {
        let mut savepoint = self.tx.begin().await?;

        let row = sqlx::query_as::<_, ProductRow>(
            r"
            INSERT INTO crm.products (name, price, stock)
            VALUES ($1, $2, $3)
            RETURNING id, name, price, stock
            ",
        )
        .bind(&input.name)
        .bind(input.price)
        .bind(input.stock)
        .fetch_one(&mut *savepoint)
        .await?;

        savepoint.commit().await?;

        Ok(row.into())
    }

    async fn find_product_by_name(&mut self, name: &str) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, price, stock
            FROM crm.products
            WHERE name = $1
            ORDER BY id
            LIMIT 1
            ",
        )
        .bind(name)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn get_products_by_ids(
        &mut self,
        ids: &BTreeSet<ProductId>,
    ) -> Result<Vec<Product>, RepositoryError> {
        let ids: Vec<i32> = ids.iter().map(ProductId::as_i32).collect();

        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, price, stock
            FROM crm.products
            WHERE id = ANY($1)
            ORDER BY id
            ",
        )
        .bind(ids)
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update_product_price(
        &mut self,
        id: ProductId,
        price: Decimal,
    ) -> Result<Product, RepositoryError> {
        let mut savepoint = self.tx.begin().await?;

        let row = sqlx::query_as::<_, ProductRow>(
            r"
            UPDATE crm.products
            SET price = $2
            WHERE id = $1
            RETURNING id, name, price, stock
            ",
        )
        .bind(id.as_i32())
        .bind(price)
        .fetch_optional(&mut *savepoint)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        savepoint.commit().await?;

        Ok(row.into())
    }

    async fn restock_low_stock(
        &mut self,
        threshold: i32,
        increment: i32,
    ) -> Result<Vec<Product>, RepositoryError> {
        let mut savepoint = self.tx.begin().await?;

        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            UPDATE crm.products
            SET stock = stock + $2
            WHERE stock < $1
            RETURNING id, name, price, stock
            ",
        )
        .bind(threshold)
        .bind(increment)
        .fetch_all(&mut *savepoint)
        .await?;

        savepoint.commit().await?;

        // RETURNING order is unspecified
        let mut products: Vec<Product> = rows.into_iter().map(Into::into).collect();
        products.sort_by_key(|p| p.id);
        Ok(products)
    }

    async fn insert_order(&mut self, input: &NewOrder) -> Result<Order, RepositoryError> {
        let mut savepoint = self.tx.begin().await?;

        let row = sqlx::query_as::<_, OrderRow>(
            r"
            INSERT INTO crm.orders (customer_id, total_amount, order_date)
            VALUES ($1, $2, $3)
            RETURNING id, customer_id, total_amount, order_date
            ",
        )
        .bind(input.customer_id.as_i32())
        .bind(input.total_amount)
        .bind(input.order_date)
        .fetch_one(&mut *savepoint)
        .await?;

        let product_ids: Vec<i32> = input.product_ids.iter().map(ProductId::as_i32).collect();
        sqlx::query(
            r"
            INSERT INTO crm.order_products (order_id, product_id)
            SELECT $1, UNNEST($2::int4[])
            ",
        )
        .bind(row.id)
        .bind(product_ids)
        .execute(&mut *savepoint)
        .await?;

        savepoint.commit().await?;

        Ok(row.into_order(input.product_ids.clone()))
    }

    async fn get_order(&mut self, id: OrderId) -> Result<Order, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, customer_id, total_amount, order_date
            FROM crm.orders
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .fetch_optional(&mut *self.tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        let product_ids = self.product_ids_for_order(row.id).await?;
        Ok(row.into_order(product_ids))
    }

    async fn orders_placed_between(
        &mut self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<OrderReminder>, RepositoryError> {
        let rows = sqlx::query_as::<_, ReminderRow>(
            r"
            SELECT o.id AS order_id, c.email AS customer_email, o.order_date
            FROM crm.orders o
            INNER JOIN crm.customers c ON c.id = o.customer_id
            WHERE o.order_date >= $1 AND o.order_date <= $2
            ORDER BY o.order_date ASC, o.id ASC
            ",
        )
        .bind(start)
        .bind(end)
        .fetch_all(&mut *self.tx)
        .await?;

        rows.into_iter().map(OrderReminder::try_from).collect()
    }

    async fn summary(&mut self) -> Result<CrmSummary, RepositoryError> {
        let row = sqlx::query_as::<_, SummaryRow>(
            r"
            SELECT
                (SELECT COUNT(*) FROM crm.customers) AS customers,
                (SELECT COUNT(*) FROM crm.orders) AS orders,
                (SELECT COALESCE(SUM(total_amount), 0) FROM crm.orders) AS revenue
            ",
        )
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(CrmSummary {
            customers: row.customers,
            orders: row.orders,
            revenue: row.revenue,
        })
    }

    async fn ping(&mut self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&mut *self.tx).await?;
        Ok(())
    }

    async fn commit(self) -> Result<(), RepositoryError> {
        self.tx.commit().await?;
        Ok(())
    }
}
