//! Product mutations.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crm_core::ProductId;

use super::MutationEngine;
use crate::clock::Clock;
use crate::db::{CrmStore, CrmTransaction};
use crate::error::MutationError;
use crate::models::{Product, ProductInput};
use crate::repository::EntityRepository;

/// Outcome of a low-stock restock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LowStockUpdate {
    /// Restocked products with their new stock, ascending by ID.
    pub products: Vec<Product>,
    /// Human-readable summary.
    pub message: String,
}

impl<S: CrmStore, C: Clock> MutationEngine<S, C> {
    /// Create one product. Price is rounded to cents; stock defaults to 0.
    ///
    /// # Errors
    ///
    /// Returns [`MutationError::InvalidPrice`] or [`MutationError::InvalidStock`].
    pub async fn create_product(&self, input: &ProductInput) -> Result<Product, MutationError> {
        let mut tx = self.store.begin().await?;
        let product = EntityRepository::new(&mut tx)
            .create_product(input)
            .await
            .inspect_err(|e| debug!(kind = ?e.kind(), "Product rejected"))?;
        tx.commit().await?;

        info!(product_id = %product.id, price = %product.price, "Product created");
        Ok(product)
    }

    /// Find a product by exact name, lowest ID first.
    ///
    /// # Errors
    ///
    /// Returns [`MutationError::StorageFailure`] if the store fails.
    pub async fn find_product_by_name(&self, name: &str) -> Result<Option<Product>, MutationError> {
        let mut tx = self.store.begin().await?;
        Ok(tx.find_product_by_name(name).await?)
    }

    /// Change a product's price. Totals of existing orders are not touched.
    ///
    /// # Errors
    ///
    /// Returns [`MutationError::InvalidPrice`] or [`MutationError::NotFound`].
    pub async fn update_product_price(
        &self,
        id: ProductId,
        price: Decimal,
    ) -> Result<Product, MutationError> {
        let mut tx = self.store.begin().await?;
        let product = EntityRepository::new(&mut tx)
            .update_product_price(id, price)
            .await?;
        tx.commit().await?;

        info!(product_id = %id, price = %product.price, "Product price updated");
        Ok(product)
    }

    /// Add `increment` to every product whose stock is below `threshold`.
    ///
    /// # Errors
    ///
    /// Returns [`MutationError::InvalidStock`] if `threshold` is negative or
    /// `increment` is not positive.
    pub async fn update_low_stock_products(
        &self,
        threshold: i32,
        increment: i32,
    ) -> Result<LowStockUpdate, MutationError> {
        if threshold < 0 {
            return Err(MutationError::InvalidStock { stock: threshold });
        }
        if increment <= 0 {
            return Err(MutationError::InvalidStock { stock: increment });
        }

        let mut tx = self.store.begin().await?;
        let products = tx.restock_low_stock(threshold, increment).await?;
        tx.commit().await?;

        let message = match products.len() {
            0 => "No low-stock products found".to_owned(),
            1 => "Updated 1 low-stock product".to_owned(),
            n => format!("Updated {n} low-stock products"),
        };
        info!(updated = products.len(), threshold, increment, "{message}");

        Ok(LowStockUpdate { products, message })
    }
}
