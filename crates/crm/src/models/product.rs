//! Product domain models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crm_core::ProductId;

/// A persisted product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Unique product ID (system-assigned).
    pub id: ProductId,
    /// Product name.
    pub name: String,
    /// Unit price, always > 0 with two decimal places.
    pub price: Decimal,
    /// Units on hand, never negative.
    pub stock: i32,
}

/// Raw product fields as submitted by a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductInput {
    pub name: String,
    pub price: Decimal,
    /// Defaults to 0 when omitted.
    #[serde(default)]
    pub stock: Option<i32>,
}

impl ProductInput {
    /// Convenience constructor used by seeding and tests.
    #[must_use]
    pub fn new(name: impl Into<String>, price: Decimal, stock: Option<i32>) -> Self {
        Self {
            name: name.into(),
            price,
            stock,
        }
    }
}

/// A validated product ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub price: Decimal,
    pub stock: i32,
}
