//! Order domain models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crm_core::{CustomerId, OrderId, ProductId};

/// A persisted order.
///
/// `total_amount` is the sum of the linked products' prices at the moment the
/// order was created. It is stored, not derived on read, so later price
/// changes never alter it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Unique order ID (system-assigned).
    pub id: OrderId,
    /// Owning customer.
    pub customer_id: CustomerId,
    /// Linked products, each once, ascending by ID.
    pub product_ids: Vec<ProductId>,
    /// Price snapshot total.
    pub total_amount: Decimal,
    /// When the order was placed.
    pub order_date: DateTime<Utc>,
}

/// Raw order fields as submitted by a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderInput {
    pub customer_id: CustomerId,
    pub product_ids: Vec<ProductId>,
    /// Defaults to the current time when omitted.
    #[serde(default)]
    pub order_date: Option<DateTime<Utc>>,
}

/// A validated order ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub customer_id: CustomerId,
    /// Distinct product IDs, ascending.
    pub product_ids: Vec<ProductId>,
    pub total_amount: Decimal,
    pub order_date: DateTime<Utc>,
}
