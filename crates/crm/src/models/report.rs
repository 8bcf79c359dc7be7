//! Read models used by the scheduled jobs.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crm_core::{Email, OrderId};

/// Store-wide totals for the periodic CRM report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrmSummary {
    /// Number of customers.
    pub customers: i64,
    /// Number of orders.
    pub orders: i64,
    /// Sum of every order's `total_amount`.
    pub revenue: Decimal,
}

/// An order due for a reminder, with the address to remind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderReminder {
    pub order_id: OrderId,
    pub customer_email: Email,
    pub order_date: DateTime<Utc>,
}
