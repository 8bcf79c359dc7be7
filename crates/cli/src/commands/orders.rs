//! Order commands.

use chrono::{DateTime, Utc};

use crm::CrmConfig;
use crm::models::OrderInput;
use crm_core::{CustomerId, OrderId, ProductId};

use super::{CliError, connect, print_json};

/// Create an order.
pub async fn create(
    config: &CrmConfig,
    customer_id: CustomerId,
    product_ids: Vec<ProductId>,
    order_date: Option<DateTime<Utc>>,
) -> Result<(), CliError> {
    let engine = connect(config).await?;
    let order = engine
        .create_order(&OrderInput {
            customer_id,
            product_ids,
            order_date,
        })
        .await?;
    print_json(&order)
}

/// Print an order.
pub async fn show(config: &CrmConfig, id: OrderId) -> Result<(), CliError> {
    let engine = connect(config).await?;
    let order = engine.get_order(id).await?;
    print_json(&order)
}
