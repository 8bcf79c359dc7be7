//! Product commands.

use rust_decimal::Decimal;

use crm::CrmConfig;
use crm::models::ProductInput;
use crm_core::ProductId;

use super::{CliError, connect, print_json};

/// Create one product.
pub async fn create(
    config: &CrmConfig,
    name: String,
    price: Decimal,
    stock: Option<i32>,
) -> Result<(), CliError> {
    let engine = connect(config).await?;
    let product = engine
        .create_product(&ProductInput { name, price, stock })
        .await?;
    print_json(&product)
}

/// Change a product's price.
pub async fn set_price(config: &CrmConfig, id: ProductId, price: Decimal) -> Result<(), CliError> {
    let engine = connect(config).await?;
    let product = engine.update_product_price(id, price).await?;
    print_json(&product)
}
