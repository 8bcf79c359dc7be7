//! Seed the database with demo customers and products.
//!
//! Records go through the mutation engine, so seeding twice reports the
//! existing customers and products instead of duplicating them. A demo
//! product counts as existing when a product with the same name does.

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};

use crm::models::{Customer, CustomerInput, Product, ProductInput};
use crm::{Clock, CrmConfig, CrmStore, MutationEngine, MutationError};

use super::{CliError, connect, print_json};

#[derive(Debug, Serialize)]
struct SeedReport {
    customers: Vec<Customer>,
    products: Vec<Product>,
    errors: Vec<String>,
}

fn demo_customers() -> Vec<CustomerInput> {
    vec![
        CustomerInput::new("John Doe", "john@example.com", Some("+1234567890")),
        CustomerInput::new("Jane Smith", "jane@example.com", None),
    ]
}

fn demo_products() -> Vec<ProductInput> {
    vec![
        ProductInput::new("Laptop", Decimal::new(99_999, 2), Some(5)),
        ProductInput::new("Phone", Decimal::new(49_999, 2), Some(10)),
        ProductInput::new("Headphones", Decimal::new(5_999, 2), Some(25)),
    ]
}

async fn seed<S: CrmStore, C: Clock>(
    engine: &MutationEngine<S, C>,
) -> Result<SeedReport, MutationError> {
    let imported = engine.bulk_create_customers(&demo_customers()).await?;
    let mut errors = imported.errors;

    let mut products = Vec::new();
    for input in demo_products() {
        if engine.find_product_by_name(&input.name).await?.is_some() {
            errors.push(format!("Product '{}' already exists", input.name));
            continue;
        }
        products.push(engine.create_product(&input).await?);
    }

    Ok(SeedReport {
        customers: imported.customers,
        products,
        errors,
    })
}

/// Insert the demo data and print what was created.
pub async fn run(config: &CrmConfig) -> Result<(), CliError> {
    let engine = connect(config).await?;
    let report = seed(&engine).await?;

    for err in &report.errors {
        warn!("Skipped demo record: {err}");
    }
    info!(
        customers = report.customers.len(),
        products = report.products.len(),
        "Database seeded"
    );
    print_json(&report)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crm::{CrmTransaction, MemoryStore};

    use super::*;

    #[tokio::test]
    async fn test_demo_data_is_valid() {
        let engine = MutationEngine::new(MemoryStore::new());

        let report = seed(&engine).await.unwrap();
        assert_eq!(report.customers.len(), 2);
        assert_eq!(report.products.len(), 3);
        assert!(report.errors.is_empty());
    }

    #[tokio::test]
    async fn test_seeding_twice_creates_nothing_new() {
        let engine = MutationEngine::new(MemoryStore::new());
        seed(&engine).await.unwrap();

        let again = seed(&engine).await.unwrap();
        assert!(again.customers.is_empty());
        assert!(again.products.is_empty());
        assert_eq!(
            again.errors,
            [
                "Row 1: Email 'john@example.com' already exists",
                "Row 2: Email 'jane@example.com' already exists",
                "Product 'Laptop' already exists",
                "Product 'Phone' already exists",
                "Product 'Headphones' already exists",
            ]
        );

        let mut tx = engine.store().begin().await.unwrap();
        let summary = tx.summary().await.unwrap();
        assert_eq!(summary.customers, 2);
    }
}
