//! Customer commands.

use std::path::Path;

use crm::CrmConfig;
use crm::models::CustomerInput;
use crm_core::CustomerId;

use super::{CliError, connect, print_json};

/// Create one customer.
pub async fn create(
    config: &CrmConfig,
    name: String,
    email: String,
    phone: Option<String>,
) -> Result<(), CliError> {
    let engine = connect(config).await?;
    let customer = engine
        .create_customer(&CustomerInput { name, email, phone })
        .await?;
    print_json(&customer)
}

/// Create customers from a JSON array file.
///
/// Rejected rows are printed alongside the created customers; they do not
/// make the command fail.
pub async fn import(config: &CrmConfig, file: &Path) -> Result<(), CliError> {
    let rows = read_rows(file).await?;
    tracing::info!(rows = rows.len(), path = %file.display(), "Importing customers");

    let engine = connect(config).await?;
    let result = engine.bulk_create_customers(&rows).await?;
    print_json(&result)
}

/// Delete a customer and its orders.
pub async fn delete(config: &CrmConfig, id: CustomerId) -> Result<(), CliError> {
    let engine = connect(config).await?;
    engine.delete_customer(id).await?;
    print_json(&serde_json::json!({ "deleted": id }))
}

async fn read_rows(file: &Path) -> Result<Vec<CustomerInput>, CliError> {
    let content = tokio::fs::read_to_string(file)
        .await
        .map_err(|source| CliError::ReadFile {
            path: file.display().to_string(),
            source,
        })?;
    Ok(serde_json::from_str(&content)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_rows_accepts_missing_phone() {
        let path = std::env::temp_dir().join(format!("crm-import-{}.json", std::process::id()));
        tokio::fs::write(
            &path,
            r#"[
                {"name": "Ann", "email": "ann@example.com", "phone": "+1234567890"},
                {"name": "Ben", "email": "ben@example.com"}
            ]"#,
        )
        .await
        .unwrap();

        let rows = read_rows(&path).await.unwrap();
        assert_eq!(
            rows,
            vec![
                CustomerInput::new("Ann", "ann@example.com", Some("+1234567890")),
                CustomerInput::new("Ben", "ben@example.com", None),
            ]
        );
    }

    #[tokio::test]
    async fn test_read_rows_missing_file() {
        let err = read_rows(Path::new("/nonexistent/customers.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, CliError::ReadFile { .. }));
    }
}
