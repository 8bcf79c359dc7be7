//! Low-stock restock job.

use std::path::Path;

use tracing::info;

use super::{JobError, append_lines};
use crate::clock::Clock;
use crate::db::CrmStore;
use crate::mutations::{LowStockUpdate, MutationEngine};

/// Restock every product below `threshold` by `increment` and log the
/// restocked products.
///
/// Each run writes a blank separator line, then the summary, then one line
/// per product with its new stock.
///
/// # Errors
///
/// Returns [`JobError::Mutation`] if the arguments are rejected or the store
/// fails, and [`JobError::Log`] if the log file cannot be written.
pub async fn run<S: CrmStore, C: Clock>(
    engine: &MutationEngine<S, C>,
    threshold: i32,
    increment: i32,
    log_path: &Path,
) -> Result<LowStockUpdate, JobError> {
    let update = engine
        .update_low_stock_products(threshold, increment)
        .await?;

    let timestamp = engine.clock().now().format("%d/%m/%Y-%H:%M:%S");
    let mut lines = vec![String::new(), format!("[{timestamp}] {}", update.message)];
    lines.extend(
        update
            .products
            .iter()
            .map(|p| format!(" - {} (New Stock: {})", p.name, p.stock)),
    );

    append_lines(log_path, &lines).await?;
    info!(updated = update.products.len(), "Low-stock job finished");
    Ok(update)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    use super::*;
    use crate::clock::FixedClock;
    use crate::db::MemoryStore;
    use crate::jobs::test_log_path;
    use crate::models::ProductInput;

    #[tokio::test]
    async fn test_low_stock_log() {
        let now = Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 0).unwrap();
        let engine = MutationEngine::with_clock(MemoryStore::new(), FixedClock(now));
        for (name, stock) in [("Laptop", 5), ("Phone", 10), ("Cable", 0)] {
            engine
                .create_product(&ProductInput::new(name, Decimal::ONE, Some(stock)))
                .await
                .unwrap();
        }
        let path = test_log_path("low_stock.txt").await;

        let update = run(&engine, 10, 10, &path).await.unwrap();
        assert_eq!(update.products.len(), 2);
        run(&engine, 10, 10, &path).await.unwrap();

        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(
            contents,
            concat!(
                "\n",
                "[31/12/2024-23:59:00] Updated 2 low-stock products\n",
                " - Laptop (New Stock: 15)\n",
                " - Cable (New Stock: 10)\n",
                "\n",
                "[31/12/2024-23:59:00] No low-stock products found\n",
            )
        );
    }

    #[tokio::test]
    async fn test_rejected_arguments_write_nothing() {
        let engine = MutationEngine::new(MemoryStore::new());
        let path = test_log_path("low_stock_rejected.txt").await;

        let err = run(&engine, 10, 0, &path).await.unwrap_err();
        assert!(matches!(err, JobError::Mutation(_)));
        assert!(!path.exists());
    }
}
