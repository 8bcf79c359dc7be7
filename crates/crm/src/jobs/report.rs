//! Periodic CRM summary report.

use std::path::Path;

use tracing::info;

use super::{JobError, append_lines};
use crate::clock::Clock;
use crate::db::{CrmStore, CrmTransaction};
use crate::models::CrmSummary;
use crate::mutations::MutationEngine;

/// Log store-wide customer count, order count and revenue.
///
/// # Errors
///
/// Returns [`JobError::Repository`] if the store fails and [`JobError::Log`]
/// if the log file cannot be written.
pub async fn run<S: CrmStore, C: Clock>(
    engine: &MutationEngine<S, C>,
    log_path: &Path,
) -> Result<CrmSummary, JobError> {
    let mut tx = engine.store().begin().await?;
    let summary = tx.summary().await?;
    drop(tx);

    let line = format!(
        "{} - Report: {} customers, {} orders, {} revenue",
        engine.clock().now().format("%Y-%m-%d %H:%M:%S"),
        summary.customers,
        summary.orders,
        summary.revenue
    );
    append_lines(log_path, &[line]).await?;

    info!(
        customers = summary.customers,
        orders = summary.orders,
        revenue = %summary.revenue,
        "CRM report written"
    );
    Ok(summary)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    use super::*;
    use crate::clock::FixedClock;
    use crate::db::MemoryStore;
    use crate::jobs::test_log_path;
    use crate::models::{CustomerInput, OrderInput, ProductInput};

    #[tokio::test]
    async fn test_report_line() {
        let now = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        let engine = MutationEngine::with_clock(MemoryStore::new(), FixedClock(now));
        let customer = engine
            .create_customer(&CustomerInput::new("Ann", "ann@example.com", None))
            .await
            .unwrap();
        engine
            .create_customer(&CustomerInput::new("Ben", "ben@example.com", None))
            .await
            .unwrap();
        let product = engine
            .create_product(&ProductInput::new(
                "Pen",
                Decimal::from_str("12.25").unwrap(),
                Some(1),
            ))
            .await
            .unwrap();
        for _ in 0..2 {
            engine
                .create_order(&OrderInput {
                    customer_id: customer.id,
                    product_ids: vec![product.id],
                    order_date: None,
                })
                .await
                .unwrap();
        }

        let path = test_log_path("report.txt").await;
        let summary = run(&engine, &path).await.unwrap();
        assert_eq!(summary.customers, 2);
        assert_eq!(summary.orders, 2);

        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(
            contents,
            "2025-01-02 03:04:05 - Report: 2 customers, 2 orders, 24.50 revenue\n"
        );
    }
}
