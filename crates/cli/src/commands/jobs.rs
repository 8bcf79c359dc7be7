//! Scheduled job commands.
//!
//! Each command runs its job once; schedule them with cron or a timer:
//!
//! ```text
//! */5 * * * *  crm job heartbeat
//! 0 */12 * * * crm job low-stock
//! 0 8 * * *    crm job order-reminders
//! 0 6 * * 1    crm job report
//! ```

use crm::CrmConfig;
use crm::jobs;

use super::{CliError, connect, connect_lazy, print_json};

/// Write a heartbeat line and ping the database.
///
/// An unreachable database is reported in the log, not as a failure.
pub async fn heartbeat(config: &CrmConfig) -> Result<(), CliError> {
    let engine = connect_lazy(config)?;
    let store_ok = jobs::heartbeat::run(&engine, &config.jobs.heartbeat_log).await?;
    print_json(&serde_json::json!({ "alive": true, "store_ok": store_ok }))
}

/// Restock low-stock products.
pub async fn low_stock(
    config: &CrmConfig,
    threshold: Option<i32>,
    increment: Option<i32>,
) -> Result<(), CliError> {
    let engine = connect(config).await?;
    let update = jobs::low_stock::run(
        &engine,
        threshold.unwrap_or(config.jobs.low_stock_threshold),
        increment.unwrap_or(config.jobs.low_stock_increment),
        &config.jobs.low_stock_log,
    )
    .await?;
    print_json(&update)
}

/// Log reminders for recent orders.
pub async fn order_reminders(config: &CrmConfig, days: Option<i64>) -> Result<(), CliError> {
    let engine = connect(config).await?;
    let reminders = jobs::reminders::run(
        &engine,
        days.unwrap_or(config.jobs.reminder_window_days),
        &config.jobs.reminders_log,
    )
    .await?;
    print_json(&reminders)
}

/// Log the CRM summary report.
pub async fn report(config: &CrmConfig) -> Result<(), CliError> {
    let engine = connect(config).await?;
    let summary = jobs::report::run(&engine, &config.jobs.report_log).await?;
    print_json(&summary)
}
