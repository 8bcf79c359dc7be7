//! Recent-order reminders.

use std::path::Path;

use chrono::{DateTime, TimeDelta, Utc};
use tracing::info;

use super::{JobError, append_lines};
use crate::clock::Clock;
use crate::db::{CrmStore, CrmTransaction};
use crate::models::OrderReminder;
use crate::mutations::MutationEngine;

/// Log a reminder for every order placed within the last `window_days` days,
/// oldest first.
///
/// # Errors
///
/// Returns [`JobError::Repository`] if the store fails and [`JobError::Log`]
/// if the log file cannot be written.
pub async fn run<S: CrmStore, C: Clock>(
    engine: &MutationEngine<S, C>,
    window_days: i64,
    log_path: &Path,
) -> Result<Vec<OrderReminder>, JobError> {
    let now = engine.clock().now();
    let start = TimeDelta::try_days(window_days.max(0))
        .and_then(|window| now.checked_sub_signed(window))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);

    let mut tx = engine.store().begin().await?;
    let reminders = tx.orders_placed_between(start, now).await?;
    drop(tx);

    let timestamp = now.format("%Y-%m-%d %H:%M:%S");
    let lines = if reminders.is_empty() {
        vec![format!("{timestamp} - No recent orders found.")]
    } else {
        reminders
            .iter()
            .map(|r| {
                format!(
                    "{timestamp} - Reminder: Order {} for {}",
                    r.order_id, r.customer_email
                )
            })
            .collect()
    };

    append_lines(log_path, &lines).await?;
    info!(reminders = reminders.len(), window_days, "Order reminders processed");
    Ok(reminders)
}
