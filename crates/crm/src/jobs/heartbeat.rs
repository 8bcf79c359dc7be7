//! Liveness heartbeat.

use std::path::Path;

use tracing::{info, warn};

use super::{JobError, append_lines};
use crate::clock::Clock;
use crate::db::{CrmStore, CrmTransaction, RepositoryError};
use crate::mutations::MutationEngine;

const TIMESTAMP_FORMAT: &str = "%d/%m/%Y-%H:%M:%S";

/// Log that the CRM is alive and whether the store answers a ping.
///
/// A failed ping is logged, not returned: the heartbeat itself succeeded.
/// Returns whether the store is reachable.
///
/// # Errors
///
/// Returns [`JobError::Log`] if the log file cannot be written.
pub async fn run<S: CrmStore, C: Clock>(
    engine: &MutationEngine<S, C>,
    log_path: &Path,
) -> Result<bool, JobError> {
    let timestamp = engine.clock().now().format(TIMESTAMP_FORMAT);
    let mut lines = vec![format!("{timestamp} CRM is alive")];

    let store_ok = match ping(engine.store()).await {
        Ok(()) => {
            lines.push(format!("{timestamp} Store ping: ok"));
            true
        }
        Err(e) => {
            warn!(error = %e, "Store ping failed");
            lines.push(format!("{timestamp} Store ping failed: {e}"));
            false
        }
    };

    append_lines(log_path, &lines).await?;
    info!(store_ok, "Heartbeat written");
    Ok(store_ok)
}

async fn ping<S: CrmStore>(store: &S) -> Result<(), RepositoryError> {
    let mut tx = store.begin().await?;
    tx.ping().await
}
