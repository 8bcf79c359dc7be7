//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! crm migrate
//! ```
//!
//! # Environment Variables
//!
//! - `CRM_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! # Migration Files
//!
//! Migrations live in `crates/crm/migrations/` and are embedded at build time.

use crm::CrmConfig;
use crm::db::MIGRATOR;

use super::{CliError, connect};

/// Apply all pending migrations.
pub async fn run(config: &CrmConfig) -> Result<(), CliError> {
    let engine = connect(config).await?;

    tracing::info!("Running CRM migrations...");
    MIGRATOR.run(engine.store().pool()).await?;

    tracing::info!("CRM migrations complete!");
    Ok(())
}
