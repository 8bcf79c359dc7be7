//! Command implementations.

pub mod customers;
pub mod jobs;
pub mod migrate;
pub mod orders;
pub mod products;
pub mod seed;

use serde::Serialize;
use thiserror::Error;

use crm::db::{PgStore, create_lazy_pool, create_pool};
use crm::jobs::JobError;
use crm::{CrmConfig, MutationEngine, MutationError};

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration error.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A mutation was rejected.
    #[error(transparent)]
    Mutation(#[from] MutationError),

    /// A scheduled job failed.
    #[error("Job failed: {0}")]
    Job(JobError),

    /// An input file could not be read.
    #[error("Failed to read {path}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// JSON could not be parsed or printed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<JobError> for CliError {
    fn from(err: JobError) -> Self {
        match err {
            JobError::Mutation(e) => Self::Mutation(e),
            other => Self::Job(other),
        }
    }
}

/// Connect to the configured database and build a mutation engine over it.
pub async fn connect(config: &CrmConfig) -> Result<MutationEngine<PgStore>, CliError> {
    tracing::info!("Connecting to CRM database...");
    let pool = create_pool(&config.database_url, config.max_connections).await?;
    Ok(MutationEngine::new(PgStore::new(pool)))
}

/// Like [`connect`], but defers connecting until the store is first used.
pub fn connect_lazy(config: &CrmConfig) -> Result<MutationEngine<PgStore>, CliError> {
    let pool = create_lazy_pool(&config.database_url, config.max_connections)?;
    Ok(MutationEngine::new(PgStore::new(pool)))
}

/// Print `value` to stdout as pretty JSON.
#[allow(clippy::print_stdout)]
pub fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
