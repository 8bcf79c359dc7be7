//! Integration tests for the CRM backend.
//!
//! # Running Tests
//!
//! ```bash
//! # In-memory scenarios
//! cargo test -p crm-integration-tests
//!
//! # PostgreSQL scenarios (needs a database the tests may migrate)
//! CRM_DATABASE_URL=postgres://localhost/crm_test \
//!     cargo test -p crm-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `mutations` - Mutation engine behavior over the in-memory store
//! - `jobs` - Scheduled jobs writing their log files
//! - `postgres` - The same guarantees against `PostgreSQL`

use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use secrecy::SecretString;

use crm::db::{MIGRATOR, PgStore, create_pool};
use crm::{FixedClock, MemoryStore, MutationEngine};

/// The instant every in-memory test engine is frozen at.
///
/// # Panics
///
/// Never; the date is a valid constant.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn test_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
}

/// A fresh in-memory engine on a clock frozen at [`test_now`].
#[must_use]
pub fn memory_engine() -> MutationEngine<MemoryStore, FixedClock> {
    MutationEngine::with_clock(MemoryStore::new(), FixedClock(test_now()))
}

/// Parse a decimal literal.
///
/// # Panics
///
/// Panics if `s` is not a decimal.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

/// An email no other test run has used.
#[must_use]
pub fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@example.com", uuid::Uuid::new_v4())
}

/// A log path under the temp dir, removed if it already exists.
pub async fn fresh_log_path(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("crm-it-{}-{name}", uuid::Uuid::new_v4()));
    tokio::fs::remove_file(&path).await.ok();
    path
}

/// Connect to `CRM_DATABASE_URL`, apply migrations and return an engine.
///
/// # Panics
///
/// Panics if the variable is unset or the database is unreachable.
#[allow(clippy::expect_used)]
pub async fn pg_engine() -> MutationEngine<PgStore> {
    let url = std::env::var("CRM_DATABASE_URL").expect("CRM_DATABASE_URL must be set");
    let pool = create_pool(&SecretString::from(url), 5)
        .await
        .expect("Failed to connect to test database");
    MIGRATOR
        .run(&pool)
        .await
        .expect("Failed to run migrations");
    MutationEngine::new(PgStore::new(pool))
}
