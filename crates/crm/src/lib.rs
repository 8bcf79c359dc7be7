//! CRM - Customer, product and order mutation backend.
//!
//! # Architecture
//!
//! ```text
//! MutationEngine ──> EntityRepository ──> CrmTransaction ──> PgStore / MemoryStore
//!        │                  │
//!        └── Clock          └── crm_core::validate, totals
//! ```
//!
//! Every mutation runs in one store transaction and commits only when it
//! succeeds, except the bulk customer import, which commits the rows that
//! passed and reports the rest.
//!
//! # Modules
//!
//! - [`config`] - Environment configuration
//! - [`db`] - Row-store traits, `PostgreSQL` and in-memory backends
//! - [`error`] - User-facing mutation errors
//! - [`jobs`] - Scheduled heartbeat, restock, reminder and report jobs
//! - [`models`] - Customers, products, orders and report rows
//! - [`mutations`] - The transactional mutation engine
//! - [`repository`] - Validated entity access within a transaction
//! - [`telemetry`] - Tracing and Sentry setup
//! - [`totals`] - Derived order totals

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod jobs;
pub mod models;
pub mod mutations;
pub mod repository;
pub mod telemetry;
pub mod totals;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ConfigError, CrmConfig, JobConfig, SentryConfig};
pub use db::{CrmStore, CrmTransaction, MemoryStore, PgStore, RepositoryError};
pub use error::{ErrorKind, ErrorPayload, MutationError};
pub use mutations::{BulkCreateCustomers, LowStockUpdate, MutationEngine};
