//! CRM Core - Shared types library.
//!
//! This crate provides the types and rules shared by every CRM component:
//! - `crm` - Row stores, entity repository, mutation engine and jobs
//! - `crm-cli` - Command-line tools for migrations, seeding and scheduled jobs
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no clocks. This keeps the validation rules usable anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails and phone numbers
//! - [`validate`] - Stateless predicates for phone format and numeric bounds

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;
pub mod validate;

pub use types::*;
pub use validate::{MAX_PRICE, validate_phone, validate_price, validate_stock};
