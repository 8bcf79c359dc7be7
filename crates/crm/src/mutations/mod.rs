//! Transactional CRM mutations.
//!
//! [`MutationEngine`] is the write surface of the crate. Each operation opens
//! one store transaction, validates its input through
//! [`EntityRepository`](crate::repository::EntityRepository), and commits only
//! when the whole operation succeeded. A rejected mutation leaves the store
//! untouched.
//!
//! | Operation | Atomicity |
//! |-----------|-----------|
//! | [`create_customer`](MutationEngine::create_customer) | all or nothing |
//! | [`bulk_create_customers`](MutationEngine::bulk_create_customers) | per row, one commit |
//! | [`create_product`](MutationEngine::create_product) | all or nothing |
//! | [`create_order`](MutationEngine::create_order) | all or nothing |
//! | [`update_low_stock_products`](MutationEngine::update_low_stock_products) | all or nothing |

mod customers;
mod orders;
mod products;

pub use customers::BulkCreateCustomers;
pub use products::LowStockUpdate;

use crate::clock::{Clock, SystemClock};
use crate::db::CrmStore;

/// Runs mutations against a row store.
///
/// The clock supplies the default order date and the "now" of the
/// scheduled jobs.
#[derive(Debug, Clone)]
pub struct MutationEngine<S, C = SystemClock> {
    store: S,
    clock: C,
}

impl<S: CrmStore> MutationEngine<S> {
    /// Create an engine on the wall clock.
    pub const fn new(store: S) -> Self {
        Self::with_clock(store, SystemClock)
    }
}

impl<S: CrmStore, C: Clock> MutationEngine<S, C> {
    /// Create an engine with an explicit clock.
    pub const fn with_clock(store: S, clock: C) -> Self {
        Self { store, clock }
    }

    /// The underlying row store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// The engine's clock.
    pub const fn clock(&self) -> &C {
        &self.clock
    }
}
