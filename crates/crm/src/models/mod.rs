//! Domain models for the CRM.
//!
//! Each entity has three shapes:
//! - the raw caller input (`*Input`), deserializable and unvalidated
//! - the validated insert (`New*`) handed to a row store
//! - the persisted entity returned to callers

pub mod customer;
pub mod order;
pub mod product;
pub mod report;

pub use customer::{Customer, CustomerInput, NewCustomer};
pub use order::{NewOrder, Order, OrderInput};
pub use product::{NewProduct, Product, ProductInput};
pub use report::{CrmSummary, OrderReminder};
