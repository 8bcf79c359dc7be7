//! Customer domain models.

use serde::{Deserialize, Serialize};

use crm_core::{CustomerId, Email, Phone};

/// A persisted customer.
///
/// Customers are never mutated once created. Deleting one removes every
/// order it owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Unique customer ID (system-assigned).
    pub id: CustomerId,
    /// Display name, never empty.
    pub name: String,
    /// Normalized email, unique across all customers.
    pub email: Email,
    /// Optional phone number.
    pub phone: Option<Phone>,
}

/// Raw customer fields as submitted by a caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInput {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
}

impl CustomerInput {
    /// Convenience constructor used by seeding and tests.
    #[must_use]
    pub fn new(name: impl Into<String>, email: impl Into<String>, phone: Option<&str>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: phone.map(str::to_owned),
        }
    }
}

/// A validated customer ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCustomer {
    pub name: String,
    pub email: Email,
    pub phone: Option<Phone>,
}
