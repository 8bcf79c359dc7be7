//! User-facing mutation errors.
//!
//! Every rejected mutation is reported as one [`MutationError`] variant with
//! structured fields. Callers that serialize errors use
//! [`MutationError::payload`], which pairs a stable [`ErrorKind`] with the
//! human-readable message.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crm_core::{CustomerId, MAX_PRICE, ProductId};
use rust_decimal::Decimal;

use crate::db::RepositoryError;

/// Why a mutation was rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MutationError {
    /// A customer with this email already exists.
    #[error("Email already exists")]
    EmailExists {
        /// Email as submitted by the caller.
        email: String,
    },

    /// The email is not a valid address.
    #[error("Invalid email format")]
    InvalidEmail {
        /// Email as submitted by the caller.
        email: String,
    },

    /// The phone does not match the phone grammar.
    #[error("Invalid phone format")]
    InvalidPhone {
        /// Phone as submitted by the caller.
        phone: String,
    },

    /// A customer name is blank.
    #[error("Name cannot be empty")]
    EmptyName,

    /// Price is zero or negative, or above [`crm_core::MAX_PRICE`].
    #[error("{}", invalid_price_message(.price))]
    InvalidPrice {
        /// Price after rounding to cents.
        price: Decimal,
    },

    /// Stock (or a stock adjustment) is out of range.
    #[error("Stock cannot be negative")]
    InvalidStock {
        /// Offending value.
        stock: i32,
    },

    /// No customer exists with this ID.
    #[error("Invalid customer ID")]
    InvalidCustomerId {
        /// Requested customer.
        customer_id: CustomerId,
    },

    /// An order was requested without products.
    #[error("At least one product must be selected")]
    EmptyProductList,

    /// Some requested product IDs do not exist.
    #[error("One or more product IDs are invalid")]
    InvalidProductIds {
        /// Requested IDs with no matching product, ascending.
        missing: Vec<ProductId>,
    },

    /// A looked-up entity does not exist.
    #[error("{entity} {id} not found")]
    NotFound {
        /// Entity name (e.g. `"Order"`).
        entity: &'static str,
        /// Requested ID.
        id: i32,
    },

    /// The store failed in a way no rule anticipates.
    #[error("{0}")]
    StorageFailure(String),
}

/// Fieldless discriminant of [`MutationError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    EmailExists,
    InvalidEmail,
    InvalidPhone,
    EmptyName,
    InvalidPrice,
    InvalidStock,
    InvalidCustomerId,
    EmptyProductList,
    InvalidProductIds,
    NotFound,
    StorageFailure,
}

/// Serializable form of a [`MutationError`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub kind: ErrorKind,
    pub message: String,
}

impl MutationError {
    /// The error's kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::EmailExists { .. } => ErrorKind::EmailExists,
            Self::InvalidEmail { .. } => ErrorKind::InvalidEmail,
            Self::InvalidPhone { .. } => ErrorKind::InvalidPhone,
            Self::EmptyName => ErrorKind::EmptyName,
            Self::InvalidPrice { .. } => ErrorKind::InvalidPrice,
            Self::InvalidStock { .. } => ErrorKind::InvalidStock,
            Self::InvalidCustomerId { .. } => ErrorKind::InvalidCustomerId,
            Self::EmptyProductList => ErrorKind::EmptyProductList,
            Self::InvalidProductIds { .. } => ErrorKind::InvalidProductIds,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::StorageFailure(_) => ErrorKind::StorageFailure,
        }
    }

    /// Kind plus message, ready to serialize.
    #[must_use]
    pub fn payload(&self) -> ErrorPayload {
        ErrorPayload {
            kind: self.kind(),
            message: self.to_string(),
        }
    }

    /// Message for this error when it rejected row `row` (1-based) of a bulk
    /// customer import.
    #[must_use]
    pub fn row_message(&self, row: usize) -> String {
        match self {
            Self::EmailExists { email } => format!("Row {row}: Email '{email}' already exists"),
            Self::InvalidPhone { phone } => {
                format!("Row {row}: Invalid phone format for '{phone}'")
            }
            Self::InvalidEmail { email } => format!("Row {row}: Invalid email format for '{email}'"),
            other => format!("Row {row}: {other}"),
        }
    }

    /// Whether this error was caused by the store rather than by the input.
    #[must_use]
    pub const fn is_storage_failure(&self) -> bool {
        matches!(self, Self::StorageFailure(_))
    }
}

fn invalid_price_message(price: &Decimal) -> String {
    if *price > MAX_PRICE {
        format!("Price cannot exceed {MAX_PRICE}")
    } else {
        "Price must be positive".to_owned()
    }
}

impl From<RepositoryError> for MutationError {
    fn from(err: RepositoryError) -> Self {
        Self::StorageFailure(err.to_string())
    }
}
