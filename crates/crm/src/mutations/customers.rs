//! Customer mutations.

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crm_core::CustomerId;

use super::MutationEngine;
use crate::clock::Clock;
use crate::db::{CrmStore, CrmTransaction};
use crate::error::MutationError;
use crate::models::{Customer, CustomerInput};
use crate::repository::EntityRepository;

/// Outcome of a bulk customer import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkCreateCustomers {
    /// Created customers, in input order.
    pub customers: Vec<Customer>,
    /// One message per rejected row, in input order.
    pub errors: Vec<String>,
}

impl<S: CrmStore, C: Clock> MutationEngine<S, C> {
    /// Create one customer.
    ///
    /// # Errors
    ///
    /// Returns the first violated rule: [`MutationError::InvalidEmail`],
    /// [`MutationError::EmailExists`], [`MutationError::InvalidPhone`] or
    /// [`MutationError::EmptyName`]. Store faults surface as
    /// [`MutationError::StorageFailure`].
    pub async fn create_customer(&self, input: &CustomerInput) -> Result<Customer, MutationError> {
        let mut tx = self.store.begin().await?;
        let customer = EntityRepository::new(&mut tx)
            .create_customer(input)
            .await
            .inspect_err(|e| debug!(kind = ?e.kind(), "Customer rejected"))?;
        tx.commit().await?;

        info!(customer_id = %customer.id, "Customer created");
        Ok(customer)
    }

    /// Create many customers in one transaction.
    ///
    /// Rows are processed in order. A rejected row is reported in
    /// [`BulkCreateCustomers::errors`] as `"Row {n}: ..."` (1-based) and does
    /// not stop the remaining rows. An email repeated within the batch is
    /// rejected like one that already exists.
    ///
    /// # Errors
    ///
    /// Returns [`MutationError::StorageFailure`] only if the transaction
    /// cannot be opened or committed; nothing is persisted in that case.
    pub async fn bulk_create_customers(
        &self,
        rows: &[CustomerInput],
    ) -> Result<BulkCreateCustomers, MutationError> {
        let mut tx = self.store.begin().await?;
        let mut result = BulkCreateCustomers::default();

        for (index, row) in rows.iter().enumerate() {
            let row_number = index + 1;

            // Earlier rows are visible to the email lookup, so an email
            // repeated within the batch is rejected as existing.
            match EntityRepository::new(&mut tx).create_customer(row).await {
                Ok(customer) => result.customers.push(customer),
                Err(e) => {
                    if e.is_storage_failure() {
                        error!(row = row_number, error = %e, "Bulk row hit a storage failure");
                    }
                    result.errors.push(e.row_message(row_number));
                }
            }
        }

        tx.commit().await?;

        info!(
            created = result.customers.len(),
            rejected = result.errors.len(),
            "Bulk customer import finished"
        );
        Ok(result)
    }

    /// Delete a customer together with its orders.
    ///
    /// # Errors
    ///
    /// Returns [`MutationError::NotFound`] if the customer does not exist.
    pub async fn delete_customer(&self, id: CustomerId) -> Result<(), MutationError> {
        let mut tx = self.store.begin().await?;
        EntityRepository::new(&mut tx).delete_customer(id).await?;
        tx.commit().await?;

        info!(customer_id = %id, "Customer deleted");
        Ok(())
    }
}
