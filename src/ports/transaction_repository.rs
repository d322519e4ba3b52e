//! Upgrade transaction repository port.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, TransactionId};
use crate::domain::membership::UpgradeTransaction;

#[async_trait]
pub trait TransactionRepository: Send + Sync {
    async fn insert(&self, transaction: &UpgradeTransaction) -> Result<(), DomainError>;

    /// Persist status, invoice and settlement fields of an existing row.
    async fn update(&self, transaction: &UpgradeTransaction) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: &TransactionId) -> Result<Option<UpgradeTransaction>, DomainError>;

    /// Look up the transaction a gateway invoice was issued for.
    async fn find_by_invoice_id(
        &self,
        invoice_id: &str,
    ) -> Result<Option<UpgradeTransaction>, DomainError>;
}
