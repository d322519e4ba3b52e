//! In-memory upgrade transaction store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, TransactionId};
use crate::domain::membership::UpgradeTransaction;
use crate::ports::TransactionRepository;

#[derive(Default)]
pub struct InMemoryTransactionStore {
    transactions: RwLock<HashMap<TransactionId, UpgradeTransaction>>,
}

impl InMemoryTransactionStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub(crate) async fn len(&self) -> usize {
        self.transactions.read().await.len()
    }
}

#[async_trait]
impl TransactionRepository for InMemoryTransactionStore {
    async fn insert(&self, transaction: &UpgradeTransaction) -> Result<(), DomainError> {
        let mut transactions = self.transactions.write().await;
        if transactions.contains_key(&transaction.id) {
            return Err(DomainError::database(format!(
                "Transaction {} already exists",
                transaction.id
            )));
        }
        transactions.insert(transaction.id, transaction.clone());
        Ok(())
    }

    async fn update(&self, transaction: &UpgradeTransaction) -> Result<(), DomainError> {
        let mut transactions = self.transactions.write().await;
        match transactions.get_mut(&transaction.id) {
            Some(existing) => {
                *existing = transaction.clone();
                Ok(())
            }
            None => Err(DomainError::new(
                ErrorCode::TransactionNotFound,
                format!("Transaction {} not found", transaction.id),
            )),
        }
    }

    async fn find_by_id(&self, id: &TransactionId) -> Result<Option<UpgradeTransaction>, DomainError> {
        Ok(self.transactions.read().await.get(id).cloned())
    }

    async fn find_by_invoice_id(
        &self,
        invoice_id: &str,
    ) -> Result<Option<UpgradeTransaction>, DomainError> {
        Ok(self
            .transactions
            .read()
            .await
            .values()
            .find(|t| t.external_invoice_id.as_deref() == Some(invoice_id))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{MembershipId, Money, PlanId, Timestamp, UserId};

    fn transaction() -> UpgradeTransaction {
        UpgradeTransaction::open(
            UserId::new("user-1").unwrap(),
            MembershipId::new(),
            PlanId::new(),
            PlanId::new(),
            Money::new(5_000).unwrap(),
            Timestamp::now(),
        )
    }

    #[tokio::test]
    async fn finds_by_invoice_after_update() {
        let store = InMemoryTransactionStore::new();
        let mut tx = transaction();
        store.insert(&tx).await.unwrap();

        tx.attach_invoice("inv-1", "https://pay.example/inv-1");
        store.update(&tx).await.unwrap();

        let found = store.find_by_invoice_id("inv-1").await.unwrap().unwrap();
        assert_eq!(found.id, tx.id);
        assert!(store.find_by_invoice_id("inv-2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_insert_fails() {
        let store = InMemoryTransactionStore::new();
        let tx = transaction();
        store.insert(&tx).await.unwrap();
        assert!(store.insert(&tx).await.is_err());
    }

    #[tokio::test]
    async fn update_of_unknown_transaction_fails() {
        let store = InMemoryTransactionStore::new();
        let err = store.update(&transaction()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::TransactionNotFound);
    }
}
