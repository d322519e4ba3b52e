//! GetTransactionStatusHandler - Query handler behind the payment page poll.

use std::sync::Arc;

use crate::domain::foundation::{TransactionId, UserId};
use crate::domain::membership::{MembershipError, UpgradeTransaction};
use crate::ports::TransactionRepository;

#[derive(Debug, Clone)]
pub struct GetTransactionStatusQuery {
    pub user_id: UserId,
    pub transaction_id: TransactionId,
}

/// Returns a transaction to the member who owns it.
pub struct GetTransactionStatusHandler {
    transactions: Arc<dyn TransactionRepository>,
}

impl GetTransactionStatusHandler {
    pub fn new(transactions: Arc<dyn TransactionRepository>) -> Self {
        Self { transactions }
    }

    pub async fn handle(
        &self,
        query: GetTransactionStatusQuery,
    ) -> Result<UpgradeTransaction, MembershipError> {
        let transaction = self
            .transactions
            .find_by_id(&query.transaction_id)
            .await?
            .ok_or(MembershipError::transaction_not_found(query.transaction_id))?;

        if !transaction.is_owned_by(&query.user_id) {
            return Err(MembershipError::Forbidden);
        }
        Ok(transaction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryTransactionStore;
    use crate::domain::foundation::{MembershipId, Money, PlanId, Timestamp};
    use crate::domain::membership::TransactionStatus;

    async fn setup() -> (GetTransactionStatusHandler, UpgradeTransaction) {
        let store = Arc::new(InMemoryTransactionStore::new());
        let tx = UpgradeTransaction::open(
            UserId::new("owner").unwrap(),
            MembershipId::new(),
            PlanId::new(),
            PlanId::new(),
            Money::new(10_000).unwrap(),
            Timestamp::now(),
        );
        store.insert(&tx).await.unwrap();
        (GetTransactionStatusHandler::new(store), tx)
    }

    #[tokio::test]
    async fn owner_sees_status() {
        let (handler, tx) = setup().await;
        let found = handler
            .handle(GetTransactionStatusQuery {
                user_id: UserId::new("owner").unwrap(),
                transaction_id: tx.id,
            })
            .await
            .unwrap();
        assert_eq!(found.status, TransactionStatus::Pending);
    }

    #[tokio::test]
    async fn other_user_is_forbidden() {
        let (handler, tx) = setup().await;
        let err = handler
            .handle(GetTransactionStatusQuery {
                user_id: UserId::new("intruder").unwrap(),
                transaction_id: tx.id,
            })
            .await
            .unwrap_err();
        assert_eq!(err, MembershipError::Forbidden);
    }

    #[tokio::test]
    async fn unknown_transaction_is_not_found() {
        let (handler, _) = setup().await;
        let missing = TransactionId::new();
        let err = handler
            .handle(GetTransactionStatusQuery {
                user_id: UserId::new("owner").unwrap(),
                transaction_id: missing,
            })
            .await
            .unwrap_err();
        assert_eq!(err, MembershipError::TransactionNotFound(missing));
    }
}
