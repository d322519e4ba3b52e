//! PostgreSQL implementation of TransactionRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{
    DomainError, ErrorCode, MembershipId, Money, PlanId, Timestamp, TransactionId, UserId,
};
use crate::domain::membership::{TransactionStatus, UpgradeTransaction};
use crate::ports::TransactionRepository;

pub struct PostgresTransactionStore {
    pool: PgPool,
}

impl PostgresTransactionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TransactionRow {
    id: Uuid,
    user_id: String,
    membership_id: Uuid,
    from_plan_id: Uuid,
    target_plan_id: Uuid,
    amount: i64,
    external_invoice_id: Option<String>,
    invoice_url: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    paid_at: Option<DateTime<Utc>>,
}

impl TryFrom<TransactionRow> for UpgradeTransaction {
    type Error = DomainError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        let status: TransactionStatus = row
            .status
            .parse()
            .map_err(|e| DomainError::database(format!("Invalid status value: {}", e)))?;

        Ok(UpgradeTransaction {
            id: TransactionId::from_uuid(row.id),
            user_id: UserId::new(row.user_id)
                .map_err(|e| DomainError::database(format!("Invalid user_id: {}", e)))?,
            membership_id: MembershipId::from_uuid(row.membership_id),
            from_plan_id: PlanId::from_uuid(row.from_plan_id),
            target_plan_id: PlanId::from_uuid(row.target_plan_id),
            amount: Money::new(row.amount)
                .map_err(|e| DomainError::database(format!("Invalid amount: {}", e)))?,
            external_invoice_id: row.external_invoice_id,
            invoice_url: row.invoice_url,
            status,
            created_at: Timestamp::from_datetime(row.created_at),
            paid_at: row.paid_at.map(Timestamp::from_datetime),
        })
    }
}

const SELECT_COLUMNS: &str = r#"
    SELECT id, user_id, membership_id, from_plan_id, target_plan_id, amount,
           external_invoice_id, invoice_url, status, created_at, paid_at
    FROM upgrade_transactions
"#;

#[async_trait]
impl TransactionRepository for PostgresTransactionStore {
    async fn insert(&self, transaction: &UpgradeTransaction) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO upgrade_transactions (
                id, user_id, membership_id, from_plan_id, target_plan_id, amount,
                external_invoice_id, invoice_url, status, created_at, paid_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(transaction.id.as_uuid())
        .bind(transaction.user_id.as_str())
        .bind(transaction.membership_id.as_uuid())
        .bind(transaction.from_plan_id.as_uuid())
        .bind(transaction.target_plan_id.as_uuid())
        .bind(transaction.amount.amount())
        .bind(&transaction.external_invoice_id)
        .bind(&transaction.invoice_url)
        .bind(transaction.status.as_str())
        .bind(transaction.created_at.as_datetime())
        .bind(transaction.paid_at.map(|at| *at.as_datetime()))
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to insert transaction: {}", e)))?;

        Ok(())
    }

    async fn update(&self, transaction: &UpgradeTransaction) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE upgrade_transactions SET
                external_invoice_id = $2,
                invoice_url = $3,
                status = $4,
                paid_at = $5
            WHERE id = $1
            "#,
        )
        .bind(transaction.id.as_uuid())
        .bind(&transaction.external_invoice_id)
        .bind(&transaction.invoice_url)
        .bind(transaction.status.as_str())
        .bind(transaction.paid_at.map(|at| *at.as_datetime()))
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to update transaction: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::TransactionNotFound,
                format!("Transaction {} not found", transaction.id),
            ));
        }

        Ok(())
    }

    async fn find_by_id(&self, id: &TransactionId) -> Result<Option<UpgradeTransaction>, DomainError> {
        let row: Option<TransactionRow> = sqlx::query_as(&format!("{SELECT_COLUMNS} WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::database(format!("Failed to find transaction: {}", e)))?;

        row.map(UpgradeTransaction::try_from).transpose()
    }

    async fn find_by_invoice_id(
        &self,
        invoice_id: &str,
    ) -> Result<Option<UpgradeTransaction>, DomainError> {
        let row: Option<TransactionRow> =
            sqlx::query_as(&format!("{SELECT_COLUMNS} WHERE external_invoice_id = $1"))
                .bind(invoice_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| DomainError::database(format!("Failed to find transaction: {}", e)))?;

        row.map(UpgradeTransaction::try_from).transpose()
    }
}
