//! InitiateUpgradeHandler - Command handler starting an upgrade checkout.

use std::sync::Arc;

use crate::domain::foundation::{PlanId, Timestamp, UserId};
use crate::domain::membership::{MembershipError, UpgradeCalculation, UpgradeTransaction};
use crate::ports::{CreateInvoiceRequest, MembershipRepository, PaymentGateway, TransactionRepository};

use super::quote_upgrade::QuoteUpgradeHandler;

/// Command to start paying for an upgrade.
#[derive(Debug, Clone)]
pub struct InitiateUpgradeCommand {
    pub user_id: UserId,
    pub target_plan_id: PlanId,
    pub payer_email: Option<String>,
}

#[derive(Debug, Clone)]
pub struct InitiateUpgradeResult {
    pub transaction: UpgradeTransaction,
    pub calculation: UpgradeCalculation,
    /// Hosted invoice to send the member to; `None` when nothing was owed.
    pub invoice_url: Option<String>,
}

/// Handler for starting an upgrade checkout.
///
/// Re-prices the upgrade at request time, so the amount charged is never
/// taken from the client. A zero-price upgrade is applied immediately;
/// anything else gets a gateway invoice and a pending transaction that the
/// payment callback settles.
pub struct InitiateUpgradeHandler {
    quotes: QuoteUpgradeHandler,
    memberships: Arc<dyn MembershipRepository>,
    transactions: Arc<dyn TransactionRepository>,
    gateway: Arc<dyn PaymentGateway>,
}

impl InitiateUpgradeHandler {
    pub fn new(
        quotes: QuoteUpgradeHandler,
        memberships: Arc<dyn MembershipRepository>,
        transactions: Arc<dyn TransactionRepository>,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self {
            quotes,
            memberships,
            transactions,
            gateway,
        }
    }

    pub async fn handle(
        &self,
        cmd: InitiateUpgradeCommand,
    ) -> Result<InitiateUpgradeResult, MembershipError> {
        self.handle_at(cmd, Timestamp::now()).await
    }

    pub(crate) async fn handle_at(
        &self,
        cmd: InitiateUpgradeCommand,
        now: Timestamp,
    ) -> Result<InitiateUpgradeResult, MembershipError> {
        let quote = self
            .quotes
            .quote_at(&cmd.user_id, &cmd.target_plan_id, now)
            .await?;

        let mut transaction = UpgradeTransaction::open(
            cmd.user_id.clone(),
            quote.membership.id,
            quote.current_plan.id,
            quote.target_plan.id,
            quote.calculation.upgrade_price,
            now,
        );

        if quote.calculation.upgrade_price.is_zero() {
            let mut membership = quote.membership;
            membership.apply_upgrade(&quote.target_plan, now);
            transaction.mark_paid(now)?;

            self.memberships.save(&membership).await?;
            self.transactions.insert(&transaction).await?;

            tracing::info!(
                transaction_id = %transaction.id,
                user_id = %cmd.user_id,
                target_plan_id = %quote.target_plan.id,
                "Upgrade fully covered by credit; applied without payment"
            );

            return Ok(InitiateUpgradeResult {
                transaction,
                calculation: quote.calculation,
                invoice_url: None,
            });
        }

        let invoice = self
            .gateway
            .create_invoice(CreateInvoiceRequest {
                external_id: transaction.id.to_string(),
                amount: quote.calculation.upgrade_price,
                description: format!("Upgrade to {}", quote.target_plan.name),
                payer_email: cmd.payer_email,
            })
            .await
            .map_err(|e| MembershipError::payment_failed(e.message))?;

        transaction.attach_invoice(invoice.id, invoice.invoice_url.clone());
        self.transactions.insert(&transaction).await?;

        tracing::info!(
            transaction_id = %transaction.id,
            user_id = %cmd.user_id,
            amount = transaction.amount.amount(),
            "Upgrade invoice issued"
        );

        Ok(InitiateUpgradeResult {
            transaction,
            calculation: quote.calculation,
            invoice_url: Some(invoice.invoice_url),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{
        InMemoryMembershipStore, InMemoryPlanCatalog, InMemoryTransactionStore,
    };
    use crate::adapters::xendit::MockPaymentGateway;
    use crate::domain::foundation::Money;
    use crate::domain::membership::{ActiveMembership, MembershipPlan, PlanDuration, TransactionStatus};
    use crate::ports::{MembershipReader, PaymentError};

    struct Fixture {
        handler: InitiateUpgradeHandler,
        store: Arc<InMemoryMembershipStore>,
        transactions: Arc<InMemoryTransactionStore>,
        gateway: MockPaymentGateway,
        monthly: MembershipPlan,
        quarterly: MembershipPlan,
        cheap: MembershipPlan,
        now: Timestamp,
    }

    fn plan(name: &str, duration: PlanDuration, price: i64) -> MembershipPlan {
        MembershipPlan::new(PlanId::new(), name, duration, Money::new(price).unwrap()).unwrap()
    }

    fn user() -> UserId {
        UserId::new("member-1").unwrap()
    }

    fn fixture() -> Fixture {
        let now = Timestamp::now();
        let monthly = plan("Monthly", PlanDuration::OneMonth, 100_000);
        let quarterly = plan("Quarterly", PlanDuration::ThreeMonths, 250_000);
        let cheap = plan("Promo Quarter", PlanDuration::ThreeMonths, 20_000);

        let mut membership = ActiveMembership::start(user(), &monthly, now.add_days(-15));
        membership.end_date = Some(now.add_days(15).add_hours(1));

        let catalog = Arc::new(InMemoryPlanCatalog::with_plans(vec![
            monthly.clone(),
            quarterly.clone(),
            cheap.clone(),
        ]));
        let store = Arc::new(InMemoryMembershipStore::with_memberships(vec![membership]));
        let transactions = Arc::new(InMemoryTransactionStore::new());
        let gateway = MockPaymentGateway::new("cb-token");

        let handler = InitiateUpgradeHandler::new(
            QuoteUpgradeHandler::new(store.clone(), catalog),
            store.clone(),
            transactions.clone(),
            Arc::new(gateway.clone()),
        );

        Fixture {
            handler,
            store,
            transactions,
            gateway,
            monthly,
            quarterly,
            cheap,
            now,
        }
    }

    fn command(target: PlanId) -> InitiateUpgradeCommand {
        InitiateUpgradeCommand {
            user_id: user(),
            target_plan_id: target,
            payer_email: Some("member@example.com".to_string()),
        }
    }

    #[tokio::test]
    async fn issues_invoice_for_prorated_price() {
        let f = fixture();

        let result = f.handler.handle(command(f.quarterly.id)).await.unwrap();

        assert_eq!(result.transaction.status, TransactionStatus::Pending);
        assert_eq!(result.transaction.amount.amount(), 200_005);
        assert!(result.invoice_url.is_some());

        let requests = f.gateway.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].amount.amount(), 200_005);
        assert_eq!(requests[0].external_id, result.transaction.id.to_string());
        assert_eq!(requests[0].payer_email.as_deref(), Some("member@example.com"));

        let stored = f
            .transactions
            .find_by_invoice_id(&MockPaymentGateway::invoice_id_for(&result.transaction.id.to_string()))
            .await
            .unwrap();
        assert!(stored.is_some());

        // Membership is untouched until payment is confirmed.
        let membership = f.store.get_active(&user()).await.unwrap().unwrap();
        assert_eq!(membership.plan_id, f.monthly.id);
    }

    #[tokio::test]
    async fn fully_credited_upgrade_applies_without_gateway() {
        let f = fixture();

        let result = f.handler.handle_at(command(f.cheap.id), f.now).await.unwrap();

        assert_eq!(result.transaction.status, TransactionStatus::Paid);
        assert!(result.invoice_url.is_none());
        assert!(f.gateway.requests().is_empty());

        let membership = f.store.get_active(&user()).await.unwrap().unwrap();
        assert_eq!(membership.plan_id, f.cheap.id);
        assert_eq!(membership.end_date, Some(f.now.add_days(90)));
        assert_eq!(membership.days_remaining(f.now), 90);
    }

    #[tokio::test]
    async fn gateway_failure_persists_nothing() {
        let f = fixture();
        f.gateway.fail_next(PaymentError::network("connection reset"));

        let err = f.handler.handle(command(f.quarterly.id)).await.unwrap_err();

        assert!(matches!(err, MembershipError::PaymentFailed { .. }));
        assert!(err.is_retryable());
        assert_eq!(f.transactions.len().await, 0);
        let membership = f.store.get_active(&user()).await.unwrap().unwrap();
        assert_eq!(membership.plan_id, f.monthly.id);
    }

    #[tokio::test]
    async fn same_plan_is_rejected_before_gateway() {
        let f = fixture();

        let err = f.handler.handle(command(f.monthly.id)).await.unwrap_err();

        assert!(matches!(err, MembershipError::InvalidTarget { .. }));
        assert!(f.gateway.requests().is_empty());
    }
}
