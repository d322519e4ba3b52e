//! ConfirmUpgradePaymentHandler - Command handler for gateway payment callbacks.
//!
//! Callbacks may arrive more than once and in any order relative to the
//! member's browser. Only a `Pending` transaction is ever settled; anything
//! already settled is acknowledged without side effects.
//!
//! A member can hold several open invoices at once. A payment is applied
//! only while the membership still sits on the plan the invoice was priced
//! from; otherwise the transaction is failed and logged for refund.

use std::sync::Arc;

use crate::domain::foundation::{Timestamp, TransactionId};
use crate::domain::membership::{MembershipError, TransactionStatus, UpgradeTransaction};
use crate::ports::{
    MembershipRepository, PaymentCallback, PaymentGateway, PlanCatalog, TransactionRepository,
};

/// An unauthenticated callback as received over HTTP.
#[derive(Debug, Clone)]
pub struct ConfirmUpgradePaymentCommand {
    pub callback_token: String,
    pub callback: PaymentCallback,
}

/// What the callback did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmUpgradePaymentResult {
    /// Payment confirmed and the membership moved to the target plan.
    Applied(TransactionId),
    MarkedExpired(TransactionId),
    MarkedFailed(TransactionId),
    /// Payment arrived but no longer matches the membership or the invoice
    /// amount; the transaction is failed and needs a refund.
    Rejected(TransactionId),
    /// Transaction was settled by an earlier callback.
    AlreadySettled(TransactionId),
    /// Nothing to do (unknown invoice or a non-final status).
    Ignored,
}

pub struct ConfirmUpgradePaymentHandler {
    gateway: Arc<dyn PaymentGateway>,
    transactions: Arc<dyn TransactionRepository>,
    memberships: Arc<dyn MembershipRepository>,
    catalog: Arc<dyn PlanCatalog>,
}

impl ConfirmUpgradePaymentHandler {
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        transactions: Arc<dyn TransactionRepository>,
        memberships: Arc<dyn MembershipRepository>,
        catalog: Arc<dyn PlanCatalog>,
    ) -> Self {
        Self {
            gateway,
            transactions,
            memberships,
            catalog,
        }
    }

    pub async fn handle(
        &self,
        cmd: ConfirmUpgradePaymentCommand,
    ) -> Result<ConfirmUpgradePaymentResult, MembershipError> {
        if !self.gateway.verify_callback_token(&cmd.callback_token) {
            tracing::warn!(
                invoice_id = %cmd.callback.invoice_id,
                "Rejected payment callback with invalid token"
            );
            return Err(MembershipError::InvalidCallbackToken);
        }

        let callback = cmd.callback;
        let Some(mut transaction) = self.find_transaction(&callback).await? else {
            tracing::warn!(
                invoice_id = %callback.invoice_id,
                external_id = %callback.external_id,
                "Payment callback for unknown transaction"
            );
            return Ok(ConfirmUpgradePaymentResult::Ignored);
        };

        if transaction.status != TransactionStatus::Pending {
            if transaction.status != callback.status {
                tracing::warn!(
                    transaction_id = %transaction.id,
                    current = %transaction.status,
                    reported = %callback.status,
                    "Callback disagrees with settled transaction; keeping current status"
                );
            }
            return Ok(ConfirmUpgradePaymentResult::AlreadySettled(transaction.id));
        }

        let now = Timestamp::now();
        match callback.status {
            TransactionStatus::Pending => Ok(ConfirmUpgradePaymentResult::Ignored),
            TransactionStatus::Paid => self.settle_payment(&mut transaction, &callback, now).await,
            TransactionStatus::Expired => {
                transaction.mark_expired()?;
                self.transactions.update(&transaction).await?;
                tracing::info!(transaction_id = %transaction.id, "Upgrade invoice expired");
                Ok(ConfirmUpgradePaymentResult::MarkedExpired(transaction.id))
            }
            TransactionStatus::Failed => {
                transaction.mark_failed()?;
                self.transactions.update(&transaction).await?;
                tracing::info!(transaction_id = %transaction.id, "Upgrade payment failed");
                Ok(ConfirmUpgradePaymentResult::MarkedFailed(transaction.id))
            }
        }
    }

    /// Invoice id first; our own transaction id as echoed in `external_id`
    /// covers callbacks that race the invoice id being stored.
    async fn find_transaction(
        &self,
        callback: &PaymentCallback,
    ) -> Result<Option<UpgradeTransaction>, MembershipError> {
        if let Some(transaction) = self.transactions.find_by_invoice_id(&callback.invoice_id).await? {
            return Ok(Some(transaction));
        }
        match callback.external_id.parse::<TransactionId>() {
            Ok(id) => Ok(self.transactions.find_by_id(&id).await?),
            Err(_) => Ok(None),
        }
    }

    async fn settle_payment(
        &self,
        transaction: &mut UpgradeTransaction,
        callback: &PaymentCallback,
        now: Timestamp,
    ) -> Result<ConfirmUpgradePaymentResult, MembershipError> {
        if let Some(paid) = callback.paid_amount {
            if paid < transaction.amount {
                return self
                    .reject(transaction, "paid amount is below the invoiced amount")
                    .await;
            }
            if paid > transaction.amount {
                tracing::warn!(
                    transaction_id = %transaction.id,
                    invoiced = transaction.amount.amount(),
                    paid = paid.amount(),
                    "Gateway reports an overpayment"
                );
            }
        }

        let mut membership = self
            .memberships
            .find_by_id(&transaction.membership_id)
            .await?
            .ok_or_else(|| {
                MembershipError::infrastructure(format!(
                    "membership {} of transaction {} is missing",
                    transaction.membership_id, transaction.id
                ))
            })?;

        if membership.plan_id == transaction.target_plan_id {
            // Membership was saved but the transaction update was lost.
            transaction.mark_paid(now)?;
            self.transactions.update(transaction).await?;
            tracing::warn!(
                transaction_id = %transaction.id,
                membership_id = %membership.id,
                "Membership already on target plan; marking transaction paid without reapplying"
            );
            return Ok(ConfirmUpgradePaymentResult::Applied(transaction.id));
        }

        if membership.is_lifetime() || membership.plan_id != transaction.from_plan_id {
            return self
                .reject(transaction, "membership changed plan after the invoice was issued")
                .await;
        }

        let target = self
            .catalog
            .get(&transaction.target_plan_id)
            .await?
            .ok_or(MembershipError::plan_not_found(transaction.target_plan_id))?;

        transaction.mark_paid(now)?;
        membership.apply_upgrade(&target, now);

        self.memberships.save(&membership).await?;
        self.transactions.update(transaction).await?;

        tracing::info!(
            transaction_id = %transaction.id,
            user_id = %transaction.user_id,
            target_plan_id = %target.id,
            lifetime = membership.is_lifetime(),
            "Upgrade payment confirmed; membership upgraded"
        );
        Ok(ConfirmUpgradePaymentResult::Applied(transaction.id))
    }

    async fn reject(
        &self,
        transaction: &mut UpgradeTransaction,
        reason: &str,
    ) -> Result<ConfirmUpgradePaymentResult, MembershipError> {
        transaction.mark_failed()?;
        self.transactions.update(transaction).await?;
        tracing::warn!(
            transaction_id = %transaction.id,
            user_id = %transaction.user_id,
            invoice_id = transaction.external_invoice_id.as_deref().unwrap_or(""),
            amount = transaction.amount.amount(),
            reason,
            "Paid upgrade not applied; refund required"
        );
        Ok(ConfirmUpgradePaymentResult::Rejected(transaction.id))
    }
}
