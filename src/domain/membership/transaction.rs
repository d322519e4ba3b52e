//! Upgrade checkout transactions.
//!
//! A transaction is opened when the member accepts a quote and a gateway
//! invoice is issued. The gateway callback settles it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{
    DomainError, ErrorCode, MembershipId, Money, PlanId, StateMachine, Timestamp, TransactionId,
    UserId, ValidationError,
};

/// Settlement state of an upgrade transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    /// Invoice issued, waiting for the gateway.
    Pending,
    /// Gateway confirmed payment. The upgrade has been applied.
    Paid,
    /// Invoice lapsed without payment.
    Expired,
    /// Gateway reported a failed payment.
    Failed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "PENDING",
            TransactionStatus::Paid => "PAID",
            TransactionStatus::Expired => "EXPIRED",
            TransactionStatus::Failed => "FAILED",
        }
    }
}

impl StateMachine for TransactionStatus {
    fn valid_transitions(&self) -> Vec<Self> {
        use TransactionStatus::*;
        match self {
            Pending => vec![Paid, Expired, Failed],
            Paid | Expired | Failed => vec![],
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TransactionStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PENDING" => Ok(TransactionStatus::Pending),
            "PAID" | "SETTLED" => Ok(TransactionStatus::Paid),
            "EXPIRED" => Ok(TransactionStatus::Expired),
            "FAILED" => Ok(TransactionStatus::Failed),
            other => Err(ValidationError::invalid_format(
                "status",
                format!("unknown transaction status '{}'", other),
            )),
        }
    }
}

/// One upgrade checkout attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeTransaction {
    pub id: TransactionId,
    pub user_id: UserId,
    pub membership_id: MembershipId,
    pub from_plan_id: PlanId,
    pub target_plan_id: PlanId,
    pub amount: Money,
    pub external_invoice_id: Option<String>,
    pub invoice_url: Option<String>,
    pub status: TransactionStatus,
    pub created_at: Timestamp,
    pub paid_at: Option<Timestamp>,
}

impl UpgradeTransaction {
    /// Opens a pending transaction for an accepted quote.
    pub fn open(
        user_id: UserId,
        membership_id: MembershipId,
        from_plan_id: PlanId,
        target_plan_id: PlanId,
        amount: Money,
        now: Timestamp,
    ) -> Self {
        Self {
            id: TransactionId::new(),
            user_id,
            membership_id,
            from_plan_id,
            target_plan_id,
            amount,
            external_invoice_id: None,
            invoice_url: None,
            status: TransactionStatus::Pending,
            created_at: now,
            paid_at: None,
        }
    }

    pub fn attach_invoice(&mut self, invoice_id: impl Into<String>, invoice_url: impl Into<String>) {
        self.external_invoice_id = Some(invoice_id.into());
        self.invoice_url = Some(invoice_url.into());
    }

    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.user_id == user_id
    }

    pub fn mark_paid(&mut self, now: Timestamp) -> Result<(), DomainError> {
        self.transition_to(TransactionStatus::Paid)?;
        self.paid_at = Some(now);
        Ok(())
    }

    pub fn mark_expired(&mut self) -> Result<(), DomainError> {
        self.transition_to(TransactionStatus::Expired)
    }

    pub fn mark_failed(&mut self) -> Result<(), DomainError> {
        self.transition_to(TransactionStatus::Failed)
    }

    fn transition_to(&mut self, target: TransactionStatus) -> Result<(), DomainError> {
        self.status = self.status.transition_to(target).map_err(|_| {
            DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!(
                    "Cannot transition transaction {} from {} to {}",
                    self.id, self.status, target
                ),
            )
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending() -> UpgradeTransaction {
        UpgradeTransaction::open(
            UserId::new("user-1").unwrap(),
            MembershipId::new(),
            PlanId::new(),
            PlanId::new(),
            Money::new(200_005).unwrap(),
            Timestamp::now(),
        )
    }

    #[test]
    fn opens_pending_without_invoice() {
        let tx = pending();
        assert_eq!(tx.status, TransactionStatus::Pending);
        assert!(tx.external_invoice_id.is_none());
        assert!(tx.paid_at.is_none());
    }

    #[test]
    fn pending_can_be_paid_once() {
        let mut tx = pending();
        let now = Timestamp::now();

        tx.mark_paid(now).unwrap();
        assert_eq!(tx.status, TransactionStatus::Paid);
        assert_eq!(tx.paid_at, Some(now));

        let err = tx.mark_paid(now).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidStateTransition);
    }

    #[test]
    fn settled_states_are_terminal() {
        assert!(TransactionStatus::Paid.is_terminal());
        assert!(TransactionStatus::Expired.is_terminal());
        assert!(TransactionStatus::Failed.is_terminal());
        assert!(!TransactionStatus::Pending.is_terminal());
    }

    #[test]
    fn expired_cannot_be_paid() {
        let mut tx = pending();
        tx.mark_expired().unwrap();
        assert!(tx.mark_paid(Timestamp::now()).is_err());
    }

    #[test]
    fn status_parses_gateway_spellings() {
        assert_eq!("paid".parse::<TransactionStatus>().unwrap(), TransactionStatus::Paid);
        assert_eq!("SETTLED".parse::<TransactionStatus>().unwrap(), TransactionStatus::Paid);
        assert_eq!("EXPIRED".parse::<TransactionStatus>().unwrap(), TransactionStatus::Expired);
        assert!("REFUNDED".parse::<TransactionStatus>().is_err());
    }

    #[test]
    fn ownership_check() {
        let tx = pending();
        assert!(tx.is_owned_by(&UserId::new("user-1").unwrap()));
        assert!(!tx.is_owned_by(&UserId::new("user-2").unwrap()));
    }
}
