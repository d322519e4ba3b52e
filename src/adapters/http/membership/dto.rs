//! HTTP DTOs (Data Transfer Objects) for membership upgrade endpoints.
//!
//! These types define the JSON request/response structure for the upgrade API.
//! They serve as the boundary between HTTP and the application layer.

use serde::{Deserialize, Serialize};

use crate::application::handlers::membership::{
    ConfirmUpgradePaymentResult, InitiateUpgradeResult, UpgradeOption, UpgradeOptions,
    UpgradeQuote,
};
use crate::domain::foundation::{PlanId, Timestamp, TransactionId};
use crate::domain::membership::{
    MembershipPlan, PlanDuration, TransactionStatus, UpgradeCalculation, UpgradeTransaction,
};

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Query string of `GET /upgrade/quote`.
#[derive(Debug, Clone, Deserialize)]
pub struct QuoteUpgradeParams {
    pub target_plan_id: PlanId,
}

/// Body of `POST /upgrade`.
#[derive(Debug, Clone, Deserialize)]
pub struct InitiateUpgradeRequest {
    pub target_plan_id: PlanId,
    /// Prefills the hosted checkout page.
    #[serde(default)]
    pub payer_email: Option<String>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize)]
pub struct PlanResponse {
    pub id: PlanId,
    pub name: String,
    pub duration: PlanDuration,
    pub duration_label: &'static str,
    pub price: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_price: Option<i64>,
}

impl From<MembershipPlan> for PlanResponse {
    fn from(plan: MembershipPlan) -> Self {
        Self {
            id: plan.id,
            duration_label: plan.duration.display_name(),
            duration: plan.duration,
            price: plan.price.amount(),
            original_price: plan.original_price.map(|p| p.amount()),
            name: plan.name,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CalculationResponse {
    pub target_plan_id: PlanId,
    pub remaining_value: i64,
    pub discount: i64,
    pub upgrade_price: i64,
    pub message: String,
    pub is_lifetime_upgrade: bool,
}

impl From<UpgradeCalculation> for CalculationResponse {
    fn from(calc: UpgradeCalculation) -> Self {
        Self {
            target_plan_id: calc.target_plan_id,
            remaining_value: calc.remaining_value.amount(),
            discount: calc.discount.amount(),
            upgrade_price: calc.upgrade_price.amount(),
            message: calc.message,
            is_lifetime_upgrade: calc.is_lifetime_upgrade,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UpgradeOptionResponse {
    pub plan: PlanResponse,
    pub calculation: CalculationResponse,
}

impl From<UpgradeOption> for UpgradeOptionResponse {
    fn from(option: UpgradeOption) -> Self {
        Self {
            plan: option.plan.into(),
            calculation: option.calculation.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UpgradeOptionsResponse {
    pub current_plan: Option<PlanResponse>,
    pub end_date: Option<Timestamp>,
    pub days_remaining: u32,
    pub is_lifetime: bool,
    pub options: Vec<UpgradeOptionResponse>,
}

impl From<UpgradeOptions> for UpgradeOptionsResponse {
    fn from(options: UpgradeOptions) -> Self {
        Self {
            current_plan: options.current_plan.map(PlanResponse::from),
            end_date: options.end_date,
            days_remaining: options.days_remaining,
            is_lifetime: options.is_lifetime,
            options: options.options.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UpgradeQuoteResponse {
    pub current_plan: PlanResponse,
    pub target_plan: PlanResponse,
    pub end_date: Option<Timestamp>,
    pub days_remaining: u32,
    pub calculation: CalculationResponse,
}

impl From<UpgradeQuote> for UpgradeQuoteResponse {
    fn from(quote: UpgradeQuote) -> Self {
        Self {
            current_plan: quote.current_plan.into(),
            target_plan: quote.target_plan.into(),
            end_date: quote.membership.end_date,
            days_remaining: quote.days_remaining,
            calculation: quote.calculation.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TransactionResponse {
    pub id: TransactionId,
    pub status: TransactionStatus,
    pub amount: i64,
    pub from_plan_id: PlanId,
    pub target_plan_id: PlanId,
    pub invoice_url: Option<String>,
    pub created_at: Timestamp,
    pub paid_at: Option<Timestamp>,
}

impl From<UpgradeTransaction> for TransactionResponse {
    fn from(tx: UpgradeTransaction) -> Self {
        Self {
            id: tx.id,
            status: tx.status,
            amount: tx.amount.amount(),
            from_plan_id: tx.from_plan_id,
            target_plan_id: tx.target_plan_id,
            invoice_url: tx.invoice_url,
            created_at: tx.created_at,
            paid_at: tx.paid_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InitiateUpgradeResponse {
    pub transaction: TransactionResponse,
    pub calculation: CalculationResponse,
    /// Hosted checkout to redirect to; absent when nothing was owed.
    pub invoice_url: Option<String>,
}

impl From<InitiateUpgradeResult> for InitiateUpgradeResponse {
    fn from(result: InitiateUpgradeResult) -> Self {
        Self {
            transaction: result.transaction.into(),
            calculation: result.calculation.into(),
            invoice_url: result.invoice_url,
        }
    }
}

/// Acknowledgement returned to the payment gateway.
#[derive(Debug, Clone, Serialize)]
pub struct WebhookAckResponse {
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<TransactionId>,
}

impl From<ConfirmUpgradePaymentResult> for WebhookAckResponse {
    fn from(result: ConfirmUpgradePaymentResult) -> Self {
        let (outcome, transaction_id) = match result {
            ConfirmUpgradePaymentResult::Applied(id) => ("applied", Some(id)),
            ConfirmUpgradePaymentResult::MarkedExpired(id) => ("expired", Some(id)),
            ConfirmUpgradePaymentResult::MarkedFailed(id) => ("failed", Some(id)),
            ConfirmUpgradePaymentResult::Rejected(id) => ("rejected", Some(id)),
            ConfirmUpgradePaymentResult::AlreadySettled(id) => ("already_settled", Some(id)),
            ConfirmUpgradePaymentResult::Ignored => ("ignored", None),
        };
        Self {
            outcome,
            transaction_id,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Response DTO
// ════════════════════════════════════════════════════════════════════════════════

/// Standard error response for API errors.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::Money;

    #[test]
    fn plan_response_serializes_duration_code() {
        let plan = MembershipPlan::new(
            PlanId::new(),
            "Quarterly",
            PlanDuration::ThreeMonths,
            Money::new(250_000).unwrap(),
        )
        .unwrap()
        .with_original_price(Money::new(300_000).unwrap());

        let json = serde_json::to_value(PlanResponse::from(plan)).unwrap();

        assert_eq!(json["duration"], "3_MONTHS");
        assert_eq!(json["price"], 250_000);
        assert_eq!(json["original_price"], 300_000);
    }

    #[test]
    fn ignored_webhook_ack_omits_transaction() {
        let json = serde_json::to_value(WebhookAckResponse::from(
            ConfirmUpgradePaymentResult::Ignored,
        ))
        .unwrap();
        assert_eq!(json, serde_json::json!({ "outcome": "ignored" }));
    }

    #[test]
    fn rejected_webhook_ack_names_transaction() {
        let id = TransactionId::new();
        let json =
            serde_json::to_value(WebhookAckResponse::from(ConfirmUpgradePaymentResult::Rejected(id)))
                .unwrap();
        assert_eq!(json["outcome"], "rejected");
        assert_eq!(json["transaction_id"], id.to_string());
    }

    #[test]
    fn error_response_shape() {
        let json = serde_json::to_value(ErrorResponse::new("ALREADY_LIFETIME", "nope")).unwrap();
        assert_eq!(json, serde_json::json!({ "code": "ALREADY_LIFETIME", "message": "nope" }));
    }
}
