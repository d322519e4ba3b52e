//! Membership-specific error types.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | NotFoundForUser / PlanNotFound / TransactionNotFound | 404 |
//! | AlreadyLifetime | 409 |
//! | InvalidTarget | 400 |
//! | InvalidState | 409 |
//! | PaymentFailed | 502 |
//! | InvalidCallbackToken | 401 |
//! | Forbidden | 403 |
//! | ValidationFailed | 400 |
//! | Infrastructure | 500 |

use crate::domain::foundation::{DomainError, ErrorCode, PlanId, TransactionId, UserId};

use super::proration::UpgradeError;

/// Errors surfaced by membership upgrade operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MembershipError {
    /// The user has no active membership to upgrade from.
    NotFoundForUser(UserId),

    PlanNotFound(PlanId),

    TransactionNotFound(TransactionId),

    /// Lifetime is terminal; no upgrade is offered.
    AlreadyLifetime,

    /// Target plan cannot be upgraded to.
    InvalidTarget { reason: String },

    InvalidState { current: String, attempted: String },

    /// Payment gateway rejected or failed the request.
    PaymentFailed { reason: String },

    InvalidCallbackToken,

    /// Caller does not own the requested resource.
    Forbidden,

    ValidationFailed { field: String, message: String },

    Infrastructure(String),
}

impl MembershipError {
    pub fn not_found_for_user(user_id: UserId) -> Self {
        MembershipError::NotFoundForUser(user_id)
    }

    pub fn plan_not_found(id: PlanId) -> Self {
        MembershipError::PlanNotFound(id)
    }

    pub fn transaction_not_found(id: TransactionId) -> Self {
        MembershipError::TransactionNotFound(id)
    }

    pub fn invalid_target(reason: impl Into<String>) -> Self {
        MembershipError::InvalidTarget {
            reason: reason.into(),
        }
    }

    pub fn invalid_state(current: impl Into<String>, attempted: impl Into<String>) -> Self {
        MembershipError::InvalidState {
            current: current.into(),
            attempted: attempted.into(),
        }
    }

    pub fn payment_failed(reason: impl Into<String>) -> Self {
        MembershipError::PaymentFailed {
            reason: reason.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        MembershipError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        MembershipError::Infrastructure(message.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            MembershipError::NotFoundForUser(_) => ErrorCode::MembershipNotFound,
            MembershipError::PlanNotFound(_) => ErrorCode::PlanNotFound,
            MembershipError::TransactionNotFound(_) => ErrorCode::TransactionNotFound,
            MembershipError::AlreadyLifetime => ErrorCode::AlreadyLifetime,
            MembershipError::InvalidTarget { .. } => ErrorCode::InvalidUpgradeTarget,
            MembershipError::InvalidState { .. } => ErrorCode::InvalidStateTransition,
            MembershipError::PaymentFailed { .. } => ErrorCode::PaymentFailed,
            MembershipError::InvalidCallbackToken => ErrorCode::InvalidCallbackToken,
            MembershipError::Forbidden => ErrorCode::Forbidden,
            MembershipError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            MembershipError::Infrastructure(_) => ErrorCode::InternalError,
        }
    }

    /// User-facing message.
    pub fn message(&self) -> String {
        match self {
            MembershipError::NotFoundForUser(user_id) => {
                format!("No active membership found for user: {}", user_id)
            }
            MembershipError::PlanNotFound(id) => format!("Membership plan not found: {}", id),
            MembershipError::TransactionNotFound(id) => format!("Transaction not found: {}", id),
            MembershipError::AlreadyLifetime => UpgradeError::AlreadyLifetime.to_string(),
            MembershipError::InvalidTarget { reason } => {
                format!("{}: {}", UpgradeError::InvalidTarget, reason)
            }
            MembershipError::InvalidState { current, attempted } => {
                format!("Cannot {} a transaction in {} state", attempted, current)
            }
            MembershipError::PaymentFailed { reason } => format!("Payment failed: {}", reason),
            MembershipError::InvalidCallbackToken => "Invalid callback token".to_string(),
            MembershipError::Forbidden => "Access to this resource is not allowed".to_string(),
            MembershipError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            MembershipError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }

    /// Only gateway and storage failures are transient; rule violations
    /// stay the same on every attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            MembershipError::Infrastructure(_) | MembershipError::PaymentFailed { .. }
        )
    }
}

impl std::fmt::Display for MembershipError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for MembershipError {}

impl From<UpgradeError> for MembershipError {
    fn from(err: UpgradeError) -> Self {
        match err {
            UpgradeError::AlreadyLifetime => MembershipError::AlreadyLifetime,
            UpgradeError::InvalidTarget => {
                MembershipError::invalid_target("target is the plan you already hold")
            }
        }
    }
}

impl From<DomainError> for MembershipError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::InvalidStateTransition => MembershipError::InvalidState {
                current: "settled".to_string(),
                attempted: err.message,
            },
            ErrorCode::ValidationFailed => MembershipError::ValidationFailed {
                field: err.details.get("field").cloned().unwrap_or_default(),
                message: err.message,
            },
            _ => MembershipError::Infrastructure(err.to_string()),
        }
    }
}

impl From<MembershipError> for DomainError {
    fn from(err: MembershipError) -> Self {
        DomainError::new(err.code(), err.message())
    }
}
