//! Payment gateway port.
//!
//! The gateway issues hosted invoices for upgrade payments and later calls
//! back with the settlement result. Implementations must treat invoice
//! creation as idempotent per `external_id`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::foundation::{Money, Timestamp};
use crate::domain::membership::TransactionStatus;

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Issue a hosted invoice the member can pay.
    async fn create_invoice(&self, request: CreateInvoiceRequest) -> Result<Invoice, PaymentError>;

    /// Check the shared token a callback presented.
    fn verify_callback_token(&self, token: &str) -> bool;
}

/// Invoice to issue for an upgrade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateInvoiceRequest {
    /// Our transaction id; echoed back in callbacks.
    pub external_id: String,
    pub amount: Money,
    pub description: String,
    pub payer_email: Option<String>,
}

/// An invoice issued by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: String,
    pub invoice_url: String,
    pub expires_at: Option<Timestamp>,
}

/// Settlement notice delivered by the gateway, already authenticated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentCallback {
    pub invoice_id: String,
    pub external_id: String,
    pub status: TransactionStatus,
    /// Amount the gateway collected, when it reports one.
    pub paid_amount: Option<Money>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentErrorCode {
    NetworkError,
    AuthenticationError,
    InvalidRequest,
    ProviderError,
}

impl PaymentErrorCode {
    pub fn is_retryable(&self) -> bool {
        matches!(self, PaymentErrorCode::NetworkError | PaymentErrorCode::ProviderError)
    }
}

/// Errors from payment gateway operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code:?}: {message}")]
pub struct PaymentError {
    pub code: PaymentErrorCode,
    pub message: String,
    /// Gateway's own error code, if it sent one.
    pub provider_code: Option<String>,
}

impl PaymentError {
    pub fn new(code: PaymentErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            provider_code: None,
        }
    }

    pub fn with_provider_code(mut self, code: impl Into<String>) -> Self {
        self.provider_code = Some(code.into());
        self
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::NetworkError, message)
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::AuthenticationError, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::InvalidRequest, message)
    }

    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::ProviderError, message)
    }

    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }
}
