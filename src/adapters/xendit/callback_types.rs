//! Xendit wire types.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Money, Timestamp, ValidationError};
use crate::domain::membership::TransactionStatus;
use crate::ports::PaymentCallback;

/// Body of `POST /v2/invoices`.
#[derive(Debug, Clone, Serialize)]
pub struct XenditCreateInvoice<'a> {
    pub external_id: &'a str,
    pub amount: i64,
    pub description: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payer_email: Option<&'a str>,
    pub invoice_duration: u64,
    pub currency: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success_redirect_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_redirect_url: Option<&'a str>,
}

/// Invoice object returned by the invoice API.
#[derive(Debug, Clone, Deserialize)]
pub struct XenditInvoice {
    pub id: String,
    pub external_id: String,
    pub status: String,
    pub invoice_url: String,
    #[serde(default)]
    pub expiry_date: Option<Timestamp>,
}

/// Error body returned on non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct XenditErrorBody {
    pub error_code: String,
    pub message: String,
}

/// Invoice callback posted to our webhook.
#[derive(Debug, Clone, Deserialize)]
pub struct XenditInvoiceCallback {
    pub id: String,
    pub external_id: String,
    pub status: String,
    #[serde(default)]
    pub paid_amount: Option<f64>,
    #[serde(default)]
    pub payment_method: Option<String>,
}

impl TryFrom<XenditInvoiceCallback> for PaymentCallback {
    type Error = ValidationError;

    fn try_from(callback: XenditInvoiceCallback) -> Result<Self, Self::Error> {
        let status: TransactionStatus = callback.status.parse()?;
        let paid_amount = callback.paid_amount.map(whole_units).transpose()?;
        Ok(PaymentCallback {
            invoice_id: callback.id,
            external_id: callback.external_id,
            status,
            paid_amount,
        })
    }
}

/// Xendit reports amounts as JSON numbers; IDR has no minor unit.
fn whole_units(raw: f64) -> Result<Money, ValidationError> {
    if !raw.is_finite() || raw < 0.0 || raw > i64::MAX as f64 {
        return Err(ValidationError::invalid_format("paid_amount", "not a valid amount"));
    }
    Money::new(raw.round() as i64)
}
