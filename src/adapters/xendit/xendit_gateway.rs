//! Xendit invoice gateway.
//!
//! Issues hosted invoices through `POST /v2/invoices` and authenticates
//! invoice callbacks by their `x-callback-token` header.
//!
//! # Security
//!
//! - Secret key and callback token are held as `secrecy::SecretString`
//! - Callback tokens are compared in constant time

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use subtle::ConstantTimeEq;

use crate::config::PaymentConfig;
use crate::ports::{CreateInvoiceRequest, Invoice, PaymentError, PaymentGateway};

use super::callback_types::{XenditCreateInvoice, XenditErrorBody, XenditInvoice};

/// Xendit API settings.
#[derive(Clone)]
pub struct XenditConfig {
    secret_key: SecretString,
    callback_token: SecretString,
    api_base_url: String,
    currency: String,
    invoice_duration_secs: u64,
    success_redirect_url: Option<String>,
    failure_redirect_url: Option<String>,
}

impl XenditConfig {
    pub fn new(secret_key: impl Into<String>, callback_token: impl Into<String>) -> Self {
        Self {
            secret_key: SecretString::new(secret_key.into()),
            callback_token: SecretString::new(callback_token.into()),
            api_base_url: "https://api.xendit.co".to_string(),
            currency: "IDR".to_string(),
            invoice_duration_secs: 86_400,
            success_redirect_url: None,
            failure_redirect_url: None,
        }
    }

    pub fn from_payment_config(config: &PaymentConfig) -> Self {
        Self {
            secret_key: SecretString::new(config.xendit_secret_key.clone()),
            callback_token: SecretString::new(config.xendit_callback_token.clone()),
            api_base_url: config.xendit_api_base_url.trim_end_matches('/').to_string(),
            currency: config.currency.clone(),
            invoice_duration_secs: config.invoice_duration_secs,
            success_redirect_url: config.success_redirect_url.clone(),
            failure_redirect_url: config.failure_redirect_url.clone(),
        }
    }

    /// Point at a different API host (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}

/// `PaymentGateway` backed by Xendit invoices.
pub struct XenditGateway {
    config: XenditConfig,
    http_client: reqwest::Client,
}

impl XenditGateway {
    pub fn new(config: XenditConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    fn invoices_url(&self) -> String {
        format!("{}/v2/invoices", self.config.api_base_url)
    }
}

#[async_trait]
impl PaymentGateway for XenditGateway {
    async fn create_invoice(&self, request: CreateInvoiceRequest) -> Result<Invoice, PaymentError> {
        if request.amount.is_zero() {
            return Err(PaymentError::invalid_request("invoice amount must be positive"));
        }

        let body = XenditCreateInvoice {
            external_id: &request.external_id,
            amount: request.amount.amount(),
            description: &request.description,
            payer_email: request.payer_email.as_deref(),
            invoice_duration: self.config.invoice_duration_secs,
            currency: &self.config.currency,
            success_redirect_url: self.config.success_redirect_url.as_deref(),
            failure_redirect_url: self.config.failure_redirect_url.as_deref(),
        };

        tracing::debug!(
            external_id = %request.external_id,
            amount = request.amount.amount(),
            "Creating Xendit invoice"
        );

        let response = self
            .http_client
            .post(self.invoices_url())
            .basic_auth(self.config.secret_key.expose_secret(), Some(""))
            // Xendit deduplicates invoice creation on this header.
            .header("X-IDEMPOTENCY-KEY", &request.external_id)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Xendit request failed: {}", e);
                PaymentError::network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error = response.json::<XenditErrorBody>().await.ok();
            tracing::warn!(
                http_status = status.as_u16(),
                error_code = error.as_ref().map(|e| e.error_code.as_str()),
                "Xendit rejected invoice"
            );
            let message = error
                .as_ref()
                .map(|e| e.message.clone())
                .unwrap_or_else(|| format!("Xendit returned {}", status));
            let mut err = match status.as_u16() {
                401 | 403 => PaymentError::authentication(message),
                400..=499 => PaymentError::invalid_request(message),
                _ => PaymentError::provider(message),
            };
            if let Some(error) = error {
                err = err.with_provider_code(error.error_code);
            }
            return Err(err);
        }

        let invoice: XenditInvoice = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse Xendit invoice: {}", e);
            PaymentError::provider(format!("unreadable invoice response: {}", e))
        })?;

        tracing::info!(
            invoice_id = %invoice.id,
            external_id = %invoice.external_id,
            status = %invoice.status,
            "Xendit invoice created"
        );

        Ok(Invoice {
            id: invoice.id,
            invoice_url: invoice.invoice_url,
            expires_at: invoice.expiry_date,
        })
    }

    fn verify_callback_token(&self, token: &str) -> bool {
        let expected = self.config.callback_token.expose_secret().as_bytes();
        if expected.is_empty() {
            return false;
        }
        expected.ct_eq(token.as_bytes()).into()
    }
}
