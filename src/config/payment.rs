//! Payment configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Payment configuration (Xendit invoices)
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Xendit secret API key (`xnd_development_...` / `xnd_production_...`)
    #[serde(default)]
    pub xendit_secret_key: String,

    /// Callback verification token from the Xendit dashboard
    #[serde(default)]
    pub xendit_callback_token: String,

    /// Xendit API host
    #[serde(default = "default_api_base_url")]
    pub xendit_api_base_url: String,

    /// ISO currency code for invoices
    #[serde(default = "default_currency")]
    pub currency: String,

    /// How long an upgrade invoice stays payable
    #[serde(default = "default_invoice_duration")]
    pub invoice_duration_secs: u64,

    /// Where the hosted checkout sends the member after paying
    pub success_redirect_url: Option<String>,

    /// Where the hosted checkout sends the member after a failed payment
    pub failure_redirect_url: Option<String>,
}

impl PaymentConfig {
    /// Whether real Xendit credentials are present
    pub fn is_configured(&self) -> bool {
        !self.xendit_secret_key.is_empty()
    }

    /// Check if using a Xendit production key
    pub fn is_live_mode(&self) -> bool {
        self.xendit_secret_key.starts_with("xnd_production_")
    }

    /// Validate payment configuration
    ///
    /// Credentials may be omitted outside production; the service then runs
    /// against an offline gateway.
    pub fn validate(&self, production: bool) -> Result<(), ValidationError> {
        if production || self.is_configured() {
            if self.xendit_secret_key.is_empty() {
                return Err(ValidationError::MissingRequired("XENDIT_SECRET_KEY"));
            }
            if self.xendit_callback_token.is_empty() {
                return Err(ValidationError::MissingRequired("XENDIT_CALLBACK_TOKEN"));
            }
            if !self.xendit_secret_key.starts_with("xnd_") {
                return Err(ValidationError::InvalidXenditKey);
            }
        }
        if production && !self.xendit_api_base_url.starts_with("https://") {
            return Err(ValidationError::XenditUrlMustBeHttps);
        }
        if !(60..=31 * 86_400).contains(&self.invoice_duration_secs) {
            return Err(ValidationError::InvalidInvoiceDuration);
        }
        if self.currency.len() != 3 || !self.currency.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(ValidationError::InvalidCurrency);
        }
        Ok(())
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            xendit_secret_key: String::new(),
            xendit_callback_token: String::new(),
            xendit_api_base_url: default_api_base_url(),
            currency: default_currency(),
            invoice_duration_secs: default_invoice_duration(),
            success_redirect_url: None,
            failure_redirect_url: None,
        }
    }
}

fn default_api_base_url() -> String {
    "https://api.xendit.co".to_string()
}

fn default_currency() -> String {
    "IDR".to_string()
}

fn default_invoice_duration() -> u64 {
    86_400
}
