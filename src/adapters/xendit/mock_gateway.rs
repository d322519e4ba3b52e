//! Mock payment gateway for testing.
//!
//! Issues predictable invoices, records every request and supports error
//! injection.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::ports::{CreateInvoiceRequest, Invoice, PaymentError, PaymentGateway};

/// In-process `PaymentGateway` for tests.
///
/// ```ignore
/// let gateway = MockPaymentGateway::new("cb-token");
/// gateway.fail_next(PaymentError::network("down"));
/// ```
#[derive(Clone)]
pub struct MockPaymentGateway {
    inner: Arc<Mutex<MockState>>,
    callback_token: String,
}

#[derive(Default)]
struct MockState {
    requests: Vec<CreateInvoiceRequest>,
    next_error: Option<PaymentError>,
}

impl MockPaymentGateway {
    pub fn new(callback_token: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockState::default())),
            callback_token: callback_token.into(),
        }
    }

    /// Make the next `create_invoice` call fail with `error`.
    pub fn fail_next(&self, error: PaymentError) {
        self.lock().next_error = Some(error);
    }

    /// Invoice requests received so far.
    pub fn requests(&self) -> Vec<CreateInvoiceRequest> {
        self.lock().requests.clone()
    }

    /// Invoice id the mock issues for a transaction.
    pub fn invoice_id_for(external_id: &str) -> String {
        format!("inv_{}", external_id)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        // A panicking test poisons the lock; the state is still usable.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn create_invoice(&self, request: CreateInvoiceRequest) -> Result<Invoice, PaymentError> {
        let mut state = self.lock();
        if let Some(error) = state.next_error.take() {
            return Err(error);
        }
        let id = Self::invoice_id_for(&request.external_id);
        let invoice_url = format!("https://checkout.example.test/{}", id);
        state.requests.push(request);
        Ok(Invoice {
            id,
            invoice_url,
            expires_at: None,
        })
    }

    fn verify_callback_token(&self, token: &str) -> bool {
        !self.callback_token.is_empty() && token == self.callback_token
    }
}
