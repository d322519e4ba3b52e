//! Xendit payment gateway adapter.
//!
//! Implements the `PaymentGateway` port with Xendit's invoice API:
//! - hosted invoice creation for upgrade payments
//! - invoice callback authentication via the shared callback token
//!
//! # Configuration
//!
//! - `MEMBERSHIP_UPGRADE__PAYMENT__XENDIT_SECRET_KEY`
//! - `MEMBERSHIP_UPGRADE__PAYMENT__XENDIT_CALLBACK_TOKEN`

mod callback_types;
mod mock_gateway;
mod xendit_gateway;

pub use callback_types::{XenditInvoice, XenditInvoiceCallback};
pub use mock_gateway::MockPaymentGateway;
pub use xendit_gateway::{XenditConfig, XenditGateway};
