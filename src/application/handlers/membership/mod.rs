//! Membership upgrade handlers.
//!
//! ## Commands
//! - Starting an upgrade checkout
//! - Settling a payment gateway callback
//!
//! ## Queries
//! - Pricing one upgrade
//! - Listing upgrade options
//! - Polling a checkout transaction

mod confirm_upgrade_payment;
mod get_transaction_status;
mod initiate_upgrade;
mod list_upgrade_options;
mod quote_upgrade;

// Commands
pub use confirm_upgrade_payment::{
    ConfirmUpgradePaymentCommand, ConfirmUpgradePaymentHandler, ConfirmUpgradePaymentResult,
};
pub use initiate_upgrade::{InitiateUpgradeCommand, InitiateUpgradeHandler, InitiateUpgradeResult};

// Queries
pub use get_transaction_status::{GetTransactionStatusHandler, GetTransactionStatusQuery};
pub use list_upgrade_options::{
    ListUpgradeOptionsHandler, ListUpgradeOptionsQuery, UpgradeOption, UpgradeOptions,
};
pub use quote_upgrade::{QuoteUpgradeHandler, QuoteUpgradeQuery, UpgradeQuote};
