//! Ports - contracts between the application layer and the outside world.
//!
//! - `PlanCatalog` - membership plans on sale
//! - `MembershipReader` / `MembershipRepository` - the member's current membership
//! - `TransactionRepository` - upgrade checkout transactions
//! - `PaymentGateway` - hosted invoices and settlement callbacks

mod membership_reader;
mod membership_repository;
mod payment_gateway;
mod plan_catalog;
mod transaction_repository;

pub use membership_reader::MembershipReader;
pub use membership_repository::MembershipRepository;
pub use payment_gateway::{
    CreateInvoiceRequest, Invoice, PaymentCallback, PaymentError, PaymentErrorCode, PaymentGateway,
};
pub use plan_catalog::PlanCatalog;
pub use transaction_repository::TransactionRepository;
