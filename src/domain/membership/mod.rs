//! Membership domain module.
//!
//! Plans, the member's active membership, the upgrade proration rule and
//! upgrade checkout transactions.
//!
//! # Module Structure
//!
//! - `plan` - MembershipPlan catalog entries and durations
//! - `active` - ActiveMembership with derived days remaining
//! - `proration` - ProrationCalculator (pure upgrade pricing)
//! - `transaction` - UpgradeTransaction settlement state machine
//! - `errors` - MembershipError

mod active;
mod errors;
mod plan;
mod proration;
mod transaction;

pub use active::ActiveMembership;
pub use errors::MembershipError;
pub use plan::{MembershipPlan, PlanDuration};
pub use proration::{PlanLength, PlanTerms, ProrationCalculator, UpgradeCalculation, UpgradeError};
pub use transaction::{TransactionStatus, UpgradeTransaction};
