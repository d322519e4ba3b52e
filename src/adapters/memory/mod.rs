//! In-memory adapters for every storage port.

mod membership_store;
mod plan_catalog;
mod seed;
mod transaction_store;

pub use membership_store::InMemoryMembershipStore;
pub use plan_catalog::InMemoryPlanCatalog;
pub use seed::{MemorySeed, SeedError};
pub use transaction_store::InMemoryTransactionStore;
