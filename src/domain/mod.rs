//! Domain layer containing business logic and domain types.
//!
//! - `foundation` - Shared primitives (IDs, money, timestamps, errors)
//! - `membership` - Plans, active memberships and upgrade pricing

pub mod foundation;
pub mod membership;
