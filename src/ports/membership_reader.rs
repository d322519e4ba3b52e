//! Membership reader port (read side).
//!
//! Resolves which membership is "current" for a user. When a user has
//! several membership records, the current one is the record backed by the
//! most recently validated transaction; implementations own that choice.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::membership::ActiveMembership;

#[async_trait]
pub trait MembershipReader: Send + Sync {
    /// Get the user's current membership.
    ///
    /// Returns `None` if the user has never held one. Expired memberships are
    /// still returned; callers read days remaining off the end date.
    async fn get_active(&self, user_id: &UserId) -> Result<Option<ActiveMembership>, DomainError>;
}
