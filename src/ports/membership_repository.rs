//! Membership repository port (write side).

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, MembershipId};
use crate::domain::membership::ActiveMembership;

#[async_trait]
pub trait MembershipRepository: Send + Sync {
    /// Insert or replace a membership record.
    ///
    /// Saving makes the record the user's current membership.
    async fn save(&self, membership: &ActiveMembership) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: &MembershipId) -> Result<Option<ActiveMembership>, DomainError>;
}
