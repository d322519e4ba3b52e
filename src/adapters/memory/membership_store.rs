//! In-memory membership store.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, MembershipId, UserId};
use crate::domain::membership::ActiveMembership;
use crate::ports::{MembershipReader, MembershipRepository};

/// Membership records held in process memory.
///
/// The most recently updated record of a user is their current one.
#[derive(Debug, Default)]
pub struct InMemoryMembershipStore {
    memberships: RwLock<Vec<ActiveMembership>>,
}

impl InMemoryMembershipStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_memberships(memberships: Vec<ActiveMembership>) -> Self {
        Self {
            memberships: RwLock::new(memberships),
        }
    }
}

#[async_trait]
impl MembershipReader for InMemoryMembershipStore {
    async fn get_active(&self, user_id: &UserId) -> Result<Option<ActiveMembership>, DomainError> {
        Ok(self
            .memberships
            .read()
            .await
            .iter()
            .filter(|m| &m.user_id == user_id)
            .max_by_key(|m| m.updated_at)
            .cloned())
    }
}

#[async_trait]
impl MembershipRepository for InMemoryMembershipStore {
    async fn save(&self, membership: &ActiveMembership) -> Result<(), DomainError> {
        let mut memberships = self.memberships.write().await;
        match memberships.iter_mut().find(|m| m.id == membership.id) {
            Some(existing) => *existing = membership.clone(),
            None => memberships.push(membership.clone()),
        }
        Ok(())
    }

    async fn find_by_id(&self, id: &MembershipId) -> Result<Option<ActiveMembership>, DomainError> {
        Ok(self
            .memberships
            .read()
            .await
            .iter()
            .find(|m| &m.id == id)
            .cloned())
    }
}
