//! Plan catalog port.
//!
//! Read access to the membership plans on sale.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, PlanId};
use crate::domain::membership::MembershipPlan;

#[async_trait]
pub trait PlanCatalog: Send + Sync {
    /// Get a plan by id, including inactive plans.
    async fn get(&self, plan_id: &PlanId) -> Result<Option<MembershipPlan>, DomainError>;

    /// All plans currently on sale, cheapest first.
    async fn list_active(&self) -> Result<Vec<MembershipPlan>, DomainError>;
}
