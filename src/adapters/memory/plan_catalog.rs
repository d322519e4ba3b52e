//! In-memory plan catalog.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, PlanId};
use crate::domain::membership::MembershipPlan;
use crate::ports::PlanCatalog;

/// Plan catalog held in process memory.
///
/// Used when no database is configured and in tests.
#[derive(Debug, Default)]
pub struct InMemoryPlanCatalog {
    plans: RwLock<HashMap<PlanId, MembershipPlan>>,
}

impl InMemoryPlanCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_plans(plans: impl IntoIterator<Item = MembershipPlan>) -> Self {
        let plans = plans.into_iter().map(|p| (p.id, p)).collect();
        Self {
            plans: RwLock::new(plans),
        }
    }

    pub async fn insert(&self, plan: MembershipPlan) {
        self.plans.write().await.insert(plan.id, plan);
    }
}

#[async_trait]
impl PlanCatalog for InMemoryPlanCatalog {
    async fn get(&self, plan_id: &PlanId) -> Result<Option<MembershipPlan>, DomainError> {
        Ok(self.plans.read().await.get(plan_id).cloned())
    }

    async fn list_active(&self) -> Result<Vec<MembershipPlan>, DomainError> {
        let mut plans: Vec<_> = self
            .plans
            .read()
            .await
            .values()
            .filter(|p| p.is_active)
            .cloned()
            .collect();
        plans.sort_by(|a, b| a.price.cmp(&b.price).then_with(|| a.name.cmp(&b.name)));
        Ok(plans)
    }
}
