//! ListUpgradeOptionsHandler - Query handler for the upgrade page.

use std::sync::Arc;

use crate::domain::foundation::{Timestamp, UserId};
use crate::domain::membership::{
    MembershipError, MembershipPlan, ProrationCalculator, UpgradeCalculation,
};
use crate::ports::PlanCatalog;

use super::quote_upgrade::QuoteUpgradeHandler;

#[derive(Debug, Clone)]
pub struct ListUpgradeOptionsQuery {
    pub user_id: UserId,
}

/// One plan the member could move to, priced for them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpgradeOption {
    pub plan: MembershipPlan,
    pub calculation: UpgradeCalculation,
}

/// Everything the upgrade page shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpgradeOptions {
    pub current_plan: Option<MembershipPlan>,
    pub end_date: Option<Timestamp>,
    pub days_remaining: u32,
    /// Lifetime holders get no options.
    pub is_lifetime: bool,
    pub options: Vec<UpgradeOption>,
}

/// Lists every active plan other than the current one with its price.
pub struct ListUpgradeOptionsHandler {
    quotes: QuoteUpgradeHandler,
    catalog: Arc<dyn PlanCatalog>,
}

impl ListUpgradeOptionsHandler {
    pub fn new(quotes: QuoteUpgradeHandler, catalog: Arc<dyn PlanCatalog>) -> Self {
        Self { quotes, catalog }
    }

    pub async fn handle(
        &self,
        query: ListUpgradeOptionsQuery,
    ) -> Result<UpgradeOptions, MembershipError> {
        self.list_at(&query.user_id, Timestamp::now()).await
    }

    pub(crate) async fn list_at(
        &self,
        user_id: &UserId,
        now: Timestamp,
    ) -> Result<UpgradeOptions, MembershipError> {
        let (membership, current_plan) = match self.quotes.current(user_id).await {
            Ok(found) => found,
            Err(MembershipError::AlreadyLifetime) => {
                return Ok(UpgradeOptions {
                    current_plan: None,
                    end_date: None,
                    days_remaining: 0,
                    is_lifetime: true,
                    options: Vec::new(),
                })
            }
            Err(err) => return Err(err),
        };

        let days_remaining = membership.days_remaining_on(&current_plan, now);
        let current_terms = current_plan.terms();

        let mut options = Vec::new();
        for plan in self.catalog.list_active().await? {
            if plan.id == current_plan.id {
                continue;
            }
            let calculation =
                ProrationCalculator::calculate(&current_terms, days_remaining, &plan.terms())?;
            options.push(UpgradeOption { plan, calculation });
        }

        Ok(UpgradeOptions {
            is_lifetime: current_plan.is_lifetime(),
            current_plan: Some(current_plan),
            end_date: membership.end_date,
            days_remaining,
            options,
        })
    }
}
