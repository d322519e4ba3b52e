//! QuoteUpgradeHandler - Query handler pricing an upgrade for the caller.

use std::sync::Arc;

use crate::domain::foundation::{PlanId, Timestamp, UserId};
use crate::domain::membership::{
    ActiveMembership, MembershipError, MembershipPlan, ProrationCalculator, UpgradeCalculation,
};
use crate::ports::{MembershipReader, PlanCatalog};

/// Query to price an upgrade to `target_plan_id`.
#[derive(Debug, Clone)]
pub struct QuoteUpgradeQuery {
    pub user_id: UserId,
    pub target_plan_id: PlanId,
}

/// A priced upgrade, with the context needed to display or act on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpgradeQuote {
    pub membership: ActiveMembership,
    pub current_plan: MembershipPlan,
    pub target_plan: MembershipPlan,
    pub days_remaining: u32,
    pub calculation: UpgradeCalculation,
}

/// Handler for pricing upgrades.
///
/// Also used by the options and checkout handlers so every path prices an
/// upgrade the same way.
#[derive(Clone)]
pub struct QuoteUpgradeHandler {
    reader: Arc<dyn MembershipReader>,
    catalog: Arc<dyn PlanCatalog>,
}

impl QuoteUpgradeHandler {
    pub fn new(reader: Arc<dyn MembershipReader>, catalog: Arc<dyn PlanCatalog>) -> Self {
        Self { reader, catalog }
    }

    pub async fn handle(&self, query: QuoteUpgradeQuery) -> Result<UpgradeQuote, MembershipError> {
        self.quote_at(&query.user_id, &query.target_plan_id, Timestamp::now())
            .await
    }

    pub(crate) async fn quote_at(
        &self,
        user_id: &UserId,
        target_plan_id: &PlanId,
        now: Timestamp,
    ) -> Result<UpgradeQuote, MembershipError> {
        let (membership, current_plan) = self.current(user_id).await?;

        let target_plan = self
            .catalog
            .get(target_plan_id)
            .await?
            .ok_or(MembershipError::plan_not_found(*target_plan_id))?;

        if !target_plan.is_active && target_plan.id != current_plan.id {
            return Err(MembershipError::invalid_target("plan is no longer on sale"));
        }

        let days_remaining = membership.days_remaining_on(&current_plan, now);
        let calculation = ProrationCalculator::calculate(
            &current_plan.terms(),
            days_remaining,
            &target_plan.terms(),
        )?;

        Ok(UpgradeQuote {
            membership,
            current_plan,
            target_plan,
            days_remaining,
            calculation,
        })
    }

    /// Loads the caller's membership and its plan.
    ///
    /// Lifetime holders are turned away here, before any target lookup.
    pub(crate) async fn current(
        &self,
        user_id: &UserId,
    ) -> Result<(ActiveMembership, MembershipPlan), MembershipError> {
        let membership = self
            .reader
            .get_active(user_id)
            .await?
            .ok_or_else(|| MembershipError::not_found_for_user(user_id.clone()))?;

        if membership.is_lifetime() {
            return Err(MembershipError::AlreadyLifetime);
        }

        let current_plan = self
            .catalog
            .get(&membership.plan_id)
            .await?
            .ok_or(MembershipError::plan_not_found(membership.plan_id))?;

        Ok((membership, current_plan))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryMembershipStore, InMemoryPlanCatalog};
    use crate::domain::foundation::{DomainError, Money};
    use crate::domain::membership::PlanDuration;
    use async_trait::async_trait;

    fn plan(name: &str, duration: PlanDuration, price: i64) -> MembershipPlan {
        MembershipPlan::new(PlanId::new(), name, duration, Money::new(price).unwrap()).unwrap()
    }

    fn user() -> UserId {
        UserId::new("member-1").unwrap()
    }

    /// Membership on `plan` with `days` whole days (plus a margin) left at `now`.
    fn membership_with_days_left(plan: &MembershipPlan, days: i64, now: Timestamp) -> ActiveMembership {
        let mut membership = ActiveMembership::start(user(), plan, now.add_days(-30));
        membership.end_date = Some(now.add_days(days).add_hours(1));
        membership
    }

    fn handler(
        plans: Vec<MembershipPlan>,
        memberships: Vec<ActiveMembership>,
    ) -> QuoteUpgradeHandler {
        QuoteUpgradeHandler::new(
            Arc::new(InMemoryMembershipStore::with_memberships(memberships)),
            Arc::new(InMemoryPlanCatalog::with_plans(plans)),
        )
    }

    #[tokio::test]
    async fn prices_upgrade_with_prorated_credit() {
        let now = Timestamp::now();
        let monthly = plan("Monthly", PlanDuration::OneMonth, 100_000);
        let quarterly = plan("Quarterly", PlanDuration::ThreeMonths, 250_000);
        let membership = membership_with_days_left(&monthly, 15, now);
        let handler = handler(vec![monthly.clone(), quarterly.clone()], vec![membership]);

        let quote = handler.quote_at(&user(), &quarterly.id, now).await.unwrap();

        assert_eq!(quote.days_remaining, 15);
        assert_eq!(quote.current_plan.id, monthly.id);
        assert_eq!(quote.calculation.upgrade_price.amount(), 200_005);
        assert_eq!(quote.calculation.discount.amount(), 49_995);
    }

    #[tokio::test]
    async fn credit_never_exceeds_one_plan_window() {
        let now = Timestamp::now();
        let monthly = plan("Monthly", PlanDuration::OneMonth, 100_000);
        let quarterly = plan("Quarterly", PlanDuration::ThreeMonths, 250_000);
        let membership = membership_with_days_left(&monthly, 200, now);
        let handler = handler(vec![monthly.clone(), quarterly.clone()], vec![membership]);

        let quote = handler.quote_at(&user(), &quarterly.id, now).await.unwrap();

        assert_eq!(quote.days_remaining, 30);
        assert!(quote.calculation.discount <= monthly.price);
        assert_eq!(quote.calculation.discount.amount(), 99_990);
    }

    #[tokio::test]
    async fn expired_membership_pays_full_price() {
        let now = Timestamp::now();
        let monthly = plan("Monthly", PlanDuration::OneMonth, 100_000);
        let quarterly = plan("Quarterly", PlanDuration::ThreeMonths, 250_000);
        let membership = membership_with_days_left(&monthly, -5, now);
        let handler = handler(vec![monthly, quarterly.clone()], vec![membership]);

        let quote = handler.quote_at(&user(), &quarterly.id, now).await.unwrap();

        assert_eq!(quote.days_remaining, 0);
        assert_eq!(quote.calculation.upgrade_price.amount(), 250_000);
    }

    #[tokio::test]
    async fn lifetime_member_is_rejected() {
        let now = Timestamp::now();
        let lifetime = plan("Lifetime", PlanDuration::Lifetime, 2_000_000);
        let quarterly = plan("Quarterly", PlanDuration::ThreeMonths, 250_000);
        let membership = ActiveMembership::start(user(), &lifetime, now);
        let handler = handler(vec![lifetime, quarterly.clone()], vec![membership]);

        let err = handler.quote_at(&user(), &quarterly.id, now).await.unwrap_err();
        assert_eq!(err, MembershipError::AlreadyLifetime);
    }

    #[tokio::test]
    async fn lifetime_member_is_rejected_even_for_unknown_target() {
        let now = Timestamp::now();
        let lifetime = plan("Lifetime", PlanDuration::Lifetime, 2_000_000);
        let membership = ActiveMembership::start(user(), &lifetime, now);
        let handler = handler(vec![lifetime], vec![membership]);

        let err = handler.quote_at(&user(), &PlanId::new(), now).await.unwrap_err();
        assert_eq!(err, MembershipError::AlreadyLifetime);
    }

    #[tokio::test]
    async fn same_plan_is_invalid_target() {
        let now = Timestamp::now();
        let monthly = plan("Monthly", PlanDuration::OneMonth, 100_000);
        let membership = membership_with_days_left(&monthly, 10, now);
        let handler = handler(vec![monthly.clone()], vec![membership]);

        let err = handler.quote_at(&user(), &monthly.id, now).await.unwrap_err();
        assert!(matches!(err, MembershipError::InvalidTarget { .. }));
    }

    #[tokio::test]
    async fn inactive_target_is_invalid() {
        let now = Timestamp::now();
        let monthly = plan("Monthly", PlanDuration::OneMonth, 100_000);
        let retired = plan("Old Annual", PlanDuration::TwelveMonths, 900_000).deactivated();
        let membership = membership_with_days_left(&monthly, 10, now);
        let handler = handler(vec![monthly, retired.clone()], vec![membership]);

        let err = handler.quote_at(&user(), &retired.id, now).await.unwrap_err();
        assert!(matches!(err, MembershipError::InvalidTarget { .. }));
    }

    #[tokio::test]
    async fn unknown_target_is_not_found() {
        let now = Timestamp::now();
        let monthly = plan("Monthly", PlanDuration::OneMonth, 100_000);
        let membership = membership_with_days_left(&monthly, 10, now);
        let handler = handler(vec![monthly], vec![membership]);

        let missing = PlanId::new();
        let err = handler.quote_at(&user(), &missing, now).await.unwrap_err();
        assert_eq!(err, MembershipError::PlanNotFound(missing));
    }

    #[tokio::test]
    async fn user_without_membership_is_not_found() {
        let quarterly = plan("Quarterly", PlanDuration::ThreeMonths, 250_000);
        let handler = handler(vec![quarterly.clone()], vec![]);

        let err = handler
            .handle(QuoteUpgradeQuery {
                user_id: user(),
                target_plan_id: quarterly.id,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, MembershipError::NotFoundForUser(_)));
    }

    struct FailingReader;

    #[async_trait]
    impl MembershipReader for FailingReader {
        async fn get_active(&self, _user_id: &UserId) -> Result<Option<ActiveMembership>, DomainError> {
            Err(DomainError::database("Simulated read failure"))
        }
    }

    #[tokio::test]
    async fn reader_failure_is_infrastructure_error() {
        let handler = QuoteUpgradeHandler::new(
            Arc::new(FailingReader),
            Arc::new(InMemoryPlanCatalog::new()),
        );

        let err = handler.quote_at(&user(), &PlanId::new(), Timestamp::now()).await.unwrap_err();
        assert!(err.is_retryable());
    }
}
