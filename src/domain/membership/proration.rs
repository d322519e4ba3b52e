//! Upgrade proration rule.
//!
//! Given the plan a user holds, how many days of it are left, and the plan
//! they want, decides whether the upgrade is allowed and what it costs.
//!
//! All arithmetic is integer, in the smallest currency unit. The daily rate
//! truncates toward zero before it is multiplied by the remaining days, so a
//! member is never credited a fraction of a unit.
//!
//! # Rules
//!
//! - A lifetime holder cannot upgrade (`AlreadyLifetime`).
//! - Upgrading to the plan already held is rejected (`InvalidTarget`).
//! - Timed target: `price - min(daily_rate * days_remaining, current_price)`,
//!   floored at zero.
//! - Lifetime target: full price, no credit.

use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use thiserror::Error;

use crate::domain::foundation::{Money, PlanId};

/// Length of a plan window as seen by the proration rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanLength {
    Days(NonZeroU32),
    Unlimited,
}

impl PlanLength {
    /// A timed window; `None` when `days` is zero.
    pub fn days(days: u32) -> Option<Self> {
        NonZeroU32::new(days).map(PlanLength::Days)
    }

    pub fn is_unlimited(&self) -> bool {
        matches!(self, PlanLength::Unlimited)
    }
}

/// Pricing inputs for one plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanTerms {
    pub plan_id: PlanId,
    pub price: Money,
    pub length: PlanLength,
}

/// Result of pricing an upgrade. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeCalculation {
    pub target_plan_id: PlanId,
    /// Credit earned by the unused part of the current plan.
    pub remaining_value: Money,
    /// Amount taken off the target price.
    pub discount: Money,
    /// Amount payable.
    pub upgrade_price: Money,
    pub message: String,
    pub is_lifetime_upgrade: bool,
}

/// Why an upgrade cannot be priced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum UpgradeError {
    #[error("You already have the best plan")]
    AlreadyLifetime,

    #[error("Select a different plan")]
    InvalidTarget,
}

/// Stateless calculator for membership upgrade prices.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProrationCalculator;

impl ProrationCalculator {
    /// Prices an upgrade from `current` to `target`.
    ///
    /// `days_remaining` is ignored when `current` is unlimited.
    ///
    /// # Errors
    ///
    /// - `AlreadyLifetime` if `current` is unlimited.
    /// - `InvalidTarget` if `target` is the plan already held.
    pub fn calculate(
        current: &PlanTerms,
        days_remaining: u32,
        target: &PlanTerms,
    ) -> Result<UpgradeCalculation, UpgradeError> {
        let current_days = match current.length {
            PlanLength::Unlimited => return Err(UpgradeError::AlreadyLifetime),
            PlanLength::Days(days) => days.get(),
        };

        if current.plan_id == target.plan_id {
            return Err(UpgradeError::InvalidTarget);
        }

        let remaining_value = Self::remaining_value(current.price, current_days, days_remaining);

        if target.length.is_unlimited() {
            return Ok(UpgradeCalculation {
                target_plan_id: target.plan_id,
                remaining_value,
                discount: Money::ZERO,
                upgrade_price: target.price,
                message: "Lifetime upgrades are charged at full price; remaining time on your \
                          current plan is not credited"
                    .to_string(),
                is_lifetime_upgrade: true,
            });
        }

        let upgrade_price = target.price.saturating_sub(remaining_value);
        let discount = target.price.saturating_sub(upgrade_price);

        let message = if discount.is_zero() {
            "No credit available from your current plan; full price applies".to_string()
        } else {
            format!(
                "Credit of {} for {} remaining day(s) on your current plan",
                discount, days_remaining
            )
        };

        Ok(UpgradeCalculation {
            target_plan_id: target.plan_id,
            remaining_value,
            discount,
            upgrade_price,
            message,
            is_lifetime_upgrade: false,
        })
    }

    /// Unused value of a timed plan, capped at what was paid for it.
    fn remaining_value(price: Money, duration_days: u32, days_remaining: u32) -> Money {
        let daily_rate = price.div_truncating(duration_days);
        daily_rate.saturating_mul(days_remaining).min(price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn money(amount: i64) -> Money {
        Money::new(amount).unwrap()
    }

    fn timed(price: i64, days: u32) -> PlanTerms {
        PlanTerms {
            plan_id: PlanId::new(),
            price: money(price),
            length: PlanLength::days(days).unwrap(),
        }
    }

    fn lifetime(price: i64) -> PlanTerms {
        PlanTerms {
            plan_id: PlanId::new(),
            price: money(price),
            length: PlanLength::Unlimited,
        }
    }

    #[test]
    fn half_used_monthly_plan_credits_truncated_daily_rate() {
        let current = timed(100_000, 30);
        let target = timed(250_000, 90);

        let calc = ProrationCalculator::calculate(&current, 15, &target).unwrap();

        assert_eq!(calc.remaining_value, money(49_995));
        assert_eq!(calc.upgrade_price, money(200_005));
        assert_eq!(calc.discount, money(49_995));
        assert_eq!(calc.target_plan_id, target.plan_id);
        assert!(!calc.is_lifetime_upgrade);
    }

    #[test]
    fn expired_plan_earns_no_credit() {
        let current = timed(100_000, 30);
        let target = timed(250_000, 90);

        let calc = ProrationCalculator::calculate(&current, 0, &target).unwrap();

        assert_eq!(calc.remaining_value, Money::ZERO);
        assert_eq!(calc.upgrade_price, money(250_000));
        assert_eq!(calc.discount, Money::ZERO);
        assert!(calc.message.contains("full price"));
    }

    #[test]
    fn lifetime_target_charges_full_price() {
        let current = timed(100_000, 30);
        let target = lifetime(2_000_000);

        let calc = ProrationCalculator::calculate(&current, 30, &target).unwrap();

        assert!(calc.is_lifetime_upgrade);
        assert_eq!(calc.upgrade_price, money(2_000_000));
        assert_eq!(calc.discount, Money::ZERO);
        assert!(calc.message.contains("Lifetime"));
    }

    #[test]
    fn lifetime_holder_cannot_upgrade() {
        let current = lifetime(2_000_000);
        let target = timed(250_000, 90);

        assert_eq!(
            ProrationCalculator::calculate(&current, 10, &target),
            Err(UpgradeError::AlreadyLifetime)
        );
    }

    #[test]
    fn lifetime_check_wins_over_same_plan_check() {
        let current = lifetime(2_000_000);
        assert_eq!(
            ProrationCalculator::calculate(&current, 0, &current),
            Err(UpgradeError::AlreadyLifetime)
        );
    }

    #[test]
    fn same_plan_is_invalid_target() {
        let current = timed(100_000, 30);
        assert_eq!(
            ProrationCalculator::calculate(&current, 15, &current),
            Err(UpgradeError::InvalidTarget)
        );
    }

    #[test]
    fn credit_is_capped_at_price_paid() {
        // Clock skew: more days left than the plan ever granted.
        let current = timed(100_000, 30);
        let target = timed(500_000, 365);

        let calc = ProrationCalculator::calculate(&current, 45, &target).unwrap();

        assert_eq!(calc.remaining_value, money(100_000));
        assert_eq!(calc.upgrade_price, money(400_000));
    }

    #[test]
    fn cheaper_target_costs_nothing() {
        let current = timed(1_000_000, 365);
        let target = timed(50_000, 30);

        let calc = ProrationCalculator::calculate(&current, 300, &target).unwrap();

        assert_eq!(calc.upgrade_price, Money::ZERO);
        assert_eq!(calc.discount, money(50_000));
    }

    #[test]
    fn error_messages_are_user_facing() {
        assert_eq!(UpgradeError::AlreadyLifetime.to_string(), "You already have the best plan");
        assert_eq!(UpgradeError::InvalidTarget.to_string(), "Select a different plan");
    }

    #[test]
    fn zero_day_length_is_not_constructible() {
        assert_eq!(PlanLength::days(0), None);
    }
}
