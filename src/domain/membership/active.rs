//! A user's current membership.
//!
//! # Design Decisions
//!
//! - **Derived days remaining**: only `end_date` is stored; days left are
//!   computed against a caller-supplied `now`, so the two cannot drift.
//! - **Lifetime = no end date**: `end_date == None` is the lifetime flag.
//! - **Upgrade replaces the window**: a confirmed upgrade starts a fresh
//!   window of the target plan's length. The unused part of the old window
//!   was already paid back through the proration discount.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{MembershipId, PlanId, Timestamp, UserId};

use super::plan::{MembershipPlan, PlanDuration};

/// The membership currently granting a user access.
///
/// # Invariants
///
/// - `end_date` is `None` exactly when the membership is lifetime
/// - `updated_at >= created_at`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveMembership {
    pub id: MembershipId,
    pub user_id: UserId,
    pub plan_id: PlanId,
    pub end_date: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ActiveMembership {
    /// Starts a membership on `plan` at `now`.
    pub fn start(user_id: UserId, plan: &MembershipPlan, now: Timestamp) -> Self {
        Self {
            id: MembershipId::new(),
            user_id,
            plan_id: plan.id,
            end_date: end_date_for(plan.duration, now),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_lifetime(&self) -> bool {
        self.end_date.is_none()
    }

    /// Whole days until `end_date`, floored and clamped at zero.
    ///
    /// Lifetime memberships report zero; the proration rule never reads
    /// days remaining for them.
    pub fn days_remaining(&self, now: Timestamp) -> u32 {
        let Some(end) = self.end_date else {
            return 0;
        };
        if now >= end {
            return 0;
        }
        let days = end.duration_since(&now).num_days();
        u32::try_from(days).unwrap_or(u32::MAX)
    }

    /// Days remaining, capped at the length of the plan being credited.
    ///
    /// A stored end date further out than one window of `plan` (a manual
    /// extension, or data written before a plan was shortened) never earns
    /// more credit than the plan itself is worth.
    pub fn days_remaining_on(&self, plan: &MembershipPlan, now: Timestamp) -> u32 {
        let days = self.days_remaining(now);
        match plan.duration.days() {
            Some(window) => days.min(window),
            None => days,
        }
    }

    pub fn is_expired(&self, now: Timestamp) -> bool {
        matches!(self.end_date, Some(end) if end <= now)
    }

    /// Moves the membership onto `target` after a confirmed payment.
    pub fn apply_upgrade(&mut self, target: &MembershipPlan, now: Timestamp) {
        self.plan_id = target.id;
        self.end_date = end_date_for(target.duration, now);
        self.updated_at = now;
    }
}

fn end_date_for(duration: PlanDuration, from: Timestamp) -> Option<Timestamp> {
    duration.days().map(|days| from.add_days(i64::from(days)))
}
