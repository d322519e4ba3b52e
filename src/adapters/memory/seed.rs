//! Startup data for the in-memory stores.
//!
//! A seed is a JSON document:
//!
//! ```json
//! {
//!   "plans": [
//!     { "id": "…", "name": "Monthly", "duration": "1_MONTH", "price": 100000 }
//!   ],
//!   "memberships": [
//!     { "user_id": "user-1", "plan_id": "…", "end_date": "2026-11-01T00:00:00Z" }
//!   ]
//! }
//! ```
//!
//! A timed membership without `end_date` starts a fresh plan window at load
//! time. Lifetime memberships must omit `end_date`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::domain::foundation::{Money, PlanId, Timestamp, UserId, ValidationError};
use crate::domain::membership::{ActiveMembership, MembershipPlan, PlanDuration};

use super::{InMemoryMembershipStore, InMemoryPlanCatalog};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("cannot read seed file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed seed document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid seed entry: {0}")]
    Invalid(#[from] ValidationError),

    #[error("membership of {user_id} references unknown plan {plan_id}")]
    UnknownPlan { user_id: String, plan_id: PlanId },

    #[error("lifetime membership of {0} cannot have an end date")]
    LifetimeWithEndDate(String),
}

#[derive(Debug, Deserialize)]
struct SeedPlan {
    id: PlanId,
    name: String,
    duration: PlanDuration,
    price: Money,
    #[serde(default)]
    original_price: Option<Money>,
    #[serde(default = "active_by_default")]
    is_active: bool,
}

fn active_by_default() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct SeedMembership {
    user_id: String,
    plan_id: PlanId,
    #[serde(default)]
    end_date: Option<Timestamp>,
}

/// Parsed seed document.
#[derive(Debug, Deserialize)]
pub struct MemorySeed {
    #[serde(default)]
    plans: Vec<SeedPlan>,
    #[serde(default)]
    memberships: Vec<SeedMembership>,
}

impl MemorySeed {
    pub fn from_json(json: &str) -> Result<Self, SeedError> {
        Ok(serde_json::from_str(json)?)
    }

    pub async fn load(path: &Path) -> Result<Self, SeedError> {
        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| SeedError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_json(&json)
    }

    /// Builds populated stores, validating every entry.
    pub fn into_stores(
        self,
        now: Timestamp,
    ) -> Result<(InMemoryPlanCatalog, InMemoryMembershipStore), SeedError> {
        let mut plans = HashMap::with_capacity(self.plans.len());
        for seed in self.plans {
            let mut plan = MembershipPlan::new(seed.id, seed.name, seed.duration, seed.price)?;
            if let Some(original) = seed.original_price {
                plan = plan.with_original_price(original);
            }
            if !seed.is_active {
                plan = plan.deactivated();
            }
            plans.insert(plan.id, plan);
        }

        let mut memberships = Vec::with_capacity(self.memberships.len());
        for seed in self.memberships {
            let plan = plans.get(&seed.plan_id).ok_or_else(|| SeedError::UnknownPlan {
                user_id: seed.user_id.clone(),
                plan_id: seed.plan_id,
            })?;
            let user_id = UserId::new(seed.user_id)?;
            let mut membership = ActiveMembership::start(user_id, plan, now);
            match (plan.is_lifetime(), seed.end_date) {
                (true, Some(_)) => {
                    return Err(SeedError::LifetimeWithEndDate(
                        membership.user_id.to_string(),
                    ))
                }
                (false, Some(end)) => membership.end_date = Some(end),
                _ => {}
            }
            memberships.push(membership);
        }

        tracing::info!(
            plans = plans.len(),
            memberships = memberships.len(),
            "Loaded in-memory seed"
        );

        Ok((
            InMemoryPlanCatalog::with_plans(plans.into_values()),
            InMemoryMembershipStore::with_memberships(memberships),
        ))
    }
}
