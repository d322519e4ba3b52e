//! PostgreSQL implementation of PlanCatalog.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, Money, PlanId};
use crate::domain::membership::{MembershipPlan, PlanDuration};
use crate::ports::PlanCatalog;

/// Reads plans from the `membership_plans` table.
pub struct PostgresPlanCatalog {
    pool: PgPool,
}

impl PostgresPlanCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a plan.
#[derive(Debug, sqlx::FromRow)]
struct PlanRow {
    id: Uuid,
    name: String,
    duration: String,
    price: i64,
    original_price: Option<i64>,
    is_active: bool,
}

impl TryFrom<PlanRow> for MembershipPlan {
    type Error = DomainError;

    fn try_from(row: PlanRow) -> Result<Self, Self::Error> {
        let duration: PlanDuration = row.duration.parse().map_err(|e| {
            DomainError::database(format!("Invalid duration for plan {}: {}", row.id, e))
        })?;
        let price = Money::new(row.price)
            .map_err(|e| DomainError::database(format!("Invalid price for plan {}: {}", row.id, e)))?;
        let original_price = row
            .original_price
            .map(Money::new)
            .transpose()
            .map_err(|e| DomainError::database(format!("Invalid list price for plan {}: {}", row.id, e)))?;

        let mut plan = MembershipPlan::new(PlanId::from_uuid(row.id), row.name, duration, price)?;
        plan.original_price = original_price;
        plan.is_active = row.is_active;
        Ok(plan)
    }
}

#[async_trait]
impl PlanCatalog for PostgresPlanCatalog {
    async fn get(&self, plan_id: &PlanId) -> Result<Option<MembershipPlan>, DomainError> {
        let row: Option<PlanRow> = sqlx::query_as(
            r#"
            SELECT id, name, duration, price, original_price, is_active
            FROM membership_plans
            WHERE id = $1
            "#,
        )
        .bind(plan_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to load plan: {}", e)))?;

        row.map(MembershipPlan::try_from).transpose()
    }

    async fn list_active(&self) -> Result<Vec<MembershipPlan>, DomainError> {
        let rows: Vec<PlanRow> = sqlx::query_as(
            r#"
            SELECT id, name, duration, price, original_price, is_active
            FROM membership_plans
            WHERE is_active
            ORDER BY price ASC, name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to list plans: {}", e)))?;

        rows.into_iter().map(MembershipPlan::try_from).collect()
    }
}
