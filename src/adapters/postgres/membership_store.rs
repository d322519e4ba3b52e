//! PostgreSQL implementation of MembershipReader and MembershipRepository.
//!
//! A user may accumulate several membership rows over time; the current one
//! is the most recently updated.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, MembershipId, PlanId, Timestamp, UserId};
use crate::domain::membership::ActiveMembership;
use crate::ports::{MembershipReader, MembershipRepository};

pub struct PostgresMembershipStore {
    pool: PgPool,
}

impl PostgresMembershipStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct MembershipRow {
    id: Uuid,
    user_id: String,
    plan_id: Uuid,
    end_date: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<MembershipRow> for ActiveMembership {
    type Error = DomainError;

    fn try_from(row: MembershipRow) -> Result<Self, Self::Error> {
        Ok(ActiveMembership {
            id: MembershipId::from_uuid(row.id),
            user_id: UserId::new(row.user_id)
                .map_err(|e| DomainError::database(format!("Invalid user_id: {}", e)))?,
            plan_id: PlanId::from_uuid(row.plan_id),
            end_date: row.end_date.map(Timestamp::from_datetime),
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

#[async_trait]
impl MembershipReader for PostgresMembershipStore {
    async fn get_active(&self, user_id: &UserId) -> Result<Option<ActiveMembership>, DomainError> {
        let row: Option<MembershipRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, plan_id, end_date, created_at, updated_at
            FROM memberships
            WHERE user_id = $1
            ORDER BY updated_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to find membership: {}", e)))?;

        row.map(ActiveMembership::try_from).transpose()
    }
}

#[async_trait]
impl MembershipRepository for PostgresMembershipStore {
    async fn save(&self, membership: &ActiveMembership) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO memberships (id, user_id, plan_id, end_date, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO UPDATE SET
                plan_id = EXCLUDED.plan_id,
                end_date = EXCLUDED.end_date,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(membership.id.as_uuid())
        .bind(membership.user_id.as_str())
        .bind(membership.plan_id.as_uuid())
        .bind(membership.end_date.map(|end| *end.as_datetime()))
        .bind(membership.created_at.as_datetime())
        .bind(membership.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to save membership: {}", e)))?;

        Ok(())
    }

    async fn find_by_id(&self, id: &MembershipId) -> Result<Option<ActiveMembership>, DomainError> {
        let row: Option<MembershipRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, plan_id, end_date, created_at, updated_at
            FROM memberships
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to find membership: {}", e)))?;

        row.map(ActiveMembership::try_from).transpose()
    }
}
