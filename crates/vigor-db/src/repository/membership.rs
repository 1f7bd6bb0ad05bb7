//! # Membership Repository
//!
//! Plan catalog reads and issued-membership queries. Issuing and
//! deactivating memberships happens inside the sale engine's transactions;
//! this repository covers the read side and plan seeding.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use vigor_core::{Membership, MembershipPlan};

/// Repository for membership plans and issued memberships.
#[derive(Debug, Clone)]
pub struct MembershipRepository {
    pool: SqlitePool,
}

impl MembershipRepository {
    /// Creates a new MembershipRepository.
    pub fn new(pool: SqlitePool) -> Self {
        MembershipRepository { pool }
    }

    /// Gets a plan by its ID.
    pub async fn plan_by_id(&self, id: &str) -> DbResult<Option<MembershipPlan>> {
        let plan = sqlx::query_as::<_, MembershipPlan>(
            "SELECT * FROM membership_plans WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(plan)
    }

    /// Lists active plans, cheapest first.
    pub async fn list_active_plans(&self) -> DbResult<Vec<MembershipPlan>> {
        let plans = sqlx::query_as::<_, MembershipPlan>(
            r#"
            SELECT * FROM membership_plans
            WHERE is_active = 1
            ORDER BY price_cents, name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(plans)
    }

    /// Inserts a plan (catalog seeding; plan CRUD lives outside this core).
    pub async fn insert_plan(&self, plan: &MembershipPlan) -> DbResult<()> {
        debug!(id = %plan.id, name = %plan.name, "Inserting membership plan");

        sqlx::query(
            r#"
            INSERT INTO membership_plans (
                id, name, plan_type, price_cents, discount_price_cents,
                duration_days, is_active, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&plan.id)
        .bind(&plan.name)
        .bind(plan.plan_type)
        .bind(plan.price_cents)
        .bind(plan.discount_price_cents)
        .bind(plan.duration_days)
        .bind(plan.is_active)
        .bind(plan.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets an issued membership by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Membership>> {
        let membership =
            sqlx::query_as::<_, Membership>("SELECT * FROM memberships WHERE id = ?1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(membership)
    }

    /// Lists a customer's memberships, newest first.
    pub async fn for_customer(&self, customer_id: &str) -> DbResult<Vec<Membership>> {
        let memberships = sqlx::query_as::<_, Membership>(
            r#"
            SELECT * FROM memberships
            WHERE customer_id = ?1
            ORDER BY start_date DESC
            "#,
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(memberships)
    }
}

// =============================================================================
// Tests
// =============================================================================
