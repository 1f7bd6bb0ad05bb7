//! # Sale Engine
//!
//! Atomic sale creation and same-day reversal.
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  CREATE (one transaction)                                           │
//! │    validate request → snapshot products/plans → totals check        │
//! │    → claim daily sale number → insert sale + lines                  │
//! │    → decrement stock (guarded) + movement audit                     │
//! │    → issue memberships                                              │
//! │    COMMIT, or roll back everything                                  │
//! │                                                                     │
//! │  REVERSE (one transaction, same calendar day only)                  │
//! │    restock each line + movement audit → deactivate memberships      │
//! │    → write reversal record → mark sale refunded                     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Two races the schema closes rather than the code:
//! - sale numbers come from an atomic `sale_counters` upsert, so two
//!   registers creating sales in the same instant cannot collide;
//! - stock decrements are conditional (`WHERE current_stock >= qty`), so
//!   check-then-decrement cannot oversell under concurrency.

use std::sync::Arc;

use chrono::Duration;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::pool::Database;
use vigor_core::{
    Clock, CoreError, CreateSaleRequest, DeactivatedMembership, Membership, MembershipPlan, Money,
    MovementType, Product, RestockedProduct, ReversalRecord, Sale, SaleDetails,
    SaleMembershipLine, SaleProductLine, SaleStatus,
};

/// Orchestrates sale transactions against the database.
pub struct SaleEngine {
    db: Database,
    clock: Arc<dyn Clock>,
}

impl SaleEngine {
    /// Creates a new SaleEngine with an injectable clock.
    pub fn new(db: Database, clock: Arc<dyn Clock>) -> Self {
        SaleEngine { db, clock }
    }

    /// Creates a completed sale with all of its side effects in one
    /// transaction.
    ///
    /// Errors (all roll the transaction back in full):
    /// - `Domain(Validation)` - malformed request (no lines, bad ranges)
    /// - `NotFound` - unknown seller, customer, product, or plan
    /// - `Domain(InsufficientStock)` - a line exceeds available stock
    /// - `Domain(InsufficientPayment)` - amount paid below the total
    pub async fn create_sale(
        &self,
        seller_id: &str,
        req: &CreateSaleRequest,
    ) -> DbResult<SaleDetails> {
        req.validate().map_err(CoreError::from)?;

        let now = self.clock.now();
        let mut tx = self.db.pool().begin().await?;

        ensure_user_exists(&mut tx, seller_id).await?;
        if let Some(customer_id) = &req.customer_id {
            ensure_user_exists(&mut tx, customer_id).await?;
        }

        // Snapshot product lines and accumulate the subtotal. Stock is
        // only pre-checked here for a precise error message; the
        // authoritative guard is the conditional decrement below.
        let mut subtotal = Money::zero();
        let mut pending_products: Vec<(Product, &vigor_core::ProductLineRequest, Money, Money)> =
            Vec::new();

        for line in &req.products {
            let product = fetch_product(&mut tx, &line.product_id)
                .await?
                .ok_or_else(|| DbError::not_found("Product", &line.product_id))?;

            if !product.can_sell(line.quantity) {
                return Err(CoreError::InsufficientStock {
                    name: product.name.clone(),
                    available: product.current_stock,
                    requested: line.quantity,
                }
                .into());
            }

            let unit_price = line
                .unit_price_cents
                .map(Money::from_cents)
                .unwrap_or_else(|| product.price());
            let line_total = unit_price
                .multiply_quantity(line.quantity)
                .apply_percentage_discount(line.discount_bps);

            subtotal += line_total;
            pending_products.push((product, line, unit_price, line_total));
        }

        // Snapshot membership lines.
        let mut pending_memberships: Vec<(MembershipPlan, &vigor_core::MembershipLineRequest, Money)> =
            Vec::new();

        for line in &req.memberships {
            let plan = fetch_plan(&mut tx, &line.plan_id)
                .await?
                .ok_or_else(|| DbError::not_found("Membership plan", &line.plan_id))?;
            ensure_user_exists(&mut tx, &line.customer_id).await?;

            let price = plan.effective_price();
            subtotal += price;
            pending_memberships.push((plan, line, price));
        }

        // Totals. Tax is a recorded zero.
        let discount = Money::from_cents(req.discount_cents);
        let total = subtotal - discount;
        let paid = Money::from_cents(req.amount_paid_cents);

        if paid < total {
            return Err(CoreError::InsufficientPayment { total, paid }.into());
        }
        let change = paid - total;

        // Claim the next daily sequence atomically; two concurrent creates
        // get distinct numbers or serialize on this row.
        let day = now.format("%Y%m%d").to_string();
        let seq: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO sale_counters (day, seq) VALUES (?1, 1)
            ON CONFLICT(day) DO UPDATE SET seq = seq + 1
            RETURNING seq
            "#,
        )
        .bind(&day)
        .fetch_one(&mut *tx)
        .await?;
        let sale_number = format!("SALE-{day}-{seq:04}");

        let sale = Sale {
            id: Uuid::new_v4().to_string(),
            sale_number: sale_number.clone(),
            customer_id: req.customer_id.clone(),
            seller_id: seller_id.to_string(),
            sale_type: req.derived_sale_type(),
            status: SaleStatus::Completed,
            subtotal_cents: subtotal.cents(),
            discount_cents: discount.cents(),
            tax_cents: 0,
            total_cents: total.cents(),
            amount_paid_cents: paid.cents(),
            change_cents: change.cents(),
            payment_channel: req.payment_channel,
            notes: req.notes.clone(),
            is_reversed: false,
            reversed_by: None,
            reversed_at: None,
            reversal_reason: None,
            created_at: now,
            updated_at: None,
        };

        insert_sale(&mut tx, &sale).await?;

        // Product lines: snapshot, decrement stock, audit the movement.
        let mut product_lines = Vec::with_capacity(pending_products.len());
        for (product, line, unit_price, line_total) in &pending_products {
            let sale_line = SaleProductLine {
                id: Uuid::new_v4().to_string(),
                sale_id: sale.id.clone(),
                product_id: product.id.clone(),
                name_snapshot: product.name.clone(),
                sku_snapshot: product.sku.clone(),
                unit_price_cents: unit_price.cents(),
                unit_cost_cents: Some(product.cost_cents),
                quantity: line.quantity,
                discount_bps: line.discount_bps as i64,
                line_total_cents: line_total.cents(),
                created_at: now,
            };
            insert_product_line(&mut tx, &sale_line).await?;

            let stock_after: Option<i64> = sqlx::query_scalar(
                r#"
                UPDATE products
                SET current_stock = current_stock - ?2,
                    last_sale_date = ?3,
                    updated_at = ?3
                WHERE id = ?1 AND current_stock >= ?2
                RETURNING current_stock
                "#,
            )
            .bind(&product.id)
            .bind(line.quantity)
            .bind(now)
            .fetch_optional(&mut *tx)
            .await?;

            // Lost a concurrent race between pre-check and decrement.
            let stock_after = stock_after.ok_or_else(|| {
                DbError::from(CoreError::InsufficientStock {
                    name: product.name.clone(),
                    available: product.current_stock,
                    requested: line.quantity,
                })
            })?;

            insert_movement(
                &mut tx,
                &product.id,
                MovementType::Sale,
                -line.quantity,
                stock_after + line.quantity,
                stock_after,
                &sale_number,
                now,
            )
            .await?;

            product_lines.push(sale_line);
        }

        // Membership lines: issue the membership, then snapshot the line.
        let mut membership_lines = Vec::with_capacity(pending_memberships.len());
        for (plan, line, price) in &pending_memberships {
            let start = now;
            let end = now + Duration::days(plan.duration_days);

            let membership = Membership {
                id: Uuid::new_v4().to_string(),
                customer_id: line.customer_id.clone(),
                plan_name: plan.name.clone(),
                plan_type: plan.plan_type,
                start_date: start,
                end_date: end,
                price_cents: price.cents(),
                payment_channel: line.payment_channel.unwrap_or(req.payment_channel),
                is_active: true,
                created_at: now,
            };
            insert_membership(&mut tx, &membership).await?;

            let sale_line = SaleMembershipLine {
                id: Uuid::new_v4().to_string(),
                sale_id: sale.id.clone(),
                plan_id: plan.id.clone(),
                membership_id: Some(membership.id.clone()),
                customer_id: line.customer_id.clone(),
                plan_name: plan.name.clone(),
                plan_type: plan.plan_type,
                plan_duration_days: plan.duration_days,
                plan_price_cents: price.cents(),
                start_date: start,
                end_date: end,
                created_at: now,
            };
            insert_membership_line(&mut tx, &sale_line).await?;
            membership_lines.push(sale_line);
        }

        tx.commit().await?;

        info!(
            sale_number = %sale.sale_number,
            total = %total,
            products = product_lines.len(),
            memberships = membership_lines.len(),
            "Sale completed"
        );

        Ok(SaleDetails {
            sale,
            product_lines,
            membership_lines,
        })
    }

    /// Reverses a completed sale: restocks products, deactivates the
    /// memberships it issued, writes the immutable reversal record, and
    /// marks the sale refunded. One transaction.
    ///
    /// Only allowed while the sale is `completed`, not yet reversed, and
    /// on its creation calendar day (UTC).
    pub async fn reverse_sale(
        &self,
        sale_id: &str,
        reason: &str,
        actor_id: &str,
    ) -> DbResult<ReversalRecord> {
        let now = self.clock.now();
        let today = now.date_naive();

        let mut tx = self.db.pool().begin().await?;

        ensure_user_exists(&mut tx, actor_id).await?;

        let sale: Sale = sqlx::query_as("SELECT * FROM sales WHERE id = ?1")
            .bind(sale_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DbError::not_found("Sale", sale_id))?;

        if sale.is_reversed || sale.status != SaleStatus::Completed {
            return Err(CoreError::AlreadyReversed {
                sale_number: sale.sale_number,
            }
            .into());
        }
        if !sale.can_be_reversed(today) {
            return Err(CoreError::ReversalWindowExpired {
                sale_number: sale.sale_number,
                created_on: sale.created_at.date_naive(),
            }
            .into());
        }

        let reference = format!("REV-{}", sale.sale_number);

        // Restock every product line, auditing each movement.
        let product_lines: Vec<SaleProductLine> =
            sqlx::query_as("SELECT * FROM sale_product_lines WHERE sale_id = ?1")
                .bind(sale_id)
                .fetch_all(&mut *tx)
                .await?;

        let mut restocked = Vec::with_capacity(product_lines.len());
        for line in &product_lines {
            let stock_after: i64 = sqlx::query_scalar(
                r#"
                UPDATE products
                SET current_stock = current_stock + ?2,
                    updated_at = ?3
                WHERE id = ?1
                RETURNING current_stock
                "#,
            )
            .bind(&line.product_id)
            .bind(line.quantity)
            .bind(now)
            .fetch_one(&mut *tx)
            .await?;

            insert_movement(
                &mut tx,
                &line.product_id,
                MovementType::Return,
                line.quantity,
                stock_after - line.quantity,
                stock_after,
                &reference,
                now,
            )
            .await?;

            restocked.push(RestockedProduct {
                product_id: line.product_id.clone(),
                product_name: line.name_snapshot.clone(),
                quantity: line.quantity,
            });
        }

        // Deactivate the memberships issued for each line's customer at or
        // after the sale, catching renewals created on top of this sale.
        let membership_lines: Vec<SaleMembershipLine> =
            sqlx::query_as("SELECT * FROM sale_membership_lines WHERE sale_id = ?1")
                .bind(sale_id)
                .fetch_all(&mut *tx)
                .await?;

        let mut deactivated = Vec::new();
        let mut seen_customers: Vec<&str> = Vec::new();
        for line in &membership_lines {
            if seen_customers.contains(&line.customer_id.as_str()) {
                continue;
            }
            seen_customers.push(&line.customer_id);

            let rows: Vec<(String, String)> = sqlx::query_as(
                r#"
                UPDATE memberships
                SET is_active = 0
                WHERE customer_id = ?1 AND is_active = 1 AND start_date >= ?2
                RETURNING id, plan_name
                "#,
            )
            .bind(&line.customer_id)
            .bind(sale.created_at)
            .fetch_all(&mut *tx)
            .await?;

            for (membership_id, plan_name) in rows {
                deactivated.push(DeactivatedMembership {
                    membership_id,
                    plan_name,
                    customer_id: line.customer_id.clone(),
                });
            }
        }

        let record = ReversalRecord {
            id: Uuid::new_v4().to_string(),
            sale_id: sale.id.clone(),
            reversed_by: actor_id.to_string(),
            reason: reason.to_string(),
            products_restocked: serde_json::to_string(&restocked)
                .map_err(|e| DbError::Internal(e.to_string()))?,
            memberships_deactivated: serde_json::to_string(&deactivated)
                .map_err(|e| DbError::Internal(e.to_string()))?,
            refunded_cents: sale.total_cents,
            created_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO sale_reversals (
                id, sale_id, reversed_by, reason,
                products_restocked, memberships_deactivated,
                refunded_cents, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&record.id)
        .bind(&record.sale_id)
        .bind(&record.reversed_by)
        .bind(&record.reason)
        .bind(&record.products_restocked)
        .bind(&record.memberships_deactivated)
        .bind(record.refunded_cents)
        .bind(record.created_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE sales
            SET status = 'refunded',
                is_reversed = 1,
                reversed_by = ?2,
                reversed_at = ?3,
                reversal_reason = ?4,
                updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(&sale.id)
        .bind(actor_id)
        .bind(now)
        .bind(reason)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            sale_number = %sale.sale_number,
            refunded = %Money::from_cents(record.refunded_cents),
            restocked = restocked.len(),
            deactivated = deactivated.len(),
            "Sale reversed"
        );

        Ok(record)
    }
}

// =============================================================================
// Transaction Helpers
// =============================================================================

type Tx<'c> = sqlx::Transaction<'c, sqlx::Sqlite>;

async fn ensure_user_exists(tx: &mut Tx<'_>, user_id: &str) -> DbResult<()> {
    let found: Option<String> = sqlx::query_scalar("SELECT id FROM users WHERE id = ?1")
        .bind(user_id)
        .fetch_optional(&mut **tx)
        .await?;

    found
        .map(|_| ())
        .ok_or_else(|| DbError::not_found("User", user_id))
}

async fn fetch_product(tx: &mut Tx<'_>, id: &str) -> DbResult<Option<Product>> {
    let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ?1")
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;
    Ok(product)
}

async fn fetch_plan(tx: &mut Tx<'_>, id: &str) -> DbResult<Option<MembershipPlan>> {
    let plan = sqlx::query_as::<_, MembershipPlan>("SELECT * FROM membership_plans WHERE id = ?1")
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;
    Ok(plan)
}

async fn insert_sale(tx: &mut Tx<'_>, sale: &Sale) -> DbResult<()> {
    debug!(id = %sale.id, sale_number = %sale.sale_number, "Inserting sale");

    sqlx::query(
        r#"
        INSERT INTO sales (
            id, sale_number, customer_id, seller_id, sale_type, status,
            subtotal_cents, discount_cents, tax_cents, total_cents,
            amount_paid_cents, change_cents, payment_channel, notes,
            is_reversed, reversed_by, reversed_at, reversal_reason,
            created_at, updated_at
        ) VALUES (
            ?1, ?2, ?3, ?4, ?5, ?6,
            ?7, ?8, ?9, ?10,
            ?11, ?12, ?13, ?14,
            ?15, ?16, ?17, ?18,
            ?19, ?20
        )
        "#,
    )
    .bind(&sale.id)
    .bind(&sale.sale_number)
    .bind(&sale.customer_id)
    .bind(&sale.seller_id)
    .bind(sale.sale_type)
    .bind(sale.status)
    .bind(sale.subtotal_cents)
    .bind(sale.discount_cents)
    .bind(sale.tax_cents)
    .bind(sale.total_cents)
    .bind(sale.amount_paid_cents)
    .bind(sale.change_cents)
    .bind(sale.payment_channel)
    .bind(&sale.notes)
    .bind(sale.is_reversed)
    .bind(&sale.reversed_by)
    .bind(sale.reversed_at)
    .bind(&sale.reversal_reason)
    .bind(sale.created_at)
    .bind(sale.updated_at)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

async fn insert_product_line(tx: &mut Tx<'_>, line: &SaleProductLine) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO sale_product_lines (
            id, sale_id, product_id, name_snapshot, sku_snapshot,
            unit_price_cents, unit_cost_cents, quantity, discount_bps,
            line_total_cents, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        "#,
    )
    .bind(&line.id)
    .bind(&line.sale_id)
    .bind(&line.product_id)
    .bind(&line.name_snapshot)
    .bind(&line.sku_snapshot)
    .bind(line.unit_price_cents)
    .bind(line.unit_cost_cents)
    .bind(line.quantity)
    .bind(line.discount_bps)
    .bind(line.line_total_cents)
    .bind(line.created_at)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

async fn insert_membership(tx: &mut Tx<'_>, membership: &Membership) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO memberships (
            id, customer_id, plan_name, plan_type, start_date, end_date,
            price_cents, payment_channel, is_active, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        "#,
    )
    .bind(&membership.id)
    .bind(&membership.customer_id)
    .bind(&membership.plan_name)
    .bind(membership.plan_type)
    .bind(membership.start_date)
    .bind(membership.end_date)
    .bind(membership.price_cents)
    .bind(membership.payment_channel)
    .bind(membership.is_active)
    .bind(membership.created_at)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

async fn insert_membership_line(tx: &mut Tx<'_>, line: &SaleMembershipLine) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO sale_membership_lines (
            id, sale_id, plan_id, membership_id, customer_id,
            plan_name, plan_type, plan_duration_days, plan_price_cents,
            start_date, end_date, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
        "#,
    )
    .bind(&line.id)
    .bind(&line.sale_id)
    .bind(&line.plan_id)
    .bind(&line.membership_id)
    .bind(&line.customer_id)
    .bind(&line.plan_name)
    .bind(line.plan_type)
    .bind(line.plan_duration_days)
    .bind(line.plan_price_cents)
    .bind(line.start_date)
    .bind(line.end_date)
    .bind(line.created_at)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn insert_movement(
    tx: &mut Tx<'_>,
    product_id: &str,
    movement_type: MovementType,
    quantity: i64,
    stock_before: i64,
    stock_after: i64,
    reference: &str,
    now: chrono::DateTime<chrono::Utc>,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO stock_movements (
            id, product_id, movement_type, quantity,
            stock_before, stock_after, reference, notes, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, NULL, ?8)
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(product_id)
    .bind(movement_type)
    .bind(quantity)
    .bind(stock_before)
    .bind(stock_after)
    .bind(reference)
    .bind(now)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
