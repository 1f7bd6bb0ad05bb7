//! # Cash Closure Engine
//!
//! Creates and maintains the one reconciliation record per seller per
//! shift date, and serves the shift aggregation queries that feed it.
//!
//! ## Closure Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  close_shift (one transaction)                                      │
//! │    window check → recompute recorded totals from completed sales    │
//! │    → reconcile against physical counts → atomic upsert on           │
//! │      (seller, shift_date) → status back to pending                  │
//! │                                                                     │
//! │  pending ⇄ pending (re-submission)                                  │
//! │     │                                                               │
//! │     ├──► reviewed  (review_closure: stamps reviewer + timestamp)    │
//! │     └──► cancelled (cancel_closure)                                 │
//! │  reviewed / cancelled are terminal                                  │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Shift dates are normalized to the UTC calendar date of the submitted
//! shift start, and lookups are exact. Recorded totals are recomputed
//! server-side on every submission - the create and update paths trust
//! the same source: completed sales, nothing the client sent.

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::engine::shift;
use crate::error::{DbError, DbResult};
use crate::pool::Database;
use vigor_core::{
    reconcile, Clock, CloseShiftRequest, ClosureDetails, ClosureFilter, ClosurePage,
    ClosureReport, ClosureStatus, CoreError, DailyClosureStats, Money, Page, SellerClosureStats,
    ShiftItems, ShiftSummary, CLOSURE_WINDOW_FUTURE_DAYS, CLOSURE_WINDOW_PAST_DAYS,
};

/// Orchestrates cash-closure reconciliation against the database.
pub struct ClosureEngine {
    db: Database,
    clock: Arc<dyn Clock>,
}

impl ClosureEngine {
    /// Creates a new ClosureEngine with an injectable clock.
    pub fn new(db: Database, clock: Arc<dyn Clock>) -> Self {
        ClosureEngine { db, clock }
    }

    /// Creates or re-submits the closure for `(seller, date(shift_start))`.
    ///
    /// Recorded totals always come from the seller's completed sales as of
    /// this call, so a re-submission after a late sale picks the new total
    /// up. The upsert is a single statement on the `(seller_id,
    /// shift_date)` unique key: concurrent submissions serialize instead
    /// of duplicating records.
    pub async fn close_shift(
        &self,
        seller_id: &str,
        req: &CloseShiftRequest,
    ) -> DbResult<vigor_core::CashClosure> {
        req.validate().map_err(CoreError::from)?;

        let now = self.clock.now();
        let today = now.date_naive();
        let shift_date = req.shift_start.date_naive();

        let earliest = today - Duration::days(CLOSURE_WINDOW_PAST_DAYS);
        let latest = today + Duration::days(CLOSURE_WINDOW_FUTURE_DAYS);
        if shift_date < earliest || shift_date > latest {
            return Err(CoreError::InvalidDateRange {
                shift_date,
                earliest,
                latest,
            }
            .into());
        }

        let mut tx = self.db.pool().begin().await?;

        let seller: Option<String> = sqlx::query_scalar("SELECT id FROM users WHERE id = ?1")
            .bind(seller_id)
            .fetch_optional(&mut *tx)
            .await?;
        seller.ok_or_else(|| DbError::not_found("User", seller_id))?;

        // Recorded totals from the same snapshot this transaction writes.
        let summary = shift::shift_summary(&mut *tx, seller_id, req.shift_start).await?;
        let recon = reconcile(&summary.by_channel, &req.counted);

        debug!(
            seller_id = %seller_id,
            %shift_date,
            recorded = %summary.total_sales,
            counted = %recon.total_counted,
            "Reconciled shift"
        );

        let recorded = &summary.by_channel;
        let counted = &req.counted;
        let diffs = &recon.differences;

        let upserted_id: Option<String> = sqlx::query_scalar(
            r#"
            INSERT INTO cash_closures (
                id, seller_id, shift_date, shift_start, shift_end,
                total_sales_cents, total_products_sold,
                total_memberships_sold, total_daily_access_sold,
                cash_sales_cents, nequi_sales_cents, bancolombia_sales_cents,
                daviplata_sales_cents, card_sales_cents, transfer_sales_cents,
                cash_counted_cents, nequi_counted_cents, bancolombia_counted_cents,
                daviplata_counted_cents, card_counted_cents, transfer_counted_cents,
                cash_diff_cents, nequi_diff_cents, bancolombia_diff_cents,
                daviplata_diff_cents, card_diff_cents, transfer_diff_cents,
                status, notes, discrepancies_notes, created_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5,
                ?6, ?7, ?8, ?9,
                ?10, ?11, ?12, ?13, ?14, ?15,
                ?16, ?17, ?18, ?19, ?20, ?21,
                ?22, ?23, ?24, ?25, ?26, ?27,
                'pending', ?28, ?29, ?30
            )
            ON CONFLICT(seller_id, shift_date) DO UPDATE SET
                shift_start = excluded.shift_start,
                shift_end = excluded.shift_end,
                total_sales_cents = excluded.total_sales_cents,
                total_products_sold = excluded.total_products_sold,
                total_memberships_sold = excluded.total_memberships_sold,
                total_daily_access_sold = excluded.total_daily_access_sold,
                cash_sales_cents = excluded.cash_sales_cents,
                nequi_sales_cents = excluded.nequi_sales_cents,
                bancolombia_sales_cents = excluded.bancolombia_sales_cents,
                daviplata_sales_cents = excluded.daviplata_sales_cents,
                card_sales_cents = excluded.card_sales_cents,
                transfer_sales_cents = excluded.transfer_sales_cents,
                cash_counted_cents = excluded.cash_counted_cents,
                nequi_counted_cents = excluded.nequi_counted_cents,
                bancolombia_counted_cents = excluded.bancolombia_counted_cents,
                daviplata_counted_cents = excluded.daviplata_counted_cents,
                card_counted_cents = excluded.card_counted_cents,
                transfer_counted_cents = excluded.transfer_counted_cents,
                cash_diff_cents = excluded.cash_diff_cents,
                nequi_diff_cents = excluded.nequi_diff_cents,
                bancolombia_diff_cents = excluded.bancolombia_diff_cents,
                daviplata_diff_cents = excluded.daviplata_diff_cents,
                card_diff_cents = excluded.card_diff_cents,
                transfer_diff_cents = excluded.transfer_diff_cents,
                status = 'pending',
                notes = COALESCE(excluded.notes, cash_closures.notes),
                discrepancies_notes = excluded.discrepancies_notes,
                updated_at = excluded.shift_end
            WHERE cash_closures.status IN ('pending', 'completed')
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(seller_id)
        .bind(shift_date)
        .bind(req.shift_start)
        .bind(now)
        .bind(summary.total_sales.cents())
        .bind(summary.total_products_sold)
        .bind(summary.total_memberships_sold)
        .bind(summary.total_daily_access_sold)
        .bind(recorded.cash.cents())
        .bind(recorded.nequi.cents())
        .bind(recorded.bancolombia.cents())
        .bind(recorded.daviplata.cents())
        .bind(recorded.card.cents())
        .bind(recorded.transfer.cents())
        .bind(counted.cash.cents())
        .bind(counted.nequi.cents())
        .bind(counted.bancolombia.cents())
        .bind(counted.daviplata.cents())
        .bind(counted.card.cents())
        .bind(counted.transfer.cents())
        .bind(diffs.cash.cents())
        .bind(diffs.nequi.cents())
        .bind(diffs.bancolombia.cents())
        .bind(diffs.daviplata.cents())
        .bind(diffs.card.cents())
        .bind(diffs.transfer.cents())
        .bind(&req.notes)
        .bind(&recon.discrepancy_notes)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await?;

        let closure_id = match upserted_id {
            Some(id) => id,
            None => {
                // The conflict row exists but is terminal.
                let status: Option<ClosureStatus> = sqlx::query_scalar(
                    "SELECT status FROM cash_closures WHERE seller_id = ?1 AND shift_date = ?2",
                )
                .bind(seller_id)
                .bind(shift_date)
                .fetch_optional(&mut *tx)
                .await?;

                return match status {
                    Some(status) => Err(CoreError::ClosureNotEditable {
                        status: status.as_str().to_string(),
                    }
                    .into()),
                    None => Err(DbError::Internal(
                        "closure upsert affected no row".to_string(),
                    )),
                };
            }
        };

        let closure: vigor_core::CashClosure =
            sqlx::query_as("SELECT * FROM cash_closures WHERE id = ?1")
                .bind(&closure_id)
                .fetch_one(&mut *tx)
                .await?;

        tx.commit().await?;

        info!(
            closure_id = %closure.id,
            seller_id = %seller_id,
            %shift_date,
            has_discrepancies = recon.has_discrepancies,
            total_differences = %recon.total_differences,
            "Cash closure submitted"
        );

        Ok(closure)
    }

    /// Signs off a pending closure: stamps the reviewer and timestamp.
    pub async fn review_closure(
        &self,
        closure_id: &str,
        reviewer_id: &str,
        note: Option<&str>,
    ) -> DbResult<vigor_core::CashClosure> {
        let now = self.clock.now();
        let mut tx = self.db.pool().begin().await?;

        let reviewer: Option<String> = sqlx::query_scalar("SELECT id FROM users WHERE id = ?1")
            .bind(reviewer_id)
            .fetch_optional(&mut *tx)
            .await?;
        reviewer.ok_or_else(|| DbError::not_found("User", reviewer_id))?;

        let updated: Option<String> = sqlx::query_scalar(
            r#"
            UPDATE cash_closures
            SET status = 'reviewed',
                reviewed_by = ?2,
                reviewed_at = ?3,
                notes = COALESCE(?4, notes),
                updated_at = ?3
            WHERE id = ?1 AND status = 'pending'
            RETURNING id
            "#,
        )
        .bind(closure_id)
        .bind(reviewer_id)
        .bind(now)
        .bind(note)
        .fetch_optional(&mut *tx)
        .await?;

        let closure = self
            .finish_status_change(&mut tx, closure_id, updated)
            .await?;

        tx.commit().await?;

        info!(closure_id = %closure_id, reviewer_id = %reviewer_id, "Cash closure reviewed");
        Ok(closure)
    }

    /// Cancels a pending closure. Terminal.
    pub async fn cancel_closure(&self, closure_id: &str) -> DbResult<vigor_core::CashClosure> {
        let now = self.clock.now();
        let mut tx = self.db.pool().begin().await?;

        let updated: Option<String> = sqlx::query_scalar(
            r#"
            UPDATE cash_closures
            SET status = 'cancelled', updated_at = ?2
            WHERE id = ?1 AND status = 'pending'
            RETURNING id
            "#,
        )
        .bind(closure_id)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await?;

        let closure = self
            .finish_status_change(&mut tx, closure_id, updated)
            .await?;

        tx.commit().await?;

        info!(closure_id = %closure_id, "Cash closure cancelled");
        Ok(closure)
    }

    /// Shared tail of review/cancel: distinguish "not found" from
    /// "exists but not pending", then return the fresh row.
    async fn finish_status_change(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        closure_id: &str,
        updated: Option<String>,
    ) -> DbResult<vigor_core::CashClosure> {
        if updated.is_none() {
            let status: Option<ClosureStatus> =
                sqlx::query_scalar("SELECT status FROM cash_closures WHERE id = ?1")
                    .bind(closure_id)
                    .fetch_optional(&mut **tx)
                    .await?;

            return match status {
                Some(status) => Err(CoreError::ClosureNotEditable {
                    status: status.as_str().to_string(),
                }
                .into()),
                None => Err(DbError::not_found("Cash closure", closure_id)),
            };
        }

        let closure = sqlx::query_as("SELECT * FROM cash_closures WHERE id = ?1")
            .bind(closure_id)
            .fetch_one(&mut **tx)
            .await?;
        Ok(closure)
    }

    /// Gets a closure with its seller's display name.
    pub async fn get_closure(&self, closure_id: &str) -> DbResult<ClosureDetails> {
        let details = sqlx::query_as::<_, ClosureDetails>(
            r#"
            SELECT c.*, u.name AS seller_name
            FROM cash_closures c
            JOIN users u ON u.id = c.seller_id
            WHERE c.id = ?1
            "#,
        )
        .bind(closure_id)
        .fetch_optional(self.db.pool())
        .await?;

        details.ok_or_else(|| DbError::not_found("Cash closure", closure_id))
    }

    /// Lists closures with filters and pagination, newest shift first.
    pub async fn list_closures(
        &self,
        filter: &ClosureFilter,
        page: Page,
    ) -> DbResult<ClosurePage> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM cash_closures
            WHERE (?1 IS NULL OR seller_id = ?1)
              AND (?2 IS NULL OR shift_date >= ?2)
              AND (?3 IS NULL OR shift_date <= ?3)
              AND (?4 IS NULL OR status = ?4)
            "#,
        )
        .bind(&filter.seller_id)
        .bind(filter.date_from)
        .bind(filter.date_to)
        .bind(filter.status)
        .fetch_one(self.db.pool())
        .await?;

        let closures = sqlx::query_as::<_, ClosureDetails>(
            r#"
            SELECT c.*, u.name AS seller_name
            FROM cash_closures c
            JOIN users u ON u.id = c.seller_id
            WHERE (?1 IS NULL OR c.seller_id = ?1)
              AND (?2 IS NULL OR c.shift_date >= ?2)
              AND (?3 IS NULL OR c.shift_date <= ?3)
              AND (?4 IS NULL OR c.status = ?4)
            ORDER BY c.shift_date DESC, c.created_at DESC
            LIMIT ?5 OFFSET ?6
            "#,
        )
        .bind(&filter.seller_id)
        .bind(filter.date_from)
        .bind(filter.date_to)
        .bind(filter.status)
        .bind(page.per_page as i64)
        .bind(page.offset())
        .fetch_all(self.db.pool())
        .await?;

        let total_pages = page.total_pages(total);

        Ok(ClosurePage {
            closures,
            total,
            page: page.page,
            per_page: page.per_page,
            total_pages,
            has_next: page.page < total_pages,
            has_prev: page.page > 1,
        })
    }

    /// Period report across closures: totals, per-seller and per-day
    /// rollups, discrepancy counts.
    pub async fn closure_report(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        seller_id: Option<&str>,
    ) -> DbResult<ClosureReport> {
        let closures = sqlx::query_as::<_, ClosureDetails>(
            r#"
            SELECT c.*, u.name AS seller_name
            FROM cash_closures c
            JOIN users u ON u.id = c.seller_id
            WHERE c.shift_date >= ?1
              AND c.shift_date <= ?2
              AND (?3 IS NULL OR c.seller_id = ?3)
            ORDER BY c.shift_date DESC
            "#,
        )
        .bind(start)
        .bind(end)
        .bind(seller_id)
        .fetch_all(self.db.pool())
        .await?;

        let mut total_sales = Money::zero();
        let mut total_counted = Money::zero();
        let mut total_differences = Money::zero();
        let mut closures_with_discrepancies = 0_i64;
        let mut by_seller: std::collections::BTreeMap<String, SellerClosureStats> =
            std::collections::BTreeMap::new();
        let mut daily: std::collections::BTreeMap<NaiveDate, DailyClosureStats> =
            std::collections::BTreeMap::new();

        for details in &closures {
            let closure = &details.closure;
            let sales = Money::from_cents(closure.total_sales_cents);
            let differences = closure.total_differences();
            let discrepant = closure.has_discrepancies();

            total_sales += sales;
            total_counted += closure.total_counted();
            total_differences += differences;
            if discrepant {
                closures_with_discrepancies += 1;
            }

            let seller = by_seller
                .entry(details.seller_name.clone())
                .or_insert_with(|| SellerClosureStats {
                    seller_name: details.seller_name.clone(),
                    closures_count: 0,
                    total_sales: Money::zero(),
                    total_differences: Money::zero(),
                    discrepancies_count: 0,
                });
            seller.closures_count += 1;
            seller.total_sales += sales;
            seller.total_differences += differences;
            if discrepant {
                seller.discrepancies_count += 1;
            }

            let day = daily
                .entry(closure.shift_date)
                .or_insert_with(|| DailyClosureStats {
                    date: closure.shift_date,
                    closures_count: 0,
                    total_sales: Money::zero(),
                    total_differences: Money::zero(),
                    discrepancies_count: 0,
                });
            day.closures_count += 1;
            day.total_sales += sales;
            day.total_differences += differences;
            if discrepant {
                day.discrepancies_count += 1;
            }
        }

        let total_closures = closures.len() as i64;
        let average_difference = if total_closures > 0 {
            Money::from_cents(total_differences.cents() / total_closures)
        } else {
            Money::zero()
        };

        Ok(ClosureReport {
            period_start: start,
            period_end: end,
            total_closures,
            total_sales,
            total_counted,
            total_differences,
            closures_with_discrepancies,
            average_difference,
            by_seller: by_seller.into_values().collect(),
            daily: daily.into_values().collect(),
        })
    }

    /// Aggregate of the seller's completed sales since `shift_start`.
    pub async fn shift_summary(
        &self,
        seller_id: &str,
        shift_start: DateTime<Utc>,
    ) -> DbResult<ShiftSummary> {
        shift::shift_summary(self.db.pool(), seller_id, shift_start).await
    }

    /// Per-product breakdown of the seller's shift with live stock.
    pub async fn shift_items_sold(
        &self,
        seller_id: &str,
        shift_start: DateTime<Utc>,
    ) -> DbResult<ShiftItems> {
        shift::shift_items_sold(self.db.pool(), seller_id, shift_start).await
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::sale::SaleEngine;
    use crate::testutil::{
        fixed_clock, seed_plan, seed_product, seed_user, shift_morning, test_db,
    };
    use vigor_core::{
        ChannelBreakdown, ClosureStatus, CreateSaleRequest, FixedClock, MembershipLineRequest,
        PaymentChannel, PlanType, ProductLineRequest, User, UserRole,
    };

    fn counted(channel: PaymentChannel, major: i64) -> ChannelBreakdown {
        let mut breakdown = ChannelBreakdown::default();
        breakdown.set(channel, Money::from_major(major));
        breakdown
    }

    fn close_req(counted: ChannelBreakdown) -> CloseShiftRequest {
        CloseShiftRequest {
            shift_start: shift_morning(),
            counted,
            notes: None,
        }
    }

    async fn sell_cash(
        engine: &SaleEngine,
        seller: &User,
        product_id: &str,
        qty: i64,
        paid_cents: i64,
    ) {
        let req = CreateSaleRequest {
            customer_id: None,
            payment_channel: PaymentChannel::Cash,
            amount_paid_cents: paid_cents,
            discount_cents: 0,
            notes: None,
            products: vec![ProductLineRequest {
                product_id: product_id.to_string(),
                quantity: qty,
                unit_price_cents: None,
                discount_bps: 0,
            }],
            memberships: vec![],
        };
        engine.create_sale(&seller.id, &req).await.unwrap();
    }

    async fn closures_count(db: &Database) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM cash_closures")
            .fetch_one(db.pool())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_closure_flags_cash_discrepancy() {
        let db = test_db().await;
        let clock = fixed_clock();
        let sales = SaleEngine::new(db.clone(), clock.clone());
        let closures = ClosureEngine::new(db.clone(), clock.clone());
        let seller = seed_user(&db, "Laura", UserRole::Receptionist).await;
        let product = seed_product(&db, "MAT", "Yoga Mat", 169_000_00, 5).await;

        sell_cash(&sales, &seller, &product.id, 1, 169_000_00).await;

        let closure = closures
            .close_shift(&seller.id, &close_req(counted(PaymentChannel::Cash, 168_000)))
            .await
            .unwrap();

        assert_eq!(closure.status, ClosureStatus::Pending);
        assert_eq!(closure.shift_date, shift_morning().date_naive());
        assert_eq!(closure.cash_sales_cents, 169_000_00);
        assert_eq!(closure.cash_counted_cents, 168_000_00);
        assert_eq!(closure.cash_diff_cents, -1_000_00);
        assert_eq!(closure.total_sales_cents, 169_000_00);
        assert_eq!(closure.total_products_sold, 1);
        assert_eq!(closure.recorded().cash, Money::from_major(169_000));
        assert_eq!(closure.counted().cash, Money::from_major(168_000));
        assert_eq!(closure.total_counted(), Money::from_major(168_000));
        assert_eq!(closure.total_differences(), Money::from_major(-1_000));
        assert!(closure.has_discrepancies());
        assert!(closure
            .discrepancies_notes
            .as_deref()
            .unwrap()
            .contains("CASH: system $169000 vs physical $168000 (diff: $-1000)"));
    }

    #[tokio::test]
    async fn test_resubmission_updates_the_same_record() {
        let db = test_db().await;
        let clock = fixed_clock();
        let sales = SaleEngine::new(db.clone(), clock.clone());
        let closures = ClosureEngine::new(db.clone(), clock.clone());
        let seller = seed_user(&db, "Laura", UserRole::Receptionist).await;
        let product = seed_product(&db, "MAT", "Yoga Mat", 169_000_00, 5).await;
        let bar = seed_product(&db, "BAR", "Protein Bar", 20_000_00, 10).await;

        sell_cash(&sales, &seller, &product.id, 1, 169_000_00).await;

        let first = closures
            .close_shift(&seller.id, &close_req(counted(PaymentChannel::Cash, 169_000)))
            .await
            .unwrap();
        assert!(!first.has_discrepancies());

        // a late sale lands after the closure was drafted
        sell_cash(&sales, &seller, &bar.id, 1, 20_000_00).await;

        let second = closures
            .close_shift(&seller.id, &close_req(counted(PaymentChannel::Cash, 169_000)))
            .await
            .unwrap();

        // same record, recomputed totals and differences
        assert_eq!(second.id, first.id);
        assert_eq!(closures_count(&db).await, 1);
        assert_eq!(second.cash_sales_cents, 189_000_00);
        assert_eq!(second.cash_diff_cents, -20_000_00);
        assert_eq!(second.status, ClosureStatus::Pending);
        assert!(second.has_discrepancies());
        assert!(second.updated_at.is_some());
    }

    #[tokio::test]
    async fn test_shift_date_window_enforced() {
        let db = test_db().await;
        let clock = fixed_clock();
        let closures = ClosureEngine::new(db.clone(), clock.clone());
        let seller = seed_user(&db, "Laura", UserRole::Receptionist).await;

        // ten days back is outside the window
        let mut req = close_req(ChannelBreakdown::default());
        req.shift_start = shift_morning() - Duration::days(10);
        let err = closures.close_shift(&seller.id, &req).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::InvalidDateRange { .. })
        ));

        // three days back is fine
        let mut req = close_req(ChannelBreakdown::default());
        req.shift_start = shift_morning() - Duration::days(3);
        let closure = closures.close_shift(&seller.id, &req).await.unwrap();
        assert_eq!(
            closure.shift_date,
            (shift_morning() - Duration::days(3)).date_naive()
        );
    }

    #[tokio::test]
    async fn test_terminal_closure_rejects_resubmission() {
        let db = test_db().await;
        let clock = fixed_clock();
        let closures = ClosureEngine::new(db.clone(), clock.clone());
        let seller = seed_user(&db, "Laura", UserRole::Receptionist).await;
        let manager = seed_user(&db, "Andrea", UserRole::Manager).await;

        let closure = closures
            .close_shift(&seller.id, &close_req(ChannelBreakdown::default()))
            .await
            .unwrap();

        closures
            .review_closure(&closure.id, &manager.id, None)
            .await
            .unwrap();

        let err = closures
            .close_shift(&seller.id, &close_req(ChannelBreakdown::default()))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::ClosureNotEditable { .. })
        ));
        assert_eq!(closures_count(&db).await, 1);
    }

    #[tokio::test]
    async fn test_review_stamps_reviewer_and_is_terminal() {
        let db = test_db().await;
        let clock = fixed_clock();
        let closures = ClosureEngine::new(db.clone(), clock.clone());
        let seller = seed_user(&db, "Laura", UserRole::Receptionist).await;
        let manager = seed_user(&db, "Andrea", UserRole::Manager).await;

        let closure = closures
            .close_shift(&seller.id, &close_req(ChannelBreakdown::default()))
            .await
            .unwrap();
        assert!(closure.reviewed_by.is_none());

        let reviewed = closures
            .review_closure(&closure.id, &manager.id, Some("count verified"))
            .await
            .unwrap();
        assert_eq!(reviewed.status, ClosureStatus::Reviewed);
        assert!(reviewed.status.is_terminal());
        assert_eq!(reviewed.reviewed_by.as_deref(), Some(manager.id.as_str()));
        assert_eq!(reviewed.reviewed_at, Some(clock.now()));
        assert_eq!(reviewed.notes.as_deref(), Some("count verified"));

        // reviewed is terminal
        let err = closures
            .review_closure(&closure.id, &manager.id, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::ClosureNotEditable { .. })
        ));
    }

    #[tokio::test]
    async fn test_cancel_closure_is_terminal() {
        let db = test_db().await;
        let clock = fixed_clock();
        let closures = ClosureEngine::new(db.clone(), clock.clone());
        let seller = seed_user(&db, "Laura", UserRole::Receptionist).await;
        let manager = seed_user(&db, "Andrea", UserRole::Manager).await;

        let closure = closures
            .close_shift(&seller.id, &close_req(ChannelBreakdown::default()))
            .await
            .unwrap();

        let cancelled = closures.cancel_closure(&closure.id).await.unwrap();
        assert_eq!(cancelled.status, ClosureStatus::Cancelled);

        let err = closures
            .review_closure(&closure.id, &manager.id, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::ClosureNotEditable { .. })
        ));
    }

    #[tokio::test]
    async fn test_unknown_closure_and_seller() {
        let db = test_db().await;
        let clock = fixed_clock();
        let closures = ClosureEngine::new(db.clone(), clock.clone());

        let err = closures
            .close_shift("ghost", &close_req(ChannelBreakdown::default()))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));

        let err = closures.get_closure("missing").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_get_and_list_closures() {
        let db = test_db().await;
        let clock = fixed_clock();
        let closures = ClosureEngine::new(db.clone(), clock.clone());
        let laura = seed_user(&db, "Laura", UserRole::Receptionist).await;
        let pedro = seed_user(&db, "Pedro", UserRole::Receptionist).await;

        let laura_closure = closures
            .close_shift(&laura.id, &close_req(ChannelBreakdown::default()))
            .await
            .unwrap();
        closures
            .close_shift(&pedro.id, &close_req(ChannelBreakdown::default()))
            .await
            .unwrap();

        let details = closures.get_closure(&laura_closure.id).await.unwrap();
        assert_eq!(details.seller_name, "Laura");
        assert_eq!(details.closure.id, laura_closure.id);

        let all = closures
            .list_closures(&ClosureFilter::default(), Page::default())
            .await
            .unwrap();
        assert_eq!(all.total, 2);
        assert_eq!(all.closures.len(), 2);

        let filter = ClosureFilter {
            seller_id: Some(laura.id.clone()),
            ..Default::default()
        };
        let only_laura = closures.list_closures(&filter, Page::default()).await.unwrap();
        assert_eq!(only_laura.total, 1);
        assert_eq!(only_laura.closures[0].seller_name, "Laura");

        let paged = closures
            .list_closures(&ClosureFilter::default(), Page { page: 1, per_page: 1 })
            .await
            .unwrap();
        assert_eq!(paged.closures.len(), 1);
        assert_eq!(paged.total_pages, 2);
        assert!(paged.has_next);
        assert!(!paged.has_prev);
    }

    #[tokio::test]
    async fn test_closure_report_rolls_up() {
        let db = test_db().await;
        let clock = fixed_clock();
        let sales = SaleEngine::new(db.clone(), clock.clone());
        let closures = ClosureEngine::new(db.clone(), clock.clone());
        let laura = seed_user(&db, "Laura", UserRole::Receptionist).await;
        let pedro = seed_user(&db, "Pedro", UserRole::Receptionist).await;
        let product = seed_product(&db, "MAT", "Yoga Mat", 100_000_00, 10).await;

        sell_cash(&sales, &laura, &product.id, 1, 100_000_00).await;

        // Laura's drawer is short; Pedro's day had no sales and counts clean.
        closures
            .close_shift(&laura.id, &close_req(counted(PaymentChannel::Cash, 98_000)))
            .await
            .unwrap();
        closures
            .close_shift(&pedro.id, &close_req(ChannelBreakdown::default()))
            .await
            .unwrap();

        let today = clock.now().date_naive();
        let report = closures.closure_report(today, today, None).await.unwrap();

        assert_eq!(report.total_closures, 2);
        assert_eq!(report.total_sales, Money::from_major(100_000));
        assert_eq!(report.total_counted, Money::from_major(98_000));
        assert_eq!(report.total_differences, Money::from_major(-2_000));
        assert_eq!(report.closures_with_discrepancies, 1);
        assert_eq!(report.average_difference, Money::from_major(-1_000));
        assert_eq!(report.by_seller.len(), 2);
        assert_eq!(report.daily.len(), 1);
        assert_eq!(report.daily[0].closures_count, 2);

        let laura_stats = report
            .by_seller
            .iter()
            .find(|s| s.seller_name == "Laura")
            .unwrap();
        assert_eq!(laura_stats.discrepancies_count, 1);
        assert_eq!(laura_stats.total_differences, Money::from_major(-2_000));
    }

    #[tokio::test]
    async fn test_membership_counts_flow_into_closure() {
        let db = test_db().await;
        let clock: Arc<FixedClock> = fixed_clock();
        let sales = SaleEngine::new(db.clone(), clock.clone());
        let closures = ClosureEngine::new(db.clone(), clock.clone());
        let seller = seed_user(&db, "Laura", UserRole::Receptionist).await;
        let customer = seed_user(&db, "Carlos", UserRole::Customer).await;
        let plan = seed_plan(&db, "Day Pass", PlanType::Daily, 15_000_00, None, 1).await;

        let req = CreateSaleRequest {
            customer_id: Some(customer.id.clone()),
            payment_channel: PaymentChannel::Nequi,
            amount_paid_cents: 15_000_00,
            discount_cents: 0,
            notes: None,
            products: vec![],
            memberships: vec![MembershipLineRequest {
                plan_id: plan.id,
                customer_id: customer.id,
                payment_channel: None,
            }],
        };
        sales.create_sale(&seller.id, &req).await.unwrap();

        let closure = closures
            .close_shift(&seller.id, &close_req(counted(PaymentChannel::Nequi, 15_000)))
            .await
            .unwrap();

        assert_eq!(closure.total_memberships_sold, 1);
        assert_eq!(closure.total_daily_access_sold, 1);
        assert_eq!(closure.nequi_sales_cents, 15_000_00);
        assert!(!closure.has_discrepancies());
    }
}
