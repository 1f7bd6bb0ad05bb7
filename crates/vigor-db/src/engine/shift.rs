//! # Shift Aggregation Queries
//!
//! Read-only aggregation of a seller's completed sales since a shift-start
//! timestamp. These functions are generic over the executor so the closure
//! engine can run them inside its own transaction (the recorded totals a
//! closure stores must come from the same snapshot the closure writes in).
//!
//! Only `status = 'completed'` sales count: refunded sales put the cash
//! back in the drawer, so they must not inflate recorded revenue.

use chrono::{DateTime, Utc};
use sqlx::{Executor, Sqlite};

use crate::error::DbResult;
use vigor_core::{
    ChannelBreakdown, Money, PaymentChannel, SaleType, ShiftItemSold, ShiftItems, ShiftSummary,
};

/// One completed sale's contribution to a shift summary.
#[derive(Debug, sqlx::FromRow)]
struct ShiftSaleRow {
    sale_type: SaleType,
    payment_channel: PaymentChannel,
    total_cents: i64,
    has_daily_line: bool,
}

/// Sums a seller's completed sales since `shift_start` into revenue,
/// per-channel totals, and sale-type counters.
///
/// A `mixed` sale increments both the product and the membership counter.
/// A sale containing at least one daily-pass line additionally increments
/// the daily-access counter.
pub(crate) async fn shift_summary<'a, E>(
    executor: E,
    seller_id: &str,
    shift_start: DateTime<Utc>,
) -> DbResult<ShiftSummary>
where
    E: Executor<'a, Database = Sqlite>,
{
    let rows: Vec<ShiftSaleRow> = sqlx::query_as(
        r#"
        SELECT
            s.sale_type,
            s.payment_channel,
            s.total_cents,
            EXISTS(
                SELECT 1 FROM sale_membership_lines l
                WHERE l.sale_id = s.id AND l.plan_type = 'daily'
            ) AS has_daily_line
        FROM sales s
        WHERE s.seller_id = ?1
          AND s.created_at >= ?2
          AND s.status = 'completed'
        "#,
    )
    .bind(seller_id)
    .bind(shift_start)
    .fetch_all(executor)
    .await?;

    let mut summary = ShiftSummary {
        total_sales: Money::zero(),
        total_products_sold: 0,
        total_memberships_sold: 0,
        total_daily_access_sold: 0,
        by_channel: ChannelBreakdown::default(),
        sales_count: rows.len() as i64,
    };

    for row in &rows {
        let total = Money::from_cents(row.total_cents);
        summary.total_sales += total;
        summary.by_channel.add(row.payment_channel, total);

        match row.sale_type {
            SaleType::Product => summary.total_products_sold += 1,
            SaleType::Membership => summary.total_memberships_sold += 1,
            SaleType::Mixed => {
                summary.total_products_sold += 1;
                summary.total_memberships_sold += 1;
            }
        }

        if row.has_daily_line {
            summary.total_daily_access_sold += 1;
        }
    }

    Ok(summary)
}

/// Per-product quantities sold in the shift window, each with the
/// product's *current* remaining stock and selling price (a live
/// snapshot for the close-out count, not a point-in-time one).
pub(crate) async fn shift_items_sold<'a, E>(
    executor: E,
    seller_id: &str,
    shift_start: DateTime<Utc>,
) -> DbResult<ShiftItems>
where
    E: Executor<'a, Database = Sqlite>,
{
    let items: Vec<ShiftItemSold> = sqlx::query_as(
        r#"
        SELECT
            l.product_id,
            p.name AS product_name,
            SUM(l.quantity) AS quantity_sold,
            p.current_stock AS remaining_stock,
            p.price_cents AS unit_price_cents
        FROM sale_product_lines l
        JOIN sales s ON s.id = l.sale_id
        JOIN products p ON p.id = l.product_id
        WHERE s.seller_id = ?1
          AND s.created_at >= ?2
          AND s.status = 'completed'
        GROUP BY l.product_id, p.name, p.current_stock, p.price_cents
        ORDER BY p.name
        "#,
    )
    .bind(seller_id)
    .bind(shift_start)
    .fetch_all(executor)
    .await?;

    let total_items_sold = items.iter().map(|i| i.quantity_sold).sum();
    let distinct_products = items.len() as i64;

    Ok(ShiftItems {
        items,
        total_items_sold,
        distinct_products,
    })
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
    use chrono::Duration;
    use vigor_core::{
        Clock, CreateSaleRequest, MembershipLineRequest, PlanType, ProductLineRequest, UserRole,
    };

    fn product_sale(
        product_id: &str,
        qty: i64,
        paid_cents: i64,
        channel: PaymentChannel,
    ) -> CreateSaleRequest {
        CreateSaleRequest {
            customer_id: None,
            payment_channel: channel,
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
        }
    }

    #[tokio::test]
    async fn test_summary_counts_types_and_channels() {
        let db = test_db().await;
        let engine = SaleEngine::new(db.clone(), fixed_clock());
        let seller = seed_user(&db, "Laura", UserRole::Receptionist).await;
        let customer = seed_user(&db, "Carlos", UserRole::Customer).await;
        let mat = seed_product(&db, "MAT", "Yoga Mat", 100_000_00, 10).await;
        let plan = seed_plan(&db, "Monthly Full", PlanType::Monthly, 120_000_00, None, 30).await;

        // product sale in cash, membership sale in nequi, mixed sale by card
        engine
            .create_sale(&seller.id, &product_sale(&mat.id, 1, 100_000_00, PaymentChannel::Cash))
            .await
            .unwrap();
        engine
            .create_sale(
                &seller.id,
                &CreateSaleRequest {
                    customer_id: Some(customer.id.clone()),
                    payment_channel: PaymentChannel::Nequi,
                    amount_paid_cents: 120_000_00,
                    discount_cents: 0,
                    notes: None,
                    products: vec![],
                    memberships: vec![MembershipLineRequest {
                        plan_id: plan.id.clone(),
                        customer_id: customer.id.clone(),
                        payment_channel: None,
                    }],
                },
            )
            .await
            .unwrap();
        engine
            .create_sale(
                &seller.id,
                &CreateSaleRequest {
                    customer_id: Some(customer.id.clone()),
                    payment_channel: PaymentChannel::Card,
                    amount_paid_cents: 220_000_00,
                    discount_cents: 0,
                    notes: None,
                    products: vec![ProductLineRequest {
                        product_id: mat.id.clone(),
                        quantity: 1,
                        unit_price_cents: None,
                        discount_bps: 0,
                    }],
                    memberships: vec![MembershipLineRequest {
                        plan_id: plan.id.clone(),
                        customer_id: customer.id.clone(),
                        payment_channel: None,
                    }],
                },
            )
            .await
            .unwrap();

        let summary = shift_summary(db.pool(), &seller.id, shift_morning())
            .await
            .unwrap();

        assert_eq!(summary.sales_count, 3);
        assert_eq!(summary.total_sales, Money::from_major(440_000));
        // mixed increments both counters
        assert_eq!(summary.total_products_sold, 2);
        assert_eq!(summary.total_memberships_sold, 2);
        assert_eq!(summary.total_daily_access_sold, 0);
        assert_eq!(summary.by_channel.cash, Money::from_major(100_000));
        assert_eq!(summary.by_channel.nequi, Money::from_major(120_000));
        assert_eq!(summary.by_channel.card, Money::from_major(220_000));
    }

    #[tokio::test]
    async fn test_summary_scopes_to_seller_window_and_status() {
        let db = test_db().await;
        let clock = fixed_clock();
        let engine = SaleEngine::new(db.clone(), clock.clone());
        let laura = seed_user(&db, "Laura", UserRole::Receptionist).await;
        let pedro = seed_user(&db, "Pedro", UserRole::Receptionist).await;
        let bar = seed_product(&db, "BAR", "Protein Bar", 10_000_00, 50).await;

        // before the shift window
        engine
            .create_sale(&laura.id, &product_sale(&bar.id, 1, 10_000_00, PaymentChannel::Cash))
            .await
            .unwrap();

        clock.advance(Duration::hours(2));
        let shift_start = clock.now();

        // inside the window: one kept, one reversed, one by another seller
        let kept = engine
            .create_sale(&laura.id, &product_sale(&bar.id, 2, 20_000_00, PaymentChannel::Cash))
            .await
            .unwrap();
        let reversed = engine
            .create_sale(&laura.id, &product_sale(&bar.id, 1, 10_000_00, PaymentChannel::Cash))
            .await
            .unwrap();
        engine
            .reverse_sale(&reversed.sale.id, "void", &laura.id)
            .await
            .unwrap();
        engine
            .create_sale(&pedro.id, &product_sale(&bar.id, 5, 50_000_00, PaymentChannel::Cash))
            .await
            .unwrap();

        let summary = shift_summary(db.pool(), &laura.id, shift_start).await.unwrap();
        assert_eq!(summary.sales_count, 1);
        assert_eq!(summary.total_sales, Money::from_cents(kept.sale.total_cents));
        assert_eq!(summary.by_channel.cash, Money::from_major(20_000));
    }

    #[tokio::test]
    async fn test_daily_pass_counts_as_daily_access() {
        let db = test_db().await;
        let engine = SaleEngine::new(db.clone(), fixed_clock());
        let seller = seed_user(&db, "Laura", UserRole::Receptionist).await;
        let customer = seed_user(&db, "Carlos", UserRole::Customer).await;
        let day_pass = seed_plan(&db, "Day Pass", PlanType::Daily, 15_000_00, None, 1).await;

        engine
            .create_sale(
                &seller.id,
                &CreateSaleRequest {
                    customer_id: Some(customer.id.clone()),
                    payment_channel: PaymentChannel::Cash,
                    amount_paid_cents: 15_000_00,
                    discount_cents: 0,
                    notes: None,
                    products: vec![],
                    memberships: vec![MembershipLineRequest {
                        plan_id: day_pass.id,
                        customer_id: customer.id,
                        payment_channel: None,
                    }],
                },
            )
            .await
            .unwrap();

        let summary = shift_summary(db.pool(), &seller.id, shift_morning())
            .await
            .unwrap();
        assert_eq!(summary.total_memberships_sold, 1);
        assert_eq!(summary.total_daily_access_sold, 1);
    }

    #[tokio::test]
    async fn test_items_sold_groups_with_live_stock() {
        let db = test_db().await;
        let engine = SaleEngine::new(db.clone(), fixed_clock());
        let seller = seed_user(&db, "Laura", UserRole::Receptionist).await;
        let bar = seed_product(&db, "BAR", "Protein Bar", 10_000_00, 50).await;
        let mat = seed_product(&db, "MAT", "Yoga Mat", 100_000_00, 10).await;

        engine
            .create_sale(&seller.id, &product_sale(&bar.id, 3, 30_000_00, PaymentChannel::Cash))
            .await
            .unwrap();
        engine
            .create_sale(&seller.id, &product_sale(&bar.id, 2, 20_000_00, PaymentChannel::Card))
            .await
            .unwrap();
        engine
            .create_sale(&seller.id, &product_sale(&mat.id, 1, 100_000_00, PaymentChannel::Cash))
            .await
            .unwrap();

        let items = shift_items_sold(db.pool(), &seller.id, shift_morning())
            .await
            .unwrap();

        assert_eq!(items.distinct_products, 2);
        assert_eq!(items.total_items_sold, 6);

        let bar_row = items.items.iter().find(|i| i.product_id == bar.id).unwrap();
        assert_eq!(bar_row.quantity_sold, 5);
        // live stock after both sales
        assert_eq!(bar_row.remaining_stock, 45);
        assert_eq!(bar_row.unit_price_cents, 10_000_00);

        let mat_row = items.items.iter().find(|i| i.product_id == mat.id).unwrap();
        assert_eq!(mat_row.quantity_sold, 1);
        assert_eq!(mat_row.remaining_stock, 9);
    }

    #[tokio::test]
    async fn test_empty_shift_is_all_zeroes() {
        let db = test_db().await;
        let seller = seed_user(&db, "Laura", UserRole::Receptionist).await;

        let summary = shift_summary(db.pool(), &seller.id, shift_morning())
            .await
            .unwrap();
        assert_eq!(summary.sales_count, 0);
        assert_eq!(summary.total_sales, Money::zero());
        assert_eq!(summary.by_channel.total(), Money::zero());

        let items = shift_items_sold(db.pool(), &seller.id, shift_morning())
            .await
            .unwrap();
        assert!(items.items.is_empty());
        assert_eq!(items.total_items_sold, 0);
    }
}
