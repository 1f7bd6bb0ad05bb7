//! # Sale Repository
//!
//! Read side of sales: details with both line collections, filtered
//! listings with pagination, and period summaries.
//!
//! Writes are deliberately absent here. Creating and reversing sales are
//! multi-step invariant-bearing operations owned by
//! [`crate::engine::sale::SaleEngine`].

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use vigor_core::{
    ChannelBreakdown, Money, Page, ReversalRecord, Sale, SaleDetails, SaleFilter,
    SaleMembershipLine, SalePage, SaleProductLine, SaleStatus, SalesSummary,
};

/// Repository for sale read operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Gets a sale header by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>("SELECT * FROM sales WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(sale)
    }

    /// Gets a sale with both of its line collections.
    pub async fn get_details(&self, id: &str) -> DbResult<SaleDetails> {
        let sale = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Sale", id))?;

        let product_lines = self.product_lines(id).await?;
        let membership_lines = self.membership_lines(id).await?;

        Ok(SaleDetails {
            sale,
            product_lines,
            membership_lines,
        })
    }

    /// Gets all product lines for a sale.
    pub async fn product_lines(&self, sale_id: &str) -> DbResult<Vec<SaleProductLine>> {
        let lines = sqlx::query_as::<_, SaleProductLine>(
            "SELECT * FROM sale_product_lines WHERE sale_id = ?1 ORDER BY created_at, id",
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    /// Gets all membership lines for a sale.
    pub async fn membership_lines(&self, sale_id: &str) -> DbResult<Vec<SaleMembershipLine>> {
        let lines = sqlx::query_as::<_, SaleMembershipLine>(
            "SELECT * FROM sale_membership_lines WHERE sale_id = ?1 ORDER BY created_at, id",
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    /// Gets the reversal audit record for a sale, if it was reversed.
    pub async fn reversal_record(&self, sale_id: &str) -> DbResult<Option<ReversalRecord>> {
        let record = sqlx::query_as::<_, ReversalRecord>(
            "SELECT * FROM sale_reversals WHERE sale_id = ?1",
        )
        .bind(sale_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Lists sales with filters and pagination, newest first.
    pub async fn list(&self, filter: &SaleFilter, page: Page) -> DbResult<SalePage> {
        debug!(?filter, page = page.page, "Listing sales");

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM sales
            WHERE (?1 IS NULL OR created_at >= ?1)
              AND (?2 IS NULL OR created_at <= ?2)
              AND (?3 IS NULL OR status = ?3)
              AND (?4 IS NULL OR seller_id = ?4)
            "#,
        )
        .bind(filter.date_from)
        .bind(filter.date_to)
        .bind(filter.status)
        .bind(&filter.seller_id)
        .fetch_one(&self.pool)
        .await?;

        let sales = sqlx::query_as::<_, Sale>(
            r#"
            SELECT * FROM sales
            WHERE (?1 IS NULL OR created_at >= ?1)
              AND (?2 IS NULL OR created_at <= ?2)
              AND (?3 IS NULL OR status = ?3)
              AND (?4 IS NULL OR seller_id = ?4)
            ORDER BY created_at DESC
            LIMIT ?5 OFFSET ?6
            "#,
        )
        .bind(filter.date_from)
        .bind(filter.date_to)
        .bind(filter.status)
        .bind(&filter.seller_id)
        .bind(page.per_page as i64)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total_pages = page.total_pages(total);

        Ok(SalePage {
            sales,
            total,
            page: page.page,
            per_page: page.per_page,
            total_pages,
            has_next: page.page < total_pages,
            has_prev: page.page > 1,
        })
    }

    /// Period rollup: counts, completed revenue, refunded total, and a
    /// per-channel breakdown of completed revenue.
    pub async fn summary(
        &self,
        date_from: Option<chrono::DateTime<chrono::Utc>>,
        date_to: Option<chrono::DateTime<chrono::Utc>>,
    ) -> DbResult<SalesSummary> {
        let rows: Vec<Sale> = sqlx::query_as::<_, Sale>(
            r#"
            SELECT * FROM sales
            WHERE status IN ('completed', 'refunded')
              AND (?1 IS NULL OR created_at >= ?1)
              AND (?2 IS NULL OR created_at <= ?2)
            "#,
        )
        .bind(date_from)
        .bind(date_to)
        .fetch_all(&self.pool)
        .await?;

        let mut completed_revenue = Money::zero();
        let mut refunded_total = Money::zero();
        let mut by_channel = ChannelBreakdown::default();

        for sale in &rows {
            match sale.status {
                SaleStatus::Completed => {
                    completed_revenue += sale.total();
                    by_channel.add(sale.payment_channel, sale.total());
                }
                SaleStatus::Refunded => refunded_total += sale.total(),
                _ => {}
            }
        }

        Ok(SalesSummary {
            sales_count: rows.len() as i64,
            completed_revenue,
            refunded_total,
            net_revenue: completed_revenue - refunded_total,
            by_channel,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
