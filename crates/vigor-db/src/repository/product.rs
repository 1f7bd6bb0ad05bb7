//! # Product Repository
//!
//! Catalog reads, restocking, and the stock-movement audit trail.
//!
//! Stock only ever changes together with a movement row: `sale` and
//! `return` movements are written by the sale engine inside its
//! transaction; `purchase` movements are written here by [`restock`].
//!
//! [`restock`]: ProductRepository::restock

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use vigor_core::{MovementType, Product, StockMovement};

/// Repository for product and stock-movement operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Lists active products available for sale, optionally filtered by a
    /// search term matched against name, SKU, and barcode.
    pub async fn list_for_sale(&self, search: Option<&str>) -> DbResult<Vec<Product>> {
        let term = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{s}%"));

        debug!(search = term.as_deref().unwrap_or(""), "Listing products for sale");

        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT * FROM products
            WHERE is_active = 1
              AND (?1 IS NULL OR name LIKE ?1 OR sku LIKE ?1 OR barcode LIKE ?1)
            ORDER BY name
            "#,
        )
        .bind(term)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Inserts a product (catalog seeding; the catalog UI lives outside
    /// this core).
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, sku = %product.sku, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, sku, barcode, name, description,
                price_cents, cost_cents, current_stock, min_stock, is_active,
                created_at, updated_at, last_sale_date, last_restock_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
        )
        .bind(&product.id)
        .bind(&product.sku)
        .bind(&product.barcode)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price_cents)
        .bind(product.cost_cents)
        .bind(product.current_stock)
        .bind(product.min_stock)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .bind(product.last_sale_date)
        .bind(product.last_restock_date)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Adds stock from a supplier delivery and writes the `purchase`
    /// movement, in one transaction.
    pub async fn restock(
        &self,
        product_id: &str,
        quantity: i64,
        reference: Option<&str>,
        now: DateTime<Utc>,
    ) -> DbResult<Product> {
        let mut tx = self.pool.begin().await?;

        let stock_after: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE products
            SET current_stock = current_stock + ?2,
                last_restock_date = ?3,
                updated_at = ?3
            WHERE id = ?1
            RETURNING current_stock
            "#,
        )
        .bind(product_id)
        .bind(quantity)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await?;

        let stock_after = stock_after.ok_or_else(|| DbError::not_found("Product", product_id))?;

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
        .bind(MovementType::Purchase)
        .bind(quantity)
        .bind(stock_after - quantity)
        .bind(stock_after)
        .bind(reference)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(product_id = %product_id, quantity = %quantity, stock_after = %stock_after, "Product restocked");

        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ?1")
            .bind(product_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(product)
    }

    /// Lists the movement audit trail for a product, newest first.
    pub async fn movements(&self, product_id: &str) -> DbResult<Vec<StockMovement>> {
        let movements = sqlx::query_as::<_, StockMovement>(
            r#"
            SELECT * FROM stock_movements
            WHERE product_id = ?1
            ORDER BY created_at DESC, id
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(movements)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{seed_product, test_db};

    #[tokio::test]
    async fn test_restock_updates_stock_and_writes_movement() {
        let db = test_db().await;
        let product = seed_product(&db, "PROT-1KG", "Whey Protein 1kg", 50_000_00, 10).await;

        let now = Utc::now();
        let updated = db
            .products()
            .restock(&product.id, 15, Some("PO-2026-044"), now)
            .await
            .unwrap();

        assert_eq!(updated.current_stock, 25);
        assert_eq!(updated.last_restock_date.map(|d| d.date_naive()), Some(now.date_naive()));

        let movements = db.products().movements(&product.id).await.unwrap();
        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].movement_type, MovementType::Purchase);
        assert_eq!(movements[0].quantity, 15);
        assert_eq!(movements[0].stock_before, 10);
        assert_eq!(movements[0].stock_after, 25);
        assert_eq!(movements[0].reference.as_deref(), Some("PO-2026-044"));
    }

    #[tokio::test]
    async fn test_restock_unknown_product_fails() {
        let db = test_db().await;
        let err = db
            .products()
            .restock("missing", 5, None, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_list_for_sale_filters_and_searches() {
        let db = test_db().await;
        seed_product(&db, "PROT-1KG", "Whey Protein 1kg", 50_000_00, 10).await;
        seed_product(&db, "SHAKER", "Shaker Bottle", 25_000_00, 5).await;

        let all = db.products().list_for_sale(None).await.unwrap();
        assert_eq!(all.len(), 2);

        let hits = db.products().list_for_sale(Some("whey")).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].sku, "PROT-1KG");

        let by_sku = db.products().list_for_sale(Some("SHAK")).await.unwrap();
        assert_eq!(by_sku.len(), 1);
    }
}
