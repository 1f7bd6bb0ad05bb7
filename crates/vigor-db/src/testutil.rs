//! Shared test fixtures: an in-memory database plus directory/catalog
//! seeds. Times are pinned to a known morning so date-sensitive behavior
//! (sale numbers, reversal windows, closure dates) is deterministic.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use crate::pool::{Database, DbConfig};
use vigor_core::{FixedClock, MembershipPlan, PlanType, Product, User, UserRole};

/// Fresh in-memory database with migrations applied. Honors RUST_LOG for
/// query/engine tracing during test runs.
pub(crate) async fn test_db() -> Database {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    Database::new(DbConfig::in_memory())
        .await
        .expect("in-memory database")
}

/// The pinned "now" used across tests: 2026-03-10 08:00 UTC.
pub(crate) fn shift_morning() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 10, 8, 0, 0).unwrap()
}

pub(crate) fn fixed_clock() -> Arc<FixedClock> {
    Arc::new(FixedClock::new(shift_morning()))
}

pub(crate) async fn seed_user(db: &Database, name: &str, role: UserRole) -> User {
    let user = User {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        role,
        is_active: true,
        created_at: shift_morning(),
    };
    db.users().insert(&user).await.unwrap();
    user
}

pub(crate) async fn seed_product(
    db: &Database,
    sku: &str,
    name: &str,
    price_cents: i64,
    stock: i64,
) -> Product {
    let now = shift_morning();
    let product = Product {
        id: Uuid::new_v4().to_string(),
        sku: sku.to_string(),
        barcode: None,
        name: name.to_string(),
        description: None,
        price_cents,
        cost_cents: price_cents / 2,
        current_stock: stock,
        min_stock: 5,
        is_active: true,
        created_at: now,
        updated_at: now,
        last_sale_date: None,
        last_restock_date: None,
    };
    db.products().insert(&product).await.unwrap();
    product
}

pub(crate) async fn seed_plan(
    db: &Database,
    name: &str,
    plan_type: PlanType,
    price_cents: i64,
    discount_price_cents: Option<i64>,
    duration_days: i64,
) -> MembershipPlan {
    let plan = MembershipPlan {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        plan_type,
        price_cents,
        discount_price_cents,
        duration_days,
        is_active: true,
        created_at: shift_morning(),
    };
    db.memberships().insert_plan(&plan).await.unwrap();
    plan
}
