//! # Domain Types
//!
//! Core domain types for Vigor POS.
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business ID where one exists (`sku`, `sale_number`) - human-readable
//!
//! ## Snapshot Pattern
//! Sale lines freeze catalog data (name, SKU, price, cost, plan terms) at
//! the moment of sale. A later catalog edit never rewrites history.
//!
//! ## Closed Enumerations
//! Statuses, sale types, and payment channels are closed enums normalized
//! once at the system boundary. They are never compared as free-form
//! strings downstream.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::DISCREPANCY_TOLERANCE;

// =============================================================================
// Status & Classification Enums
// =============================================================================

/// The status of a sale transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    /// Transient state inside the creation transaction.
    Pending,
    /// Paid and committed with all side effects.
    Completed,
    /// Administratively cancelled. Terminal.
    Cancelled,
    /// Reversed same-day with stock restored. Terminal.
    Refunded,
}

impl SaleStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            SaleStatus::Pending => "pending",
            SaleStatus::Completed => "completed",
            SaleStatus::Cancelled => "cancelled",
            SaleStatus::Refunded => "refunded",
        }
    }
}

/// What a sale contains. Derived from the submitted lines, never trusted
/// from the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SaleType {
    Product,
    Membership,
    /// Products and memberships in one ticket.
    Mixed,
}

/// A payment method tracked independently for reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentChannel {
    /// Physical cash in the register drawer.
    Cash,
    Nequi,
    Bancolombia,
    Daviplata,
    Card,
    Transfer,
}

impl PaymentChannel {
    /// All channels, in reconciliation order.
    pub const ALL: [PaymentChannel; 6] = [
        PaymentChannel::Cash,
        PaymentChannel::Nequi,
        PaymentChannel::Bancolombia,
        PaymentChannel::Daviplata,
        PaymentChannel::Card,
        PaymentChannel::Transfer,
    ];

    pub const fn code(&self) -> &'static str {
        match self {
            PaymentChannel::Cash => "cash",
            PaymentChannel::Nequi => "nequi",
            PaymentChannel::Bancolombia => "bancolombia",
            PaymentChannel::Daviplata => "daviplata",
            PaymentChannel::Card => "card",
            PaymentChannel::Transfer => "transfer",
        }
    }
}

/// The status of a cash closure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ClosureStatus {
    /// Submitted, awaiting review. Re-submission overwrites in place.
    Pending,
    Completed,
    /// Signed off by a reviewer. Terminal.
    Reviewed,
    /// Terminal.
    Cancelled,
}

impl ClosureStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ClosureStatus::Pending => "pending",
            ClosureStatus::Completed => "completed",
            ClosureStatus::Reviewed => "reviewed",
            ClosureStatus::Cancelled => "cancelled",
        }
    }

    /// Terminal closures no longer accept re-submission or review.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, ClosureStatus::Reviewed | ClosureStatus::Cancelled)
    }
}

/// Stock movement classification for the inventory audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    /// Stock out through a sale.
    Sale,
    /// Stock back in through a sale reversal.
    Return,
    /// Restock from a supplier.
    Purchase,
    /// Manual correction.
    Adjustment,
}

/// Membership plan duration class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PlanType {
    /// Single-day gym access.
    Daily,
    Monthly,
    Quarterly,
}

/// Staff/customer role in the user directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    Manager,
    Receptionist,
    Customer,
}

// =============================================================================
// Channel Breakdown
// =============================================================================

/// One amount per payment channel. Used for recorded revenue, physical
/// counts, and per-channel differences alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ChannelBreakdown {
    pub cash: Money,
    pub nequi: Money,
    pub bancolombia: Money,
    pub daviplata: Money,
    pub card: Money,
    pub transfer: Money,
}

impl ChannelBreakdown {
    pub fn get(&self, channel: PaymentChannel) -> Money {
        match channel {
            PaymentChannel::Cash => self.cash,
            PaymentChannel::Nequi => self.nequi,
            PaymentChannel::Bancolombia => self.bancolombia,
            PaymentChannel::Daviplata => self.daviplata,
            PaymentChannel::Card => self.card,
            PaymentChannel::Transfer => self.transfer,
        }
    }

    pub fn set(&mut self, channel: PaymentChannel, amount: Money) {
        match channel {
            PaymentChannel::Cash => self.cash = amount,
            PaymentChannel::Nequi => self.nequi = amount,
            PaymentChannel::Bancolombia => self.bancolombia = amount,
            PaymentChannel::Daviplata => self.daviplata = amount,
            PaymentChannel::Card => self.card = amount,
            PaymentChannel::Transfer => self.transfer = amount,
        }
    }

    pub fn add(&mut self, channel: PaymentChannel, amount: Money) {
        self.set(channel, self.get(channel) + amount);
    }

    /// Sum across all channels.
    pub fn total(&self) -> Money {
        PaymentChannel::ALL
            .iter()
            .fold(Money::zero(), |acc, c| acc + self.get(*c))
    }
}

// =============================================================================
// Directory & Catalog Entities
// =============================================================================

/// A user in the directory: staff or customer. Authentication is handled
/// outside this core; sales and closures only need existence and names.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct User {
    pub id: String,
    pub name: String,
    pub role: UserRole,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// A product available for sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    pub id: String,
    /// Stock Keeping Unit - business identifier.
    pub sku: String,
    pub barcode: Option<String>,
    pub name: String,
    pub description: Option<String>,
    /// Selling price in cents.
    pub price_cents: i64,
    /// Purchase cost in cents (margin reporting).
    pub cost_cents: i64,
    pub current_stock: i64,
    /// Low-stock alert threshold.
    pub min_stock: i64,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub last_sale_date: Option<DateTime<Utc>>,
    #[ts(as = "Option<String>")]
    pub last_restock_date: Option<DateTime<Utc>>,
}

impl Product {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Checks whether `quantity` units can be sold from current stock.
    pub fn can_sell(&self, quantity: i64) -> bool {
        self.is_active && self.current_stock >= quantity
    }
}

/// One entry in the append-only inventory audit trail.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct StockMovement {
    pub id: String,
    pub product_id: String,
    pub movement_type: MovementType,
    /// Signed quantity: negative on the way out, positive on the way in.
    pub quantity: i64,
    pub stock_before: i64,
    pub stock_after: i64,
    /// Sale number, reversal reference, or supplier document.
    pub reference: Option<String>,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// A sellable membership plan definition.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct MembershipPlan {
    pub id: String,
    pub name: String,
    pub plan_type: PlanType,
    pub price_cents: i64,
    /// Promotional price; takes precedence over `price_cents` when set.
    pub discount_price_cents: Option<i64>,
    pub duration_days: i64,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl MembershipPlan {
    /// The price a customer actually pays: the promotional price if one is
    /// set, otherwise the list price.
    #[inline]
    pub fn effective_price(&self) -> Money {
        Money::from_cents(self.discount_price_cents.unwrap_or(self.price_cents))
    }
}

/// An issued membership, derived from a plan snapshot at sale time.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Membership {
    pub id: String,
    pub customer_id: String,
    pub plan_name: String,
    pub plan_type: PlanType,
    #[ts(as = "String")]
    pub start_date: DateTime<Utc>,
    #[ts(as = "String")]
    pub end_date: DateTime<Utc>,
    pub price_cents: i64,
    pub payment_channel: PaymentChannel,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Sale
// =============================================================================

/// A sale transaction. Owned by the sale engine at creation; mutated only
/// by the reversal path afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Sale {
    pub id: String,
    /// Business identifier, unique: `SALE-YYYYMMDD-NNNN`.
    pub sale_number: String,
    pub customer_id: Option<String>,
    pub seller_id: String,
    pub sale_type: SaleType,
    pub status: SaleStatus,
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    /// Always zero today; recorded so the ledger shape survives a future
    /// tax regime.
    pub tax_cents: i64,
    pub total_cents: i64,
    pub amount_paid_cents: i64,
    pub change_cents: i64,
    pub payment_channel: PaymentChannel,
    pub notes: Option<String>,
    pub is_reversed: bool,
    pub reversed_by: Option<String>,
    #[ts(as = "Option<String>")]
    pub reversed_at: Option<DateTime<Utc>>,
    pub reversal_reason: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Sale {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// A sale is reversible while completed, not yet reversed, and only on
    /// its creation calendar day (UTC).
    pub fn can_be_reversed(&self, today: NaiveDate) -> bool {
        self.status == SaleStatus::Completed
            && !self.is_reversed
            && self.created_at.date_naive() == today
    }
}

/// A product line inside a sale. Immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SaleProductLine {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,
    /// Product name at time of sale (frozen).
    pub name_snapshot: String,
    /// SKU at time of sale (frozen).
    pub sku_snapshot: String,
    /// Unit price actually charged, in cents (frozen).
    pub unit_price_cents: i64,
    /// Unit cost at time of sale, for margin reporting.
    pub unit_cost_cents: Option<i64>,
    pub quantity: i64,
    /// Line discount in basis points (1000 = 10%).
    pub discount_bps: i64,
    pub line_total_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl SaleProductLine {
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }
}

/// A membership line inside a sale. Immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SaleMembershipLine {
    pub id: String,
    pub sale_id: String,
    pub plan_id: String,
    /// The membership issued for this line.
    pub membership_id: Option<String>,
    /// Who the membership was issued to (may differ from the sale's payer).
    pub customer_id: String,
    pub plan_name: String,
    pub plan_type: PlanType,
    pub plan_duration_days: i64,
    pub plan_price_cents: i64,
    #[ts(as = "String")]
    pub start_date: DateTime<Utc>,
    #[ts(as = "String")]
    pub end_date: DateTime<Utc>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Reversal Record
// =============================================================================

/// A product restocked during a reversal (audit payload).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RestockedProduct {
    pub product_id: String,
    pub product_name: String,
    pub quantity: i64,
}

/// A membership deactivated during a reversal (audit payload).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DeactivatedMembership {
    pub membership_id: String,
    pub plan_name: String,
    pub customer_id: String,
}

/// The immutable audit record written by a sale reversal. Never mutated
/// after creation.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ReversalRecord {
    pub id: String,
    pub sale_id: String,
    pub reversed_by: String,
    pub reason: String,
    /// JSON array of [`RestockedProduct`].
    pub products_restocked: String,
    /// JSON array of [`DeactivatedMembership`].
    pub memberships_deactivated: String,
    pub refunded_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl ReversalRecord {
    pub fn restocked_products(&self) -> Vec<RestockedProduct> {
        serde_json::from_str(&self.products_restocked).unwrap_or_default()
    }

    pub fn deactivated_memberships(&self) -> Vec<DeactivatedMembership> {
        serde_json::from_str(&self.memberships_deactivated).unwrap_or_default()
    }
}

// =============================================================================
// Cash Closure
// =============================================================================

/// The once-per-seller-per-day reconciliation record comparing recorded
/// revenue against physically counted funds, per payment channel.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CashClosure {
    pub id: String,
    pub seller_id: String,
    /// Canonical UTC shift date. Uniqueness key together with the seller.
    #[ts(as = "String")]
    pub shift_date: NaiveDate,
    #[ts(as = "String")]
    pub shift_start: DateTime<Utc>,
    #[ts(as = "String")]
    pub shift_end: DateTime<Utc>,
    pub total_sales_cents: i64,
    pub total_products_sold: i64,
    pub total_memberships_sold: i64,
    pub total_daily_access_sold: i64,
    pub cash_sales_cents: i64,
    pub nequi_sales_cents: i64,
    pub bancolombia_sales_cents: i64,
    pub daviplata_sales_cents: i64,
    pub card_sales_cents: i64,
    pub transfer_sales_cents: i64,
    pub cash_counted_cents: i64,
    pub nequi_counted_cents: i64,
    pub bancolombia_counted_cents: i64,
    pub daviplata_counted_cents: i64,
    pub card_counted_cents: i64,
    pub transfer_counted_cents: i64,
    pub cash_diff_cents: i64,
    pub nequi_diff_cents: i64,
    pub bancolombia_diff_cents: i64,
    pub daviplata_diff_cents: i64,
    pub card_diff_cents: i64,
    pub transfer_diff_cents: i64,
    pub status: ClosureStatus,
    pub notes: Option<String>,
    pub discrepancies_notes: Option<String>,
    pub reviewed_by: Option<String>,
    #[ts(as = "Option<String>")]
    pub reviewed_at: Option<DateTime<Utc>>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl CashClosure {
    /// System-recorded revenue per channel.
    pub fn recorded(&self) -> ChannelBreakdown {
        ChannelBreakdown {
            cash: Money::from_cents(self.cash_sales_cents),
            nequi: Money::from_cents(self.nequi_sales_cents),
            bancolombia: Money::from_cents(self.bancolombia_sales_cents),
            daviplata: Money::from_cents(self.daviplata_sales_cents),
            card: Money::from_cents(self.card_sales_cents),
            transfer: Money::from_cents(self.transfer_sales_cents),
        }
    }

    /// Physically counted funds per channel.
    pub fn counted(&self) -> ChannelBreakdown {
        ChannelBreakdown {
            cash: Money::from_cents(self.cash_counted_cents),
            nequi: Money::from_cents(self.nequi_counted_cents),
            bancolombia: Money::from_cents(self.bancolombia_counted_cents),
            daviplata: Money::from_cents(self.daviplata_counted_cents),
            card: Money::from_cents(self.card_counted_cents),
            transfer: Money::from_cents(self.transfer_counted_cents),
        }
    }

    /// Stored per-channel differences (counted − recorded).
    pub fn differences(&self) -> ChannelBreakdown {
        ChannelBreakdown {
            cash: Money::from_cents(self.cash_diff_cents),
            nequi: Money::from_cents(self.nequi_diff_cents),
            bancolombia: Money::from_cents(self.bancolombia_diff_cents),
            daviplata: Money::from_cents(self.daviplata_diff_cents),
            card: Money::from_cents(self.card_diff_cents),
            transfer: Money::from_cents(self.transfer_diff_cents),
        }
    }

    pub fn total_counted(&self) -> Money {
        self.counted().total()
    }

    pub fn total_differences(&self) -> Money {
        self.differences().total()
    }

    /// True when any single channel differs beyond the tolerance.
    pub fn has_discrepancies(&self) -> bool {
        let diffs = self.differences();
        PaymentChannel::ALL
            .iter()
            .any(|c| diffs.get(*c).abs() > DISCREPANCY_TOLERANCE)
    }
}

// =============================================================================
// Read Model / Response Shapes
// =============================================================================

/// A sale with both of its line collections.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleDetails {
    pub sale: Sale,
    pub product_lines: Vec<SaleProductLine>,
    pub membership_lines: Vec<SaleMembershipLine>,
}

/// Aggregate of a seller's completed sales since shift start.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ShiftSummary {
    pub total_sales: Money,
    pub total_products_sold: i64,
    pub total_memberships_sold: i64,
    pub total_daily_access_sold: i64,
    pub by_channel: ChannelBreakdown,
    pub sales_count: i64,
}

/// One product's sold quantity within a shift, with a *live* stock
/// snapshot (current remaining stock, not stock at sale time).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ShiftItemSold {
    pub product_id: String,
    pub product_name: String,
    pub quantity_sold: i64,
    pub remaining_stock: i64,
    pub unit_price_cents: i64,
}

/// Per-product breakdown of a shift's sales.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ShiftItems {
    pub items: Vec<ShiftItemSold>,
    pub total_items_sold: i64,
    pub distinct_products: i64,
}

/// Period-level sales rollup.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalesSummary {
    pub sales_count: i64,
    pub completed_revenue: Money,
    pub refunded_total: Money,
    pub net_revenue: Money,
    pub by_channel: ChannelBreakdown,
}

/// One page of a sale listing.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalePage {
    pub sales: Vec<Sale>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

/// A closure joined with its seller's display name.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ClosureDetails {
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    pub closure: CashClosure,
    pub seller_name: String,
}

/// One page of a closure listing.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ClosurePage {
    pub closures: Vec<ClosureDetails>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

/// Per-seller rollup inside a closure report.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SellerClosureStats {
    pub seller_name: String,
    pub closures_count: i64,
    pub total_sales: Money,
    pub total_differences: Money,
    pub discrepancies_count: i64,
}

/// Per-day rollup inside a closure report.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DailyClosureStats {
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub closures_count: i64,
    pub total_sales: Money,
    pub total_differences: Money,
    pub discrepancies_count: i64,
}

/// Period report across closures, for back-office review.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ClosureReport {
    #[ts(as = "String")]
    pub period_start: NaiveDate,
    #[ts(as = "String")]
    pub period_end: NaiveDate,
    pub total_closures: i64,
    pub total_sales: Money,
    pub total_counted: Money,
    pub total_differences: Money,
    pub closures_with_discrepancies: i64,
    pub average_difference: Money,
    pub by_seller: Vec<SellerClosureStats>,
    pub daily: Vec<DailyClosureStats>,
}

// =============================================================================
// Unit Tests
// =============================================================================
