//! # Request Shapes
//!
//! Explicit, typed request structs for every operation the core exposes.
//! Required vs. optional fields are enumerated here and validated before a
//! transaction begins - there are no free-form payload maps anywhere in
//! the system.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::types::{ChannelBreakdown, ClosureStatus, PaymentChannel, SaleStatus, SaleType};
use crate::validation::{
    validate_discount_bps, validate_non_negative_cents, validate_quantity, validate_reference,
};

// =============================================================================
// Sale Creation
// =============================================================================

/// One product line in a sale request.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductLineRequest {
    pub product_id: String,
    pub quantity: i64,
    /// Overrides the product's current selling price when set.
    pub unit_price_cents: Option<i64>,
    /// Line discount in basis points (1000 = 10%). Defaults to none.
    #[serde(default)]
    pub discount_bps: u32,
}

/// One membership line in a sale request.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MembershipLineRequest {
    pub plan_id: String,
    /// Who the membership is issued to.
    pub customer_id: String,
    /// Channel recorded on the issued membership. Defaults to the sale's
    /// payment channel.
    pub payment_channel: Option<PaymentChannel>,
}

/// Request to create a sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreateSaleRequest {
    /// Paying customer. Required when any membership line is present.
    pub customer_id: Option<String>,
    pub payment_channel: PaymentChannel,
    pub amount_paid_cents: i64,
    /// Sale-level discount applied to the subtotal.
    #[serde(default)]
    pub discount_cents: i64,
    pub notes: Option<String>,
    #[serde(default)]
    pub products: Vec<ProductLineRequest>,
    #[serde(default)]
    pub memberships: Vec<MembershipLineRequest>,
}

impl CreateSaleRequest {
    /// Validates shape and field ranges. Stock, prices, and existence
    /// checks run later, inside the sale transaction.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.products.is_empty() && self.memberships.is_empty() {
            return Err(ValidationError::EmptySale);
        }

        validate_non_negative_cents("amount_paid", self.amount_paid_cents)?;
        validate_non_negative_cents("discount", self.discount_cents)?;

        for line in &self.products {
            validate_reference("product_id", &line.product_id)?;
            validate_quantity(line.quantity)?;
            validate_discount_bps(line.discount_bps)?;
            if let Some(price) = line.unit_price_cents {
                validate_non_negative_cents("unit_price", price)?;
            }
        }

        for line in &self.memberships {
            validate_reference("plan_id", &line.plan_id)?;
            validate_reference("customer_id", &line.customer_id)?;
        }

        if !self.memberships.is_empty() && self.customer_id.is_none() {
            return Err(ValidationError::Required {
                field: "customer_id".to_string(),
            });
        }

        Ok(())
    }

    /// The sale type implied by the submitted lines.
    pub fn derived_sale_type(&self) -> SaleType {
        match (self.products.is_empty(), self.memberships.is_empty()) {
            (false, true) => SaleType::Product,
            (true, false) => SaleType::Membership,
            _ => SaleType::Mixed,
        }
    }
}

// =============================================================================
// Cash Closure
// =============================================================================

/// Request to create or re-submit the day's cash closure for a seller.
///
/// Only physical counts travel with the request; system-recorded totals
/// are always recomputed server-side from the seller's completed sales.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CloseShiftRequest {
    /// When the shift began. Its UTC date is the closure's identity date.
    #[ts(as = "String")]
    pub shift_start: DateTime<Utc>,
    /// Physically counted funds per channel.
    pub counted: ChannelBreakdown,
    pub notes: Option<String>,
}

impl CloseShiftRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        for channel in PaymentChannel::ALL {
            validate_non_negative_cents(channel.code(), self.counted.get(channel).cents())?;
        }
        Ok(())
    }
}

// =============================================================================
// Filters & Pagination
// =============================================================================

/// Pagination window. Pages are 1-based.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Page {
    pub page: u32,
    pub per_page: u32,
}

impl Default for Page {
    fn default() -> Self {
        Page {
            page: 1,
            per_page: 50,
        }
    }
}

impl Page {
    /// Row offset for the current page.
    pub fn offset(&self) -> i64 {
        (self.page.max(1) as i64 - 1) * self.per_page as i64
    }

    /// Total page count for a result set of `total` rows.
    pub fn total_pages(&self, total: i64) -> u32 {
        if self.per_page == 0 {
            return 0;
        }
        ((total + self.per_page as i64 - 1) / self.per_page as i64) as u32
    }
}

/// Filters for listing sales.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleFilter {
    #[ts(as = "Option<String>")]
    pub date_from: Option<DateTime<Utc>>,
    #[ts(as = "Option<String>")]
    pub date_to: Option<DateTime<Utc>>,
    pub status: Option<SaleStatus>,
    pub seller_id: Option<String>,
}

/// Filters for listing cash closures.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ClosureFilter {
    pub seller_id: Option<String>,
    #[ts(as = "Option<String>")]
    pub date_from: Option<NaiveDate>,
    #[ts(as = "Option<String>")]
    pub date_to: Option<NaiveDate>,
    pub status: Option<ClosureStatus>,
}

// =============================================================================
// Unit Tests
// =============================================================================
