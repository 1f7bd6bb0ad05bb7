//! # Error Types
//!
//! Domain error types for vigor-core.
//!
//! ## Error Flow
//! ```text
//! ValidationError → CoreError → DbError (vigor-db) → presentation layer
//! ```
//!
//! ## Design Principles
//! 1. `thiserror` derive macros, never manual impls
//! 2. Context in every message (sale number, product name, amounts)
//! 3. Errors are enum variants, never strings or panics
//! 4. Every variant is recoverable by the caller; the core never retries

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations.
///
/// All of these surface unmodified to the presentation layer. Any of them
/// raised mid-transaction aborts the whole transaction: partial stock
/// decrements or partial membership issuance are never observable.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Requested quantity exceeds the stock available at validation time.
    #[error("Insufficient stock for {name}: available {available}, requested {requested}")]
    InsufficientStock {
        name: String,
        available: i64,
        requested: i64,
    },

    /// Amount paid does not cover the computed total.
    #[error("Insufficient payment: total {total}, paid {paid}")]
    InsufficientPayment { total: Money, paid: Money },

    /// The sale was already reversed, or is not in a reversible state.
    #[error("Sale {sale_number} has already been reversed or is not reversible")]
    AlreadyReversed { sale_number: String },

    /// Reversals are only allowed on the sale's creation calendar day.
    #[error("Sale {sale_number} was created on {created_on}; same-day reversal window has expired")]
    ReversalWindowExpired {
        sale_number: String,
        created_on: chrono::NaiveDate,
    },

    /// Closure shift date falls outside the permitted submission window.
    #[error("Shift date {shift_date} outside permitted window ({earliest} to {latest})")]
    InvalidDateRange {
        shift_date: chrono::NaiveDate,
        earliest: chrono::NaiveDate,
        latest: chrono::NaiveDate,
    },

    /// The closure reached a terminal state and no longer accepts writes.
    #[error("Cash closure is {status}; it can no longer be modified")]
    ClosureNotEditable { status: String },

    /// Malformed request (wraps field-level validation failures).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation failures, raised before any transaction begins.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format or shape.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// A sale needs at least one product or membership line.
    #[error("sale must contain at least one product or membership line")]
    EmptySale,
}

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
