//! # Money Module
//!
//! Monetary values as integer cents. Every peso amount in the system flows
//! through this type; floating point never touches money.
//!
//! ```rust
//! use vigor_core::money::Money;
//!
//! let price = Money::from_major(50_000);      // $50,000.00
//! let line = price.multiply_quantity(2);      // $100,000.00
//! assert_eq!(line.cents(), 10_000_000);
//! ```
//!
//! Why integers: `0.1 + 0.2 != 0.3` in floats, and a shift reconciliation
//! that compares recorded revenue against counted cash cannot tolerate
//! accumulated float drift. The smallest unit (cent) is exact; precision
//! loss on division is explicit and auditable.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

/// A monetary value in cents (the smallest currency unit).
///
/// - **i64 (signed)**: refunds and reconciliation differences are negative.
/// - **Single-field tuple struct**: zero-cost wrapper over i64.
/// - Database columns store the raw cents; entities carry `*_cents: i64`
///   fields and convert through this type for arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from whole currency units.
    ///
    /// ```rust
    /// use vigor_core::money::Money;
    ///
    /// assert_eq!(Money::from_major(89_900).cents(), 8_990_000);
    /// ```
    #[inline]
    pub const fn from_major(major: i64) -> Self {
        Money(major * 100)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole-unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the fractional cents portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Multiplies by a quantity.
    ///
    /// ```rust
    /// use vigor_core::money::Money;
    ///
    /// let unit = Money::from_major(50_000);
    /// assert_eq!(unit.multiply_quantity(2), Money::from_major(100_000));
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Applies a percentage discount expressed in basis points
    /// (1000 bps = 10%) and returns the discounted amount.
    ///
    /// The discount amount itself is rounded half-up in integer math before
    /// subtraction, so `$89,900 - 10%` is exactly `$80,910`.
    ///
    /// ```rust
    /// use vigor_core::money::Money;
    ///
    /// let line = Money::from_major(89_900);
    /// assert_eq!(line.apply_percentage_discount(1000), Money::from_major(80_910));
    /// ```
    pub fn apply_percentage_discount(&self, discount_bps: u32) -> Money {
        // i128 intermediate to avoid overflow on large lines
        let discount_amount = (self.0 as i128 * discount_bps as i128 + 5000) / 10000;
        Money::from_cents(self.0 - discount_amount as i64)
    }
}

/// Debug/log formatting. The frontend does its own localized formatting.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, self.major().abs(), self.cents_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}
