//! # Shift Reconciliation
//!
//! Pure comparison of system-recorded revenue against physically counted
//! funds, per payment channel. No I/O: the closure engine feeds it a
//! recorded breakdown (recomputed from completed sales) and the staff's
//! counted breakdown, and persists what comes back.
//!
//! A channel is discrepant when `|counted − recorded|` exceeds the
//! tolerance of one cent. Each discrepant channel earns one line in a
//! human-readable narrative stored alongside the closure:
//!
//! ```text
//! CASH: system $169000 vs physical $168000 (diff: $-1000)
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{ChannelBreakdown, PaymentChannel};
use crate::DISCREPANCY_TOLERANCE;

/// The result of comparing recorded vs. counted amounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Reconciliation {
    /// Per channel: `counted − recorded`.
    pub differences: ChannelBreakdown,
    /// Sum of counted amounts across channels.
    pub total_counted: Money,
    /// Sum of differences across channels.
    pub total_differences: Money,
    /// True when any single channel is off by more than the tolerance.
    pub has_discrepancies: bool,
    /// One narrative line per discrepant channel, joined with `"; "`.
    /// `None` when every channel is within tolerance.
    pub discrepancy_notes: Option<String>,
}

/// Compares recorded and counted amounts channel by channel.
pub fn reconcile(recorded: &ChannelBreakdown, counted: &ChannelBreakdown) -> Reconciliation {
    let mut differences = ChannelBreakdown::default();
    let mut notes: Vec<String> = Vec::new();

    for channel in PaymentChannel::ALL {
        let recorded_amount = recorded.get(channel);
        let counted_amount = counted.get(channel);
        let difference = counted_amount - recorded_amount;
        differences.set(channel, difference);

        if difference.abs() > DISCREPANCY_TOLERANCE {
            notes.push(format!(
                "{}: system ${} vs physical ${} (diff: ${})",
                channel.code().to_uppercase(),
                fmt_amount(recorded_amount),
                fmt_amount(counted_amount),
                fmt_signed(difference),
            ));
        }
    }

    Reconciliation {
        differences,
        total_counted: counted.total(),
        total_differences: differences.total(),
        has_discrepancies: !notes.is_empty(),
        discrepancy_notes: if notes.is_empty() {
            None
        } else {
            Some(notes.join("; "))
        },
    }
}

/// Narrative amount: whole amounts print without decimals, fractional
/// amounts with two.
fn fmt_amount(amount: Money) -> String {
    let sign = if amount.is_negative() { "-" } else { "" };
    if amount.cents_part() == 0 {
        format!("{}{}", sign, amount.major().abs())
    } else {
        format!("{}{}.{:02}", sign, amount.major().abs(), amount.cents_part())
    }
}

/// Narrative difference: always carries an explicit sign.
fn fmt_signed(amount: Money) -> String {
    let sign = if amount.is_negative() { "-" } else { "+" };
    if amount.cents_part() == 0 {
        format!("{}{}", sign, amount.major().abs())
    } else {
        format!("{}{}.{:02}", sign, amount.major().abs(), amount.cents_part())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cash_only(recorded_major: i64, counted_major: i64) -> (ChannelBreakdown, ChannelBreakdown) {
        let mut recorded = ChannelBreakdown::default();
        recorded.set(PaymentChannel::Cash, Money::from_major(recorded_major));
        let mut counted = ChannelBreakdown::default();
        counted.set(PaymentChannel::Cash, Money::from_major(counted_major));
        (recorded, counted)
    }

    #[test]
    fn test_difference_is_counted_minus_recorded() {
        let (recorded, counted) = cash_only(169_000, 168_000);
        let result = reconcile(&recorded, &counted);

        assert_eq!(result.differences.cash, Money::from_major(-1_000));
        assert_eq!(result.total_counted, Money::from_major(168_000));
        assert_eq!(result.total_differences, Money::from_major(-1_000));
        assert!(result.has_discrepancies);
    }

    #[test]
    fn test_narrative_format() {
        let (recorded, counted) = cash_only(169_000, 168_000);
        let result = reconcile(&recorded, &counted);

        let notes = result.discrepancy_notes.unwrap();
        assert!(notes.contains("CASH: system $169000 vs physical $168000 (diff: $-1000)"));
    }

    #[test]
    fn test_surplus_gets_positive_sign() {
        let (recorded, counted) = cash_only(100_000, 100_500);
        let result = reconcile(&recorded, &counted);

        assert_eq!(
            result.discrepancy_notes.as_deref(),
            Some("CASH: system $100000 vs physical $100500 (diff: $+500)")
        );
    }

    #[test]
    fn test_exact_match_has_no_discrepancies() {
        let (recorded, counted) = cash_only(169_000, 169_000);
        let result = reconcile(&recorded, &counted);

        assert!(!result.has_discrepancies);
        assert!(result.discrepancy_notes.is_none());
        assert_eq!(result.total_differences, Money::zero());
    }

    #[test]
    fn test_one_cent_is_within_tolerance() {
        let mut recorded = ChannelBreakdown::default();
        recorded.set(PaymentChannel::Card, Money::from_cents(10_001));
        let mut counted = ChannelBreakdown::default();
        counted.set(PaymentChannel::Card, Money::from_cents(10_000));

        let result = reconcile(&recorded, &counted);
        assert_eq!(result.differences.card, Money::from_cents(-1));
        assert!(!result.has_discrepancies);

        // two cents is out
        counted.set(PaymentChannel::Card, Money::from_cents(9_999));
        let result = reconcile(&recorded, &counted);
        assert!(result.has_discrepancies);
    }

    #[test]
    fn test_multiple_channels_joined_in_order() {
        let mut recorded = ChannelBreakdown::default();
        recorded.set(PaymentChannel::Cash, Money::from_major(50_000));
        recorded.set(PaymentChannel::Nequi, Money::from_major(30_000));
        let mut counted = ChannelBreakdown::default();
        counted.set(PaymentChannel::Cash, Money::from_major(49_000));
        counted.set(PaymentChannel::Nequi, Money::from_major(31_000));

        let result = reconcile(&recorded, &counted);
        let notes = result.discrepancy_notes.unwrap();
        assert_eq!(
            notes,
            "CASH: system $50000 vs physical $49000 (diff: $-1000); \
             NEQUI: system $30000 vs physical $31000 (diff: $+1000)"
        );
        // offsetting differences still flag per-channel
        assert_eq!(result.total_differences, Money::zero());
        assert!(result.has_discrepancies);
    }

    #[test]
    fn test_fractional_amounts_print_two_decimals() {
        let mut recorded = ChannelBreakdown::default();
        recorded.set(PaymentChannel::Cash, Money::from_cents(12_345));
        let counted = ChannelBreakdown::default();

        let result = reconcile(&recorded, &counted);
        assert_eq!(
            result.discrepancy_notes.as_deref(),
            Some("CASH: system $123.45 vs physical $0 (diff: $-123.45)")
        );
    }
}
