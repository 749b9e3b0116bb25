//! Exact monetary arithmetic
//!
//! Amounts travel as `rust_decimal::Decimal` at the API boundary and are
//! persisted as integer minor units (cents), so sums never round. Binary
//! floating point is never used on a money path.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Number of fractional digits carried by a value, ignoring trailing zeros.
///
/// `25.500` normalizes to `25.5` and reports 1, so textual padding does not
/// count as extra precision.
pub fn fractional_digits(value: Decimal) -> u32 {
    value.normalize().scale()
}

/// Whether the integral part of `value` fits in `max_digits` digits.
pub fn fits_integral_digits(value: Decimal, max_digits: u32) -> bool {
    value.abs() < Decimal::from(10i64.pow(max_digits))
}

/// Convert a validated amount (at most 2 fractional digits) to cents.
///
/// Callers must validate scale first; values with more precision would be
/// silently truncated here, which the validators never allow.
pub fn to_cents(amount: Decimal) -> i64 {
    (amount * Decimal::ONE_HUNDRED)
        .normalize()
        .to_i64()
        .unwrap_or(i64::MAX)
}

/// Convert stored cents back to a two-decimal amount.
pub fn from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

/// Round half-up (midpoint away from zero) to two fractional digits.
///
/// Applied only when producing derived values such as `averageExpense`;
/// stored amounts are exact and never re-rounded.
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
