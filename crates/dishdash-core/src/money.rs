//! # Money Module
//!
//! Provides the `Money` type for monetary values and `DiscountRate` for
//! percentage promotions.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  The backend returns prices as JSON numbers (doubles):                  │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  Per-unit pack prices:                                                  │
//! │    1000.00 / 3 = 333.33 (×3 = 999.99)  → Lost 0.01!                    │
//! │                                                                         │
//! │  OUR SOLUTION: Integer minor units                                      │
//! │    100000 / 3 = 33333 remainder 1                                       │
//! │    The remainder is carried explicitly (see `split_evenly`)             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use dishdash_core::money::Money;
//!
//! let price = Money::from_cents(65_000); // 650.00
//! let doubled = price * 2_u32;
//! assert_eq!(doubled.cents(), 130_000);
//!
//! // Backend doubles are converted once, at the edge
//! assert_eq!(Money::from_major_f64(12.5).cents(), 1_250);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use std::iter::Sum;
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit.
///
/// ## Design Decisions
/// - **i64 (signed)**: subtraction can go negative before clamping
/// - **Single field tuple struct**: zero-cost abstraction over i64
///
/// ## Where Money Flows
/// ```text
/// MenuItem.price ──► base unit price ──► CartEntry.unit_price ──► line total
///                                                                   │
/// PromoCode.value ──► calculate_discount ──► OrderTotals.item_discount
///                                                                   │
///                                              OrderTotals.total ◄──┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from the smallest currency unit.
    ///
    /// ```rust
    /// use dishdash_core::money::Money;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Converts a major-unit amount (as returned by the backend) to Money.
    ///
    /// Rounds half away from zero. Non-finite input (NaN, infinity) becomes
    /// zero so a corrupt record cannot poison a total.
    ///
    /// ```rust
    /// use dishdash_core::money::Money;
    ///
    /// assert_eq!(Money::from_major_f64(150.0).cents(), 15_000);
    /// assert_eq!(Money::from_major_f64(0.005).cents(), 1);
    /// assert_eq!(Money::from_major_f64(f64::NAN).cents(), 0);
    /// ```
    pub fn from_major_f64(major: f64) -> Self {
        if !major.is_finite() {
            return Money::zero();
        }
        let cents = (major * 100.0).round();
        if cents >= i64::MAX as f64 || cents <= i64::MIN as f64 {
            return Money::zero();
        }
        Money(cents as i64)
    }

    /// Parses a decimal string such as `"150.00"` or `"-12.5"` exactly.
    ///
    /// Digits past the second decimal place round half away from zero.
    /// Returns `None` for anything that is not a plain decimal number or
    /// does not fit in i64 minor units.
    ///
    /// ```rust
    /// use dishdash_core::money::Money;
    ///
    /// assert_eq!(Money::from_decimal_str("150.00"), Some(Money::from_cents(15_000)));
    /// assert_eq!(Money::from_decimal_str(" 0.125 "), Some(Money::from_cents(13)));
    /// assert_eq!(Money::from_decimal_str("-1.005"), Some(Money::from_cents(-101)));
    /// assert_eq!(Money::from_decimal_str("12,50"), None);
    /// ```
    pub fn from_decimal_str(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let (negative, digits) = match raw.as_bytes().first()? {
            b'-' => (true, &raw[1..]),
            b'+' => (false, &raw[1..]),
            _ => (false, raw),
        };
        let (int_part, frac_part) = match digits.split_once('.') {
            Some((int_part, frac_part)) => (int_part, frac_part),
            None => (digits, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return None;
        }
        if !int_part.bytes().chain(frac_part.bytes()).all(|b| b.is_ascii_digit()) {
            return None;
        }

        let mut cents: i64 = 0;
        for b in int_part.bytes() {
            cents = cents.checked_mul(10)?.checked_add(i64::from(b - b'0'))?;
        }
        cents = cents.checked_mul(100)?;

        let mut frac = frac_part.bytes();
        let tens = frac.next().map_or(0, |b| i64::from(b - b'0'));
        let ones = frac.next().map_or(0, |b| i64::from(b - b'0'));
        cents = cents.checked_add(tens * 10 + ones)?;
        if frac.next().is_some_and(|b| b >= b'5') {
            cents = cents.checked_add(1)?;
        }

        Some(Money(if negative { -cents } else { cents }))
    }

    /// Returns the value in the smallest currency unit.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Clamps the value into `[lo, hi]`.
    ///
    /// If `hi < lo` (e.g. a negative order amount), `lo` wins.
    ///
    /// ```rust
    /// use dishdash_core::money::Money;
    ///
    /// let lo = Money::zero();
    /// let hi = Money::from_cents(500);
    /// assert_eq!(Money::from_cents(900).clamp_between(lo, hi).cents(), 500);
    /// assert_eq!(Money::from_cents(-10).clamp_between(lo, hi).cents(), 0);
    /// ```
    pub fn clamp_between(self, lo: Money, hi: Money) -> Money {
        if hi < lo {
            return lo;
        }
        self.max(lo).min(hi)
    }

    /// Returns `rate` of this amount, rounded half up in integer math.
    ///
    /// ```rust
    /// use dishdash_core::money::{DiscountRate, Money};
    ///
    /// let subtotal = Money::from_cents(100_000);
    /// let off = subtotal.percentage_of(DiscountRate::from_bps(1_250)); // 12.5%
    /// assert_eq!(off.cents(), 12_500);
    /// ```
    pub fn percentage_of(&self, rate: DiscountRate) -> Money {
        // i128 keeps amount * bps from overflowing on large totals
        let scaled = self.0 as i128 * rate.bps() as i128;
        let rounded = if scaled >= 0 {
            (scaled + 5_000) / 10_000
        } else {
            (scaled - 5_000) / 10_000
        };
        Money(rounded as i64)
    }

    /// Splits this amount across `qty` units.
    ///
    /// Returns `(per_unit, remainder)` with
    /// `per_unit * qty + remainder == self`. A zero quantity returns the whole
    /// amount as remainder.
    ///
    /// ## Example
    /// ```rust
    /// use dishdash_core::money::Money;
    ///
    /// let (unit, rest) = Money::from_cents(100_000).split_evenly(3);
    /// assert_eq!(unit.cents(), 33_333);
    /// assert_eq!(rest.cents(), 1);
    /// assert_eq!(unit * 3_u32 + rest, Money::from_cents(100_000));
    /// ```
    pub fn split_evenly(&self, qty: u32) -> (Money, Money) {
        if qty == 0 {
            return (Money::zero(), *self);
        }
        let qty = i64::from(qty);
        (Money(self.0 / qty), Money(self.0 % qty))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================
//
// Arithmetic saturates at the i64 bounds. Backend prices are not capped on
// ingestion, so an absurd row must not panic or wrap a total negative.

/// Displays the amount without a currency symbol. The app formats currency.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().unsigned_abs(), self.minor())
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
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

/// Multiplication by a line quantity.
impl Mul<u32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: u32) -> Self {
        Money(self.0.saturating_mul(i64::from(qty)))
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Discount Rate
// =============================================================================

/// Percentage discount in basis points (1 bps = 0.01%).
///
/// ## Why Basis Points?
/// Restaurants enter rates like 12.5%. 1250 bps keeps that exact in integers.
/// Always within 0..=10000 (0% to 100%).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DiscountRate(u32);

impl DiscountRate {
    /// Full discount (100%).
    pub const MAX_BPS: u32 = 10_000;

    /// Creates a rate from basis points, clamped to 100%.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        if bps > Self::MAX_BPS {
            DiscountRate(Self::MAX_BPS)
        } else {
            DiscountRate(bps)
        }
    }

    /// Creates a rate from a percentage such as `12.5`.
    ///
    /// Negative or non-finite percentages become 0%, values above 100 clamp.
    pub fn from_percentage(pct: f64) -> Self {
        if !pct.is_finite() || pct <= 0.0 {
            return DiscountRate(0);
        }
        if pct >= 100.0 {
            return DiscountRate(Self::MAX_BPS);
        }
        DiscountRate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1099).to_string(), "10.99");
        assert_eq!(Money::from_cents(15_000).to_string(), "150.00");
        assert_eq!(Money::from_cents(-550).to_string(), "-5.50");
        assert_eq!(Money::zero().to_string(), "0.00");
    }

    #[test]
    fn test_arithmetic_and_sum() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);
        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((a * 3_u32).cents(), 3000);

        let total: Money = [a, b, b].iter().sum();
        assert_eq!(total.cents(), 2000);
    }

    #[test]
    fn test_arithmetic_saturates_instead_of_overflowing() {
        let huge = Money::from_cents(5_000_000_000_000_000_000);
        assert_eq!((huge * 2_u32).cents(), i64::MAX);
        assert_eq!((huge * -2_i64).cents(), i64::MIN);
        assert_eq!((huge + huge).cents(), i64::MAX);
        assert_eq!((Money::from_cents(i64::MIN) - huge).cents(), i64::MIN);

        let mut acc = huge;
        acc += huge;
        assert_eq!(acc.cents(), i64::MAX);
        let total: Money = [huge, huge, huge].iter().sum();
        assert_eq!(total.cents(), i64::MAX);

        // Display must not overflow on the most negative value either
        assert_eq!(Money::from_cents(i64::MIN).to_string(), "-92233720368547758.08");
    }

    #[test]
    fn test_from_decimal_str() {
        assert_eq!(Money::from_decimal_str("650"), Some(Money::from_cents(65_000)));
        assert_eq!(Money::from_decimal_str("150.005"), Some(Money::from_cents(15_001)));
        assert_eq!(Money::from_decimal_str("150.0049"), Some(Money::from_cents(15_000)));
        assert_eq!(Money::from_decimal_str("+.5"), Some(Money::from_cents(50)));
        assert_eq!(Money::from_decimal_str("7."), Some(Money::from_cents(700)));
        assert_eq!(Money::from_decimal_str("-0.125"), Some(Money::from_cents(-13)));
        // Exact where f64 is not: 0.1 + 0.2 style inputs stay exact
        assert_eq!(Money::from_decimal_str("0.30"), Some(Money::from_cents(30)));

        for garbage in ["", "   ", "-", ".", "abc", "1.2.3", "1e3", "--1", "12 50", "NaN"] {
            assert_eq!(Money::from_decimal_str(garbage), None, "{garbage:?}");
        }
        // Overflowing i64 minor units is rejected rather than wrapped
        assert_eq!(Money::from_decimal_str("92233720368547758.08"), None);
        assert_eq!(
            Money::from_decimal_str("92233720368547758.07"),
            Some(Money::from_cents(i64::MAX))
        );
    }

    #[test]
    fn test_from_major_f64_rounding() {
        assert_eq!(Money::from_major_f64(650.0).cents(), 65_000);
        assert_eq!(Money::from_major_f64(19.999).cents(), 2_000);
        assert_eq!(Money::from_major_f64(-1.5).cents(), -150);
        assert_eq!(Money::from_major_f64(f64::INFINITY).cents(), 0);
        assert_eq!(Money::from_major_f64(1e300).cents(), 0);
    }

    #[test]
    fn test_percentage_of_rounds_half_up() {
        let amount = Money::from_cents(999);
        // 999 * 10% = 99.9 -> 100
        assert_eq!(amount.percentage_of(DiscountRate::from_bps(1000)).cents(), 100);
        assert_eq!(amount.percentage_of(DiscountRate::from_bps(0)).cents(), 0);
        assert_eq!(amount.percentage_of(DiscountRate::from_bps(10_000)).cents(), 999);
    }

    #[test]
    fn test_split_evenly_reconstructs_total() {
        for total in [0_i64, 1, 99, 100_000, 123_457] {
            for qty in 1..=7_u32 {
                let amount = Money::from_cents(total);
                let (unit, rest) = amount.split_evenly(qty);
                assert_eq!(unit * qty + rest, amount);
                assert!(rest.cents() < i64::from(qty));
            }
        }
        let (unit, rest) = Money::from_cents(700).split_evenly(0);
        assert!(unit.is_zero());
        assert_eq!(rest.cents(), 700);
    }

    #[test]
    fn test_clamp_between() {
        let zero = Money::zero();
        assert_eq!(Money::from_cents(50).clamp_between(zero, Money::from_cents(40)).cents(), 40);
        // Inverted bounds collapse to the lower bound
        assert_eq!(Money::from_cents(50).clamp_between(zero, Money::from_cents(-40)), zero);
    }

    #[test]
    fn test_discount_rate_bounds() {
        assert_eq!(DiscountRate::from_bps(20_000).bps(), 10_000);
        assert_eq!(DiscountRate::from_percentage(12.5).bps(), 1_250);
        assert_eq!(DiscountRate::from_percentage(-3.0).bps(), 0);
        assert_eq!(DiscountRate::from_percentage(f64::NAN).bps(), 0);
        assert_eq!(DiscountRate::from_percentage(150.0).bps(), 10_000);
    }
}
