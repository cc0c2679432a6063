//! # Money Module
//!
//! Fixed-point monetary values in integer minor units.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In binary floating point:                                              │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Minor Units                                      │
//! │    Every total is an i64 count of cents (or the local equivalent).      │
//! │    Decimal strings exist only at display/input boundaries.              │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Fractional quantities use [`Quantity`], an integer count of thousandths,
//! so a line total is computed with a single round-half-to-even division
//! rather than cumulative float rounding.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

use crate::error::CoreError;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit.
///
/// ## Design Decisions
/// - **i64 (signed)**: intermediate results (total − paid) may dip negative
///   before clamping; refund-shaped values stay representable
/// - **Single-field tuple struct**: zero-cost abstraction over i64
/// - **No float constructors**: `from_decimal_str` is the only entry point
///   for human input, and it parses digits, never floats
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units.
    #[inline]
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn minor(&self) -> i64 {
        self.0
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
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    ///
    /// Used by the cart to coerce order-level discount/shipping/tax inputs,
    /// which are defined as absolute amounts.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Clamps a possibly-negative amount to zero.
    ///
    /// The cart total and the outstanding (pending) balance are both defined
    /// as `max(0, x)`; this is that clamp.
    #[inline]
    pub const fn clamp_non_negative(&self) -> Self {
        if self.0 < 0 {
            Money(0)
        } else {
            *self
        }
    }

    /// Subtraction that stops at zero instead of going negative.
    #[inline]
    pub const fn saturating_sub(&self, other: Self) -> Self {
        let diff = self.0 - other.0;
        if diff < 0 {
            Money(0)
        } else {
            Money(diff)
        }
    }

    /// Boundary check: fails with [`CoreError::InvalidAmount`] when the value
    /// is negative in a position that requires a non-negative amount.
    pub fn require_non_negative(&self, what: &str) -> Result<Self, CoreError> {
        if self.0 < 0 {
            Err(CoreError::InvalidAmount {
                what: what.to_string(),
                value: self.to_decimal_string(),
            })
        } else {
            Ok(*self)
        }
    }

    /// Parses a decimal string ("12.34", "-5", "0.5") into minor units.
    ///
    /// ## Accepted Forms
    /// - optional leading `-`
    /// - integer part (at least one digit)
    /// - optional `.` followed by one or two fraction digits
    ///
    /// Anything else — empty input, three fraction digits, exponents,
    /// stray characters — is [`CoreError::InvalidAmount`]. Input with more
    /// precision than a minor unit is rejected rather than silently rounded,
    /// so `to_decimal_string` is an exact inverse.
    pub fn from_decimal_str(input: &str) -> Result<Self, CoreError> {
        let invalid = || CoreError::InvalidAmount {
            what: "decimal amount".to_string(),
            value: input.to_string(),
        };

        let trimmed = input.trim();
        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };

        let (whole, frac) = match digits.split_once('.') {
            Some((w, f)) => (w, f),
            None => (digits, ""),
        };

        if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        if frac.len() > 2 || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let whole: i64 = whole.parse().map_err(|_| invalid())?;
        let frac_minor: i64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().map_err(|_| invalid())? * 10,
            _ => frac.parse().map_err(|_| invalid())?,
        };

        let minor = whole
            .checked_mul(100)
            .and_then(|w| w.checked_add(frac_minor))
            .ok_or_else(invalid)?;

        Ok(Money(if negative { -minor } else { minor }))
    }

    /// Formats the value as a plain decimal string ("12.34", "-5.00").
    ///
    /// This is the display/input boundary representation; totals are never
    /// compared or persisted in this form.
    pub fn to_decimal_string(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!("{}{}.{:02}", sign, (self.0 / 100).abs(), (self.0 % 100).abs())
    }

    /// Multiplies a unit price by a fractional [`Quantity`].
    ///
    /// ## Rounding
    /// The product is computed in i128 thousandths and divided back down
    /// with round-half-to-even, exactly once. Line totals are the only
    /// place fractional quantities meet money, so no rounding error can
    /// accumulate across operations.
    pub fn mul_quantity(&self, qty: Quantity) -> Money {
        let numerator = self.0 as i128 * qty.milli() as i128;
        Money(div_round_half_even(numerator, Quantity::SCALE as i128))
    }
}

/// Integer division rounding half to even (banker's rounding).
///
/// Standard half-up rounding biases totals upward over many transactions;
/// half-to-even alternates, which is what financial reconciliation expects.
fn div_round_half_even(numerator: i128, denominator: i128) -> i64 {
    debug_assert!(denominator > 0);

    let quotient = numerator.div_euclid(denominator);
    let remainder = numerator.rem_euclid(denominator);

    let doubled = remainder * 2;
    let rounded = if doubled > denominator || (doubled == denominator && quotient % 2 != 0) {
        quotient + 1
    } else {
        quotient
    };

    rounded as i64
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows the decimal form; use `to_decimal_string` when the string
/// itself is needed.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_decimal_string())
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

/// Multiplication by a whole count (for whole-unit quantities).
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, count: i64) -> Self {
        Money(self.0 * count)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Quantity Type
// =============================================================================

/// A fractional quantity in integer thousandths of a unit.
///
/// ## Why Thousandths?
/// Quantities like 1.5 kg must not introduce floats into totals math.
/// The same integer-scaling idiom used for rates (basis points) applies:
/// 1500 milli-units = 1.5 units, and the only division happens inside
/// [`Money::mul_quantity`] with explicit rounding.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Quantity(i64);

impl Quantity {
    /// Milli-units per whole unit.
    pub const SCALE: i64 = 1000;

    /// One whole unit.
    pub const ONE: Quantity = Quantity(Self::SCALE);

    /// Creates a quantity from whole units.
    #[inline]
    pub const fn from_units(units: i64) -> Self {
        Quantity(units * Self::SCALE)
    }

    /// Creates a quantity from thousandths of a unit.
    #[inline]
    pub const fn from_milli(milli: i64) -> Self {
        Quantity(milli)
    }

    /// Returns the raw thousandths count.
    #[inline]
    pub const fn milli(&self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Quantity(0)
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }
}

impl Add for Quantity {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Quantity(self.0 + other.0)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 % Self::SCALE == 0 {
            write!(f, "{}", self.0 / Self::SCALE)
        } else {
            write!(f, "{}.{:03}", self.0 / Self::SCALE, (self.0 % Self::SCALE).abs())
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
