//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Integer Cents Below the Boundary
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  HTTP body            Money (this module)            SQLite             │
//! │                                                                         │
//! │  "9.99"  ──from_decimal──►  Money(999)  ──cents()──►  *_cents INTEGER   │
//! │  "29.97" ◄──to_decimal───  Money(2997)  ◄─from_cents─  *_cents INTEGER  │
//! │                                                                         │
//! │  Amounts with more than two decimals never get past from_decimal.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tally_core::money::Money;
//!
//! let price = Money::from_cents(999); // 9.99
//! let line = price.multiply_quantity(3);
//! assert_eq!(line.cents(), 2997);
//! assert_eq!(line.to_string(), "29.97");
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub};
use ts_rs::TS;

use crate::types::TaxRate;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in cents.
///
/// Signed so that differences (profit, change) can be expressed before
/// they are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Converts a two-decimal amount into cents.
    ///
    /// Returns `None` when the amount carries more than two significant
    /// decimals or does not fit in an `i64` of cents.
    ///
    /// ## Example
    /// ```rust
    /// use rust_decimal::Decimal;
    /// use tally_core::money::Money;
    ///
    /// let paid = Money::from_decimal(Decimal::new(3000, 2)).unwrap(); // 30.00
    /// assert_eq!(paid.cents(), 3000);
    ///
    /// // 1.005 has three decimals
    /// assert!(Money::from_decimal(Decimal::new(1005, 3)).is_none());
    /// ```
    pub fn from_decimal(amount: Decimal) -> Option<Self> {
        let mut normalized = amount.normalize();
        if normalized.scale() > 2 {
            return None;
        }
        normalized.rescale(2);
        i64::try_from(normalized.mantissa()).ok().map(Money)
    }

    /// Returns the value as a two-decimal `Decimal` (`Money(2997)` → `29.97`).
    #[inline]
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
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

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Calculates tax on this amount, rounding half up to the cent.
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::money::Money;
    /// use tally_core::types::TaxRate;
    ///
    /// let subtotal = Money::from_cents(1000);
    /// assert_eq!(subtotal.calculate_tax(TaxRate::from_bps(825)).cents(), 83);
    /// assert!(subtotal.calculate_tax(TaxRate::zero()).is_zero());
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        // i128 so large subtotals cannot overflow the intermediate product
        let tax_cents = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_cents(i64::try_from(tax_cents).unwrap_or(i64::MAX))
    }

    /// Multiplies a unit price by a quantity.
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Like [`Money::multiply_quantity`], but `None` on overflow.
    #[inline]
    pub const fn checked_multiply_quantity(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// `self + other`, or `None` on overflow.
    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Returns `self - other`, floored at zero.
    ///
    /// Used for change due: a customer is never owed negative change.
    #[inline]
    pub fn saturating_sub_floor_zero(&self, other: Money) -> Money {
        Money((self.0 - other.0).max(0))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Plain two-decimal rendering ("29.97", "-5.50"); currency symbols are a
/// client concern.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
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

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
