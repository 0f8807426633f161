//! # Money
//!
//! Prices and cart totals as whole cents.
//!
//! ## Decimal Boundary
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Where Decimals Become Cents                          │
//! │                                                                         │
//! │  catalog JSON        "price": 109.95                                   │
//! │  persisted record    "cartTotal": 19.98                                │
//! │        │                                                                │
//! │        ▼  Deserialize: round(x × 100)                                  │
//! │  ┌──────────────────────────────┐                                      │
//! │  │  Money(10995)   Money(1998)  │  ← every sum and product in i64       │
//! │  └──────────────────────────────┘                                      │
//! │        │                                                                │
//! │        ▼  Serialize: cents / 100                                       │
//! │  JSON number with at most two decimals                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Summing `9.99 + 9.99` as `f64` is not guaranteed to equal `19.98`; summing
//! `999 + 999` cents always is, so the cart total can be compared exactly
//! against Σ price × quantity.
//!
//! ```rust
//! use storefront_core::money::Money;
//!
//! let mug = Money::from_decimal(9.99);
//! assert_eq!(mug.times(2), Money::from_cents(1998));
//! assert_eq!((mug + Money::from_cents(1)).to_string(), "$10.00");
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Mul};
use ts_rs::TS;

/// An amount of money in cents. Serialized as a decimal number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, TS)]
#[ts(export, type = "number")]
pub struct Money(i64);

impl Money {
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Converts a decimal amount to the nearest cent. NaN and infinities
    /// become zero; out-of-range values saturate.
    ///
    /// ```rust
    /// use storefront_core::money::Money;
    ///
    /// assert_eq!(Money::from_decimal(109.95).cents(), 10995);
    /// assert_eq!(Money::from_decimal(22.3).cents(), 2230);
    /// ```
    pub fn from_decimal(amount: f64) -> Self {
        if amount.is_finite() {
            Money((amount * 100.0).round() as i64)
        } else {
            Money(0)
        }
    }

    /// The amount as a decimal, for the wire format.
    pub fn to_decimal(self) -> f64 {
        self.0 as f64 / 100.0
    }

    #[inline]
    pub const fn cents(self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Line total for `quantity` units at this unit price. Saturates at
    /// the i64 bounds instead of wrapping.
    #[inline]
    pub const fn times(self, quantity: i64) -> Self {
        Money(self.0.saturating_mul(quantity))
    }
}

/// `$12.34`, `-$0.50`
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let abs = self.0.unsigned_abs();
        if self.0 < 0 {
            f.write_str("-")?;
        }
        write!(f, "${}.{:02}", abs / 100, abs % 100)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_decimal())
    }
}

/// Any JSON number is accepted: `10`, `9.99`, `-1.5`. Strings are not.
impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        f64::deserialize(deserializer).map(Money::from_decimal)
    }
}

impl Add for Money {
    type Output = Money;

    #[inline]
    fn add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl Mul<i64> for Money {
    type Output = Money;

    #[inline]
    fn mul(self, quantity: i64) -> Money {
        self.times(quantity)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
