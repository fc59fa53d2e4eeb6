//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  The ERP backend sends prices as "10.50" or 10.5.                       │
//! │  Summing those as f64 drifts: 0.1 + 0.2 = 0.30000000000000004          │
//! │                                                                         │
//! │  OUR SOLUTION: Integer cents inside, decimal text at the boundary      │
//! │    "10.50"  ──parse_decimal──►  1050  ──to_decimal_string──►  "10.50"   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use payshia_core::money::Money;
//!
//! let price = Money::parse_decimal("10.99").unwrap();
//! assert_eq!(price.cents(), 1099);
//!
//! let line = price * 3;
//! assert_eq!(line.to_decimal_string(), "32.97");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

use crate::error::ValidationError;
use crate::types::TaxRate;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: totals may legitimately go negative before checkout
///   rejects them, so the type must represent them
/// - **Serde**: serializes as the raw cent count; use [`serde_decimal`] on
///   fields that travel to the ERP backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
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

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Calculates tax, rounding half away from zero on the cent.
    ///
    /// ## Implementation
    /// Integer math on the magnitude: `(|amount| * bps + 5000) / 10000`,
    /// widened to i128, then the sign is put back. A negative base
    /// (discounts above the subtotal) rounds symmetrically.
    ///
    /// ## Example
    /// ```rust
    /// use payshia_core::money::Money;
    /// use payshia_core::types::TaxRate;
    ///
    /// let after_discounts = Money::from_cents(2800); // 28.00
    /// let tax = after_discounts.calculate_tax(TaxRate::from_bps(800));
    /// assert_eq!(tax.cents(), 224); // 2.24
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        let magnitude = (self.0.unsigned_abs() as i128 * rate.bps() as i128 + 5000) / 10000;
        let tax_cents = if self.0 < 0 { -magnitude } else { magnitude };
        Money::from_cents(tax_cents as i64)
    }

    /// Multiplies money by a quantity.
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Parses a decimal amount as the ERP writes it ("10", "10.5", "-3.25").
    ///
    /// Digits past the second decimal place are rounded half-up. Amounts
    /// whose cents do not fit in an `i64` are rejected.
    ///
    /// ## Example
    /// ```rust
    /// use payshia_core::money::Money;
    ///
    /// assert_eq!(Money::parse_decimal("10.5").unwrap().cents(), 1050);
    /// assert_eq!(Money::parse_decimal(" 2.245 ").unwrap().cents(), 225);
    /// assert!(Money::parse_decimal("ten").is_err());
    /// ```
    pub fn parse_decimal(input: &str) -> Result<Money, ValidationError> {
        let invalid = || ValidationError::InvalidFormat {
            field: "amount".to_string(),
            reason: format!("'{}' is not a decimal amount", input.trim()),
        };

        let text = input.trim();
        let (negative, digits) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text.strip_prefix('+').unwrap_or(text)),
        };

        let (whole, frac) = match digits.split_once('.') {
            Some((w, f)) => (w, f),
            None => (digits, ""),
        };

        if whole.is_empty() && frac.is_empty() {
            return Err(invalid());
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let whole_cents = if whole.is_empty() {
            0
        } else {
            whole
                .parse::<i64>()
                .map_err(|_| invalid())?
                .checked_mul(100)
                .ok_or_else(invalid)?
        };

        let mut frac_digits = frac.bytes().map(|b| (b - b'0') as i64);
        let tenths = frac_digits.next().unwrap_or(0);
        let hundredths = frac_digits.next().unwrap_or(0);
        let round_up = frac_digits.next().map(|d| d >= 5).unwrap_or(false);

        let mut cents = whole_cents
            .checked_add(tenths * 10 + hundredths)
            .ok_or_else(invalid)?;
        if round_up {
            cents = cents.checked_add(1).ok_or_else(invalid)?;
        }

        Ok(Money(if negative { -cents } else { cents }))
    }

    /// Converts an `f64` amount from a JSON number.
    ///
    /// Only used at the wire boundary; rounds to the nearest cent. `None`
    /// for NaN, infinities and values outside the `i64` cent range.
    pub fn from_f64_amount(amount: f64) -> Option<Money> {
        let cents = (amount * 100.0).round();
        if !cents.is_finite() || cents.abs() >= i64::MAX as f64 {
            return None;
        }
        Some(Money(cents as i64))
    }

    /// Formats as a plain two-decimal string ("31.24", "-0.50").
    pub fn to_decimal_string(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        format!("{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

/// Displays as a plain decimal; currency symbols belong to the terminal.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_decimal_string())
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

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

/// Multiplication by a line quantity.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Wire Format Helpers
// =============================================================================

/// Serde adapter for amounts exchanged with the ERP backend.
///
/// Serializes as a two-decimal string. Deserializes from a JSON string
/// ("10.50"), a JSON number (10.5) or null (zero).
///
/// ```rust
/// use payshia_core::money::{serde_decimal, Money};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Line {
///     #[serde(with = "serde_decimal")]
///     price: Money,
/// }
///
/// let line: Line = serde_json::from_str(r#"{"price": 12.5}"#).unwrap();
/// assert_eq!(line.price.cents(), 1250);
/// assert_eq!(serde_json::to_string(&line).unwrap(), r#"{"price":"12.50"}"#);
/// ```
pub mod serde_decimal {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::Money;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawAmount {
        Text(String),
        Number(f64),
    }

    pub fn serialize<S: Serializer>(value: &Money, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_decimal_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Money, D::Error> {
        match Option::<RawAmount>::deserialize(deserializer)? {
            None => Ok(Money::zero()),
            Some(RawAmount::Text(text)) if text.trim().is_empty() => Ok(Money::zero()),
            Some(RawAmount::Text(text)) => Money::parse_decimal(&text).map_err(D::Error::custom),
            Some(RawAmount::Number(n)) => Money::from_f64_amount(n)
                .ok_or_else(|| D::Error::custom(format!("amount {} is not finite", n))),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
