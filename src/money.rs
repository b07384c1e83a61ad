//! Monetary Decimal Module
//!
//! Every balance, amount, fee and fee rate in the ledger is a [`Decimal`].
//! It wraps `rust_decimal` so balance math never touches floating point, and
//! it owns the single canonical text form used by both Postgres and the API.
//!
//! ## Text Form
//! - Accepted: `123`, `-4`, `0.15`, `89.850`
//! - Rejected: empty, whitespace, `.5`, `5.`, `+1`, `1e8`, `1_000`
//! - `parse(d.to_string()) == d` for every value, including results of
//!   `+`, `*` and `/`.
//!
//! ```rust
//! use walletdb::money::Decimal;
//!
//! let amount = Decimal::parse("10.00")?;
//! let fee = amount / Decimal::from(100) * Decimal::parse("1.5")?;
//! assert_eq!(fee, Decimal::parse("0.15")?);
//! # Ok::<(), walletdb::money::MoneyError>(())
//! ```

use std::fmt;
use std::ops::{Add, Div, Mul, Sub};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    #[error("Invalid decimal format: {0:?}")]
    InvalidFormat(String),
}

// ============================================================================
// Decimal
// ============================================================================

/// Signed decimal value with exact base-10 arithmetic.
///
/// Equality and ordering are numeric: `10.0 == 10.00`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, sqlx::Type)]
#[sqlx(transparent)]
pub struct Decimal(rust_decimal::Decimal);

impl Decimal {
    pub const ZERO: Decimal = Decimal(rust_decimal::Decimal::ZERO);
    pub const ONE_HUNDRED: Decimal = Decimal(rust_decimal::Decimal::ONE_HUNDRED);

    /// Parse the canonical text form.
    pub fn parse(s: &str) -> Result<Self, MoneyError> {
        if !is_plain_literal(s) {
            return Err(MoneyError::InvalidFormat(s.to_string()));
        }

        // from_str_exact refuses to round away digits it cannot hold
        rust_decimal::Decimal::from_str_exact(s)
            .map(Decimal)
            .map_err(|_| MoneyError::InvalidFormat(s.to_string()))
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        self.0 > rust_decimal::Decimal::ZERO
    }

    pub fn checked_add(self, other: Decimal) -> Option<Decimal> {
        self.0.checked_add(other.0).map(Decimal)
    }

    pub fn checked_sub(self, other: Decimal) -> Option<Decimal> {
        self.0.checked_sub(other.0).map(Decimal)
    }

    pub fn checked_mul(self, other: Decimal) -> Option<Decimal> {
        self.0.checked_mul(other.0).map(Decimal)
    }

    /// `None` on overflow or a zero divisor.
    pub fn checked_div(self, other: Decimal) -> Option<Decimal> {
        self.0.checked_div(other.0).map(Decimal)
    }

    /// Same value with trailing fractional zeros removed (`89.850` -> `89.85`).
    pub fn normalize(self) -> Decimal {
        Decimal(self.0.normalize())
    }

    pub fn inner(self) -> rust_decimal::Decimal {
        self.0
    }
}

/// `-?digits(.digits)?`
fn is_plain_literal(s: &str) -> bool {
    let unsigned = s.strip_prefix('-').unwrap_or(s);
    let (whole, frac) = match unsigned.split_once('.') {
        Some((whole, frac)) => (whole, Some(frac)),
        None => (unsigned, None),
    };

    let all_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());

    all_digits(whole) && frac.is_none_or(all_digits)
}

impl From<rust_decimal::Decimal> for Decimal {
    fn from(value: rust_decimal::Decimal) -> Self {
        Decimal(value)
    }
}

impl From<i64> for Decimal {
    fn from(value: i64) -> Self {
        Decimal(rust_decimal::Decimal::from(value))
    }
}

impl FromStr for Decimal {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::parse(s)
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

// Operators panic on overflow, like rust_decimal. The transfer path uses the
// checked_* forms.
impl Add for Decimal {
    type Output = Decimal;

    fn add(self, rhs: Decimal) -> Decimal {
        Decimal(self.0 + rhs.0)
    }
}

impl Sub for Decimal {
    type Output = Decimal;

    fn sub(self, rhs: Decimal) -> Decimal {
        Decimal(self.0 - rhs.0)
    }
}

impl Mul for Decimal {
    type Output = Decimal;

    fn mul(self, rhs: Decimal) -> Decimal {
        Decimal(self.0 * rhs.0)
    }
}

impl Div for Decimal {
    type Output = Decimal;

    fn div(self, rhs: Decimal) -> Decimal {
        Decimal(self.0 / rhs.0)
    }
}

impl Serialize for Decimal {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        // String keeps every digit through JSON
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Decimal {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Decimal::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::parse(s).unwrap()
    }

    #[test]
    fn test_parse_accepts_plain_literals() {
        assert_eq!(dec("100").to_string(), "100");
        assert_eq!(dec("0.15").to_string(), "0.15");
        assert_eq!(dec("-4.50").to_string(), "-4.50");
        assert_eq!(dec("007.1"), dec("7.1"));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in [
            "", " 1", "1 ", ".5", "5.", "+1", "1e8", "1E8", "1_000", "1.2.3", "-", "abc", "0x10",
            "--1", "1,5",
        ] {
            assert_eq!(
                Decimal::parse(bad),
                Err(MoneyError::InvalidFormat(bad.to_string())),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_rejects_unrepresentable_precision() {
        let too_long = format!("0.{}", "1".repeat(40));
        assert!(Decimal::parse(&too_long).is_err());
    }

    #[test]
    fn test_equality_is_numeric() {
        assert_eq!(dec("10.0"), dec("10.00"));
        assert_eq!(dec("0"), Decimal::ZERO);
        assert!(dec("89.85") < dec("89.851"));
        assert!(!(dec("1.0") < dec("1")));
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(dec("0.1") + dec("0.2"), dec("0.3"));
        assert_eq!(dec("100.00") - dec("10.15"), dec("89.85"));
        assert_eq!(dec("10.00") * dec("1.5"), dec("15"));
        assert_eq!(dec("10.00") / Decimal::ONE_HUNDRED, dec("0.1"));
        assert_eq!(dec("1") / dec("3") * dec("3"), dec("0.9999999999999999999999999999"));
    }

    #[test]
    fn test_checked_ops() {
        let max = Decimal::from(rust_decimal::Decimal::MAX);
        assert!(max.checked_add(dec("1")).is_none());
        assert!(max.checked_mul(dec("2")).is_none());
        assert!(dec("1").checked_div(Decimal::ZERO).is_none());
        assert_eq!(dec("5").checked_sub(dec("7")), Some(dec("-2")));
    }

    #[test]
    fn test_round_trip_of_computed_values() {
        let amount = dec("10.00");
        let rate = dec("1.5");
        let fee = amount / Decimal::ONE_HUNDRED * rate;
        let total = amount + fee;
        let third = dec("1") / dec("3");

        for value in [fee, total, third, dec("-0.000001"), Decimal::ZERO] {
            assert_eq!(dec(&value.to_string()), value);
        }
    }

    #[test]
    fn test_sign_helpers() {
        assert!(dec("0.01").is_positive());
        assert!(!Decimal::ZERO.is_positive());
        assert!(!dec("-1").is_positive());
        assert!(dec("0.000").is_zero());
        assert_eq!(dec("89.850").normalize().to_string(), "89.85");
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&dec("89.85")).unwrap();
        assert_eq!(json, r#""89.85""#);

        let back: Decimal = serde_json::from_str(r#""0.15""#).unwrap();
        assert_eq!(back, dec("0.15"));

        assert!(serde_json::from_str::<Decimal>("1.5").is_err());
        assert!(serde_json::from_str::<Decimal>(r#""1e2""#).is_err());
    }
}
