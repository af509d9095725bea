//! Arbitrary-Precision Decimal Amounts
//!
//! Liabilities are hashed through their string form, so formatting must be
//! exact and stable between the exchange that built the tree and the user
//! who verifies it.
//!
//! ## Representation
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  value = coefficient × 10^exponent                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  coefficient: BigInt, no trailing decimal zeros             │
//! │  exponent:    i64                                           │
//! │  zero:        (0, 0)                                        │
//! │                                                             │
//! │  "1.20"    -> (12, -1)                                      │
//! │  "-4500"   -> (-45, 2)                                      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Normalization makes derived equality numeric equality, and makes the
//! canonical string strip trailing zeros.
//!
//! Precision and exponent bounds are never global: they travel in an
//! explicit [`DecimalContext`] value.

use std::fmt;
use std::str::FromStr;

use num_bigint::{BigInt, Sign};
use serde::de::{self, Unexpected};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use thiserror::Error;

/// Default number of significant digits an amount may carry.
pub const DEFAULT_PRECISION: u64 = 1000;

/// Default lower exponent bound for positional notation.
pub const DEFAULT_MIN_EXPONENT: i64 = -1000;

/// Default upper exponent bound for positional notation.
pub const DEFAULT_MAX_EXPONENT: i64 = 1000;

/// Errors from parsing or arithmetic on amounts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecimalError {
    /// Input is not a decimal literal.
    #[error("invalid decimal literal: {0:?}")]
    InvalidFormat(String),
    /// Exponent part does not fit in 64 bits.
    #[error("decimal exponent out of range: {0:?}")]
    ExponentOverflow(String),
    /// Result would need more significant digits than the context allows.
    #[error("decimal needs {digits} significant digits, precision is {precision}")]
    PrecisionExceeded {
        /// Digits the value would need.
        digits: u64,
        /// Configured precision.
        precision: u64,
    },
}

/// Exact signed base-10 number.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Decimal {
    coefficient: BigInt,
    exponent: i64,
}

impl Default for Decimal {
    fn default() -> Self {
        Self::zero()
    }
}

impl Decimal {
    /// The value 0.
    pub fn zero() -> Self {
        Self {
            coefficient: BigInt::from(0u8),
            exponent: 0,
        }
    }

    /// Build `coefficient × 10^exponent`, normalizing trailing zeros.
    ///
    /// Fails when folding the trailing zeros into the exponent would
    /// overflow it.
    pub fn new(coefficient: BigInt, exponent: i64) -> Result<Self, DecimalError> {
        if coefficient.sign() == Sign::NoSign {
            return Ok(Self::zero());
        }

        let digits = coefficient.magnitude().to_str_radix(10);
        let trailing = digits.bytes().rev().take_while(|b| *b == b'0').count();
        if trailing == 0 {
            return Ok(Self { coefficient, exponent });
        }

        let exponent = exponent
            .checked_add(trailing as i64)
            .ok_or_else(|| DecimalError::ExponentOverflow(format!("{}e{}", digits, exponent)))?;
        Ok(Self {
            coefficient: coefficient / pow10(trailing as u64),
            exponent,
        })
    }

    fn from_int(mut value: i128) -> Self {
        let mut exponent = 0;
        while value != 0 && value % 10 == 0 {
            value /= 10;
            exponent += 1;
        }
        Self {
            coefficient: BigInt::from(value),
            exponent,
        }
    }

    /// Power of ten applied to the coefficient.
    pub fn exponent(&self) -> i64 {
        self.exponent
    }

    /// Is this exactly zero?
    pub fn is_zero(&self) -> bool {
        self.coefficient.sign() == Sign::NoSign
    }

    /// Is this strictly greater than zero?
    pub fn is_positive(&self) -> bool {
        self.coefficient.sign() == Sign::Plus
    }

    /// Is this strictly less than zero?
    pub fn is_negative(&self) -> bool {
        self.coefficient.sign() == Sign::Minus
    }

    /// Number of significant digits (1 for zero).
    pub fn significant_digits(&self) -> u64 {
        self.coefficient.magnitude().to_str_radix(10).len() as u64
    }

    /// Exponent of the most significant digit, i.e. `e` in `d.ddd × 10^e`.
    pub fn adjusted_exponent(&self) -> i64 {
        self.exponent
            .saturating_add(self.significant_digits() as i64 - 1)
    }

    /// Exact sum with no precision bound.
    fn exact_add(&self, other: &Self) -> Result<Self, DecimalError> {
        if self.is_zero() {
            return Ok(other.clone());
        }
        if other.is_zero() {
            return Ok(self.clone());
        }

        let exponent = self.exponent.min(other.exponent);
        let lhs = &self.coefficient * pow10(self.exponent.abs_diff(exponent));
        let rhs = &other.coefficient * pow10(other.exponent.abs_diff(exponent));
        Self::new(lhs + rhs, exponent)
    }

    /// Positional notation.
    fn write_plain(&self, out: &mut String) {
        if self.is_negative() {
            out.push('-');
        }

        let digits = self.coefficient.magnitude().to_str_radix(10);
        if self.exponent >= 0 {
            out.push_str(&digits);
            if !self.is_zero() {
                out.extend(std::iter::repeat('0').take(self.exponent as usize));
            }
            return;
        }

        let scale = self.exponent.unsigned_abs() as usize;
        if digits.len() > scale {
            let (int, frac) = digits.split_at(digits.len() - scale);
            out.push_str(int);
            out.push('.');
            out.push_str(frac);
        } else {
            out.push_str("0.");
            out.extend(std::iter::repeat('0').take(scale - digits.len()));
            out.push_str(&digits);
        }
    }

    /// Exponential notation: `d[.ddd]e±N`.
    fn write_exponential(&self, out: &mut String) {
        if self.is_negative() {
            out.push('-');
        }

        let digits = self.coefficient.magnitude().to_str_radix(10);
        let (first, rest) = digits.split_at(1);
        out.push_str(first);
        if !rest.is_empty() {
            out.push('.');
            out.push_str(rest);
        }

        let e = self.adjusted_exponent();
        if e < 0 {
            out.push_str(&format!("e{}", e));
        } else {
            out.push_str(&format!("e+{}", e));
        }
    }
}

fn pow10(n: u64) -> BigInt {
    // Callers bound `n` by the context precision before aligning operands.
    BigInt::from(10u8).pow(u32::try_from(n).unwrap_or(u32::MAX))
}

impl From<i64> for Decimal {
    fn from(value: i64) -> Self {
        Self::from_int(i128::from(value))
    }
}

impl From<u64> for Decimal {
    fn from(value: u64) -> Self {
        Self::from_int(i128::from(value))
    }
}

impl FromStr for Decimal {
    type Err = DecimalError;

    /// Exact parse of `[+-]digits[.digits][(e|E)[+-]digits]`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DecimalError::InvalidFormat(s.to_owned());

        let (negative, body) = match s.as_bytes().first() {
            Some(b'-') => (true, &s[1..]),
            Some(b'+') => (false, &s[1..]),
            _ => (false, s),
        };

        let (mantissa, exp_part) = match body.find(['e', 'E']) {
            Some(pos) => (&body[..pos], Some(&body[pos + 1..])),
            None => (body, None),
        };

        let (int_part, frac_part) = match mantissa.find('.') {
            Some(pos) => (&mantissa[..pos], &mantissa[pos + 1..]),
            None => (mantissa, ""),
        };

        let all_digits = |p: &str| p.bytes().all(|b| b.is_ascii_digit());
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }
        if !all_digits(int_part) || !all_digits(frac_part) {
            return Err(invalid());
        }

        let mut exponent: i64 = match exp_part {
            None => 0,
            Some(e) => {
                let digits = e.strip_prefix(['+', '-']).unwrap_or(e);
                if digits.is_empty() || !all_digits(digits) {
                    return Err(invalid());
                }
                e.parse()
                    .map_err(|_| DecimalError::ExponentOverflow(s.to_owned()))?
            }
        };
        exponent = exponent
            .checked_sub(frac_part.len() as i64)
            .ok_or_else(|| DecimalError::ExponentOverflow(s.to_owned()))?;

        let mut digits = String::with_capacity(int_part.len() + frac_part.len());
        digits.push_str(int_part);
        digits.push_str(frac_part);

        let magnitude = BigInt::parse_bytes(digits.as_bytes(), 10).ok_or_else(invalid)?;
        let coefficient = if negative { -magnitude } else { magnitude };

        Self::new(coefficient, exponent).map_err(|_| DecimalError::ExponentOverflow(s.to_owned()))
    }
}

impl fmt::Display for Decimal {
    /// Canonical form under the default context. Hashing code must use
    /// [`DecimalContext::to_canonical_string`] with its own context instead.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&DecimalContext::default().to_canonical_string(self))
    }
}

impl Serialize for Decimal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Decimal {
    /// Accepts a JSON string or a JSON number. Numbers are parsed from their
    /// source text, never through `f64`.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::String(text) => text.parse().map_err(de::Error::custom),
            Value::Number(number) => number.to_string().parse().map_err(de::Error::custom),
            other => Err(de::Error::invalid_type(
                unexpected(&other),
                &"a decimal string or number",
            )),
        }
    }
}

fn unexpected(value: &Value) -> Unexpected<'_> {
    match value {
        Value::Null => Unexpected::Unit,
        Value::Bool(b) => Unexpected::Bool(*b),
        Value::Array(_) => Unexpected::Seq,
        Value::Object(_) => Unexpected::Map,
        Value::String(s) => Unexpected::Str(s),
        Value::Number(_) => Unexpected::Other("number"),
    }
}

/// Precision and formatting bounds for amounts.
///
/// Passed explicitly to every operation whose result depends on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecimalContext {
    /// Maximum significant digits of any sum.
    pub precision: u64,
    /// Adjusted exponents at or below this switch to exponential notation.
    pub min_exponent: i64,
    /// Adjusted exponents at or above this switch to exponential notation.
    pub max_exponent: i64,
}

impl Default for DecimalContext {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
            min_exponent: DEFAULT_MIN_EXPONENT,
            max_exponent: DEFAULT_MAX_EXPONENT,
        }
    }
}

impl DecimalContext {
    /// Check that a value fits the precision.
    pub fn check(&self, value: &Decimal) -> Result<(), DecimalError> {
        let digits = value.significant_digits();
        if digits > self.precision {
            return Err(DecimalError::PrecisionExceeded {
                digits,
                precision: self.precision,
            });
        }
        Ok(())
    }

    /// Exact sum, failing instead of rounding when it exceeds the precision.
    pub fn add(&self, lhs: &Decimal, rhs: &Decimal) -> Result<Decimal, DecimalError> {
        if !lhs.is_zero() && !rhs.is_zero() {
            // Bound the aligned width before allocating it.
            let top = lhs.adjusted_exponent().max(rhs.adjusted_exponent());
            let bottom = lhs.exponent.min(rhs.exponent);
            let span = top.saturating_sub(bottom).saturating_add(1);
            if span.unsigned_abs() > self.precision.saturating_add(1) {
                return Err(DecimalError::PrecisionExceeded {
                    digits: span.unsigned_abs(),
                    precision: self.precision,
                });
            }
        }

        let sum = lhs.exact_add(rhs)?;
        self.check(&sum)?;
        Ok(sum)
    }

    /// The string form that goes into hash pre-images.
    ///
    /// Positional while `min_exponent < e < max_exponent`, exponential
    /// otherwise; trailing zeros are never present.
    pub fn to_canonical_string(&self, value: &Decimal) -> String {
        let mut out = String::new();
        if value.is_zero() {
            out.push('0');
            return out;
        }

        let e = value.adjusted_exponent();
        if e <= self.min_exponent || e >= self.max_exponent {
            value.write_exponential(&mut out);
        } else {
            value.write_plain(&mut out);
        }
        out
    }
}

// =============================================================================
// TESTS
// =============================================================================
