//! Nonnegative money amount backed by rust_decimal.
//!
//! Amounts are exact; the canonical string form drops trailing zeros and never
//! uses exponent notation.

use rust_decimal::Decimal as RustDecimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A nonnegative monetary amount.
///
/// Serializes to a JSON number. Equality is numeric, so `10.5` and `10.50`
/// compare equal.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Amount(#[serde(with = "rust_decimal::serde::float")] RustDecimal);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("not a decimal number: {0}")]
    NotNumeric(String),
    #[error("amount must be nonnegative: {0}")]
    Negative(String),
}

impl Amount {
    /// Build an amount from a decimal, rejecting negative values.
    pub fn new(value: RustDecimal) -> Result<Self, AmountError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(AmountError::Negative(value.to_string()));
        }
        // -0 is folded into 0
        Ok(Amount(value.abs()))
    }

    /// Parse an already-cleaned decimal string (period separator, no spaces).
    pub fn from_str_canonical(s: &str) -> Result<Self, AmountError> {
        let value =
            RustDecimal::from_str(s).map_err(|_| AmountError::NotNumeric(s.to_string()))?;
        Self::new(value)
    }

    /// Format without trailing zeros or exponent notation.
    pub fn to_canonical_string(&self) -> String {
        format!("{}", self.0.normalize())
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_canonical_string())
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_canonical(s)
    }
}
