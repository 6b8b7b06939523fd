//! Kin amounts
//!
//! Amounts are held as integer stroops; the ledger's decimal strings are
//! parsed and rendered exactly.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::KinError;

/// Stroops per KIN
pub const STROOPS_PER_KIN: i64 = 10_000_000;

/// Decimal places the ledger keeps
pub const KIN_DECIMALS: usize = 7;

/// An amount of Kin
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Balance {
    stroops: i64,
}

impl Balance {
    pub fn from_stroops(stroops: i64) -> Self {
        Self { stroops }
    }

    pub fn stroops(&self) -> i64 {
        self.stroops
    }

    /// Render with `precision` decimal places, truncating (never rounding
    /// up) past the ledger's seven
    pub fn value(&self, precision: usize) -> String {
        let precision = precision.min(KIN_DECIMALS);
        let sign = if self.stroops < 0 { "-" } else { "" };
        let magnitude = self.stroops.unsigned_abs();
        let whole = magnitude / STROOPS_PER_KIN as u64;
        let fraction = magnitude % STROOPS_PER_KIN as u64;

        if precision == 0 {
            return format!("{}{}", sign, whole);
        }

        let digits = format!("{:07}", fraction);
        format!("{}{}.{}", sign, whole, &digits[..precision])
    }

    /// Parse a decimal KIN amount such as `"12.5"` or `"0.0000001"`
    pub fn parse(amount: &str) -> Result<Self, KinError> {
        let invalid = || KinError::InvalidArgument(format!("Invalid Kin amount: '{}'", amount));

        let trimmed = amount
            .trim()
            .trim_end_matches("KIN")
            .trim_end();
        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };

        let (whole, fraction) = match digits.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (digits, ""),
        };

        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }
        if !whole.chars().all(|c| c.is_ascii_digit())
            || !fraction.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }
        if fraction.len() > KIN_DECIMALS {
            return Err(KinError::InvalidArgument(format!(
                "Kin amounts have at most {} decimal places: '{}'",
                KIN_DECIMALS, amount
            )));
        }

        let whole: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };
        let fraction: i64 = format!("{:0<7}", fraction).parse().map_err(|_| invalid())?;

        let stroops = whole
            .checked_mul(STROOPS_PER_KIN)
            .and_then(|s| s.checked_add(fraction))
            .ok_or_else(invalid)?;

        Ok(Self::from_stroops(if negative { -stroops } else { stroops }))
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} KIN", self.value(KIN_DECIMALS))
    }
}
