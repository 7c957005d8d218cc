//! The `Money` value object.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::currency::{CurrencyCode, nanos_step};
use crate::error::MoneyError;

const NANOS_PER_UNIT: i128 = 1_000_000_000;

/// An exact monetary amount: `units + nanos * 10^-9` of `currency`.
///
/// Invariants, enforced on construction and on every operation:
/// - `|nanos| < 10^9`
/// - `units` and `nanos` signs agree (zero is `(0, 0)`)
/// - `nanos` is a multiple of `10^(9 - exponent)` for the currency
///
/// Arithmetic is exact over 128-bit nanounit totals; there is no rounding
/// path anywhere. Mixing currencies fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    currency: CurrencyCode,
    units: i64,
    nanos: i32,
}

impl Money {
    /// Creates a money amount, validating parts and currency scale.
    pub fn new(currency: CurrencyCode, units: i64, nanos: i32) -> Result<Self, MoneyError> {
        let m = Self {
            currency,
            units,
            nanos,
        };
        m.ensure_valid()?;
        Ok(m)
    }

    /// Zero of the given currency.
    pub fn zero(currency: CurrencyCode) -> Self {
        Self {
            currency,
            units: 0,
            nanos: 0,
        }
    }

    /// Returns the currency.
    pub fn currency(&self) -> &CurrencyCode {
        &self.currency
    }

    /// Returns the whole-unit part.
    pub fn units(&self) -> i64 {
        self.units
    }

    /// Returns the fractional part in nanounits.
    pub fn nanos(&self) -> i32 {
        self.nanos
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.units == 0 && self.nanos == 0
    }

    /// Returns true if the amount is strictly positive.
    pub fn is_positive(&self) -> bool {
        self.units > 0 || (self.units == 0 && self.nanos > 0)
    }

    /// Returns true if the amount is strictly negative.
    pub fn is_negative(&self) -> bool {
        self.units < 0 || (self.units == 0 && self.nanos < 0)
    }

    /// Adds another amount of the same currency. Exact; fails on mismatch,
    /// invalid scale, or overflow.
    pub fn add(&self, other: &Money) -> Result<Money, MoneyError> {
        self.same_currency(other)?;
        self.ensure_valid()?;
        other.ensure_valid()?;
        Self::from_total_nanos(self.currency.clone(), self.total_nanos() + other.total_nanos())
    }

    /// Subtracts another amount of the same currency. The result may be
    /// negative.
    pub fn sub(&self, other: &Money) -> Result<Money, MoneyError> {
        self.same_currency(other)?;
        self.ensure_valid()?;
        other.ensure_valid()?;
        Self::from_total_nanos(self.currency.clone(), self.total_nanos() - other.total_nanos())
    }

    /// Compares two amounts of the same currency.
    pub fn compare(&self, other: &Money) -> Result<Ordering, MoneyError> {
        self.same_currency(other)?;
        self.ensure_valid()?;
        other.ensure_valid()?;
        Ok(self.total_nanos().cmp(&other.total_nanos()))
    }

    /// Converts to an integer count of the currency's minor units (e.g.
    /// cents). Exact; fails if the amount is not a whole number of minor
    /// units.
    pub fn to_minor_units(&self) -> Result<i64, MoneyError> {
        self.ensure_valid()?;
        let step = nanos_step(self.currency.as_str())? as i128;
        let total = self.total_nanos();
        if total % step != 0 {
            return Err(MoneyError::InvalidScale {
                currency: self.currency.as_str().to_string(),
                nanos: self.nanos,
            });
        }
        i64::try_from(total / step).map_err(|_| MoneyError::Overflow)
    }

    /// Builds an amount from an integer count of minor units.
    pub fn from_minor_units(currency: CurrencyCode, minor: i64) -> Result<Money, MoneyError> {
        let step = nanos_step(currency.as_str())? as i128;
        Self::from_total_nanos(currency, minor as i128 * step)
    }

    /// Total amount in nanounits. `i64::MAX` units still fits comfortably
    /// in an `i128`, so sums never wrap.
    fn total_nanos(&self) -> i128 {
        self.units as i128 * NANOS_PER_UNIT + self.nanos as i128
    }

    /// Rebuilds a normalized amount from a nanounit total.
    ///
    /// Truncating division keeps `units` and the remainder on the same side
    /// of zero, so sign agreement holds by construction.
    fn from_total_nanos(currency: CurrencyCode, total: i128) -> Result<Money, MoneyError> {
        let units = i64::try_from(total / NANOS_PER_UNIT).map_err(|_| MoneyError::Overflow)?;
        let nanos = (total % NANOS_PER_UNIT) as i32;
        Money::new(currency, units, nanos)
    }

    fn same_currency(&self, other: &Money) -> Result<(), MoneyError> {
        if self.currency != other.currency {
            return Err(MoneyError::CurrencyMismatch {
                left: self.currency.as_str().to_string(),
                right: other.currency.as_str().to_string(),
            });
        }
        Ok(())
    }

    fn ensure_valid(&self) -> Result<(), MoneyError> {
        if self.nanos.unsigned_abs() >= NANOS_PER_UNIT as u32
            || (self.units > 0 && self.nanos < 0)
            || (self.units < 0 && self.nanos > 0)
        {
            return Err(MoneyError::InconsistentParts {
                units: self.units,
                nanos: self.nanos,
            });
        }
        let step = nanos_step(self.currency.as_str())?;
        if self.nanos % step != 0 {
            return Err(MoneyError::InvalidScale {
                currency: self.currency.as_str().to_string(),
                nanos: self.nanos,
            });
        }
        Ok(())
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        let units = self.units.unsigned_abs();
        let nanos = self.nanos.unsigned_abs();
        if nanos == 0 {
            write!(f, "{sign}{units} {}", self.currency)
        } else {
            let frac = format!("{nanos:09}");
            write!(
                f,
                "{sign}{units}.{} {}",
                frac.trim_end_matches('0'),
                self.currency
            )
        }
    }
}
