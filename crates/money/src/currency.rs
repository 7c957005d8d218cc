//! ISO-4217 currency codes and the minor-unit exponent registry.

use std::collections::HashMap;
use std::sync::{LazyLock, RwLock};

use serde::{Deserialize, Serialize};

use crate::error::MoneyError;

/// Known ISO-4217 exponents (minor-unit decimals). Extensible at runtime via
/// [`register_currency_exponent`].
static CURRENCY_EXPONENTS: LazyLock<RwLock<HashMap<String, u32>>> = LazyLock::new(|| {
    let mut m = HashMap::new();
    for code in ["USD", "EUR", "GBP", "CHF", "RUB"] {
        m.insert(code.to_string(), 2);
    }
    m.insert("JPY".to_string(), 0);
    for code in ["KWD", "BHD", "JOD"] {
        m.insert(code.to_string(), 3);
    }
    RwLock::new(m)
});

/// A validated ISO-4217 currency code: three ASCII letters, stored uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Parses and normalizes a currency code.
    pub fn new(code: &str) -> Result<Self, MoneyError> {
        let code = code.trim();
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(MoneyError::InvalidCurrencyCode(code.to_string()));
        }
        Ok(Self(code.to_ascii_uppercase()))
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the registered minor-unit exponent for this currency.
    pub fn exponent(&self) -> Result<u32, MoneyError> {
        exponent_of(self.as_str())
    }
}

impl std::fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for CurrencyCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Adds or updates a currency exponent at runtime.
///
/// Intended for startup configuration; concurrent registration is serialized
/// by the registry lock. `exponent` must be in `[0, 9]`.
pub fn register_currency_exponent(code: &str, exponent: u32) -> Result<(), MoneyError> {
    let code = CurrencyCode::new(code)?;
    if exponent > 9 {
        return Err(MoneyError::InvalidExponent {
            code: code.as_str().to_string(),
            exponent,
        });
    }
    CURRENCY_EXPONENTS
        .write()
        .expect("currency registry poisoned")
        .insert(code.as_str().to_string(), exponent);
    Ok(())
}

/// Returns the ISO-4217 exponent (minor-unit decimals) for a currency code.
pub fn exponent_of(code: &str) -> Result<u32, MoneyError> {
    let code = code.trim().to_ascii_uppercase();
    CURRENCY_EXPONENTS
        .read()
        .expect("currency registry poisoned")
        .get(&code)
        .copied()
        .ok_or(MoneyError::UnknownCurrency(code))
}

/// Returns the allowed nanos step for a currency: `10^(9 - exponent)`.
pub fn nanos_step(code: &str) -> Result<i32, MoneyError> {
    let exp = exponent_of(code)?;
    Ok(10_i32.pow(9 - exp))
}
