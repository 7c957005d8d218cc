use thiserror::Error;

/// Errors produced by money construction and arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    /// Currency code is not three ASCII letters.
    #[error("invalid currency code: {0:?}")]
    InvalidCurrencyCode(String),

    /// Currency has no registered minor-unit exponent.
    #[error("unknown currency: {0}")]
    UnknownCurrency(String),

    /// Exponent outside the supported [0, 9] range.
    #[error("invalid exponent {exponent} for currency {code}")]
    InvalidExponent { code: String, exponent: u32 },

    /// Nanos are not a multiple of the currency's minor-unit step.
    #[error("amount is not representable at {currency} scale (nanos = {nanos})")]
    InvalidScale { currency: String, nanos: i32 },

    /// Nanos outside (-10^9, 10^9), or units/nanos signs disagree.
    #[error("units and nanos are inconsistent (units = {units}, nanos = {nanos})")]
    InconsistentParts { units: i64, nanos: i32 },

    /// Two-operand operation over different currencies.
    #[error("currency mismatch: {left} vs {right}")]
    CurrencyMismatch { left: String, right: String },

    /// Result does not fit the 64-bit unit range.
    #[error("amount overflows the representable range")]
    Overflow,
}
