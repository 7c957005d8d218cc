//! Exact, currency-aware money arithmetic.
//!
//! This crate provides:
//! - [`CurrencyCode`]: a validated ISO-4217 currency code
//! - a process-global registry mapping currency code to its minor-unit
//!   exponent, extensible at runtime
//! - [`Money`]: an exact `(currency, units, nanos)` amount with
//!   per-currency scale validation and no rounding anywhere
//!
//! All arithmetic fails on currency mismatch or invalid scale instead of
//! guessing.

mod currency;
mod error;
mod money;

pub use currency::{CurrencyCode, exponent_of, nanos_step, register_currency_exponent};
pub use error::MoneyError;
pub use money::Money;
