//! Type-safe price representation using decimal arithmetic.
//!
//! Catalog prices arrive as JSON numbers (`44`, `5.5`) and are stored in cart
//! snapshots as decimal strings (`"44"`). Both forms deserialize into a
//! [`Price`]; arithmetic never goes through `f64`.

use std::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors constructing a [`Price`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceError {
    #[error("price must not be negative (got {0})")]
    Negative(Decimal),
}

/// A non-negative unit price in the catalog's currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// A price of zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new price.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Negative` if `amount` is below zero.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }
        Ok(Self(amount))
    }

    /// Create a price from an amount in cents (e.g. `550` is `5.50`).
    #[must_use]
    pub fn from_cents(cents: u32) -> Self {
        Self(Decimal::new(i64::from(cents), 2))
    }

    /// The decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Price multiplied by a quantity, saturating at `Decimal::MAX`.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Decimal {
        self.0.saturating_mul(Decimal::from(quantity))
    }

    /// Format for display (e.g. `"$19.99"`).
    #[must_use]
    pub fn display(&self) -> String {
        format!("${}", format_amount(self.0))
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_amount(self.0))
    }
}

/// Format an amount with exactly two decimal places, rounding half away from zero.
///
/// `25.5` becomes `"25.50"`, `0.125` becomes `"0.13"`.
#[must_use]
pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{rounded:.2}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_negative_price_rejected() {
        let err = Price::new(Decimal::from(-1)).unwrap_err();
        assert_eq!(err, PriceError::Negative(Decimal::from(-1)));
        assert!(Price::new(Decimal::ZERO).is_ok());
    }

    #[test]
    fn test_price_deserializes_from_number_and_string() {
        let from_int: Price = serde_json::from_str("44").unwrap();
        assert_eq!(from_int.amount(), Decimal::from(44));

        let from_float: Price = serde_json::from_str("5.5").unwrap();
        assert_eq!(from_float, Price::from_cents(550));

        let from_str: Price = serde_json::from_str("\"10.00\"").unwrap();
        assert_eq!(from_str, Price::from_cents(1000));

        assert!(serde_json::from_str::<Price>("-3").is_err());
    }

    #[test]
    fn test_format_amount_two_places() {
        assert_eq!(format_amount(Decimal::from(25)), "25.00");
        assert_eq!(format_amount(Decimal::from_str("25.5").unwrap()), "25.50");
        assert_eq!(format_amount(Decimal::from_str("0.125").unwrap()), "0.13");
        assert_eq!(format_amount(Decimal::ZERO), "0.00");
    }

    #[test]
    fn test_times_and_display() {
        let price = Price::from_cents(1999);
        assert_eq!(price.times(3), Decimal::from_str("59.97").unwrap());
        assert_eq!(price.display(), "$19.99");
        assert_eq!(price.to_string(), "19.99");
    }

    #[test]
    fn test_times_saturates_on_overflow() {
        let huge = Price::new(Decimal::from_str("10000000000000000000000000000").unwrap()).unwrap();
        assert_eq!(huge.times(8), Decimal::MAX);
        assert_eq!(huge.times(0), Decimal::ZERO);
    }
}
