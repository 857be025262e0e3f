//! Type-safe price representation using decimal arithmetic.
//!
//! Catalog prices are nullable: a card without a price is shown in the
//! catalog but cannot be bought. [`Price`] keeps that distinction explicit
//! instead of overloading zero, and [`CurrencyFormat`] renders both cases.

use std::iter::Sum;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A nullable catalog price.
///
/// Serialized as a JSON number, or `null` for a priceless item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(#[serde(with = "rust_decimal::serde::float_option")] Option<Decimal>);

impl Price {
    /// Create a purchasable price.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(Some(amount))
    }

    /// A priceless (not purchasable) item.
    #[must_use]
    pub const fn priceless() -> Self {
        Self(None)
    }

    /// Convenience constructor from a whole number of currency units.
    #[must_use]
    pub fn from_units(units: i64) -> Self {
        Self(Some(Decimal::from(units)))
    }

    /// The amount, if the item is purchasable.
    #[must_use]
    pub const fn amount(&self) -> Option<Decimal> {
        self.0
    }

    /// The amount, with a priceless item counting as zero.
    #[must_use]
    pub fn amount_or_zero(&self) -> Decimal {
        self.0.unwrap_or(Decimal::ZERO)
    }

    /// Returns `true` if the item has no price.
    #[must_use]
    pub const fn is_priceless(&self) -> bool {
        self.0.is_none()
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self::new(amount)
    }
}

impl From<Option<Decimal>> for Price {
    fn from(amount: Option<Decimal>) -> Self {
        Self(amount)
    }
}

/// Summing prices treats priceless items as zero.
impl Sum<Price> for Decimal {
    fn sum<I: Iterator<Item = Price>>(iter: I) -> Self {
        iter.map(|price| price.amount_or_zero()).sum()
    }
}

/// Display settings for monetary amounts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyFormat {
    /// Suffix appended after the amount (e.g. "synapses").
    pub unit: String,
    /// Label shown instead of an amount for priceless items.
    pub priceless_label: String,
}

impl CurrencyFormat {
    /// Maximum number of decimal places shown.
    pub const MAX_DECIMAL_PLACES: u32 = 2;

    /// Create a format with a custom unit and priceless label.
    #[must_use]
    pub fn new(unit: impl Into<String>, priceless_label: impl Into<String>) -> Self {
        Self {
            unit: unit.into(),
            priceless_label: priceless_label.into(),
        }
    }

    /// Format a nullable price for display.
    ///
    /// ```
    /// use larek_core::{CurrencyFormat, Price};
    ///
    /// let format = CurrencyFormat::default();
    /// assert_eq!(format.format(Price::from_units(750)), "750 synapses");
    /// assert_eq!(format.format(Price::priceless()), "Priceless");
    /// ```
    #[must_use]
    pub fn format(&self, price: Price) -> String {
        price.amount().map_or_else(
            || self.priceless_label.clone(),
            |amount| self.format_amount(amount),
        )
    }

    /// Format a definite amount, such as a basket total.
    #[must_use]
    pub fn format_amount(&self, amount: Decimal) -> String {
        let shown = amount.round_dp(Self::MAX_DECIMAL_PLACES).normalize();
        format!("{shown} {}", self.unit)
    }
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        Self::new("synapses", "Priceless")
    }
}
