//! The closed set of settlement currencies.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{ClasspayError, constants};

/// A settlement currency. Exactly two symbols are supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Currency {
    /// Primary currency (`STX`).
    #[serde(rename = "STX")]
    Stx,
    /// Secondary currency (`USD`).
    #[serde(rename = "USD")]
    Usd,
}

impl Currency {
    /// All supported currencies.
    pub const ALL: [Self; 2] = [Self::Stx, Self::Usd];

    /// The wire symbol of this currency.
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Stx => constants::PRIMARY_CURRENCY_SYMBOL,
            Self::Usd => constants::SECONDARY_CURRENCY_SYMBOL,
        }
    }
}

impl FromStr for Currency {
    type Err = ClasspayError;

    fn from_str(symbol: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.symbol() == symbol)
            .ok_or_else(|| ClasspayError::InvalidCurrency(symbol.to_string()))
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
