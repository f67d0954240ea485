use serde::{Deserialize, Serialize};

use crate::EngineError;

/// ISO-like currency code an obligation can be denominated in.
///
/// The set is fixed: these are the currencies the organization actually books
/// in. An obligation may carry principals in several of them at once, so the
/// engine keys installments, transactions and summaries by `Currency`.
///
/// ## Minor units
///
/// Monetary values are stored as an `i64` number of **minor units** (see
/// `Money`). `minor_units()` returns how many decimal digits are used when
/// converting between:
/// - major units (human input/output, e.g. `10.50 THB`)
/// - minor units (stored integers, e.g. `1050`)
///
/// All supported currencies use 2 minor units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Lak,
    Thb,
    Usd,
    Cny,
    Eur,
}

impl Currency {
    /// Canonical currency code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Currency::Lak => "LAK",
            Currency::Thb => "THB",
            Currency::Usd => "USD",
            Currency::Cny => "CNY",
            Currency::Eur => "EUR",
        }
    }

    /// Number of fraction digits used when formatting/parsing amounts.
    #[must_use]
    pub const fn minor_units(self) -> u8 {
        match self {
            Currency::Lak
            | Currency::Thb
            | Currency::Usd
            | Currency::Cny
            | Currency::Eur => 2,
        }
    }
}

impl core::fmt::Display for Currency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

impl TryFrom<&str> for Currency {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "LAK" => Ok(Currency::Lak),
            "THB" => Ok(Currency::Thb),
            "USD" => Ok(Currency::Usd),
            "CNY" => Ok(Currency::Cny),
            "EUR" => Ok(Currency::Eur),
            other => Err(EngineError::InvalidAmount(format!(
                "unsupported currency: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(Currency::try_from("lak").unwrap(), Currency::Lak);
        assert_eq!(Currency::try_from(" USD ").unwrap(), Currency::Usd);
    }

    #[test]
    fn parse_rejects_unknown_code() {
        assert!(Currency::try_from("GBP").is_err());
    }

    #[test]
    fn serde_uses_uppercase_codes() {
        let json = serde_json::to_string(&Currency::Thb).unwrap();
        assert_eq!(json, "\"THB\"");
    }
}
