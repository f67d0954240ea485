use serde::{Deserialize, Serialize};

use crate::{Currency, EngineError, Money, ResultEngine};

/// An amount denominated in a single currency.
///
/// This is the principal value type: the originally requested amount of an
/// obligation in one of its currencies. Immutable once built; a principal only
/// changes through the aggregate's explicit `increase_principal` command,
/// which replaces the value wholesale.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyAmount {
    pub currency: Currency,
    pub amount: Money,
}

impl CurrencyAmount {
    /// Builds a principal amount. Principals may be zero (an obligation can be
    /// opened before the amount is settled) but never negative.
    pub fn new(currency: Currency, amount: Money) -> ResultEngine<Self> {
        if amount.is_negative() {
            return Err(EngineError::InvalidAmount(format!(
                "principal amount must be >= 0, got {amount} {currency}"
            )));
        }
        Ok(Self { currency, amount })
    }
}

impl core::fmt::Display for CurrencyAmount {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} {}", self.amount, self.currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_negative_amount() {
        assert!(CurrencyAmount::new(Currency::Lak, Money::new(-1)).is_err());
    }

    #[test]
    fn zero_is_a_valid_principal() {
        let amount = CurrencyAmount::new(Currency::Usd, Money::ZERO).unwrap();
        assert_eq!(amount.amount, Money::ZERO);
    }

    #[test]
    fn displays_amount_and_code() {
        let amount = CurrencyAmount::new(Currency::Thb, Money::new(500_000)).unwrap();
        assert_eq!(amount.to_string(), "5000.00 THB");
    }
}
