//! Value objects for cart pricing

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Money value object. Arithmetic is currency-checked; amounts are
/// `rust_decimal` so pricing math is exact.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    amount: Decimal,
    currency: String,
}

impl Money {
    pub fn new(amount: Decimal, currency: &str) -> Self {
        Self { amount, currency: currency.to_string() }
    }
    pub fn inr(amount: Decimal) -> Self { Self::new(amount, "INR") }
    pub fn zero(currency: &str) -> Self { Self::new(Decimal::ZERO, currency) }
    pub fn amount(&self) -> Decimal { self.amount }
    pub fn currency(&self) -> &str { &self.currency }
    pub fn is_zero(&self) -> bool { self.amount.is_zero() }
    pub fn add(&self, other: &Money) -> Result<Money, MoneyError> {
        if self.currency != other.currency { return Err(MoneyError::CurrencyMismatch); }
        Ok(Money::new(self.amount + other.amount, &self.currency))
    }
    pub fn multiply(&self, qty: u32) -> Money { Money::new(self.amount * Decimal::from(qty), &self.currency) }
}

impl Default for Money {
    fn default() -> Self { Self::zero("INR") }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{} {}", self.amount, self.currency) }
}

#[derive(Debug, Clone)] pub enum MoneyError { CurrencyMismatch }
impl std::error::Error for MoneyError {}
impl fmt::Display for MoneyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "Currency mismatch") }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_money_add() {
        let a = Money::inr(dec!(100));
        let b = Money::inr(dec!(50));
        assert_eq!(a.add(&b).unwrap().amount(), dec!(150));
    }

    #[test]
    fn test_money_add_rejects_mixed_currencies() {
        let a = Money::inr(dec!(100));
        let b = Money::new(dec!(100), "USD");
        assert!(a.add(&b).is_err());
    }

    #[test]
    fn test_money_multiply() {
        assert_eq!(Money::inr(dec!(19.99)).multiply(3).amount(), dec!(59.97));
    }
}
