//! Payment instruments a merchant-style gateway can charge directly.
//! Non-merchant gateways never see these; the payer enters card data on
//! the provider's hosted page.

use std::str::FromStr;

use common_utils::{
    pii::CardNumberStrategy,
    {PeekInterface, Secret},
};

#[derive(Debug, thiserror::Error)]
pub enum CardError {
    #[error("Card number is not numeric or has an invalid length")]
    InvalidCardNumber,
    #[error("Card expiry is not a valid month/year pair")]
    InvalidExpiry,
}

/// A primary account number. Debug output keeps the BIN and last four.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String")]
pub struct CardNumber(Secret<String, CardNumberStrategy>);

impl CardNumber {
    pub fn peek(&self) -> &str {
        self.0.peek()
    }

    pub fn last_four(&self) -> String {
        let digits = self.0.peek();
        digits[digits.len() - 4..].to_string()
    }
}

impl FromStr for CardNumber {
    type Err = CardError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let len = value.len();
        if (15..=19).contains(&len) && value.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(Secret::new(value.to_string())))
        } else {
            Err(CardError::InvalidCardNumber)
        }
    }
}

impl TryFrom<String> for CardNumber {
    type Error = CardError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_str(&value)
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Card {
    pub card_number: CardNumber,
    pub card_exp_month: Secret<String>,
    pub card_exp_year: Secret<String>,
    pub card_cvc: Secret<String>,
    pub card_holder_name: Option<Secret<String>>,
}

impl Card {
    /// Expiry in the `MMYY` form most processors expect.
    pub fn expiry_mmyy(&self) -> Secret<String> {
        let year = self.card_exp_year.peek();
        let short_year = if year.len() == 4 { &year[2..] } else { year };
        Secret::new(format!("{:0>2}{short_year}", self.card_exp_month.peek()))
    }
}

/// An ACH/echeck debit instrument.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct BankDebit {
    pub account_number: Secret<String>,
    pub routing_number: Secret<String>,
    pub account_holder_name: Option<Secret<String>>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub enum PaymentMethodData {
    Card(Card),
    BankDebit(BankDebit),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_number_accepts_valid_pans() {
        assert!(CardNumber::from_str("4111111111111111").is_ok());
        assert!(CardNumber::from_str("411111111111111").is_ok()); // amex length
    }

    #[test]
    fn card_number_rejects_short_or_non_numeric() {
        assert!(CardNumber::from_str("4111").is_err());
        assert!(CardNumber::from_str("4111-1111-1111-1111").is_err());
    }

    #[test]
    fn card_number_debug_is_masked() {
        let number = CardNumber::from_str("4111111111111111").unwrap();
        let printed = format!("{number:?}");
        assert!(!printed.contains("4111111111111111"));
        assert!(printed.contains("1111"));
    }

    #[test]
    fn expiry_formats_as_mmyy() {
        let card = Card {
            card_number: CardNumber::from_str("4111111111111111").unwrap(),
            card_exp_month: Secret::new("3".to_string()),
            card_exp_year: Secret::new("2027".to_string()),
            card_cvc: Secret::new("123".to_string()),
            card_holder_name: None,
        };
        assert_eq!(card.expiry_mmyy().peek(), "0327");
    }
}
