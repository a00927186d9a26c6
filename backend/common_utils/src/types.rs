//! Amount unit types. The core works exclusively in [`MinorUnit`]; each
//! gateway declares the unit its wire format expects through an
//! [`AmountConvertor`].

use std::fmt::Display;

use common_enums::Currency;
use error_stack::report;
use rust_decimal::{prelude::ToPrimitive, Decimal};
use serde::{Deserialize, Serialize};

use crate::errors::{CustomResult, ParsingError};

/// Convert between the core minor unit and a gateway's wire amount type.
pub trait AmountConvertor: Send + Sync {
    type Output;

    fn convert(
        &self,
        amount: MinorUnit,
        currency: Currency,
    ) -> CustomResult<Self::Output, ParsingError>;

    fn convert_back(
        &self,
        amount: Self::Output,
        currency: Currency,
    ) -> CustomResult<MinorUnit, ParsingError>;
}

/// Amount in the smallest unit of its currency (cents, yen, fils).
#[derive(
    Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd, Deserialize, Serialize,
)]
pub struct MinorUnit(i64);

impl MinorUnit {
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    pub const fn get_amount_as_i64(self) -> i64 {
        self.0
    }

    fn to_decimal(self, currency: Currency) -> Decimal {
        Decimal::new(self.0, currency.number_of_digits_after_decimal_point())
    }

    fn conversion_error(self, currency: Currency) -> error_stack::Report<ParsingError> {
        report!(ParsingError::AmountConversionFailure {
            amount: self.0,
            currency,
        })
    }

    fn to_major_unit_as_f64(self, currency: Currency) -> CustomResult<FloatMajorUnit, ParsingError> {
        let major = self
            .to_decimal(currency)
            .to_f64()
            .ok_or_else(|| self.conversion_error(currency))?;
        Ok(FloatMajorUnit::new(major))
    }

    fn to_major_unit_as_string(
        self,
        currency: Currency,
    ) -> CustomResult<StringMajorUnit, ParsingError> {
        Ok(StringMajorUnit::new(self.to_decimal(currency).to_string()))
    }

    fn to_minor_unit_as_string(self) -> CustomResult<StringMinorUnit, ParsingError> {
        Ok(StringMinorUnit::new(self.0.to_string()))
    }
}

impl Display for MinorUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Amount in the major unit of its currency, as a float.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct FloatMajorUnit(f64);

impl FloatMajorUnit {
    pub const fn new(value: f64) -> Self {
        Self(value)
    }

    pub const fn get_amount_as_f64(self) -> f64 {
        self.0
    }

    fn to_minor_unit_as_i64(self, currency: Currency) -> CustomResult<MinorUnit, ParsingError> {
        let scale = currency.number_of_digits_after_decimal_point();
        let decimal = Decimal::try_from(self.0)
            .map_err(|_| report!(ParsingError::FloatParsingFailure))?;
        let scaled = decimal
            .checked_mul(Decimal::from(10_i64.pow(scale)))
            .ok_or(report!(ParsingError::IntegerParsingFailure))?;
        let minor = scaled
            .round()
            .to_i64()
            .ok_or(report!(ParsingError::IntegerParsingFailure))?;
        Ok(MinorUnit::new(minor))
    }
}

/// Amount in the major unit of its currency, fixed-point, as a string.
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
pub struct StringMajorUnit(String);

impl StringMajorUnit {
    pub const fn new(value: String) -> Self {
        Self(value)
    }

    pub fn get_amount_as_string(&self) -> &str {
        &self.0
    }

    fn to_minor_unit_as_i64(&self, currency: Currency) -> CustomResult<MinorUnit, ParsingError> {
        let decimal: Decimal = self
            .0
            .parse()
            .map_err(|_| report!(ParsingError::FloatParsingFailure))?;
        let scale = currency.number_of_digits_after_decimal_point();
        let scaled = decimal
            .checked_mul(Decimal::from(10_i64.pow(scale)))
            .ok_or(report!(ParsingError::IntegerParsingFailure))?;
        let minor = scaled
            .round()
            .to_i64()
            .ok_or(report!(ParsingError::IntegerParsingFailure))?;
        Ok(MinorUnit::new(minor))
    }
}

/// Amount in the minor unit of its currency, as a string.
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
pub struct StringMinorUnit(String);

impl StringMinorUnit {
    pub const fn new(value: String) -> Self {
        Self(value)
    }

    pub fn get_amount_as_string(&self) -> &str {
        &self.0
    }

    fn to_minor_unit_as_i64(&self) -> CustomResult<MinorUnit, ParsingError> {
        let minor = self
            .0
            .parse::<i64>()
            .map_err(|_| report!(ParsingError::IntegerParsingFailure))?;
        Ok(MinorUnit::new(minor))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MinorUnitForGateway;

impl AmountConvertor for MinorUnitForGateway {
    type Output = MinorUnit;

    fn convert(
        &self,
        amount: MinorUnit,
        _currency: Currency,
    ) -> CustomResult<Self::Output, ParsingError> {
        Ok(amount)
    }

    fn convert_back(
        &self,
        amount: MinorUnit,
        _currency: Currency,
    ) -> CustomResult<MinorUnit, ParsingError> {
        Ok(amount)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FloatMajorUnitForGateway;

impl AmountConvertor for FloatMajorUnitForGateway {
    type Output = FloatMajorUnit;

    fn convert(
        &self,
        amount: MinorUnit,
        currency: Currency,
    ) -> CustomResult<Self::Output, ParsingError> {
        amount.to_major_unit_as_f64(currency)
    }

    fn convert_back(
        &self,
        amount: FloatMajorUnit,
        currency: Currency,
    ) -> CustomResult<MinorUnit, ParsingError> {
        amount.to_minor_unit_as_i64(currency)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StringMajorUnitForGateway;

impl AmountConvertor for StringMajorUnitForGateway {
    type Output = StringMajorUnit;

    fn convert(
        &self,
        amount: MinorUnit,
        currency: Currency,
    ) -> CustomResult<Self::Output, ParsingError> {
        amount.to_major_unit_as_string(currency)
    }

    fn convert_back(
        &self,
        amount: StringMajorUnit,
        currency: Currency,
    ) -> CustomResult<MinorUnit, ParsingError> {
        amount.to_minor_unit_as_i64(currency)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StringMinorUnitForGateway;

impl AmountConvertor for StringMinorUnitForGateway {
    type Output = StringMinorUnit;

    fn convert(
        &self,
        amount: MinorUnit,
        _currency: Currency,
    ) -> CustomResult<Self::Output, ParsingError> {
        amount.to_minor_unit_as_string()
    }

    fn convert_back(
        &self,
        amount: StringMinorUnit,
        _currency: Currency,
    ) -> CustomResult<MinorUnit, ParsingError> {
        amount.to_minor_unit_as_i64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minor_to_string_major_and_back() {
        let amount = MinorUnit::new(10000);
        let major = StringMajorUnitForGateway
            .convert(amount, Currency::USD)
            .unwrap();
        assert_eq!(major.get_amount_as_string(), "100.00");
        let back = StringMajorUnitForGateway
            .convert_back(major, Currency::USD)
            .unwrap();
        assert_eq!(back, amount);
    }

    #[test]
    fn zero_decimal_currency_has_no_fraction() {
        let amount = MinorUnit::new(500);
        let major = StringMajorUnitForGateway
            .convert(amount, Currency::JPY)
            .unwrap();
        assert_eq!(major.get_amount_as_string(), "500");
    }

    #[test]
    fn float_major_unit_round_trip() {
        let amount = MinorUnit::new(6012);
        let major = FloatMajorUnitForGateway
            .convert(amount, Currency::USD)
            .unwrap();
        assert_eq!(major.get_amount_as_f64(), 60.12);
        let back = FloatMajorUnitForGateway
            .convert_back(major, Currency::USD)
            .unwrap();
        assert_eq!(back, amount);
    }

    #[test]
    fn three_decimal_currency() {
        let amount = MinorUnit::new(12345);
        let major = StringMajorUnitForGateway
            .convert(amount, Currency::KWD)
            .unwrap();
        assert_eq!(major.get_amount_as_string(), "12.345");
    }
}
