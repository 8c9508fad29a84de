//! Currency conversion at the boundaries of a country computation.
//!
//! Income is converted from the input currency into the country's native
//! currency before any rule runs, and the amounts of the result are converted
//! into the display currency afterwards. Both directions read the same
//! [`ExchangeRates`] snapshot, and converting between equal currencies is the
//! identity, so a computation whose currencies all match is unaffected.

use rust_decimal::Decimal;

use crate::config::ExchangeRates;
use crate::error::{EngineError, EngineResult};
use crate::models::{BracketSlice, CountryResult, Currency, TaxInput};

use super::aggregate;

/// A conversion between two currencies taken from one rate snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrencyConversion {
    from: Currency,
    to: Currency,
    from_rate: Decimal,
    to_rate: Decimal,
}

impl CurrencyConversion {
    /// Looks up the rates for `from` and `to` in the snapshot.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedCurrency` if either currency has no rate.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use tax_engine::calculation::CurrencyConversion;
    /// use tax_engine::config::ConfigLoader;
    /// use tax_engine::models::Currency;
    /// use rust_decimal::Decimal;
    ///
    /// let loader = ConfigLoader::load("./config/2024").unwrap();
    /// let conversion =
    ///     CurrencyConversion::new(loader.tables().exchange_rates(), Currency::Eur, Currency::Gbp)
    ///         .unwrap();
    /// println!("{}", conversion.apply(Decimal::new(1_000, 0)).unwrap());
    /// ```
    pub fn new(rates: &ExchangeRates, from: Currency, to: Currency) -> EngineResult<Self> {
        if from == to {
            return Ok(Self::identity(from));
        }
        Ok(Self {
            from,
            to,
            from_rate: rates.rate(from)?,
            to_rate: rates.rate(to)?,
        })
    }

    /// A conversion that leaves amounts unchanged.
    pub fn identity(currency: Currency) -> Self {
        Self {
            from: currency,
            to: currency,
            from_rate: Decimal::ONE,
            to_rate: Decimal::ONE,
        }
    }

    /// The source currency.
    pub fn source(&self) -> Currency {
        self.from
    }

    /// The target currency.
    pub fn target(&self) -> Currency {
        self.to
    }

    /// Returns true if the conversion leaves amounts unchanged.
    pub fn is_identity(&self) -> bool {
        self.from == self.to
    }

    /// Converts an amount from the source into the target currency.
    ///
    /// # Errors
    ///
    /// Returns `CalculationError` if the converted amount does not fit in a
    /// `Decimal`.
    pub fn apply(&self, amount: Decimal) -> EngineResult<Decimal> {
        if self.is_identity() {
            return Ok(amount);
        }
        amount
            .checked_mul(self.to_rate)
            .and_then(|scaled| scaled.checked_div(self.from_rate))
            .ok_or_else(|| EngineError::CalculationError {
                message: format!("converting {} {} to {} overflowed", amount, self.from, self.to),
            })
    }

    /// The conversion in the opposite direction, using the same rates.
    pub fn inverse(&self) -> Self {
        Self {
            from: self.to,
            to: self.from,
            from_rate: self.to_rate,
            to_rate: self.from_rate,
        }
    }
}

/// Expresses the monetary fields of an input in another currency.
pub fn convert_input(input: &TaxInput, conversion: &CurrencyConversion) -> EngineResult<TaxInput> {
    let mut converted = input.clone();
    converted.gross_income = conversion.apply(input.gross_income)?;
    converted.sole_proprietorship_income = conversion.apply(input.sole_proprietorship_income)?;
    converted.currency = conversion.target();
    Ok(converted)
}

/// Expresses a native-currency result in the display currency.
///
/// Deductions and bases are converted; `gross_income` is the original input
/// amount expressed in the display currency, and net income and the effective
/// rate are recomputed from it so that they never drift from the converted
/// deductions.
pub fn convert_result(
    result: CountryResult,
    gross_income: Decimal,
    conversion: &CurrencyConversion,
) -> EngineResult<CountryResult> {
    if conversion.is_identity() {
        return Ok(result);
    }

    let income_tax = conversion.apply(result.income_tax)?;
    let social_security = conversion.apply(result.social_security)?;
    let other_taxes = conversion.apply(result.other_taxes)?;
    let totals = aggregate(gross_income, income_tax, social_security, other_taxes)?;
    let income_tax_breakdown = result
        .income_tax_breakdown
        .iter()
        .map(|slice| {
            Ok(BracketSlice {
                rate: slice.rate,
                taxable_amount: conversion.apply(slice.taxable_amount)?,
                tax_amount: conversion.apply(slice.tax_amount)?,
            })
        })
        .collect::<EngineResult<Vec<_>>>()?;

    Ok(CountryResult {
        currency: conversion.target(),
        gross_income,
        taxable_base: conversion.apply(result.taxable_base)?,
        income_tax,
        income_tax_breakdown,
        social_security,
        other_taxes,
        total_deductions: totals.total_deductions,
        net_income: totals.net_income,
        effective_rate: totals.effective_rate,
        ..result
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::collections::BTreeMap;
    use std::str::FromStr;

    use crate::models::{AuditTrace, CountryCode, IncomeTaxMethod};

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn snapshot() -> ExchangeRates {
        let mut rates = BTreeMap::new();
        rates.insert(Currency::Gbp, dec("0.85"));
        rates.insert(Currency::Usd, dec("1.08"));
        ExchangeRates {
            base: Currency::Eur,
            as_of: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            rates,
        }
    }

    fn native_result() -> CountryResult {
        CountryResult {
            country: CountryCode::UnitedKingdom,
            currency: Currency::Gbp,
            gross_income: dec("42500"),
            taxable_base: dec("42500"),
            income_tax: dec("5986"),
            income_tax_method: IncomeTaxMethod::Progressive,
            income_tax_breakdown: vec![
                BracketSlice::new(dec("0"), dec("12570")),
                BracketSlice::new(dec("0.20"), dec("29930")),
            ],
            social_security: dec("2394.40"),
            social_security_note: String::new(),
            social_security_limit: None,
            other_taxes: Decimal::ZERO,
            total_deductions: dec("8380.40"),
            net_income: dec("34119.60"),
            effective_rate: dec("19.72"),
            tax_regime_note: String::new(),
            family_quotient: None,
            audit_trace: AuditTrace::default(),
        }
    }

    #[test]
    fn test_identity_conversion_is_exact() {
        let conversion =
            CurrencyConversion::new(&snapshot(), Currency::Gbp, Currency::Gbp).unwrap();
        assert!(conversion.is_identity());
        assert_eq!(conversion.apply(dec("123.456")).unwrap(), dec("123.456"));

        let result = native_result();
        let converted = convert_result(result.clone(), dec("42500"), &conversion).unwrap();
        assert_eq!(converted, result);
    }

    #[test]
    fn test_eur_to_gbp() {
        let conversion =
            CurrencyConversion::new(&snapshot(), Currency::Eur, Currency::Gbp).unwrap();
        assert_eq!(conversion.apply(dec("50000")).unwrap(), dec("42500"));
        assert_eq!(conversion.inverse().apply(dec("42500")).unwrap(), dec("50000"));
    }

    #[test]
    fn test_cross_rate_through_base() {
        let conversion =
            CurrencyConversion::new(&snapshot(), Currency::Usd, Currency::Gbp).unwrap();
        // 1080 USD = 1000 EUR = 850 GBP
        assert_eq!(conversion.apply(dec("1080")).unwrap(), dec("850"));
    }

    #[test]
    fn test_missing_rate_is_rejected() {
        match CurrencyConversion::new(&snapshot(), Currency::Eur, Currency::Pln) {
            Err(EngineError::UnsupportedCurrency { code }) => assert_eq!(code, "PLN"),
            other => panic!("Expected UnsupportedCurrency, got {:?}", other),
        }
    }

    #[test]
    fn test_overflowing_conversion_is_an_error() {
        let conversion =
            CurrencyConversion::new(&snapshot(), Currency::Eur, Currency::Usd).unwrap();
        match conversion.apply(Decimal::MAX) {
            Err(EngineError::CalculationError { message }) => {
                assert!(message.contains("overflowed"));
            }
            other => panic!("Expected CalculationError, got {:?}", other),
        }
    }

    #[test]
    fn test_convert_input_moves_all_amounts() {
        let input = TaxInput::new(dec("50000"), Currency::Eur)
            .with_sole_proprietorship(dec("20000"), 2);
        let conversion =
            CurrencyConversion::new(&snapshot(), Currency::Eur, Currency::Gbp).unwrap();
        let converted = convert_input(&input, &conversion).unwrap();
        assert_eq!(converted.gross_income, dec("42500"));
        assert_eq!(converted.sole_proprietorship_income, dec("17000"));
        assert_eq!(converted.currency, Currency::Gbp);
        assert_eq!(converted.years_in_business, 2);
    }

    #[test]
    fn test_convert_result_recomputes_net_from_original_gross() {
        let back = CurrencyConversion::new(&snapshot(), Currency::Gbp, Currency::Eur).unwrap();
        let converted = convert_result(native_result(), dec("50000"), &back).unwrap();

        assert_eq!(converted.currency, Currency::Eur);
        assert_eq!(converted.gross_income, dec("50000"));
        assert_eq!(
            converted.total_deductions,
            converted.income_tax + converted.social_security + converted.other_taxes
        );
        assert_eq!(converted.net_income, dec("50000") - converted.total_deductions);
        assert_eq!(converted.country, CountryCode::UnitedKingdom);
    }
}
