//! Request types for the tax engine API.
//!
//! This module defines the JSON request structure for the `/calculate` endpoint.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::EngineResult;
use crate::models::{
    CountryCode, Currency, MaritalStatus, PolishTaxForm, Regime, TaxBenefit, TaxInput,
};

/// Request body for the `/calculate` endpoint.
///
/// Carries the taxpayer's income and personal attributes together with the
/// countries to compare. Country and currency codes are kept as strings so
/// that an unknown code is reported as unsupported rather than as malformed
/// JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculationRequest {
    /// Total income from all sources.
    pub gross_income: Decimal,
    /// ISO 4217 code of the currency `gross_income` is expressed in.
    #[serde(default = "default_currency")]
    pub currency: String,
    /// The taxpayer's marital status.
    #[serde(default)]
    pub marital_status: MaritalStatus,
    /// Number of dependent children.
    #[serde(default)]
    pub num_children: u32,
    /// Whether part of the income comes from a sole proprietorship.
    #[serde(default)]
    pub has_sole_proprietorship: bool,
    /// The part of `gross_income` earned through the sole proprietorship.
    #[serde(default)]
    pub sole_proprietorship_income: Decimal,
    /// Completed years of business activity.
    #[serde(default)]
    pub years_in_business: u32,
    /// Benefits the taxpayer elects to claim.
    #[serde(default)]
    pub benefits: BTreeSet<TaxBenefit>,
    /// Portuguese accounting regime.
    #[serde(default)]
    pub regime: Option<Regime>,
    /// Polish form of taxation.
    #[serde(default)]
    pub tax_form: Option<PolishTaxForm>,
    /// Country codes to compare ("pt", "uk", ...).
    #[serde(default)]
    pub countries: Vec<String>,
}

fn default_currency() -> String {
    Currency::Eur.code().to_string()
}

impl CalculationRequest {
    /// Splits the request into the engine input and the parsed countries.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedCurrency` or `UnsupportedCountry` for unknown codes.
    pub fn into_parts(self) -> EngineResult<(TaxInput, Vec<CountryCode>)> {
        let currency: Currency = self.currency.parse()?;
        let countries = self
            .countries
            .iter()
            .map(|code| code.parse::<CountryCode>())
            .collect::<EngineResult<Vec<_>>>()?;

        let input = TaxInput {
            gross_income: self.gross_income,
            marital_status: self.marital_status,
            num_children: self.num_children,
            has_sole_proprietorship: self.has_sole_proprietorship,
            sole_proprietorship_income: self.sole_proprietorship_income,
            years_in_business: self.years_in_business,
            benefits: self.benefits,
            regime: self.regime,
            tax_form: self.tax_form,
            currency,
        };

        Ok((input, countries))
    }
}
