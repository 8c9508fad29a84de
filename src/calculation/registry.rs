//! Country lookup and the entry points that run the adapters.
//!
//! [`compute_country`] is the single path from a [`TaxInput`] to a
//! [`CountryResult`]: it validates the input, converts it into the country's
//! native currency, runs the country's rules and converts the result back.

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::TaxTables;
use crate::error::{EngineError, EngineResult};
use crate::models::{ComparisonReport, CountryCode, CountryResult, TaxInput};

use super::currency::{CurrencyConversion, convert_input, convert_result};
use super::{Cyprus, France, Poland, Portugal, Spain, UnitedKingdom};

/// The tax rules of one jurisdiction.
///
/// Implementations receive an input already expressed in the country's
/// native currency and return a result in that currency.
pub trait CountryRules {
    /// The country these rules belong to.
    fn country(&self) -> CountryCode;

    /// Computes taxes and contributions for a validated input.
    fn compute(&self, input: &TaxInput, tables: &TaxTables) -> EngineResult<CountryResult>;
}

/// Returns the rules for a country.
pub fn rules_for(country: CountryCode) -> &'static (dyn CountryRules + Sync) {
    match country {
        CountryCode::Cyprus => &Cyprus,
        CountryCode::UnitedKingdom => &UnitedKingdom,
        CountryCode::France => &France,
        CountryCode::Spain => &Spain,
        CountryCode::Portugal => &Portugal,
        CountryCode::Poland => &Poland,
    }
}

/// Computes the estimate for one country, in the input's currency.
///
/// # Errors
///
/// Returns `InvalidInput` if the input fails validation or the country
/// rejects a benefit, and `UnsupportedCurrency` if the rate snapshot lacks
/// one of the currencies involved.
///
/// # Example
///
/// ```no_run
/// use tax_engine::calculation::compute_country;
/// use tax_engine::config::ConfigLoader;
/// use tax_engine::models::{CountryCode, Currency, TaxInput};
/// use rust_decimal::Decimal;
///
/// let loader = ConfigLoader::load("./config/2024").unwrap();
/// let input = TaxInput::new(Decimal::new(40_000, 0), Currency::Gbp);
///
/// let result = compute_country(CountryCode::UnitedKingdom, &input, loader.tables()).unwrap();
/// assert_eq!(result.income_tax, Decimal::new(5_486, 0));
/// ```
pub fn compute_country(
    country: CountryCode,
    input: &TaxInput,
    tables: &TaxTables,
) -> EngineResult<CountryResult> {
    input.validate()?;

    let to_native = CurrencyConversion::new(
        tables.exchange_rates(),
        input.currency,
        country.native_currency(),
    )?;
    let native_input = convert_input(input, &to_native)?;

    debug!(
        country = %country,
        input_currency = %to_native.source(),
        native_currency = %to_native.target(),
        native_gross = %native_input.gross_income,
        "Running country rules"
    );

    let result = rules_for(country).compute(&native_input, tables)?;
    convert_result(result, input.gross_income, &to_native.inverse())
}

/// Computes the estimate for every requested country.
///
/// Duplicate countries are computed once. Results keep the order of the
/// request and are expressed in the input's currency.
///
/// # Errors
///
/// Returns `InvalidInput` if no country is requested, or the first error
/// raised by a country.
pub fn compare(
    input: &TaxInput,
    countries: &[CountryCode],
    tables: &TaxTables,
) -> EngineResult<ComparisonReport> {
    if countries.is_empty() {
        return Err(EngineError::invalid_input(
            "countries",
            "at least one country must be selected",
        ));
    }

    let mut selected: Vec<CountryCode> = Vec::with_capacity(countries.len());
    for country in countries {
        if !selected.contains(country) {
            selected.push(*country);
        }
    }

    let results = selected
        .iter()
        .map(|country| compute_country(*country, input, tables))
        .collect::<EngineResult<Vec<_>>>()?;

    let lowest_effective_rate = results
        .iter()
        .min_by(|a, b| a.effective_rate.cmp(&b.effective_rate))
        .map(|result| result.country);

    info!(
        countries = results.len(),
        lowest_effective_rate = ?lowest_effective_rate,
        "Comparison complete"
    );

    Ok(ComparisonReport {
        calculation_id: Uuid::new_v4(),
        timestamp: Utc::now(),
        engine_version: env!("CARGO_PKG_VERSION").to_string(),
        tax_year: tables.tax_year().year.clone(),
        currency: input.currency,
        results,
        lowest_effective_rate,
    })
}
