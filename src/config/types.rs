//! Configuration types for the tax tables.
//!
//! This module contains the strongly-typed structures shared by every
//! country and the [`TaxTables`] aggregate deserialized from YAML files.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::{EngineError, EngineResult};
use crate::models::{Bracket, Currency};

use super::countries::{
    CyprusConfig, FranceConfig, PolandConfig, PortugalConfig, SpainConfig, UnitedKingdomConfig,
};

/// Metadata about the tax year the tables describe.
#[derive(Debug, Clone, Deserialize)]
pub struct TaxYearMetadata {
    /// The tax year label (e.g., "2024").
    pub year: String,
    /// A human-readable name for the table set.
    pub name: String,
    /// The first day the tables apply to.
    pub effective_date: NaiveDate,
}

/// A progressive schedule as stored in configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct IncomeTaxSchedule {
    /// Brackets ordered by ascending threshold, the first starting at 0.
    pub brackets: Vec<Bracket>,
}

/// A multiplier schedule indexed by completed years in business.
///
/// Index 0 applies during the first year of activity. Years past the end of
/// the schedule get the full factor of 1.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct PhaseInSchedule(pub Vec<Decimal>);

impl PhaseInSchedule {
    /// Returns the factor for the given number of completed years.
    pub fn factor(&self, years_in_business: u32) -> Decimal {
        self.0
            .get(years_in_business as usize)
            .copied()
            .unwrap_or(Decimal::ONE)
    }
}

/// A snapshot of exchange rates relative to a base currency.
///
/// Each rate is the number of units of the currency worth one unit of the
/// base currency.
#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeRates {
    /// The currency every rate is quoted against.
    pub base: Currency,
    /// The date the snapshot was taken.
    pub as_of: NaiveDate,
    /// Units of each currency per unit of `base`.
    pub rates: BTreeMap<Currency, Decimal>,
}

impl ExchangeRates {
    /// Returns the units of `currency` per unit of the base currency.
    ///
    /// The base currency always has a rate of 1, whether listed or not.
    pub fn rate(&self, currency: Currency) -> EngineResult<Decimal> {
        if currency == self.base {
            return Ok(Decimal::ONE);
        }
        match self.rates.get(&currency) {
            Some(rate) if *rate > Decimal::ZERO => Ok(*rate),
            _ => Err(EngineError::UnsupportedCurrency {
                code: currency.code().to_string(),
            }),
        }
    }
}

/// Per-country configuration sections.
#[derive(Debug, Clone)]
pub struct CountryTables {
    /// Cyprus tables.
    pub cyprus: CyprusConfig,
    /// United Kingdom tables.
    pub united_kingdom: UnitedKingdomConfig,
    /// France tables.
    pub france: FranceConfig,
    /// Spain tables.
    pub spain: SpainConfig,
    /// Portugal tables.
    pub portugal: PortugalConfig,
    /// Poland tables.
    pub poland: PolandConfig,
}

/// The complete set of tables for one tax year loaded from YAML files.
///
/// This struct aggregates all configuration loaded from the various
/// YAML files in a tax-year directory.
#[derive(Debug, Clone)]
pub struct TaxTables {
    /// Tax year metadata.
    metadata: TaxYearMetadata,
    /// Exchange rate snapshot used for every conversion.
    exchange_rates: ExchangeRates,
    /// Country-specific tables.
    countries: CountryTables,
}

impl TaxTables {
    /// Creates a new TaxTables from its component parts.
    pub fn new(
        metadata: TaxYearMetadata,
        exchange_rates: ExchangeRates,
        countries: CountryTables,
    ) -> Self {
        Self {
            metadata,
            exchange_rates,
            countries,
        }
    }

    /// Returns the tax year metadata.
    pub fn tax_year(&self) -> &TaxYearMetadata {
        &self.metadata
    }

    /// Returns the exchange rate snapshot.
    pub fn exchange_rates(&self) -> &ExchangeRates {
        &self.exchange_rates
    }

    /// Returns the country-specific tables.
    pub fn countries(&self) -> &CountryTables {
        &self.countries
    }
}
