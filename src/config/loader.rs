//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading the tax tables
//! of one tax year from YAML files.

use std::fs;
use std::path::Path;

use crate::calculation::validate_brackets;
use crate::error::{EngineError, EngineResult};
use crate::models::{Bracket, CountryCode};

use super::countries::{
    CyprusConfig, FranceConfig, PolandConfig, PortugalConfig, SpainConfig, UnitedKingdomConfig,
};
use super::types::{CountryTables, ExchangeRates, TaxTables, TaxYearMetadata};

/// Loads and provides access to the tax tables.
///
/// The `ConfigLoader` reads YAML configuration files from a tax-year
/// directory and checks every bracket schedule before handing the tables out.
///
/// # Directory Structure
///
/// ```text
/// config/2024/
/// ├── tax_year.yaml        # Tax year metadata
/// ├── exchange_rates.yaml  # Rate snapshot used for conversions
/// └── countries/
///     ├── cy.yaml
///     ├── es.yaml
///     ├── fr.yaml
///     ├── pl.yaml
///     ├── pt.yaml
///     └── uk.yaml
/// ```
///
/// # Example
///
/// ```no_run
/// use tax_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/2024").unwrap();
/// println!("Loaded tables: {}", loader.tax_year().name);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    tables: TaxTables,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - Any required file is missing (`ConfigNotFound`)
    /// - Any file contains invalid YAML or misses a field (`ConfigParseError`)
    /// - A bracket schedule is malformed (`ConfigParseError`)
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let metadata = Self::load_yaml::<TaxYearMetadata>(&path.join("tax_year.yaml"))?;
        let exchange_rates = Self::load_yaml::<ExchangeRates>(&path.join("exchange_rates.yaml"))?;

        let countries_dir = path.join("countries");
        let country_file =
            |country: CountryCode| countries_dir.join(format!("{}.yaml", country.code()));

        let cyprus_path = country_file(CountryCode::Cyprus);
        let cyprus = Self::load_yaml::<CyprusConfig>(&cyprus_path)?;
        Self::check_schedule(&cyprus_path, &cyprus.income_tax.brackets)?;

        let united_kingdom_path = country_file(CountryCode::UnitedKingdom);
        let united_kingdom = Self::load_yaml::<UnitedKingdomConfig>(&united_kingdom_path)?;
        Self::check_schedule(
            &united_kingdom_path,
            &united_kingdom.national_insurance.class_1.brackets(),
        )?;
        Self::check_schedule(
            &united_kingdom_path,
            &united_kingdom.national_insurance.class_4.brackets(),
        )?;

        let france_path = country_file(CountryCode::France);
        let france = Self::load_yaml::<FranceConfig>(&france_path)?;
        Self::check_schedule(&france_path, &france.income_tax.brackets)?;

        let spain_path = country_file(CountryCode::Spain);
        let spain = Self::load_yaml::<SpainConfig>(&spain_path)?;
        Self::check_schedule(&spain_path, &spain.income_tax.brackets)?;
        Self::check_schedule(&spain_path, &spain.beckham_law.brackets)?;

        let portugal_path = country_file(CountryCode::Portugal);
        let portugal = Self::load_yaml::<PortugalConfig>(&portugal_path)?;
        Self::check_schedule(&portugal_path, &portugal.income_tax.brackets)?;

        let poland_path = country_file(CountryCode::Poland);
        let poland = Self::load_yaml::<PolandConfig>(&poland_path)?;
        Self::check_schedule(&poland_path, &poland.income_tax.brackets)?;

        let tables = TaxTables::new(
            metadata,
            exchange_rates,
            CountryTables {
                cyprus,
                united_kingdom,
                france,
                spain,
                portugal,
                poland,
            },
        );

        Ok(Self { tables })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Reports a malformed schedule as a parse error of its file.
    fn check_schedule(path: &Path, brackets: &[Bracket]) -> EngineResult<()> {
        validate_brackets(brackets).map_err(|e| EngineError::ConfigParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Returns the loaded tax tables.
    pub fn tables(&self) -> &TaxTables {
        &self.tables
    }

    /// Returns the tax year metadata.
    pub fn tax_year(&self) -> &TaxYearMetadata {
        self.tables.tax_year()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Currency;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn config_path() -> &'static str {
        "./config/2024"
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_load_valid_configuration() {
        let result = ConfigLoader::load(config_path());
        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());

        let loader = result.unwrap();
        assert_eq!(loader.tax_year().year, "2024");
    }

    #[test]
    fn test_exchange_rates_loaded() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let rates = loader.tables().exchange_rates();

        assert_eq!(rates.base, Currency::Eur);
        assert_eq!(rates.rate(Currency::Gbp).unwrap(), dec("0.85"));
        assert_eq!(rates.rate(Currency::Usd).unwrap(), dec("1.08"));
        assert_eq!(rates.rate(Currency::Pln).unwrap(), dec("4.30"));
    }

    #[test]
    fn test_country_tables_loaded() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let countries = loader.tables().countries();

        assert_eq!(countries.cyprus.income_tax.brackets.len(), 5);
        assert_eq!(countries.united_kingdom.personal_allowance, dec("12570"));
        assert_eq!(countries.france.income_tax.brackets[1].threshold, dec("11294"));
        assert_eq!(countries.spain.social_security.monthly_ceiling, dec("4720.50"));
        assert_eq!(countries.portugal.social_security.ias, dec("509.26"));
        assert_eq!(countries.poland.zus.standard_monthly_base, dec("4694.40"));
    }

    #[test]
    fn test_load_missing_directory_returns_error() {
        let result = ConfigLoader::load("/nonexistent/path");

        match result {
            Err(EngineError::ConfigNotFound { path }) => {
                assert!(path.contains("tax_year.yaml"));
            }
            _ => panic!("Expected ConfigNotFound error"),
        }
    }

    #[test]
    fn test_unordered_schedule_is_a_parse_error() {
        let brackets = vec![
            Bracket::new(dec("0"), dec("0.1")),
            Bracket::new(dec("5000"), dec("0.2")),
            Bracket::new(dec("4000"), dec("0.3")),
        ];
        match ConfigLoader::check_schedule(Path::new("countries/xx.yaml"), &brackets) {
            Err(EngineError::ConfigParseError { path, message }) => {
                assert_eq!(path, "countries/xx.yaml");
                assert!(message.contains("strictly ascending"));
            }
            other => panic!("Expected ConfigParseError, got {:?}", other),
        }
    }
}
