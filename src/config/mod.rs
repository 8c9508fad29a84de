//! Configuration loading and management for the tax engine.
//!
//! This module provides functionality to load the tax tables of one tax year
//! from YAML files: metadata, an exchange rate snapshot, and one file of
//! brackets, rates, ceilings and phase-in schedules per country.
//!
//! # Example
//!
//! ```no_run
//! use tax_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/2024").unwrap();
//! println!("Loaded tables: {}", config.tax_year().name);
//! ```

mod countries;
mod loader;
mod types;

pub use countries::{
    AutonomoConfig, AutonomoTier, CappedContribution, CyprusConfig, FamilyQuotientConfig,
    FranceConfig, FranceSocialConfig, HealthConfig, LumpSumRates, NationalInsuranceClass,
    NationalInsuranceConfig, PolandConfig, PortugalConfig, PortugalElections, PortugalRegimes,
    PortugalSocialConfig, RegimeCoefficients, SpainConfig, SpainSocialConfig, UnitedKingdomConfig,
    ZusConfig, ZusRates,
};
pub use loader::ConfigLoader;
pub use types::{
    CountryTables, ExchangeRates, IncomeTaxSchedule, PhaseInSchedule, TaxTables, TaxYearMetadata,
};
