//! Core data models for the tax engine.
//!
//! This module contains all the domain models used throughout the engine.

mod bracket;
mod calculation_result;
mod country;
mod money;
mod tax_input;

pub use bracket::{Bracket, BracketSlice};
pub use calculation_result::{
    AuditStep, AuditTrace, AuditWarning, ComparisonReport, ContributionLimit, CountryResult,
    IncomeTaxMethod,
};
pub use country::CountryCode;
pub use money::{Currency, round_money};
pub use tax_input::{MAX_AMOUNT, MaritalStatus, PolishTaxForm, Regime, TaxBenefit, TaxInput};
