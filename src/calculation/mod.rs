//! Calculation logic for the tax engine.
//!
//! This module contains the bracket evaluator, the contribution base clamp,
//! the aggregator, currency conversion, and one rule adapter per supported
//! country. [`compute_country`] and [`compare`] tie them together.

mod aggregate;
mod assessment;
mod brackets;
mod contribution;
mod currency;
mod cyprus;
mod france;
mod poland;
mod portugal;
mod registry;
mod spain;
mod united_kingdom;

pub use aggregate::{Totals, aggregate};
pub use assessment::SocialSecurity;
pub use brackets::{BracketEvaluation, evaluate_brackets, flat_rate, validate_brackets};
pub use contribution::{clamp_contribution_base, limit_note};
pub use currency::{CurrencyConversion, convert_input, convert_result};
pub use cyprus::Cyprus;
pub use france::{France, household_parts};
pub use poland::Poland;
pub use portugal::Portugal;
pub use registry::{CountryRules, compare, compute_country, rules_for};
pub use spain::{Spain, autonomo_monthly_fee};
pub use united_kingdom::UnitedKingdom;
