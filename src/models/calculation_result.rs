//! Calculation result models for the tax engine.
//!
//! This module contains the [`CountryResult`] type produced by each country
//! adapter, the [`ComparisonReport`] aggregating several countries, and the
//! audit trace recording every rule that was applied.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{BracketSlice, CountryCode, Currency, round_money};

/// How the income tax of a computation was obtained.
///
/// A computation uses either the progressive schedule or one flat-rate
/// election, never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IncomeTaxMethod {
    /// The country's progressive bracket schedule.
    Progressive,
    /// A flat-rate election replacing the schedule.
    FlatRate {
        /// Identifier of the election (e.g., "pt_nhr", "pl_flat").
        election: String,
    },
}

impl IncomeTaxMethod {
    /// Creates a flat-rate method for the named election.
    pub fn flat_rate(election: impl Into<String>) -> Self {
        IncomeTaxMethod::FlatRate {
            election: election.into(),
        }
    }

    /// Returns true if a flat-rate election applied.
    pub fn is_flat_rate(&self) -> bool {
        matches!(self, IncomeTaxMethod::FlatRate { .. })
    }
}

/// Which bound of a contribution base was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContributionLimit {
    /// Income above the ceiling was not contributed on.
    Ceiling,
    /// The floor was substituted for a lower income.
    Floor,
}

/// A single step in the audit trace recording a calculation decision.
///
/// Each step captures the input, output, and reasoning for a rule application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The legal or published source of the rule.
    pub reference: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A warning generated during calculation.
///
/// Warnings indicate potential issues that don't prevent calculation
/// but may require attention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level (e.g., "low", "medium", "high").
    pub severity: String,
}

/// The audit trace for one country computation.
///
/// Records every decision made during the calculation process for
/// transparency.
///
/// # Example
///
/// ```
/// use tax_engine::models::AuditTrace;
///
/// let mut trace = AuditTrace::default();
/// trace.record(
///     "cy_income_tax",
///     "Cyprus Income Tax",
///     "Income Tax Law 118(I)/2002",
///     serde_json::json!({"taxable_base": "50000"}),
///     serde_json::json!({"income_tax": "7885"}),
///     "Progressive schedule applied",
/// );
/// assert_eq!(trace.steps[0].step_number, 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of calculation steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during calculation.
    pub warnings: Vec<AuditWarning>,
}

impl AuditTrace {
    /// Appends a step, numbering it after the previous one.
    pub fn record(
        &mut self,
        rule_id: &str,
        rule_name: &str,
        reference: &str,
        input: serde_json::Value,
        output: serde_json::Value,
        reasoning: impl Into<String>,
    ) {
        let step_number = self.steps.len() as u32 + 1;
        self.steps.push(AuditStep {
            step_number,
            rule_id: rule_id.to_string(),
            rule_name: rule_name.to_string(),
            reference: reference.to_string(),
            input,
            output,
            reasoning: reasoning.into(),
        });
    }

    /// Appends a warning.
    pub fn warn(&mut self, code: &str, message: impl Into<String>, severity: &str) {
        self.warnings.push(AuditWarning {
            code: code.to_string(),
            message: message.into(),
            severity: severity.to_string(),
        });
    }

    /// Returns true if a step with the given rule id was recorded.
    pub fn has_rule(&self, rule_id: &str) -> bool {
        self.steps.iter().any(|step| step.rule_id == rule_id)
    }

    /// Returns true if a warning with the given code was recorded.
    pub fn has_warning(&self, code: &str) -> bool {
        self.warnings.iter().any(|warning| warning.code == code)
    }
}

/// The estimate for one country.
///
/// Amounts are held in full precision; call [`CountryResult::rounded`] at the
/// presentation boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryResult {
    /// The country this result is for.
    pub country: CountryCode,
    /// The currency all amounts are expressed in.
    pub currency: Currency,
    /// Total income the estimate was computed for.
    pub gross_income: Decimal,
    /// The amount the schedule or flat rate was applied to.
    pub taxable_base: Decimal,
    /// Total income tax.
    pub income_tax: Decimal,
    /// Whether the schedule or a flat election produced the income tax.
    pub income_tax_method: IncomeTaxMethod,
    /// Per-rate breakdown of the income tax, lowest rate first.
    pub income_tax_breakdown: Vec<BracketSlice>,
    /// Total social security contributions.
    pub social_security: Decimal,
    /// Explanation of how social security was derived.
    pub social_security_note: String,
    /// Set when a contribution ceiling or floor was applied.
    pub social_security_limit: Option<ContributionLimit>,
    /// Other taxes (e.g., health contributions) not part of the above.
    pub other_taxes: Decimal,
    /// income_tax + social_security + other_taxes.
    pub total_deductions: Decimal,
    /// gross_income - total_deductions.
    pub net_income: Decimal,
    /// total_deductions / gross_income * 100, rounded to 2 decimals.
    pub effective_rate: Decimal,
    /// Explanation of the regime or elections that shaped the taxable base.
    pub tax_regime_note: String,
    /// Number of household parts, for countries using a family quotient.
    pub family_quotient: Option<Decimal>,
    /// Trace of the rules applied.
    pub audit_trace: AuditTrace,
}

impl CountryResult {
    /// Returns a copy with every monetary amount rounded to 2 decimals.
    pub fn rounded(&self) -> Self {
        let mut rounded = self.clone();
        rounded.gross_income = round_money(self.gross_income);
        rounded.taxable_base = round_money(self.taxable_base);
        rounded.income_tax = round_money(self.income_tax);
        rounded.income_tax_breakdown = self
            .income_tax_breakdown
            .iter()
            .map(|slice| BracketSlice {
                rate: slice.rate,
                taxable_amount: round_money(slice.taxable_amount),
                tax_amount: round_money(slice.tax_amount),
            })
            .collect();
        rounded.social_security = round_money(self.social_security);
        rounded.other_taxes = round_money(self.other_taxes);
        rounded.total_deductions = round_money(self.total_deductions);
        rounded.net_income = round_money(self.net_income);
        rounded
    }
}

/// Results for several countries computed from the same input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    /// Unique identifier for this calculation.
    pub calculation_id: Uuid,
    /// When the calculation was performed.
    pub timestamp: DateTime<Utc>,
    /// The version of the engine that performed the calculation.
    pub engine_version: String,
    /// The tax year of the tables used.
    pub tax_year: String,
    /// The currency all results are displayed in.
    pub currency: Currency,
    /// Per-country results, in the order the countries were requested.
    pub results: Vec<CountryResult>,
    /// The country with the lowest effective rate, if any result exists.
    pub lowest_effective_rate: Option<CountryCode>,
}

impl ComparisonReport {
    /// Returns the result for a country, if it was requested.
    pub fn result_for(&self, country: CountryCode) -> Option<&CountryResult> {
        self.results.iter().find(|result| result.country == country)
    }
}
