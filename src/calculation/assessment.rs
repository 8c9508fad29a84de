//! Assembly of the pieces a country adapter produces into a [`CountryResult`].

use rust_decimal::Decimal;

use crate::error::EngineResult;
use crate::models::{
    AuditTrace, ContributionLimit, CountryCode, CountryResult, IncomeTaxMethod, TaxInput,
};

use super::{BracketEvaluation, aggregate};

/// The social security outcome of one country.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocialSecurity {
    /// Annual contributions.
    pub amount: Decimal,
    /// How the contributions were derived.
    pub note: String,
    /// The bound applied to the contribution base, if any.
    pub limit: Option<ContributionLimit>,
}

impl SocialSecurity {
    /// No contributions due.
    pub fn none(note: impl Into<String>) -> Self {
        Self {
            amount: Decimal::ZERO,
            note: note.into(),
            limit: None,
        }
    }

    /// Adds another contribution, joining the notes.
    pub fn combine(self, other: SocialSecurity) -> Self {
        let note = match (self.note.is_empty(), other.note.is_empty()) {
            (true, _) => other.note,
            (_, true) => self.note,
            _ => format!("{}; {}", self.note, other.note),
        };
        Self {
            amount: self.amount + other.amount,
            note,
            limit: self.limit.or(other.limit),
        }
    }
}

/// Everything an adapter decided, in the country's native currency.
#[derive(Debug, Clone)]
pub(crate) struct Assessment {
    pub taxable_base: Decimal,
    pub income_tax: BracketEvaluation,
    pub income_tax_method: IncomeTaxMethod,
    pub social_security: SocialSecurity,
    pub other_taxes: Decimal,
    pub tax_regime_note: String,
    pub family_quotient: Option<Decimal>,
    pub audit_trace: AuditTrace,
}

impl Assessment {
    /// Aggregates the deductions and builds the result.
    pub fn into_result(
        self,
        country: CountryCode,
        input: &TaxInput,
    ) -> EngineResult<CountryResult> {
        let totals = aggregate(
            input.gross_income,
            self.income_tax.total,
            self.social_security.amount,
            self.other_taxes,
        )?;

        // Minimum contributions can exceed a very small income.
        let mut audit_trace = self.audit_trace;
        if totals.total_deductions > input.gross_income {
            audit_trace.warn(
                "DEDUCTIONS_EXCEED_GROSS",
                format!(
                    "Deductions of {} exceed gross income of {}; net income is negative",
                    totals.total_deductions.round_dp(2),
                    input.gross_income
                ),
                "high",
            );
        }

        Ok(CountryResult {
            country,
            currency: input.currency,
            gross_income: input.gross_income,
            taxable_base: self.taxable_base,
            income_tax: self.income_tax.total,
            income_tax_method: self.income_tax_method,
            income_tax_breakdown: self.income_tax.breakdown,
            social_security: self.social_security.amount,
            social_security_note: self.social_security.note,
            social_security_limit: self.social_security.limit,
            other_taxes: self.other_taxes,
            total_deductions: totals.total_deductions,
            net_income: totals.net_income,
            effective_rate: totals.effective_rate,
            tax_regime_note: self.tax_regime_note,
            family_quotient: self.family_quotient,
            audit_trace,
        })
    }
}

/// Formats a fractional rate as a percentage ("0.265" -> "26.5").
pub(crate) fn percent(rate: Decimal) -> String {
    (rate * Decimal::ONE_HUNDRED).normalize().to_string()
}

/// Formats an amount for notes and audit payloads.
pub(crate) fn amount(value: Decimal) -> String {
    value.normalize().to_string()
}
