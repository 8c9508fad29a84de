//! Portugal income tax (IRS), flat-rate elections and social security.
//!
//! Business income enters the taxable base through the coefficient of the
//! elected accounting regime, reduced during the first years of activity.
//! NHR and IFICI both replace the schedule with a flat rate; NHR wins when
//! both are selected.

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::config::{RegimeCoefficients, TaxTables};
use crate::error::EngineResult;
use crate::models::{
    AuditTrace, CountryCode, CountryResult, IncomeTaxMethod, Regime, TaxBenefit, TaxInput,
};

use super::assessment::{Assessment, SocialSecurity, amount, percent};
use super::{CountryRules, clamp_contribution_base, evaluate_brackets, flat_rate, limit_note};

/// Rules for Portugal.
#[derive(Debug, Clone, Copy, Default)]
pub struct Portugal;

const MONTHS: Decimal = Decimal::from_parts(12, 0, 0, false, 0);

impl CountryRules for Portugal {
    fn country(&self) -> CountryCode {
        CountryCode::Portugal
    }

    fn compute(&self, input: &TaxInput, tables: &TaxTables) -> EngineResult<CountryResult> {
        let config = &tables.countries().portugal;
        let mut trace = AuditTrace::default();

        let employment = input.employment_income();
        let business = input.business_income();

        let regime = match input.regime {
            Some(regime) => regime,
            None => {
                if business > Decimal::ZERO {
                    warn!("No accounting regime selected, assuming simplified regime");
                    trace.warn(
                        "MISSING_REGIME_SELECTION",
                        "No accounting regime was selected; the simplified regime was assumed",
                        "medium",
                    );
                }
                Regime::Simplified
            }
        };
        let coefficients: &RegimeCoefficients = match regime {
            Regime::Simplified => &config.regimes.simplified,
            Regime::OrganizedAccounting => &config.regimes.organized_accounting,
        };

        let phase_in = config.income_tax_phase_in.factor(input.years_in_business);
        let taxable_business = business * coefficients.income_tax * phase_in;
        let taxable_base = employment + taxable_business;
        if business > Decimal::ZERO {
            trace.record(
                "pt_business_income",
                "Taxable Business Income",
                "CIRS art. 31",
                serde_json::json!({
                    "business_income": amount(business),
                    "regime": regime.name(),
                    "years_in_business": input.years_in_business,
                }),
                serde_json::json!({
                    "coefficient": amount(coefficients.income_tax),
                    "phase_in_factor": amount(phase_in),
                    "taxable_business_income": amount(taxable_business),
                }),
                format!(
                    "{}% of business income is taxable, {}% of that in year {}",
                    percent(coefficients.income_tax),
                    percent(phase_in),
                    input.years_in_business + 1
                ),
            );
        }

        let nhr = input.has_benefit(TaxBenefit::PtNhr);
        let ifici = input.has_benefit(TaxBenefit::PtIfici);
        if nhr && ifici {
            trace.warn(
                "CONFLICTING_ELECTIONS",
                "NHR and IFICI cannot be combined; IFICI was ignored",
                "low",
            );
        }

        let (income_tax, income_tax_method, election_note) = if nhr {
            (
                flat_rate(taxable_base, config.elections.nhr)?,
                IncomeTaxMethod::flat_rate("pt_nhr"),
                Some(format!("NHR flat rate of {}%", percent(config.elections.nhr))),
            )
        } else if ifici {
            (
                flat_rate(taxable_base, config.elections.ifici)?,
                IncomeTaxMethod::flat_rate("pt_ifici"),
                Some(format!("IFICI flat rate of {}%", percent(config.elections.ifici))),
            )
        } else {
            (
                evaluate_brackets(taxable_base, &config.income_tax.brackets)?,
                IncomeTaxMethod::Progressive,
                None,
            )
        };
        trace.record(
            "pt_income_tax",
            "IRS",
            "CIRS art. 68 and 72",
            serde_json::json!({ "taxable_base": amount(taxable_base) }),
            serde_json::json!({ "income_tax": amount(income_tax.total) }),
            election_note
                .clone()
                .unwrap_or_else(|| "Progressive schedule applied".to_string()),
        );

        let social = &config.social_security;
        let monthly_ceiling = social.ias * social.ceiling_ias_multiple;
        let mut social_security = SocialSecurity::none("");

        if employment > Decimal::ZERO {
            let (base, limit) = clamp_contribution_base(
                employment,
                Some(social.ias * MONTHS),
                Some(monthly_ceiling * MONTHS),
            );
            social_security = social_security.combine(SocialSecurity {
                amount: base * social.employee_rate,
                note: format!(
                    "Employee contributions at {}%{}",
                    percent(social.employee_rate),
                    limit_note(limit)
                ),
                limit,
            });
        }

        if business > Decimal::ZERO {
            let factor = match regime {
                Regime::Simplified => social.simplified_phase_in.factor(input.years_in_business),
                Regime::OrganizedAccounting => Decimal::ONE,
            };
            let relevant = business * coefficients.social_security;
            let (base, limit) =
                clamp_contribution_base(relevant, None, Some(monthly_ceiling * MONTHS));
            let contribution = base * social.self_employed_rate * factor;
            let note = if factor.is_zero() {
                "Self-employed contributions exempt in the first year".to_string()
            } else if factor < Decimal::ONE {
                format!(
                    "Self-employed contributions at {}% on {}% of income, {}% phased in{}",
                    percent(social.self_employed_rate),
                    percent(coefficients.social_security),
                    percent(factor),
                    limit_note(limit)
                )
            } else {
                format!(
                    "Self-employed contributions at {}% on {}% of income{}",
                    percent(social.self_employed_rate),
                    percent(coefficients.social_security),
                    limit_note(limit)
                )
            };
            social_security = social_security.combine(SocialSecurity {
                amount: contribution,
                note,
                limit,
            });
        }

        trace.record(
            "pt_social_security",
            "Social Security",
            "Código Contributivo, Lei 110/2009",
            serde_json::json!({
                "employment_income": amount(employment),
                "business_income": amount(business),
                "ias": amount(social.ias),
            }),
            serde_json::json!({ "social_security": amount(social_security.amount) }),
            social_security.note.clone(),
        );

        let tax_regime_note = match (&election_note, business > Decimal::ZERO) {
            (Some(election), true) => format!("{}; {}", election, regime.name()),
            (Some(election), false) => election.clone(),
            (None, true) => regime.name().to_string(),
            (None, false) => "Standard progressive rates".to_string(),
        };

        debug!(
            regime = regime.name(),
            taxable_base = %taxable_base,
            income_tax = %income_tax.total,
            social_security = %social_security.amount,
            "Portugal assessment complete"
        );

        Assessment {
            taxable_base,
            income_tax,
            income_tax_method,
            social_security,
            other_taxes: Decimal::ZERO,
            tax_regime_note,
            family_quotient: None,
            audit_trace: trace,
        }
        .into_result(self.country(), input)
    }
}
