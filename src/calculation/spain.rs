//! Spain income tax, the Beckham law election, and social security for
//! employees and autónomos.

use rust_decimal::Decimal;
use tracing::debug;

use crate::config::{AutonomoConfig, TaxTables};
use crate::error::EngineResult;
use crate::models::{AuditTrace, CountryCode, CountryResult, IncomeTaxMethod, TaxBenefit, TaxInput};

use super::assessment::{Assessment, SocialSecurity, amount, percent};
use super::{CountryRules, clamp_contribution_base, evaluate_brackets, limit_note};

/// Rules for Spain.
#[derive(Debug, Clone, Copy, Default)]
pub struct Spain;

const MONTHS: Decimal = Decimal::from_parts(12, 0, 0, false, 0);

/// Monthly autónomo fee for the given business income.
///
/// New autónomos pay the reduced "tarifa plana". Afterwards the fee comes
/// from the first tier whose bound covers the net monthly income.
pub fn autonomo_monthly_fee(
    config: &AutonomoConfig,
    business_income: Decimal,
    years_in_business: u32,
) -> Decimal {
    if years_in_business < config.tarifa_plana_years {
        return config.tarifa_plana_monthly_fee;
    }

    let net_monthly = business_income * (Decimal::ONE - config.deemed_expenses) / MONTHS;
    config
        .tiers
        .iter()
        .find(|tier| tier.up_to.is_none_or(|up_to| net_monthly <= up_to))
        .or(config.tiers.last())
        .map(|tier| tier.monthly_fee)
        .unwrap_or(Decimal::ZERO)
}

impl CountryRules for Spain {
    fn country(&self) -> CountryCode {
        CountryCode::Spain
    }

    fn compute(&self, input: &TaxInput, tables: &TaxTables) -> EngineResult<CountryResult> {
        let config = &tables.countries().spain;
        let gross = input.gross_income;
        let mut trace = AuditTrace::default();

        let beckham = input.has_benefit(TaxBenefit::EsBeckhamLaw);
        let (income_tax, income_tax_method, tax_regime_note) = if beckham {
            let evaluation = evaluate_brackets(gross, &config.beckham_law.brackets)?;
            trace.record(
                "es_beckham_law",
                "Special Regime for Inbound Workers",
                "Ley 35/2006 art. 93",
                serde_json::json!({ "gross_income": amount(gross) }),
                serde_json::json!({ "income_tax": amount(evaluation.total) }),
                "Flat rates of the special regime replace the general schedule",
            );
            (
                evaluation,
                IncomeTaxMethod::flat_rate("es_beckham_law"),
                "Beckham law: 24% up to 600,000, 47% above".to_string(),
            )
        } else {
            let evaluation = evaluate_brackets(gross, &config.income_tax.brackets)?;
            trace.record(
                "es_income_tax",
                "IRPF General Schedule",
                "Ley 35/2006 art. 63 and 74",
                serde_json::json!({ "taxable_base": amount(gross) }),
                serde_json::json!({ "income_tax": amount(evaluation.total) }),
                format!(
                    "Progressive schedule applied across {} bracket(s)",
                    evaluation.breakdown.len()
                ),
            );
            (
                evaluation,
                IncomeTaxMethod::Progressive,
                "Standard progressive rates".to_string(),
            )
        };

        let social = &config.social_security;
        let mut social_security = SocialSecurity::none("");

        let employment = input.employment_income();
        if employment > Decimal::ZERO {
            let (base, limit) = clamp_contribution_base(
                employment,
                None,
                Some(social.monthly_ceiling * MONTHS),
            );
            social_security = social_security.combine(SocialSecurity {
                amount: base * social.employee_rate,
                note: format!(
                    "Employee social security at {}%{}",
                    percent(social.employee_rate),
                    limit_note(limit)
                ),
                limit,
            });
        }

        let business = input.business_income();
        if business > Decimal::ZERO {
            let fee = autonomo_monthly_fee(&social.autonomo, business, input.years_in_business);
            let note = if input.years_in_business < social.autonomo.tarifa_plana_years {
                format!("Autónomo tarifa plana of {} per month", amount(fee))
            } else {
                format!("Autónomo fee of {} per month", amount(fee))
            };
            social_security = social_security.combine(SocialSecurity {
                amount: fee * MONTHS,
                note,
                limit: None,
            });
        }

        trace.record(
            "es_social_security",
            "Social Security",
            "Real Decreto-ley 13/2022",
            serde_json::json!({
                "employment_income": amount(employment),
                "business_income": amount(business),
                "years_in_business": input.years_in_business,
            }),
            serde_json::json!({ "social_security": amount(social_security.amount) }),
            social_security.note.clone(),
        );

        debug!(
            beckham_law = beckham,
            income_tax = %income_tax.total,
            social_security = %social_security.amount,
            "Spain assessment complete"
        );

        Assessment {
            taxable_base: gross,
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
