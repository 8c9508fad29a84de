//! Cyprus income tax, social insurance and GESY.

use tracing::debug;

use crate::config::TaxTables;
use crate::error::EngineResult;
use crate::models::{AuditTrace, CountryCode, CountryResult, IncomeTaxMethod, TaxBenefit, TaxInput};

use super::assessment::{Assessment, SocialSecurity, amount, percent};
use super::{CountryRules, clamp_contribution_base, evaluate_brackets, limit_note};

/// Rules for Cyprus.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cyprus;

impl CountryRules for Cyprus {
    fn country(&self) -> CountryCode {
        CountryCode::Cyprus
    }

    fn compute(&self, input: &TaxInput, tables: &TaxTables) -> EngineResult<CountryResult> {
        let config = &tables.countries().cyprus;
        let gross = input.gross_income;
        let mut trace = AuditTrace::default();

        let high_skilled = input.has_benefit(TaxBenefit::CyHighSkilledResident);
        let (taxable_base, tax_regime_note) = if high_skilled {
            let exempt = gross * config.high_skilled_exemption;
            trace.record(
                "cy_high_skilled_exemption",
                "High-Skilled Resident Exemption",
                "Income Tax Law 118(I)/2002, s.8(21A)",
                serde_json::json!({ "gross_income": amount(gross) }),
                serde_json::json!({ "exempt_amount": amount(exempt) }),
                format!(
                    "{}% of employment income is exempt for qualifying new residents",
                    percent(config.high_skilled_exemption)
                ),
            );
            (
                gross - exempt,
                format!(
                    "High-skilled resident exemption: {}% of income exempt",
                    percent(config.high_skilled_exemption)
                ),
            )
        } else {
            (gross, "Standard progressive rates".to_string())
        };

        let income_tax = evaluate_brackets(taxable_base, &config.income_tax.brackets)?;
        trace.record(
            "cy_income_tax",
            "Cyprus Income Tax",
            "Income Tax Law 118(I)/2002, s.34",
            serde_json::json!({ "taxable_base": amount(taxable_base) }),
            serde_json::json!({ "income_tax": amount(income_tax.total) }),
            format!(
                "Progressive schedule applied across {} bracket(s)",
                income_tax.breakdown.len()
            ),
        );

        let social_insurance = &config.social_insurance;
        let (si_base, si_limit) =
            clamp_contribution_base(gross, None, Some(social_insurance.annual_ceiling));
        let social_security = SocialSecurity {
            amount: si_base * social_insurance.rate,
            note: format!(
                "Social insurance at {}%{}",
                percent(social_insurance.rate),
                limit_note(si_limit)
            ),
            limit: si_limit,
        };
        trace.record(
            "cy_social_insurance",
            "Social Insurance Fund",
            "Social Insurance Law 59(I)/2010",
            serde_json::json!({
                "gross_income": amount(gross),
                "annual_ceiling": amount(social_insurance.annual_ceiling),
            }),
            serde_json::json!({
                "contribution_base": amount(si_base),
                "social_security": amount(social_security.amount),
            }),
            social_security.note.clone(),
        );

        let gesy = &config.gesy;
        let (gesy_base, _) = clamp_contribution_base(gross, None, Some(gesy.annual_ceiling));
        let other_taxes = gesy_base * gesy.rate;
        trace.record(
            "cy_gesy",
            "General Healthcare System Contribution",
            "General Healthcare System Law 89(I)/2001",
            serde_json::json!({ "contribution_base": amount(gesy_base) }),
            serde_json::json!({ "gesy": amount(other_taxes) }),
            format!(
                "GESY at {}% on income up to {}",
                percent(gesy.rate),
                amount(gesy.annual_ceiling)
            ),
        );

        debug!(
            taxable_base = %taxable_base,
            income_tax = %income_tax.total,
            social_security = %social_security.amount,
            "Cyprus assessment complete"
        );

        Assessment {
            taxable_base,
            income_tax,
            income_tax_method: IncomeTaxMethod::Progressive,
            social_security,
            other_taxes,
            tax_regime_note,
            family_quotient: None,
            audit_trace: trace,
        }
        .into_result(self.country(), input)
    }
}
