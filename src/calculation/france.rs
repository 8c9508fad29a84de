//! France income tax with the family quotient, and social contributions.

use rust_decimal::Decimal;
use tracing::debug;

use crate::config::{FamilyQuotientConfig, TaxTables};
use crate::error::EngineResult;
use crate::models::{
    AuditTrace, CountryCode, CountryResult, IncomeTaxMethod, MaritalStatus, TaxBenefit, TaxInput,
};

use super::assessment::{Assessment, SocialSecurity, amount, percent};
use super::{CountryRules, evaluate_brackets};

/// Rules for France.
#[derive(Debug, Clone, Copy, Default)]
pub struct France;

/// Number of household parts (quotient familial).
///
/// The first children each add a reduced share; every further child adds a
/// full part.
pub fn household_parts(
    config: &FamilyQuotientConfig,
    marital_status: MaritalStatus,
    num_children: u32,
) -> Decimal {
    let adults = match marital_status {
        MaritalStatus::Single => config.single_parts,
        MaritalStatus::Married => config.married_parts,
    };
    let first = num_children.min(config.first_children);
    let further = num_children - first;

    adults
        + Decimal::from(first) * config.first_child_parts
        + Decimal::from(further) * config.additional_child_parts
}

impl CountryRules for France {
    fn country(&self) -> CountryCode {
        CountryCode::France
    }

    fn compute(&self, input: &TaxInput, tables: &TaxTables) -> EngineResult<CountryResult> {
        let config = &tables.countries().france;
        let gross = input.gross_income;
        let mut trace = AuditTrace::default();

        let impatriate = input.has_benefit(TaxBenefit::FrImpatriateRegime);
        let taxable_base = if impatriate {
            let exempt = gross * config.impatriate_exemption;
            trace.record(
                "fr_impatriate_regime",
                "Impatriate Regime",
                "CGI art. 155 B",
                serde_json::json!({ "gross_income": amount(gross) }),
                serde_json::json!({ "exempt_amount": amount(exempt) }),
                format!(
                    "{}% of remuneration exempt as impatriation premium",
                    percent(config.impatriate_exemption)
                ),
            );
            gross - exempt
        } else {
            gross
        };

        let parts = household_parts(
            &config.family_quotient,
            input.marital_status,
            input.num_children,
        );
        let income_tax =
            evaluate_brackets(taxable_base / parts, &config.income_tax.brackets)?.scaled(parts);
        trace.record(
            "fr_income_tax",
            "Income Tax with Family Quotient",
            "CGI art. 194 and 197",
            serde_json::json!({
                "taxable_base": amount(taxable_base),
                "parts": amount(parts),
            }),
            serde_json::json!({ "income_tax": amount(income_tax.total) }),
            format!(
                "Schedule applied to {} per part, multiplied by {} part(s)",
                amount(taxable_base / parts),
                amount(parts)
            ),
        );

        let social = &config.social_contributions;
        let mut social_security = SocialSecurity::none("");
        let employment = input.employment_income();
        if employment > Decimal::ZERO {
            social_security = social_security.combine(SocialSecurity {
                amount: employment * social.employee_rate,
                note: format!("Employee contributions at {}%", percent(social.employee_rate)),
                limit: None,
            });
        }
        let business = input.business_income();
        if business > Decimal::ZERO {
            let acre = social.acre_phase_in.factor(input.years_in_business);
            let rate = social.micro_entrepreneur_rate * acre;
            let note = if acre < Decimal::ONE {
                format!(
                    "Micro-entrepreneur contributions at {}% with ACRE reduction",
                    percent(rate)
                )
            } else {
                format!("Micro-entrepreneur contributions at {}%", percent(rate))
            };
            social_security = social_security.combine(SocialSecurity {
                amount: business * rate,
                note,
                limit: None,
            });
        }
        trace.record(
            "fr_social_contributions",
            "Social Contributions",
            "Code de la sécurité sociale",
            serde_json::json!({
                "employment_income": amount(employment),
                "business_income": amount(business),
                "years_in_business": input.years_in_business,
            }),
            serde_json::json!({ "social_security": amount(social_security.amount) }),
            social_security.note.clone(),
        );

        let tax_regime_note = if impatriate {
            format!(
                "Impatriate regime: {}% exempt; {} household part(s)",
                percent(config.impatriate_exemption),
                amount(parts)
            )
        } else {
            format!("Family quotient of {} part(s)", amount(parts))
        };

        debug!(
            parts = %parts,
            income_tax = %income_tax.total,
            social_security = %social_security.amount,
            "France assessment complete"
        );

        Assessment {
            taxable_base,
            income_tax,
            income_tax_method: IncomeTaxMethod::Progressive,
            social_security,
            other_taxes: Decimal::ZERO,
            tax_regime_note,
            family_quotient: Some(parts),
            audit_trace: trace,
        }
        .into_result(self.country(), input)
    }
}
