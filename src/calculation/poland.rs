//! Poland income tax (PIT), ZUS social insurance and health insurance.
//!
//! The elected form of taxation applies to the whole income of a taxpayer
//! running a business. Sole proprietors contribute on a declared monthly
//! base which the ZUS reliefs replace or waive.

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::config::{PolandConfig, TaxTables, ZusConfig};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AuditTrace, ContributionLimit, CountryCode, CountryResult, IncomeTaxMethod, PolishTaxForm,
    TaxBenefit, TaxInput,
};

use super::assessment::{Assessment, SocialSecurity, amount, percent};
use super::{
    BracketEvaluation, CountryRules, clamp_contribution_base, evaluate_brackets, flat_rate,
    limit_note,
};

/// Rules for Poland.
#[derive(Debug, Clone, Copy, Default)]
pub struct Poland;

const MONTHS: Decimal = Decimal::from_parts(12, 0, 0, false, 0);

const ZUS_BENEFITS: [TaxBenefit; 3] = [
    TaxBenefit::PlUlgaNaStart,
    TaxBenefit::PlPreferencyjneZus,
    TaxBenefit::PlMalyZusPlus,
];

/// Checks the ZUS reliefs against the business profile.
fn validate_benefits(input: &TaxInput, zus: &ZusConfig) -> EngineResult<()> {
    let business = input.business_income() > Decimal::ZERO;
    if !business && ZUS_BENEFITS.iter().any(|benefit| input.has_benefit(*benefit)) {
        return Err(EngineError::invalid_input(
            "benefits",
            "ZUS reliefs require sole proprietorship income",
        ));
    }
    if input.has_benefit(TaxBenefit::PlUlgaNaStart) && input.years_in_business != 0 {
        return Err(EngineError::invalid_input(
            "benefits",
            "Ulga na Start is only available in the first year of business",
        ));
    }
    if input.has_benefit(TaxBenefit::PlPreferencyjneZus)
        && input.years_in_business >= zus.preferential_years
    {
        return Err(EngineError::invalid_input(
            "benefits",
            format!(
                "Preferencyjne ZUS is only available in the first {} years of business",
                zus.preferential_years
            ),
        ));
    }
    Ok(())
}

fn income_tax(
    config: &PolandConfig,
    form: PolishTaxForm,
    base: Decimal,
) -> EngineResult<(BracketEvaluation, IncomeTaxMethod, String)> {
    Ok(match form {
        PolishTaxForm::General => (
            evaluate_brackets(base, &config.income_tax.brackets)?,
            IncomeTaxMethod::Progressive,
            "General scale".to_string(),
        ),
        PolishTaxForm::Flat => (
            flat_rate(base, config.flat_rate)?,
            IncomeTaxMethod::flat_rate("pl_flat"),
            format!("Flat tax of {}%", percent(config.flat_rate)),
        ),
        PolishTaxForm::LumpSumIt => (
            flat_rate(base, config.lump_sum.it)?,
            IncomeTaxMethod::flat_rate("pl_lump_sum_it"),
            format!("Lump sum of {}% on IT services", percent(config.lump_sum.it)),
        ),
        PolishTaxForm::LumpSumServices => (
            flat_rate(base, config.lump_sum.services)?,
            IncomeTaxMethod::flat_rate("pl_lump_sum_services"),
            format!("Lump sum of {}% on services", percent(config.lump_sum.services)),
        ),
    })
}

/// Social contributions of a sole proprietor.
fn business_contributions(input: &TaxInput, zus: &ZusConfig) -> SocialSecurity {
    if input.has_benefit(TaxBenefit::PlUlgaNaStart) {
        return SocialSecurity::none("Ulga na Start: social contributions waived");
    }

    let (monthly_base, limit, label) = if input.has_benefit(TaxBenefit::PlPreferencyjneZus) {
        (zus.preferential_monthly_base(), None, "Preferencyjne ZUS")
    } else if input.has_benefit(TaxBenefit::PlMalyZusPlus) {
        let income_base = input.business_income() / MONTHS * zus.maly_zus_income_ratio;
        let (base, limit) = clamp_contribution_base(
            income_base,
            Some(zus.preferential_monthly_base()),
            Some(zus.standard_monthly_base),
        );
        (base, limit, "Mały ZUS Plus")
    } else {
        (zus.standard_monthly_base, None, "Standard ZUS")
    };

    let annual_base = monthly_base * MONTHS;
    let capped_base = annual_base.min(zus.annual_base_limit);
    let rates = &zus.self_employed;

    SocialSecurity {
        amount: capped_base * rates.capped() + annual_base * rates.uncapped(),
        note: format!(
            "{} on a declared base of {} per month{}",
            label,
            amount(monthly_base),
            limit_note(limit)
        ),
        limit,
    }
}

/// Social contributions withheld from a salary.
fn employee_contributions(employment: Decimal, zus: &ZusConfig) -> SocialSecurity {
    let rates = &zus.employee;
    let (capped_base, limit) = if employment > zus.annual_base_limit {
        (zus.annual_base_limit, Some(ContributionLimit::Ceiling))
    } else {
        (employment, None)
    };

    SocialSecurity {
        amount: capped_base * rates.capped() + employment * rates.uncapped(),
        note: format!(
            "Employee ZUS at {}%{}",
            percent(rates.capped() + rates.uncapped()),
            limit_note(limit)
        ),
        limit,
    }
}

/// Health insurance for the form of taxation.
fn health_insurance(
    config: &PolandConfig,
    form: PolishTaxForm,
    income: Decimal,
    has_business: bool,
) -> Decimal {
    let health = &config.health;
    let contribution = match form {
        PolishTaxForm::General => income * health.general_rate,
        PolishTaxForm::Flat => income * health.flat_rate,
        PolishTaxForm::LumpSumIt | PolishTaxForm::LumpSumServices => {
            health.lump_sum_monthly_base * MONTHS * health.general_rate
        }
    };

    if has_business {
        let minimum = config.zus.minimum_wage * MONTHS * health.general_rate;
        contribution.max(minimum)
    } else {
        contribution
    }
}

impl CountryRules for Poland {
    fn country(&self) -> CountryCode {
        CountryCode::Poland
    }

    fn compute(&self, input: &TaxInput, tables: &TaxTables) -> EngineResult<CountryResult> {
        let config = &tables.countries().poland;
        let gross = input.gross_income;
        let employment = input.employment_income();
        let business = input.business_income();
        let has_business = business > Decimal::ZERO;
        let mut trace = AuditTrace::default();

        validate_benefits(input, &config.zus)?;

        let form = match (input.tax_form, has_business) {
            (Some(form), true) => form,
            (Some(PolishTaxForm::General), false) => PolishTaxForm::General,
            (Some(_), false) => {
                trace.warn(
                    "TAX_FORM_REQUIRES_BUSINESS",
                    "Only sole proprietors elect a form of taxation; general scale applied",
                    "low",
                );
                PolishTaxForm::General
            }
            (None, true) => {
                warn!("No form of taxation selected, assuming general scale");
                trace.warn(
                    "MISSING_TAX_FORM_SELECTION",
                    "No form of taxation was selected; the general scale was assumed",
                    "medium",
                );
                PolishTaxForm::General
            }
            (None, false) => PolishTaxForm::General,
        };

        let (income_tax, income_tax_method, tax_regime_note) = income_tax(config, form, gross)?;
        trace.record(
            "pl_income_tax",
            "PIT",
            "Ustawa o podatku dochodowym od osób fizycznych, art. 27 and 30c",
            serde_json::json!({
                "taxable_base": amount(gross),
                "tax_form": format!("{:?}", form),
            }),
            serde_json::json!({ "income_tax": amount(income_tax.total) }),
            tax_regime_note.clone(),
        );

        let mut social_security = SocialSecurity::none("");
        if employment > Decimal::ZERO {
            social_security =
                social_security.combine(employee_contributions(employment, &config.zus));
        }
        if has_business {
            social_security = social_security.combine(business_contributions(input, &config.zus));
        }
        trace.record(
            "pl_zus",
            "ZUS Social Insurance",
            "Ustawa o systemie ubezpieczeń społecznych",
            serde_json::json!({
                "employment_income": amount(employment),
                "business_income": amount(business),
                "years_in_business": input.years_in_business,
            }),
            serde_json::json!({ "social_security": amount(social_security.amount) }),
            social_security.note.clone(),
        );

        let health_base = (gross - social_security.amount).max(Decimal::ZERO);
        let other_taxes = health_insurance(config, form, health_base, has_business);
        trace.record(
            "pl_health",
            "Health Insurance",
            "Ustawa o świadczeniach opieki zdrowotnej, art. 79 to 81",
            serde_json::json!({ "health_base": amount(health_base) }),
            serde_json::json!({ "health_insurance": amount(other_taxes) }),
            "Health insurance for the elected form of taxation",
        );

        debug!(
            form = ?form,
            income_tax = %income_tax.total,
            social_security = %social_security.amount,
            health = %other_taxes,
            "Poland assessment complete"
        );

        Assessment {
            taxable_base: gross,
            income_tax,
            income_tax_method,
            social_security,
            other_taxes,
            tax_regime_note,
            family_quotient: None,
            audit_trace: trace,
        }
        .into_result(self.country(), input)
    }
}
