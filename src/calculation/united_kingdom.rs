//! United Kingdom income tax and National Insurance.
//!
//! The personal allowance is withdrawn at £1 for every £2 of income above
//! the taper threshold. The bracket schedule is rebuilt for every
//! computation because its thresholds move with the allowance.

use rust_decimal::Decimal;
use tracing::debug;

use crate::config::{NationalInsuranceClass, TaxTables, UnitedKingdomConfig};
use crate::error::EngineResult;
use crate::models::{
    AuditTrace, Bracket, CountryCode, CountryResult, IncomeTaxMethod, TaxBenefit, TaxInput,
};

use super::assessment::{Assessment, SocialSecurity, amount, percent};
use super::{CountryRules, evaluate_brackets};

/// Rules for the United Kingdom.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnitedKingdom;

/// Computes the allowance after the high-income taper.
fn personal_allowance(config: &UnitedKingdomConfig, gross: Decimal) -> Decimal {
    if gross <= config.taper_threshold {
        return config.personal_allowance;
    }
    let reduction = ((gross - config.taper_threshold) / Decimal::TWO).floor();
    (config.personal_allowance - reduction).max(Decimal::ZERO)
}

/// Builds the schedule for a given allowance.
///
/// The 0% band is left out when the allowance is fully withdrawn so the
/// thresholds stay strictly ascending.
fn income_tax_brackets(config: &UnitedKingdomConfig, allowance: Decimal) -> Vec<Bracket> {
    let mut brackets = Vec::with_capacity(4);
    if allowance > Decimal::ZERO {
        brackets.push(Bracket::new(Decimal::ZERO, Decimal::ZERO));
    }
    brackets.push(Bracket::new(allowance, config.basic_rate));

    let higher_rate_threshold = allowance + config.basic_rate_band;
    if higher_rate_threshold < config.additional_rate_threshold {
        brackets.push(Bracket::new(higher_rate_threshold, config.higher_rate));
    }
    brackets.push(Bracket::new(
        config.additional_rate_threshold,
        config.additional_rate,
    ));
    brackets
}

fn national_insurance(
    class: &NationalInsuranceClass,
    label: &str,
    earnings: Decimal,
) -> EngineResult<SocialSecurity> {
    if earnings <= class.lower_threshold {
        return Ok(SocialSecurity::none(format!(
            "{}: below primary threshold",
            label
        )));
    }

    let contribution = evaluate_brackets(earnings, &class.brackets())?;
    let note = if earnings > class.upper_limit {
        format!(
            "{}: {}% between {} and {}, {}% above",
            label,
            percent(class.main_rate),
            amount(class.lower_threshold),
            amount(class.upper_limit),
            percent(class.upper_rate)
        )
    } else {
        format!(
            "{}: {}% above {}",
            label,
            percent(class.main_rate),
            amount(class.lower_threshold)
        )
    };

    Ok(SocialSecurity {
        amount: contribution.total,
        note,
        limit: None,
    })
}

impl CountryRules for UnitedKingdom {
    fn country(&self) -> CountryCode {
        CountryCode::UnitedKingdom
    }

    fn compute(&self, input: &TaxInput, tables: &TaxTables) -> EngineResult<CountryResult> {
        let config = &tables.countries().united_kingdom;
        let gross = input.gross_income;
        let mut trace = AuditTrace::default();

        let tapered = personal_allowance(config, gross);
        let blind = input.has_benefit(TaxBenefit::UkBlindPersonsAllowance);
        let allowance = if blind {
            tapered + config.blind_persons_allowance
        } else {
            tapered
        };

        trace.record(
            "uk_personal_allowance",
            "Personal Allowance",
            "Income Tax Act 2007, s.35 and s.38",
            serde_json::json!({
                "gross_income": amount(gross),
                "blind_persons_allowance": blind,
            }),
            serde_json::json!({ "allowance": amount(allowance) }),
            if tapered < config.personal_allowance {
                format!(
                    "Allowance reduced by £1 for every £2 above {}",
                    amount(config.taper_threshold)
                )
            } else {
                "Full personal allowance".to_string()
            },
        );

        let brackets = income_tax_brackets(config, allowance);
        let income_tax = evaluate_brackets(gross, &brackets)?;
        trace.record(
            "uk_income_tax",
            "Income Tax",
            "Income Tax Act 2007, s.6 to s.10",
            serde_json::json!({ "taxable_base": amount(gross) }),
            serde_json::json!({ "income_tax": amount(income_tax.total) }),
            format!(
                "Basic rate band of {} above the allowance",
                amount(config.basic_rate_band)
            ),
        );

        let ni = &config.national_insurance;
        let mut social_security =
            national_insurance(&ni.class_1, "Class 1 NI", input.employment_income())?;
        if input.business_income() > Decimal::ZERO {
            social_security = social_security.combine(national_insurance(
                &ni.class_4,
                "Class 4 NI",
                input.business_income(),
            )?);
        }
        trace.record(
            "uk_national_insurance",
            "National Insurance",
            "Social Security Contributions and Benefits Act 1992",
            serde_json::json!({
                "employment_income": amount(input.employment_income()),
                "business_income": amount(input.business_income()),
            }),
            serde_json::json!({ "national_insurance": amount(social_security.amount) }),
            social_security.note.clone(),
        );

        let tax_regime_note = if blind {
            format!(
                "Personal allowance of {} including blind person's allowance",
                amount(allowance)
            )
        } else {
            format!("Personal allowance of {}", amount(allowance))
        };

        debug!(
            allowance = %allowance,
            income_tax = %income_tax.total,
            national_insurance = %social_security.amount,
            "United Kingdom assessment complete"
        );

        Assessment {
            taxable_base: gross,
            income_tax,
            income_tax_method: IncomeTaxMethod::Progressive,
            social_security,
            other_taxes: Decimal::ZERO,
            tax_regime_note,
            family_quotient: None,
            audit_trace: trace,
        }
        .into_result(self.country(), input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigLoader;
    use crate::models::Currency;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn tables() -> TaxTables {
        ConfigLoader::load("./config/2024").unwrap().tables().clone()
    }

    fn compute(input: &TaxInput) -> CountryResult {
        UnitedKingdom.compute(input, &tables()).unwrap()
    }

    #[test]
    fn test_uk_40000_basic_rate() {
        let result = compute(&TaxInput::new(dec("40000"), Currency::Gbp));

        assert_eq!(result.income_tax, dec("5486"));
        assert_eq!(result.social_security, dec("2194.40"));
        assert!(result.social_security_note.contains("Class 1 NI"));
        assert_eq!(result.income_tax_breakdown.len(), 2);
        assert_eq!(result.income_tax_breakdown[0].taxable_amount, dec("12570"));
    }

    #[test]
    fn test_higher_rate_and_upper_ni_band() {
        let result = compute(&TaxInput::new(dec("60000"), Currency::Gbp));

        // 37,700 at 20% + 9,730 at 40%
        assert_eq!(result.income_tax, dec("7540") + dec("3892"));
        // 37,700 at 8% + 9,730 at 2%
        assert_eq!(result.social_security, dec("3016") + dec("194.60"));
    }

    #[test]
    fn test_allowance_tapers_above_100000() {
        let tables = tables();
        let config = &tables.countries().united_kingdom;
        assert_eq!(personal_allowance(config, dec("100000")), dec("12570"));
        assert_eq!(personal_allowance(config, dec("110001")), dec("7570"));
        assert_eq!(personal_allowance(config, dec("125140")), Decimal::ZERO);
        assert_eq!(personal_allowance(config, dec("200000")), Decimal::ZERO);
    }

    #[test]
    fn test_no_zero_band_once_allowance_is_gone() {
        let result = compute(&TaxInput::new(dec("150000"), Currency::Gbp));

        assert_eq!(result.income_tax_breakdown[0].rate, dec("0.20"));
        // 37,700 at 20% + 87,440 at 40% + 24,860 at 45%
        assert_eq!(result.income_tax, dec("7540") + dec("34976") + dec("11187"));
    }

    #[test]
    fn test_blind_persons_allowance_extends_zero_band() {
        let input = TaxInput::new(dec("40000"), Currency::Gbp)
            .with_benefit(TaxBenefit::UkBlindPersonsAllowance);
        let result = compute(&input);

        assert_eq!(result.income_tax, dec("5486") - dec("614"));
        assert!(result.tax_regime_note.contains("blind person's allowance"));
    }

    #[test]
    fn test_below_primary_threshold() {
        let result = compute(&TaxInput::new(dec("10000"), Currency::Gbp));
        assert_eq!(result.income_tax, Decimal::ZERO);
        assert_eq!(result.social_security, Decimal::ZERO);
        assert!(result.social_security_note.contains("below primary threshold"));
    }

    #[test]
    fn test_class_4_on_self_employment() {
        let input = TaxInput::new(dec("40000"), Currency::Gbp)
            .with_sole_proprietorship(dec("40000"), 4);
        let result = compute(&input);

        assert_eq!(result.social_security, dec("1645.80"));
        assert!(result.social_security_note.contains("Class 1 NI: below primary threshold"));
        assert!(result.social_security_note.contains("Class 4 NI"));
    }
}
