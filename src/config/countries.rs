//! Country-specific configuration sections.
//!
//! One struct per `countries/<code>.yaml` file. Rates are fractions
//! (0.083 for 8.3%) and amounts are annual unless the field name says
//! otherwise.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::models::Bracket;

use super::types::{IncomeTaxSchedule, PhaseInSchedule};

/// A flat contribution rate applied up to an annual ceiling.
#[derive(Debug, Clone, Deserialize)]
pub struct CappedContribution {
    /// The contribution rate.
    pub rate: Decimal,
    /// Income above this amount is not contributed on.
    pub annual_ceiling: Decimal,
}

/// Cyprus tables (`countries/cy.yaml`).
#[derive(Debug, Clone, Deserialize)]
pub struct CyprusConfig {
    /// Progressive income tax schedule.
    pub income_tax: IncomeTaxSchedule,
    /// Share of gross income exempt for high-skilled residents.
    pub high_skilled_exemption: Decimal,
    /// Social insurance fund contribution.
    pub social_insurance: CappedContribution,
    /// General healthcare system (GESY) contribution.
    pub gesy: CappedContribution,
}

/// A two-band National Insurance schedule.
#[derive(Debug, Clone, Deserialize)]
pub struct NationalInsuranceClass {
    /// Earnings below this amount are not contributed on.
    pub lower_threshold: Decimal,
    /// Earnings above this amount pay the upper rate.
    pub upper_limit: Decimal,
    /// Rate between the threshold and the limit.
    pub main_rate: Decimal,
    /// Rate above the limit.
    pub upper_rate: Decimal,
}

impl NationalInsuranceClass {
    /// Expresses the class as a bracket schedule.
    pub fn brackets(&self) -> Vec<Bracket> {
        vec![
            Bracket::new(Decimal::ZERO, Decimal::ZERO),
            Bracket::new(self.lower_threshold, self.main_rate),
            Bracket::new(self.upper_limit, self.upper_rate),
        ]
    }
}

/// National Insurance classes.
#[derive(Debug, Clone, Deserialize)]
pub struct NationalInsuranceConfig {
    /// Class 1 primary contributions on employment income.
    pub class_1: NationalInsuranceClass,
    /// Class 4 contributions on self-employed profits.
    pub class_4: NationalInsuranceClass,
}

/// United Kingdom tables (`countries/uk.yaml`).
#[derive(Debug, Clone, Deserialize)]
pub struct UnitedKingdomConfig {
    /// The standard personal allowance.
    pub personal_allowance: Decimal,
    /// Income above which the allowance is withdrawn.
    pub taper_threshold: Decimal,
    /// Blind person's allowance added to the personal allowance.
    pub blind_persons_allowance: Decimal,
    /// Width of the basic rate band above the allowance.
    pub basic_rate_band: Decimal,
    /// Basic rate.
    pub basic_rate: Decimal,
    /// Higher rate.
    pub higher_rate: Decimal,
    /// Income at which the additional rate starts.
    pub additional_rate_threshold: Decimal,
    /// Additional rate.
    pub additional_rate: Decimal,
    /// National Insurance schedules.
    pub national_insurance: NationalInsuranceConfig,
}

/// Household parts used by the French family quotient.
#[derive(Debug, Clone, Deserialize)]
pub struct FamilyQuotientConfig {
    /// Parts for a single taxpayer.
    pub single_parts: Decimal,
    /// Parts for a married couple.
    pub married_parts: Decimal,
    /// How many children count for the reduced share.
    pub first_children: u32,
    /// Parts added for each of the first children.
    pub first_child_parts: Decimal,
    /// Parts added for every further child.
    pub additional_child_parts: Decimal,
}

/// French social contributions.
#[derive(Debug, Clone, Deserialize)]
pub struct FranceSocialConfig {
    /// Employee share on salaries.
    pub employee_rate: Decimal,
    /// Micro-entrepreneur rate on service turnover.
    pub micro_entrepreneur_rate: Decimal,
    /// ACRE multiplier by completed years in business.
    pub acre_phase_in: PhaseInSchedule,
}

/// France tables (`countries/fr.yaml`).
#[derive(Debug, Clone, Deserialize)]
pub struct FranceConfig {
    /// Progressive income tax schedule, applied per household part.
    pub income_tax: IncomeTaxSchedule,
    /// Share of gross income exempt under the impatriate regime.
    pub impatriate_exemption: Decimal,
    /// Family quotient parts.
    pub family_quotient: FamilyQuotientConfig,
    /// Social contributions.
    pub social_contributions: FranceSocialConfig,
}

/// One tier of the autónomo contribution table.
#[derive(Debug, Clone, Deserialize)]
pub struct AutonomoTier {
    /// Upper bound of net monthly income for this tier, open-ended if absent.
    pub up_to: Option<Decimal>,
    /// Monthly contribution.
    pub monthly_fee: Decimal,
}

/// Spanish self-employed contributions.
#[derive(Debug, Clone, Deserialize)]
pub struct AutonomoConfig {
    /// Share of turnover deducted as expenses to derive net income.
    pub deemed_expenses: Decimal,
    /// Monthly fee during the reduced "tarifa plana" period.
    pub tarifa_plana_monthly_fee: Decimal,
    /// Number of completed years the tarifa plana lasts.
    pub tarifa_plana_years: u32,
    /// Income tiers in ascending order.
    pub tiers: Vec<AutonomoTier>,
}

/// Spanish social security.
#[derive(Debug, Clone, Deserialize)]
pub struct SpainSocialConfig {
    /// Employee rate on the contribution base.
    pub employee_rate: Decimal,
    /// Maximum monthly contribution base.
    pub monthly_ceiling: Decimal,
    /// Self-employed contributions.
    pub autonomo: AutonomoConfig,
}

/// Spain tables (`countries/es.yaml`).
#[derive(Debug, Clone, Deserialize)]
pub struct SpainConfig {
    /// Progressive income tax schedule.
    pub income_tax: IncomeTaxSchedule,
    /// Rates under the special regime for inbound workers.
    pub beckham_law: IncomeTaxSchedule,
    /// Social security.
    pub social_security: SpainSocialConfig,
}

/// Flat-rate elections available in Portugal.
#[derive(Debug, Clone, Deserialize)]
pub struct PortugalElections {
    /// Non-Habitual Resident rate.
    pub nhr: Decimal,
    /// IFICI rate.
    pub ifici: Decimal,
}

/// Coefficients for one Portuguese accounting regime.
#[derive(Debug, Clone, Deserialize)]
pub struct RegimeCoefficients {
    /// Share of business income that is taxable.
    pub income_tax: Decimal,
    /// Share of business income subject to social security.
    pub social_security: Decimal,
}

/// Portuguese accounting regimes.
#[derive(Debug, Clone, Deserialize)]
pub struct PortugalRegimes {
    /// Regime simplificado.
    pub simplified: RegimeCoefficients,
    /// Contabilidade organizada.
    pub organized_accounting: RegimeCoefficients,
}

/// Portuguese social security.
#[derive(Debug, Clone, Deserialize)]
pub struct PortugalSocialConfig {
    /// Indexante dos Apoios Sociais (monthly).
    pub ias: Decimal,
    /// Employee rate.
    pub employee_rate: Decimal,
    /// Self-employed rate.
    pub self_employed_rate: Decimal,
    /// The monthly ceiling as a multiple of the IAS.
    pub ceiling_ias_multiple: Decimal,
    /// Multiplier for simplified-regime contributions by completed years.
    pub simplified_phase_in: PhaseInSchedule,
}

/// Portugal tables (`countries/pt.yaml`).
#[derive(Debug, Clone, Deserialize)]
pub struct PortugalConfig {
    /// Progressive income tax schedule.
    pub income_tax: IncomeTaxSchedule,
    /// Flat-rate elections.
    pub elections: PortugalElections,
    /// Accounting regime coefficients.
    pub regimes: PortugalRegimes,
    /// Multiplier for taxable business income by completed years.
    pub income_tax_phase_in: PhaseInSchedule,
    /// Social security.
    pub social_security: PortugalSocialConfig,
}

/// ZUS contribution rates.
#[derive(Debug, Clone, Deserialize)]
pub struct ZusRates {
    /// Emerytalne.
    pub pension: Decimal,
    /// Rentowe.
    pub disability: Decimal,
    /// Chorobowe.
    pub sickness: Decimal,
    /// Wypadkowe.
    #[serde(default)]
    pub accident: Decimal,
    /// Fundusz Pracy.
    #[serde(default)]
    pub labour_fund: Decimal,
}

impl ZusRates {
    /// Pension and disability, the contributions limited by the annual base.
    pub fn capped(&self) -> Decimal {
        self.pension + self.disability
    }

    /// Every other contribution.
    pub fn uncapped(&self) -> Decimal {
        self.sickness + self.accident + self.labour_fund
    }
}

/// Polish social insurance.
#[derive(Debug, Clone, Deserialize)]
pub struct ZusConfig {
    /// Monthly minimum wage.
    pub minimum_wage: Decimal,
    /// Standard declared monthly base for sole proprietors.
    pub standard_monthly_base: Decimal,
    /// Preferential base as a share of the minimum wage.
    pub preferential_base_ratio: Decimal,
    /// Share of monthly income used as the Mały ZUS Plus base.
    pub maly_zus_income_ratio: Decimal,
    /// Annual limit of the pension and disability base.
    pub annual_base_limit: Decimal,
    /// Completed years during which Preferencyjne ZUS is available.
    pub preferential_years: u32,
    /// Sole proprietor rates.
    pub self_employed: ZusRates,
    /// Employee rates.
    pub employee: ZusRates,
}

impl ZusConfig {
    /// The preferential monthly base.
    pub fn preferential_monthly_base(&self) -> Decimal {
        self.minimum_wage * self.preferential_base_ratio
    }
}

/// Polish health insurance.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthConfig {
    /// Rate under the general scale.
    pub general_rate: Decimal,
    /// Rate under the flat tax.
    pub flat_rate: Decimal,
    /// Monthly base for lump-sum taxpayers.
    pub lump_sum_monthly_base: Decimal,
}

/// Lump-sum rates on revenue.
#[derive(Debug, Clone, Deserialize)]
pub struct LumpSumRates {
    /// IT services.
    pub it: Decimal,
    /// Other services.
    pub services: Decimal,
}

/// Poland tables (`countries/pl.yaml`).
#[derive(Debug, Clone, Deserialize)]
pub struct PolandConfig {
    /// General scale, including the tax-free amount as a 0% bracket.
    pub income_tax: IncomeTaxSchedule,
    /// Podatek liniowy rate.
    pub flat_rate: Decimal,
    /// Ryczałt rates.
    pub lump_sum: LumpSumRates,
    /// Social insurance.
    pub zus: ZusConfig,
    /// Health insurance.
    pub health: HealthConfig,
}
