//! Tax input model and the personal attributes it carries.
//!
//! A [`TaxInput`] is built once per calculation and passed by reference into
//! every country adapter. Adapters never mutate it.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Currency;
use crate::error::{EngineError, EngineResult};

/// Largest gross or business income accepted (10^15 in any currency).
///
/// Keeps every downstream product and currency conversion well inside the
/// range of `Decimal`.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0);

/// Marital status used for household-based rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaritalStatus {
    /// Single taxpayer.
    #[default]
    Single,
    /// Married couple filing jointly.
    Married,
}

/// Accounting regime elected for sole proprietorship income in Portugal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Regime {
    /// Regime simplificado: a fixed coefficient of turnover is taxable.
    Simplified,
    /// Contabilidade organizada: profit as per the accounts is taxable.
    OrganizedAccounting,
}

impl Regime {
    /// Returns a human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            Regime::Simplified => "Simplified Regime",
            Regime::OrganizedAccounting => "Organized Accounting",
        }
    }
}

/// Form of taxation elected for business income in Poland.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolishTaxForm {
    /// Skala podatkowa (12% / 32%).
    General,
    /// Podatek liniowy (19%).
    Flat,
    /// Ryczałt at the 12% rate for IT services.
    LumpSumIt,
    /// Ryczałt at the 8.5% rate for other services.
    LumpSumServices,
}

/// Optional tax benefits a user may claim.
///
/// Each benefit belongs to exactly one country and is ignored by the others.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxBenefit {
    /// Portugal: Non-Habitual Resident flat rate.
    PtNhr,
    /// Portugal: IFICI incentive flat rate.
    PtIfici,
    /// Spain: special regime for inbound workers.
    EsBeckhamLaw,
    /// United Kingdom: blind person's allowance.
    UkBlindPersonsAllowance,
    /// Cyprus: 50% exemption for high earners relocating to Cyprus.
    CyHighSkilledResident,
    /// France: impatriate regime exemption.
    FrImpatriateRegime,
    /// Poland: social contribution holiday for new businesses.
    PlUlgaNaStart,
    /// Poland: income-based contribution base for small businesses.
    PlMalyZusPlus,
    /// Poland: preferential contribution base for new businesses.
    PlPreferencyjneZus,
}

/// Income and personal attributes for one calculation.
///
/// # Example
///
/// ```
/// use tax_engine::models::{Currency, MaritalStatus, TaxInput};
/// use rust_decimal::Decimal;
///
/// let input = TaxInput::new(Decimal::new(50_000, 0), Currency::Eur)
///     .with_marital_status(MaritalStatus::Married)
///     .with_children(2);
///
/// assert!(input.validate().is_ok());
/// assert_eq!(input.employment_income(), Decimal::new(50_000, 0));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxInput {
    /// Total income from all sources, in `currency`.
    pub gross_income: Decimal,
    /// The taxpayer's marital status.
    pub marital_status: MaritalStatus,
    /// Number of dependent children.
    pub num_children: u32,
    /// Whether part of the income comes from a sole proprietorship.
    pub has_sole_proprietorship: bool,
    /// The part of `gross_income` earned through the sole proprietorship.
    pub sole_proprietorship_income: Decimal,
    /// Completed years of business activity (0 during the first year).
    pub years_in_business: u32,
    /// Benefits the taxpayer elects to claim.
    pub benefits: BTreeSet<TaxBenefit>,
    /// Portuguese accounting regime, if chosen.
    pub regime: Option<Regime>,
    /// Polish form of taxation, if chosen.
    pub tax_form: Option<PolishTaxForm>,
    /// The currency the amounts are expressed in.
    pub currency: Currency,
}

impl TaxInput {
    /// Creates an employment-only input for a single taxpayer with no children.
    pub fn new(gross_income: Decimal, currency: Currency) -> Self {
        Self {
            gross_income,
            marital_status: MaritalStatus::Single,
            num_children: 0,
            has_sole_proprietorship: false,
            sole_proprietorship_income: Decimal::ZERO,
            years_in_business: 0,
            benefits: BTreeSet::new(),
            regime: None,
            tax_form: None,
            currency,
        }
    }

    /// Sets the marital status.
    pub fn with_marital_status(mut self, marital_status: MaritalStatus) -> Self {
        self.marital_status = marital_status;
        self
    }

    /// Sets the number of children.
    pub fn with_children(mut self, num_children: u32) -> Self {
        self.num_children = num_children;
        self
    }

    /// Declares part of the gross income as sole proprietorship income.
    pub fn with_sole_proprietorship(mut self, income: Decimal, years_in_business: u32) -> Self {
        self.has_sole_proprietorship = true;
        self.sole_proprietorship_income = income;
        self.years_in_business = years_in_business;
        self
    }

    /// Adds a benefit election.
    pub fn with_benefit(mut self, benefit: TaxBenefit) -> Self {
        self.benefits.insert(benefit);
        self
    }

    /// Sets the Portuguese accounting regime.
    pub fn with_regime(mut self, regime: Regime) -> Self {
        self.regime = Some(regime);
        self
    }

    /// Sets the Polish form of taxation.
    pub fn with_tax_form(mut self, tax_form: PolishTaxForm) -> Self {
        self.tax_form = Some(tax_form);
        self
    }

    /// Returns true if the benefit was elected.
    pub fn has_benefit(&self, benefit: TaxBenefit) -> bool {
        self.benefits.contains(&benefit)
    }

    /// Sole proprietorship income, or zero when the flag is not set.
    pub fn business_income(&self) -> Decimal {
        if self.has_sole_proprietorship {
            self.sole_proprietorship_income
        } else {
            Decimal::ZERO
        }
    }

    /// Income not earned through the sole proprietorship.
    pub fn employment_income(&self) -> Decimal {
        self.gross_income - self.business_income()
    }

    /// Checks the constraints shared by every country.
    ///
    /// Gross income must be strictly positive because the effective rate
    /// divides by it.
    pub fn validate(&self) -> EngineResult<()> {
        if self.gross_income < Decimal::ZERO {
            return Err(EngineError::invalid_input(
                "gross_income",
                "must not be negative",
            ));
        }
        if self.gross_income.is_zero() {
            return Err(EngineError::invalid_input(
                "gross_income",
                "must be greater than zero",
            ));
        }
        if self.gross_income > MAX_AMOUNT {
            return Err(EngineError::invalid_input(
                "gross_income",
                format!("must not exceed {}", MAX_AMOUNT),
            ));
        }
        if self.sole_proprietorship_income < Decimal::ZERO {
            return Err(EngineError::invalid_input(
                "sole_proprietorship_income",
                "must not be negative",
            ));
        }
        if self.sole_proprietorship_income > MAX_AMOUNT {
            return Err(EngineError::invalid_input(
                "sole_proprietorship_income",
                format!("must not exceed {}", MAX_AMOUNT),
            ));
        }
        if self.business_income() > self.gross_income {
            return Err(EngineError::invalid_input(
                "sole_proprietorship_income",
                format!(
                    "{} exceeds gross income of {}",
                    self.business_income().normalize(),
                    self.gross_income.normalize()
                ),
            ));
        }
        Ok(())
    }
}
