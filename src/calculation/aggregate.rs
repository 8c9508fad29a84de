//! Aggregation of the deductions of one country into net income.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Totals derived from the individual deductions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    /// income tax + social security + other taxes.
    pub total_deductions: Decimal,
    /// gross - total deductions.
    pub net_income: Decimal,
    /// total deductions / gross * 100, rounded to 2 decimals.
    pub effective_rate: Decimal,
}

/// Sums the deductions and derives net income and the effective rate.
///
/// # Errors
///
/// Returns `InvalidInput` when `gross` is not strictly positive, since the
/// effective rate is undefined.
///
/// # Example
///
/// ```
/// use tax_engine::calculation::aggregate;
/// use rust_decimal::Decimal;
///
/// let totals = aggregate(
///     Decimal::new(50_000, 0),
///     Decimal::new(7_885, 0),
///     Decimal::new(4_150, 0),
///     Decimal::new(1_325, 0),
/// )
/// .unwrap();
///
/// assert_eq!(totals.total_deductions, Decimal::new(13_360, 0));
/// assert_eq!(totals.net_income, Decimal::new(36_640, 0));
/// assert_eq!(totals.effective_rate.to_string(), "26.72");
/// ```
pub fn aggregate(
    gross: Decimal,
    income_tax: Decimal,
    social_security: Decimal,
    other_taxes: Decimal,
) -> EngineResult<Totals> {
    if gross <= Decimal::ZERO {
        return Err(EngineError::invalid_input(
            "gross_income",
            "must be greater than zero to compute an effective rate",
        ));
    }

    let total_deductions = income_tax + social_security + other_taxes;
    let effective_rate = (total_deductions / gross * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

    Ok(Totals {
        total_deductions,
        net_income: gross - total_deductions,
        effective_rate,
    })
}
