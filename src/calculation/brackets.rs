//! Progressive bracket evaluation.
//!
//! This module provides [`evaluate_brackets`], the marginal-rate walk every
//! country adapter delegates to, and [`flat_rate`] for elections that replace
//! the schedule with a single rate.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::{Bracket, BracketSlice};

/// The outcome of applying a schedule to a base.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketEvaluation {
    /// Total tax due.
    pub total: Decimal,
    /// Per-bracket slices with a non-zero taxable amount, lowest first.
    pub breakdown: Vec<BracketSlice>,
}

impl BracketEvaluation {
    /// An evaluation with no tax and no slices.
    pub fn empty() -> Self {
        Self {
            total: Decimal::ZERO,
            breakdown: Vec::new(),
        }
    }

    /// Multiplies every slice and the total by `factor`.
    ///
    /// Used when a schedule is applied per household part and the result is
    /// expanded back to the whole household.
    pub fn scaled(&self, factor: Decimal) -> Self {
        Self {
            total: self.total * factor,
            breakdown: self
                .breakdown
                .iter()
                .map(|slice| BracketSlice {
                    rate: slice.rate,
                    taxable_amount: slice.taxable_amount * factor,
                    tax_amount: slice.tax_amount * factor,
                })
                .collect(),
        }
    }

    /// Sum of the taxable amounts across the breakdown.
    pub fn taxed_base(&self) -> Decimal {
        self.breakdown.iter().map(|slice| slice.taxable_amount).sum()
    }
}

fn check_rate(rate: Decimal) -> EngineResult<()> {
    if rate < Decimal::ZERO || rate > Decimal::ONE {
        return Err(EngineError::InvalidBrackets {
            message: format!("rate {} is outside [0, 1]", rate.normalize()),
        });
    }
    Ok(())
}

fn check_base(base: Decimal) -> EngineResult<()> {
    if base < Decimal::ZERO {
        return Err(EngineError::invalid_input(
            "taxable_base",
            format!("{} must not be negative", base.normalize()),
        ));
    }
    Ok(())
}

/// Checks that a schedule is non-empty, starts at 0, is strictly ascending
/// and only holds rates in [0, 1].
pub fn validate_brackets(brackets: &[Bracket]) -> EngineResult<()> {
    let first = brackets.first().ok_or_else(|| EngineError::InvalidBrackets {
        message: "schedule is empty".to_string(),
    })?;

    if !first.threshold.is_zero() {
        return Err(EngineError::InvalidBrackets {
            message: format!(
                "first threshold must be 0, found {}",
                first.threshold.normalize()
            ),
        });
    }

    for pair in brackets.windows(2) {
        if pair[1].threshold <= pair[0].threshold {
            return Err(EngineError::InvalidBrackets {
                message: format!(
                    "thresholds must be strictly ascending, found {} after {}",
                    pair[1].threshold.normalize(),
                    pair[0].threshold.normalize()
                ),
            });
        }
    }

    brackets.iter().try_for_each(|bracket| check_rate(bracket.rate))
}

/// Applies a progressive schedule to `base`.
///
/// Each bracket taxes the part of the base between its own threshold and the
/// next bracket's threshold; the last bracket is unbounded. Slices with no
/// taxable amount are left out of the breakdown, so a zero base yields an
/// empty breakdown.
///
/// # Errors
///
/// Returns `InvalidInput` for a negative base and `InvalidBrackets` for a
/// malformed schedule.
///
/// # Example
///
/// ```
/// use tax_engine::calculation::evaluate_brackets;
/// use tax_engine::models::Bracket;
/// use rust_decimal::Decimal;
///
/// let brackets = vec![
///     Bracket::new(Decimal::ZERO, Decimal::ZERO),
///     Bracket::new(Decimal::new(19_500, 0), Decimal::new(20, 2)),
///     Bracket::new(Decimal::new(28_000, 0), Decimal::new(25, 2)),
///     Bracket::new(Decimal::new(36_300, 0), Decimal::new(30, 2)),
///     Bracket::new(Decimal::new(60_000, 0), Decimal::new(35, 2)),
/// ];
///
/// let result = evaluate_brackets(Decimal::new(50_000, 0), &brackets).unwrap();
/// assert_eq!(result.total, Decimal::new(7_885, 0));
/// assert_eq!(result.breakdown.len(), 4);
/// ```
pub fn evaluate_brackets(base: Decimal, brackets: &[Bracket]) -> EngineResult<BracketEvaluation> {
    validate_brackets(brackets)?;
    check_base(base)?;

    let mut evaluation = BracketEvaluation::empty();

    for (index, bracket) in brackets.iter().enumerate() {
        if base <= bracket.threshold {
            break;
        }

        let upper = match brackets.get(index + 1) {
            Some(next) if next.threshold < base => next.threshold,
            _ => base,
        };

        let slice = BracketSlice::new(bracket.rate, upper - bracket.threshold);
        evaluation.total += slice.tax_amount;
        evaluation.breakdown.push(slice);
    }

    Ok(evaluation)
}

/// Applies a single rate to the whole base.
///
/// Produces the same shape as [`evaluate_brackets`]: one slice, or none when
/// the base is zero.
pub fn flat_rate(base: Decimal, rate: Decimal) -> EngineResult<BracketEvaluation> {
    check_rate(rate)?;
    check_base(base)?;

    if base.is_zero() {
        return Ok(BracketEvaluation::empty());
    }

    let slice = BracketSlice::new(rate, base);
    Ok(BracketEvaluation {
        total: slice.tax_amount,
        breakdown: vec![slice],
    })
}
