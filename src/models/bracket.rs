//! Bracket schedule models.
//!
//! This module contains the [`Bracket`] type describing one slice of a
//! progressive schedule and the [`BracketSlice`] type recording how much of a
//! base fell into it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One (threshold, marginal rate) pair of a progressive schedule.
///
/// A bracket covers the amounts from its own threshold up to the threshold
/// of the next bracket in the schedule. The last bracket is unbounded.
///
/// # Example
///
/// ```
/// use tax_engine::models::Bracket;
/// use rust_decimal::Decimal;
///
/// let basic_rate = Bracket::new(Decimal::new(12570, 0), Decimal::new(20, 2));
/// assert_eq!(basic_rate.rate.to_string(), "0.20");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bracket {
    /// The amount at which this bracket starts.
    pub threshold: Decimal,
    /// The marginal rate as a fraction (0.20 for 20%).
    pub rate: Decimal,
}

impl Bracket {
    /// Creates a new bracket.
    pub fn new(threshold: Decimal, rate: Decimal) -> Self {
        Self { threshold, rate }
    }
}

/// The portion of a base taxed at a single rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketSlice {
    /// The marginal rate applied to this slice.
    pub rate: Decimal,
    /// The amount of the base falling into this slice.
    pub taxable_amount: Decimal,
    /// The tax due on this slice (taxable_amount * rate).
    pub tax_amount: Decimal,
}

impl BracketSlice {
    /// Creates a slice, computing the tax amount from the rate.
    pub fn new(rate: Decimal, taxable_amount: Decimal) -> Self {
        Self {
            rate,
            taxable_amount,
            tax_amount: taxable_amount * rate,
        }
    }
}
