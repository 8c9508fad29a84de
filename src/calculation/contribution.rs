//! Contribution base clamping shared by the social security rules.

use rust_decimal::Decimal;

use crate::models::ContributionLimit;

/// Clamps a contribution base between an optional floor and ceiling.
///
/// Returns the base to contribute on together with the limit that was
/// applied, if any. A zero amount is never raised to the floor, since no
/// activity means no contribution.
///
/// # Example
///
/// ```
/// use tax_engine::calculation::clamp_contribution_base;
/// use tax_engine::models::ContributionLimit;
/// use rust_decimal::Decimal;
///
/// let (base, limit) = clamp_contribution_base(
///     Decimal::new(70_000, 0),
///     None,
///     Some(Decimal::new(58_080, 0)),
/// );
/// assert_eq!(base, Decimal::new(58_080, 0));
/// assert_eq!(limit, Some(ContributionLimit::Ceiling));
/// ```
pub fn clamp_contribution_base(
    amount: Decimal,
    floor: Option<Decimal>,
    ceiling: Option<Decimal>,
) -> (Decimal, Option<ContributionLimit>) {
    if amount <= Decimal::ZERO {
        return (Decimal::ZERO, None);
    }

    match (floor, ceiling) {
        (_, Some(ceiling)) if amount > ceiling => (ceiling, Some(ContributionLimit::Ceiling)),
        (Some(floor), _) if amount < floor => (floor, Some(ContributionLimit::Floor)),
        _ => (amount, None),
    }
}

/// Describes a limit for use in social security notes.
pub fn limit_note(limit: Option<ContributionLimit>) -> &'static str {
    match limit {
        Some(ContributionLimit::Ceiling) => " (capped at the contribution ceiling)",
        Some(ContributionLimit::Floor) => " (raised to the minimum contribution base)",
        None => "",
    }
}
