//! Rounding and comparison helpers shared by every form unit.
//!
//! All dollar amounts stored on a line go through [`round_half_up`]; rates
//! and fractions go through [`round_rate`].

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds to cents, with exact half-cents moving away from zero.
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(5071.505)), dec!(5071.51));
/// assert_eq!(round_half_up(dec!(-3000.005)), dec!(-3000.01));
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// The larger of `a` and `b`; mostly used as `max(x, Decimal::ZERO)` to
/// floor a line at zero.
pub fn max(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    if a > b { a } else { b }
}

/// Rounds a rate or fraction to four decimal places using half-up rounding.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::common::round_rate;
///
/// assert_eq!(round_rate(dec!(0.08452)), dec!(0.0845));
/// assert_eq!(round_rate(dec!(0.08455)), dec!(0.0846));
/// ```
pub fn round_rate(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds a positive value up to the next multiple of `step`.
///
/// Used by phase-outs that count "each $1,000 or fraction thereof".
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::common::round_up_to_multiple;
///
/// assert_eq!(round_up_to_multiple(dec!(1), dec!(1000)), dec!(1000));
/// assert_eq!(round_up_to_multiple(dec!(2000), dec!(1000)), dec!(2000));
/// assert_eq!(round_up_to_multiple(dec!(-5), dec!(1000)), dec!(0));
/// ```
pub fn round_up_to_multiple(
    value: Decimal,
    step: Decimal,
) -> Decimal {
    if value <= Decimal::ZERO || step <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    (value / step).ceil() * step
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    // =========================================================================
    // round_half_up tests
    // =========================================================================

    #[test]
    fn round_half_up_moves_half_cents_away_from_zero() {
        assert_eq!(round_half_up(dec!(123.454)), dec!(123.45));
        assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
        assert_eq!(round_half_up(dec!(-123.455)), dec!(-123.46));
    }

    #[test]
    fn round_half_up_carries_into_whole_dollars() {
        let result = round_half_up(dec!(999999.999));

        assert_eq!(result, dec!(1000000.00));
    }

    #[test]
    fn round_half_up_drops_sub_cent_amounts() {
        let result = round_half_up(dec!(0.004));

        assert_eq!(result, dec!(0));
    }

    // =========================================================================
    // max tests
    // =========================================================================

    #[test]
    fn max_floors_negative_lines_at_zero() {
        assert_eq!(max(dec!(-3000), Decimal::ZERO), dec!(0));
        assert_eq!(max(dec!(44250), Decimal::ZERO), dec!(44250));
    }

    #[test]
    fn max_of_two_negatives() {
        let result = max(dec!(-100.00), dec!(-200.00));

        assert_eq!(result, dec!(-100.00));
    }

    // =========================================================================
    // round_rate tests
    // =========================================================================

    #[test]
    fn round_rate_keeps_four_places() {
        let result = round_rate(dec!(0.123449));

        assert_eq!(result, dec!(0.1234));
    }

    #[test]
    fn round_rate_rounds_up_at_midpoint() {
        let result = round_rate(dec!(0.12345));

        assert_eq!(result, dec!(0.1235));
    }

    // =========================================================================
    // round_up_to_multiple tests
    // =========================================================================

    #[test]
    fn round_up_to_multiple_counts_fractions_as_whole_steps() {
        let result = round_up_to_multiple(dec!(10500.01), dec!(1000));

        assert_eq!(result, dec!(11000));
    }

    #[test]
    fn round_up_to_multiple_keeps_exact_multiples() {
        let result = round_up_to_multiple(dec!(3000), dec!(1000));

        assert_eq!(result, dec!(3000));
    }

    #[test]
    fn round_up_to_multiple_returns_zero_for_non_positive_values() {
        assert_eq!(round_up_to_multiple(dec!(0), dec!(1000)), dec!(0));
        assert_eq!(round_up_to_multiple(dec!(-1), dec!(1000)), dec!(0));
    }
}
