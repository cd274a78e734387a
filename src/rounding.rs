//! Rounding helpers shared by every engine output
//!
//! All rounding resolves ties away from zero. Nothing in the crate should call
//! `Decimal::round` or `round_dp` directly: doing so would mix in banker's
//! rounding, which is the Decimal default.

use rust_decimal::{Decimal, RoundingStrategy};

/// Round to `dp` decimal places, ties away from zero
pub fn round_dp(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Round to one decimal place (weights, RPE, density)
pub fn round_tenth(value: Decimal) -> Decimal {
    round_dp(value, 1)
}

/// Round to the nearest whole number (volume, rest seconds, intensity)
pub fn round_whole(value: Decimal) -> Decimal {
    round_dp(value, 0)
}

/// Round to the nearest multiple of `increment`, rounding the quotient with
/// ties away from zero. A non-positive increment leaves the value unchanged.
pub fn round_to_increment(value: Decimal, increment: Decimal) -> Decimal {
    if increment <= Decimal::ZERO {
        return value;
    }

    round_whole(value / increment) * increment
}

/// Arithmetic mean, `None` for an empty input
pub fn mean<I>(values: I) -> Option<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    let (sum, count) = values
        .into_iter()
        .fold((Decimal::ZERO, 0u32), |(sum, count), v| (sum + v, count + 1));

    if count == 0 {
        None
    } else {
        Some(sum / Decimal::from(count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_ties_round_away_from_zero() {
        assert_eq!(round_tenth(dec!(7.25)), dec!(7.3));
        assert_eq!(round_tenth(dec!(7.35)), dec!(7.4));
        assert_eq!(round_whole(dec!(2.5)), dec!(3));
        assert_eq!(round_whole(dec!(-2.5)), dec!(-3));
    }

    #[test]
    fn test_round_to_increment() {
        // 107.625 / 2.5 = 43.05 -> 43
        assert_eq!(round_to_increment(dec!(107.625), dec!(2.5)), dec!(107.5));
        // 48.75 / 2.5 = 19.5 -> 20 (tie goes up)
        assert_eq!(round_to_increment(dec!(48.75), dec!(2.5)), dec!(50));
        assert_eq!(round_to_increment(dec!(190), dec!(2.5)), dec!(190));
    }

    #[test]
    fn test_non_positive_increment_is_identity() {
        assert_eq!(round_to_increment(dec!(101.3), dec!(0)), dec!(101.3));
        assert_eq!(round_to_increment(dec!(101.3), dec!(-2.5)), dec!(101.3));
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(Vec::<Decimal>::new()), None);
        assert_eq!(mean(vec![dec!(7), dec!(8), dec!(9)]), Some(dec!(8)));
        assert_eq!(mean(vec![dec!(0)]), Some(dec!(0)));
    }
}
