use std::ops::RangeInclusive;

use crate::{catalog::Item, settings::CONTEST_BONUS};

/// Points every member catch starts with.
pub const MEMBER_BASE_POINTS: u32 = 1000;
/// Weight range a caught member is sampled from.
pub const MEMBER_WEIGHT_KG: RangeInclusive<f64> = 55.0..=140.0;
const POUNDS_PER_KG: f64 = 2.2;

/// Base points for an item instance, capped at twice its theoretical max.
///
/// Never less than one point.
pub fn item_points(item: &Item, size_cm: f64, weight_kg: f64) -> u32 {
    let base = (weight_kg * 10.0 + size_cm).round().max(1.0) as u32;

    base.min(item.theoretical_max().saturating_mul(2))
}

pub fn member_points(weight_kg: f64) -> u32 {
    MEMBER_BASE_POINTS + (weight_kg * POUNDS_PER_KG) as u32
}

/// Applies the contest multiplier after any cap.
pub fn with_contest_bonus(points: u32, contest_active: bool) -> u32 {
    if contest_active {
        (points as f64 * CONTEST_BONUS).round() as u32
    } else {
        points
    }
}

pub fn score(item: &Item, size_cm: f64, weight_kg: f64, contest_active: bool) -> u32 {
    with_contest_bonus(item_points(item, size_cm, weight_kg), contest_active)
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use rand::{rngs::StdRng, SeedableRng};
    use test_case::test_case;

    use super::*;
    use crate::catalog::Span;

    fn fish(size: (f64, f64), weight: (f64, f64)) -> Item {
        Item {
            name: "Fish".to_string(),
            rarity: "common".to_string(),
            size_cm: Span::new(size.0, size.1),
            weight_kg: Span::new(weight.0, weight.1),
            description: String::new(),
        }
    }

    #[test_case(30.0, 2.0, false, 50 ; "plain")]
    #[test_case(30.0, 2.0, true, 75 ; "contest bonus")]
    #[test_case(30.3, 2.05, false, 51 ; "rounded")]
    #[test_case(0.0, 0.0, false, 1 ; "at least one point")]
    #[test_case(1000.0, 100.0, false, 220 ; "capped at twice the theoretical max")]
    #[test_case(1000.0, 100.0, true, 330 ; "bonus applies after cap")]
    fn item_score(size: f64, weight: f64, contest: bool, expected: u32) {
        // theoretical max: 5.0 * 10 + 60 = 110
        let item = fish((10.0, 60.0), (0.5, 5.0));

        assert_eq!(score(&item, size, weight, contest), expected);
    }

    #[test_case(55.0, 1121)]
    #[test_case(100.0, 1220)]
    #[test_case(140.0, 1308)]
    fn member_score(weight: f64, expected: u32) {
        assert_eq!(member_points(weight), expected);
    }

    #[test_case(101, false, 101)]
    #[test_case(101, true, 152 ; "rounds half up")]
    #[test_case(1308, true, 1962)]
    fn contest_bonus(points: u32, active: bool, expected: u32) {
        assert_eq!(with_contest_bonus(points, active), expected);
    }

    #[test]
    fn sampled_scores_stay_within_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let item = fish((2.0, 180.0), (0.1, 40.0));
        let cap = 2 * item.theoretical_max();

        for _ in 0..10_000 {
            let size = item.size_cm.sample(&mut rng);
            let weight = item.weight_kg.sample(&mut rng);

            assert!(score(&item, size, weight, false) <= cap);
            assert!(score(&item, size, weight, true) <= (cap as f64 * CONTEST_BONUS).round() as u32);
        }
    }

    #[test_case(12.345, 1, 12.3)]
    #[test_case(12.345, 2, 12.35 ; "two decimals")]
    #[test_case(99.96, 1, 100.0)]
    fn rounding(value: f64, decimals: i32, expected: f64) {
        assert_relative_eq!(round_to(value, decimals), expected);
    }
}
