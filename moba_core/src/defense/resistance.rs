//! Resistance - physical and magic damage mitigation
//!
//! Formula:
//! - damage_taken = raw × 100 / (100 + resist)
//! - negative resist increases damage along the same curve
//! - true damage never reaches this module

use super::constants::RESIST_SCALE;

/// Calculate damage after resist mitigation
///
/// # Arguments
/// * `raw` - The incoming damage
/// * `resist` - The defender's armor or magic resist (can be negative)
/// * `min_resist` - Floor applied to `resist` before the curve
///
/// # Returns
/// The damage after mitigation, never negative
pub fn mitigate(raw: f64, resist: f64, min_resist: f64) -> f64 {
    if raw <= 0.0 {
        return 0.0;
    }
    let resist = effective_resistance(resist, min_resist);
    raw * RESIST_SCALE / (RESIST_SCALE + resist)
}

/// Resist after applying the floor
pub fn effective_resistance(resist: f64, min_resist: f64) -> f64 {
    resist.max(min_resist)
}

#[cfg(test)]
mod tests {
    use super::super::constants::DEFAULT_MIN_RESIST;
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_zero_resist_is_full_damage() {
        let result = mitigate(100.0, 0.0, DEFAULT_MIN_RESIST);
        assert!((result - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_thirty_armor() {
        let result = mitigate(100.0, 30.0, DEFAULT_MIN_RESIST);
        assert_eq!(result, 100.0 * 100.0 / 130.0);
        assert!((result - 76.92).abs() < 0.01);
    }

    #[test]
    fn test_hundred_resist_halves() {
        let result = mitigate(200.0, 100.0, DEFAULT_MIN_RESIST);
        assert!((result - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_negative_resist_amplifies() {
        // 100 / (100 - 50) = 2x
        let result = mitigate(100.0, -50.0, DEFAULT_MIN_RESIST);
        assert!((result - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_floor_keeps_denominator_positive() {
        let result = mitigate(100.0, -500.0, DEFAULT_MIN_RESIST);
        assert!((result - 10_000.0).abs() < 1e-6);
        assert!(result.is_finite());
    }

    #[test]
    fn test_non_positive_damage_is_zero() {
        assert_eq!(mitigate(0.0, 30.0, DEFAULT_MIN_RESIST), 0.0);
        assert_eq!(mitigate(-5.0, 30.0, DEFAULT_MIN_RESIST), 0.0);
    }

    proptest! {
        #[test]
        fn prop_matches_curve(raw in 0.0f64..10_000.0, resist in 0.0f64..1_000.0) {
            let expected = raw * 100.0 / (100.0 + resist);
            let got = mitigate(raw, resist, DEFAULT_MIN_RESIST);
            prop_assert!((got - expected).abs() <= 1e-9 * expected.max(1.0));
        }

        #[test]
        fn prop_more_resist_never_more_damage(raw in 1.0f64..5_000.0, a in -90.0f64..500.0, b in -90.0f64..500.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(mitigate(raw, hi, DEFAULT_MIN_RESIST) <= mitigate(raw, lo, DEFAULT_MIN_RESIST) + 1e-9);
        }
    }
}
