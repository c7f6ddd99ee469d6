//! StatValue - The modifier container (Base → Flat → Percent)

use serde::{Deserialize, Serialize};

/// Represents a stat that follows the Flat → Percent model
///
/// Final value is calculated as:
/// `(base + flat) × Π(1 + percent)`
///
/// - `base`: The base value at the unit's level
/// - `flat`: Sum of all flat additions
/// - `percent`: One multiplier per percent modifier (as decimal). Each one
///   multiplies the result on its own, so two +20% give ×1.44
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatValue {
    /// Base value (from the unit definition at its level)
    pub base: f64,
    /// Sum of all flat additions
    pub flat: f64,
    /// List of percent multipliers (as decimal)
    pub percent: Vec<f64>,
}

impl StatValue {
    /// Create a new StatValue with the given base
    pub fn with_base(base: f64) -> Self {
        StatValue {
            base,
            flat: 0.0,
            percent: Vec::new(),
        }
    }

    /// Calculate final value: (base + flat) × Π(1 + percent)
    pub fn compute(&self) -> f64 {
        self.total_flat() * self.total_percent_multiplier()
    }

    /// Add a flat bonus
    pub fn add_flat(&mut self, value: f64) {
        self.flat += value;
    }

    /// Add a percent multiplier (as decimal, e.g., 0.20 for +20%)
    pub fn add_percent(&mut self, value: f64) {
        self.percent.push(value);
    }

    /// Get the total flat value (base + flat additions)
    pub fn total_flat(&self) -> f64 {
        self.base + self.flat
    }

    /// Get the total percent multiplier (product of all multipliers)
    pub fn total_percent_multiplier(&self) -> f64 {
        self.percent.iter().map(|p| 1.0 + p).product()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_basic() {
        let stat = StatValue::with_base(100.0);
        assert!((stat.compute() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_compute_with_flat() {
        let mut stat = StatValue::with_base(100.0);
        stat.add_flat(50.0);
        assert!((stat.compute() - 150.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_flat_applies_before_percent() {
        // (100 + 50) × 1.2, not 100 × 1.2 + 50
        let mut stat = StatValue::with_base(100.0);
        stat.add_percent(0.20);
        stat.add_flat(50.0);
        assert!((stat.compute() - 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_multiple_percent_stack_multiplicatively() {
        let mut stat = StatValue::with_base(100.0);
        stat.add_percent(0.20);
        stat.add_percent(0.20);
        // Should be 100 * 1.2 * 1.2 = 144, not 100 * 1.4 = 140
        assert!((stat.compute() - 144.0).abs() < 1e-9);
    }

    #[test]
    fn test_minus_hundred_percent_zeroes() {
        let mut stat = StatValue::with_base(340.0);
        stat.add_percent(0.30);
        stat.add_percent(-1.0);
        assert!(stat.compute().abs() < f64::EPSILON);
    }
}
