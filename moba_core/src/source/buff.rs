//! Buff sources - timed and permanent stat modifiers fold in after items

use crate::source::StatSource;
use crate::stat_block::{StatAccumulator, StatModifier};

impl StatSource for StatModifier {
    fn id(&self) -> &str {
        &self.source_id
    }

    fn priority(&self) -> i32 {
        200 // Buffs apply after items
    }

    fn apply(&self, stats: &mut StatAccumulator) {
        stats.add_flat_line(&self.flat);
        stats.add_percent_line(&self.percent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stat_block::StatKind;

    #[test]
    fn test_modifier_applies_flat_and_percent() {
        let modifier = StatModifier::new("test")
            .with_flat(StatKind::AttackDamage, 20.0)
            .with_percent(StatKind::AttackDamage, 0.1);

        let mut acc = StatAccumulator::new();
        acc.set_base(StatKind::AttackDamage, 80.0);
        modifier.apply(&mut acc);

        assert!((acc.compute(StatKind::AttackDamage) - 110.0).abs() < 1e-9);
        assert_eq!(modifier.priority(), 200);
    }
}
