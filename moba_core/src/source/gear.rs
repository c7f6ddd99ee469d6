//! GearSource - Stats from an item sitting in an inventory slot

use crate::source::StatSource;
use crate::stat_block::{StatAccumulator, StatModifier};

/// Stats from an equipped item.
///
/// The modifier is keyed `item_slot_<n>` and can only be removed by selling
/// the item in that slot.
pub struct GearSource<'a> {
    /// Which inventory slot the item is in
    pub slot: usize,
    /// The item's stat contribution
    pub modifier: &'a StatModifier,
}

impl<'a> GearSource<'a> {
    /// Create a new gear source
    pub fn new(slot: usize, modifier: &'a StatModifier) -> Self {
        GearSource { slot, modifier }
    }

    /// Source id used for an inventory slot
    pub fn slot_id(slot: usize) -> String {
        format!("item_slot_{slot}")
    }
}

impl StatSource for GearSource<'_> {
    fn id(&self) -> &str {
        &self.modifier.source_id
    }

    fn priority(&self) -> i32 {
        0 // Items apply at default priority
    }

    fn apply(&self, stats: &mut StatAccumulator) {
        stats.add_flat_line(&self.modifier.flat);
        stats.add_percent_line(&self.modifier.percent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stat_block::StatKind;

    #[test]
    fn test_gear_source_id() {
        let modifier = StatModifier::new(GearSource::slot_id(2)).with_flat(StatKind::AttackDamage, 10.0);
        let source = GearSource::new(2, &modifier);
        assert_eq!(source.id(), "item_slot_2");
        assert_eq!(source.priority(), 0);

        let mut acc = StatAccumulator::new();
        source.apply(&mut acc);
        assert!((acc.compute(StatKind::AttackDamage) - 10.0).abs() < f64::EPSILON);
    }
}
