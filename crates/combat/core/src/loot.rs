//! Loot attribution ledger.
//!
//! Tracks who damaged whom so a kill can be credited to one faction. Direct
//! kills go to the last faction that landed a hit. Kills by damage over time
//! go to the faction that engaged first, so a bystander cannot steal credit
//! by tagging a target that is already bleeding out.
use std::collections::HashMap;

use crate::types::{CharacterId, FactionId};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageRecord {
    pub by_faction: HashMap<FactionId, u64>,
    pub last_faction: Option<FactionId>,
    pub first_faction: Option<FactionId>,
}

impl DamageRecord {
    fn record(&mut self, faction: &FactionId, amount: u32) {
        *self.by_faction.entry(faction.clone()).or_default() += u64::from(amount);
        if self.first_faction.is_none() {
            self.first_faction = Some(faction.clone());
        }
        self.last_faction = Some(faction.clone());
    }
}

#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LootLedger {
    records: HashMap<CharacterId, DamageRecord>,
}

impl LootLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_damage(&mut self, faction: &FactionId, target: &CharacterId, amount: u32) {
        self.records
            .entry(target.clone())
            .or_default()
            .record(faction, amount);
    }

    pub fn record(&self, target: &CharacterId) -> Option<&DamageRecord> {
        self.records.get(target)
    }

    /// Faction credited with killing `target`.
    pub fn loot_owner(&self, target: &CharacterId, is_dot_kill: bool) -> Option<FactionId> {
        let record = self.records.get(target)?;
        if is_dot_kill {
            record.first_faction.clone()
        } else {
            record.last_faction.clone()
        }
    }

    pub fn total_by(&self, target: &CharacterId, faction: &FactionId) -> u64 {
        self.records
            .get(target)
            .and_then(|r| r.by_faction.get(faction))
            .copied()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_hit_takes_direct_kills_first_hit_takes_dot_kills() {
        let (a, b) = (FactionId::from("a"), FactionId::from("b"));
        let wolf = CharacterId::from("wolf");
        let mut ledger = LootLedger::new();

        ledger.record_damage(&b, &wolf, 5);
        ledger.record_damage(&a, &wolf, 40);
        ledger.record_damage(&b, &wolf, 3);
        ledger.record_damage(&a, &wolf, 12);

        assert_eq!(ledger.loot_owner(&wolf, false), Some(a.clone()));
        assert_eq!(ledger.loot_owner(&wolf, true), Some(b.clone()));
        assert_eq!(ledger.total_by(&wolf, &a), 52);
        assert_eq!(ledger.total_by(&wolf, &b), 8);
    }

    #[test]
    fn a_then_b_then_a() {
        let (a, b) = (FactionId::from("a"), FactionId::from("b"));
        let target = CharacterId::from("t");
        let mut ledger = LootLedger::new();
        for faction in [&a, &b, &a] {
            ledger.record_damage(faction, &target, 10);
        }
        assert_eq!(ledger.loot_owner(&target, false), Some(a.clone()));
        assert_eq!(ledger.loot_owner(&target, true), Some(a));
    }

    #[test]
    fn untouched_target_has_no_owner() {
        let ledger = LootLedger::new();
        assert_eq!(ledger.loot_owner(&CharacterId::from("x"), false), None);
    }
}
