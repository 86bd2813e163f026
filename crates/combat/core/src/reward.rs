//! End-of-combat reward payload.
//!
//! A [`RewardDistribution`] is computed once when a combat concludes and is
//! handed to settlement through a take-once slot on the instance.
use std::collections::BTreeMap;

use rand::Rng;

use crate::character::CombatCharacter;
use crate::env::{EnemyLoot, LootOracle};
use crate::instance::CombatInstance;
use crate::types::{CharacterId, CombatId, CombatType, FactionId};

/// Map entity of an enemy that took part in a combat.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnemyRef {
    pub map_id: String,
    pub instance_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DefeatedEnemy {
    pub map_id: String,
    pub instance_id: String,
    pub respawn_seconds: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DefeatedPlayer {
    pub id: CharacterId,
    pub level: u32,
}

/// Health and mana a player walks away with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FinalState {
    pub health: u32,
    pub mana: u32,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RewardDistribution {
    pub combat_id: CombatId,
    pub map_id: String,
    pub combat_type: CombatType,
    pub winner: Option<FactionId>,
    /// Granted in full to every rewarded player.
    pub total_experience: u64,
    pub total_gold: u64,
    pub gold_per_player: u64,
    /// Granted entirely to the party leader.
    pub items: Vec<String>,
    pub rewarded_players: Vec<CharacterId>,
    pub party_leader: Option<CharacterId>,
    pub final_states: BTreeMap<CharacterId, FinalState>,
    pub defeated_players: Vec<DefeatedPlayer>,
    pub defeated_enemies: Vec<DefeatedEnemy>,
    pub enemies_to_reset: Vec<EnemyRef>,
    /// Every player left the fight; enemies walk away instead of dying.
    pub enemies_disengaged: bool,
    /// Every player that took part, for window-state cleanup.
    pub participants: Vec<CharacterId>,
}

impl RewardDistribution {
    pub fn is_defeated(&self, player: &CharacterId) -> bool {
        self.defeated_players.iter().any(|d| &d.id == player)
    }
}

/// Builds the distribution for a combat that just concluded.
pub(crate) fn calculate(
    instance: &mut CombatInstance,
    winner: Option<FactionId>,
    loot: &dyn LootOracle,
) -> RewardDistribution {
    let players: Vec<&CombatCharacter> = instance.players().collect();
    let enemies: Vec<&CombatCharacter> = instance.characters().filter(|c| c.is_enemy()).collect();

    let enemies_disengaged =
        players.iter().any(|p| p.forfeited) && players.iter().all(|p| !p.is_alive());

    let rewarded_players: Vec<CharacterId> = match &winner {
        Some(faction) => players
            .iter()
            .filter(|p| &p.faction == faction && p.is_alive())
            .map(|p| p.id.clone())
            .collect(),
        None => Vec::new(),
    };

    let party_leader = players
        .iter()
        .find(|p| p.party_leader && rewarded_players.contains(&p.id))
        .map(|p| p.id.clone())
        .or_else(|| rewarded_players.first().cloned());

    let final_states = players
        .iter()
        .map(|p| {
            let state = FinalState {
                health: p.health,
                mana: p.mana,
            };
            (p.id.clone(), state)
        })
        .collect();

    let defeated_players = players
        .iter()
        .filter(|p| !p.is_alive() && !p.forfeited)
        .map(|p| DefeatedPlayer {
            id: p.id.clone(),
            level: p.level,
        })
        .collect();

    let participants = players.iter().map(|p| p.id.clone()).collect();

    let (defeated_enemies, enemies_to_reset) = if enemies_disengaged {
        let reset = enemies
            .iter()
            .filter_map(|e| e.enemy.as_ref())
            .map(|o| EnemyRef {
                map_id: o.map_id.clone(),
                instance_id: o.instance_id.clone(),
            })
            .collect();
        (Vec::new(), reset)
    } else {
        let defeated = enemies
            .iter()
            .filter(|e| !e.is_alive())
            .filter_map(|e| e.enemy.as_ref())
            .map(|o| DefeatedEnemy {
                map_id: o.map_id.clone(),
                instance_id: o.instance_id.clone(),
                respawn_seconds: o.respawn_seconds,
            })
            .collect();
        let reset = enemies
            .iter()
            .filter(|e| e.is_alive())
            .filter_map(|e| e.enemy.as_ref())
            .map(|o| EnemyRef {
                map_id: o.map_id.clone(),
                instance_id: o.instance_id.clone(),
            })
            .collect();
        (defeated, reset)
    };

    // Loot tables of kills credited to the winning faction.
    let credited: Vec<EnemyLoot> = match (&winner, rewarded_players.is_empty()) {
        (Some(faction), false) => enemies
            .iter()
            .filter(|e| &e.faction != faction && !e.is_alive() && !e.forfeited)
            .filter(|e| {
                instance
                    .ledger()
                    .loot_owner(&e.id, false)
                    .is_none_or(|owner| &owner == faction)
            })
            .map(|e| {
                e.enemy
                    .as_ref()
                    .and_then(|o| loot.enemy_loot(&o.template_id))
                    .unwrap_or_else(|| EnemyLoot::fallback(e.max_health))
            })
            .collect(),
        _ => Vec::new(),
    };

    let combat_id = instance.id();
    let map_id = instance.map_id().to_owned();
    let combat_type = instance.combat_type();

    let total_experience = credited.iter().map(|l| l.experience).sum();
    let total_gold: u64 = credited.iter().map(|l| l.gold).sum();
    let gold_per_player = match rewarded_players.len() {
        0 => 0,
        k => total_gold / k as u64,
    };

    let rng = instance.rng_mut();
    let items = credited
        .iter()
        .flat_map(|l| l.drops.iter())
        .filter(|drop| rng.r#gen::<f64>() < drop.chance)
        .map(|drop| drop.item_id.clone())
        .collect();

    RewardDistribution {
        combat_id,
        map_id,
        combat_type,
        winner,
        total_experience,
        total_gold,
        gold_per_player,
        items,
        rewarded_players,
        party_leader,
        final_states,
        defeated_players,
        defeated_enemies,
        enemies_to_reset,
        enemies_disengaged,
        participants,
    }
}
