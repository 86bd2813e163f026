//! Combat-time character snapshots.
//!
//! A [`CombatCharacter`] is copied out of the persistent player/enemy record
//! when it joins a combat and is owned by that combat until settlement writes
//! the results back. Stats never change mid-fight; health, mana, cooldowns and
//! the dead/forfeited flags do.
use std::collections::HashMap;

use crate::types::{CharacterId, CharacterKind, FactionId, PartyId};

/// Offensive and defensive stats used by the damage resolver and scheduler.
///
/// Rates are probabilities in `[0, 1]`; `crit_damage` is the bonus added on
/// top of the 150% critical multiplier.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatStats {
    pub physical_attack: i32,
    pub magic_attack: i32,
    pub physical_defense: i32,
    pub magic_defense: i32,
    pub speed: i32,
    pub crit_rate: f64,
    pub crit_damage: f64,
    pub hit_rate: f64,
    pub dodge_rate: f64,
}

impl CombatStats {
    /// Sum of both defenses; the AI's "tankiness" score.
    pub fn total_defense(&self) -> i64 {
        i64::from(self.physical_defense) + i64::from(self.magic_defense)
    }
}

/// Where an enemy came from, so settlement can update the map entity.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnemyOrigin {
    pub map_id: String,
    pub instance_id: String,
    pub template_id: String,
    pub respawn_seconds: u32,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatCharacter {
    pub id: CharacterId,
    pub kind: CharacterKind,
    pub name: String,
    pub faction: FactionId,
    pub party: Option<PartyId>,
    pub party_leader: bool,
    pub level: u32,
    pub health: u32,
    pub max_health: u32,
    pub mana: u32,
    pub max_mana: u32,
    pub stats: CombatStats,
    pub skills: Vec<String>,
    pub cooldowns: HashMap<String, u32>,
    pub dead: bool,
    /// Left the fight voluntarily; counts as dead but is not penalized.
    pub forfeited: bool,
    pub enemy: Option<EnemyOrigin>,
}

impl CombatCharacter {
    /// Creates a character at full health and mana.
    pub fn new(
        id: impl Into<CharacterId>,
        kind: CharacterKind,
        name: impl Into<String>,
        faction: impl Into<FactionId>,
        max_health: u32,
        max_mana: u32,
        stats: CombatStats,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            name: name.into(),
            faction: faction.into(),
            party: None,
            party_leader: false,
            level: 1,
            health: max_health,
            max_health,
            mana: max_mana,
            max_mana,
            stats,
            skills: Vec::new(),
            cooldowns: HashMap::new(),
            dead: false,
            forfeited: false,
            enemy: None,
        }
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    pub fn with_skills<I, S>(mut self, skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skills = skills.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_party(mut self, party: impl Into<PartyId>, leader: bool) -> Self {
        self.party = Some(party.into());
        self.party_leader = leader;
        self
    }

    pub fn with_enemy_origin(mut self, origin: EnemyOrigin) -> Self {
        self.enemy = Some(origin);
        self
    }

    /// Overrides current health/mana, e.g. for a player who enters hurt.
    pub fn with_resources(mut self, health: u32, mana: u32) -> Self {
        self.health = health.min(self.max_health);
        self.mana = mana.min(self.max_mana);
        self
    }

    pub fn is_alive(&self) -> bool {
        !self.dead && self.health > 0
    }

    pub fn is_player(&self) -> bool {
        self.kind == CharacterKind::Player
    }

    pub fn is_enemy(&self) -> bool {
        self.kind == CharacterKind::Enemy
    }

    pub fn take_damage(&mut self, amount: u32) {
        self.health = self.health.saturating_sub(amount);
        if self.health == 0 {
            self.dead = true;
        }
    }

    /// Heals up to max health and returns the amount actually restored.
    pub fn heal(&mut self, amount: u32) -> u32 {
        if !self.is_alive() {
            return 0;
        }
        let before = self.health;
        self.health = self.health.saturating_add(amount).min(self.max_health);
        self.health - before
    }

    pub fn restore_mana(&mut self, amount: u32) -> u32 {
        let before = self.mana;
        self.mana = self.mana.saturating_add(amount).min(self.max_mana);
        self.mana - before
    }

    /// Spends mana if enough is available; leaves it untouched otherwise.
    pub fn consume_mana(&mut self, amount: u32) -> bool {
        if self.mana < amount {
            return false;
        }
        self.mana -= amount;
        true
    }

    pub fn cooldown_remaining(&self, skill_id: &str) -> u32 {
        self.cooldowns.get(skill_id).copied().unwrap_or(0)
    }

    pub fn is_skill_on_cooldown(&self, skill_id: &str) -> bool {
        self.cooldown_remaining(skill_id) > 0
    }

    pub fn set_cooldown(&mut self, skill_id: &str, turns: u32) {
        if turns > 0 {
            self.cooldowns.insert(skill_id.to_owned(), turns);
        }
    }

    /// Counts every cooldown down by one turn.
    pub fn tick_cooldowns(&mut self) {
        self.cooldowns.retain(|_, remaining| {
            *remaining = remaining.saturating_sub(1);
            *remaining > 0
        });
    }

    /// Marks the character as having left the fight.
    pub fn forfeit(&mut self) {
        self.forfeited = true;
        self.dead = true;
    }
}

/// One faction's members within a combat.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatParty {
    pub faction: FactionId,
    pub members: Vec<CombatCharacter>,
}

impl CombatParty {
    pub fn new(faction: FactionId) -> Self {
        Self {
            faction,
            members: Vec::new(),
        }
    }

    pub fn has_alive_characters(&self) -> bool {
        self.members.iter().any(CombatCharacter::is_alive)
    }

    pub fn alive(&self) -> impl Iterator<Item = &CombatCharacter> {
        self.members.iter().filter(|c| c.is_alive())
    }
}
