//! Applies a skill's effect to its targets.
//!
//! Execution mutates health and the loot ledger and writes log lines. It
//! never touches the action bar or decides whether the combat is over; the
//! caller does both once this returns.
use crate::character::CombatStats;
use crate::combat::{DamageKind, resolve_attack};
use crate::error::CombatError;
use crate::instance::CombatInstance;
use crate::types::{CharacterId, FactionId};

use super::{SkillDefinition, SkillTarget};

/// Log lines produced by one skill use, in order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SkillExecution {
    pub logs: Vec<String>,
}

impl SkillExecution {
    fn push(&mut self, instance: &mut CombatInstance, line: String) {
        instance.push_log(line.clone());
        self.logs.push(line);
    }
}

/// Executes `skill` cast by `caster` on `target`.
///
/// Single-target shapes require a living target on the correct side; that is
/// checked before anything is mutated. Mana and cooldowns are the caller's
/// concern.
pub fn execute_skill(
    instance: &mut CombatInstance,
    caster: &CharacterId,
    skill: &SkillDefinition,
    target: Option<&CharacterId>,
) -> Result<SkillExecution, CombatError> {
    let (caster_name, faction, stats) = match instance.character(caster) {
        Some(c) if c.is_alive() => (c.name.clone(), c.faction.clone(), c.stats),
        _ => return Err(CombatError::CasterUnavailable),
    };

    let targets = resolve_targets(instance, caster, &faction, skill.target, target)?;

    let mut execution = SkillExecution::default();
    let headline = match (skill.target.is_single(), targets.first()) {
        (true, Some(id)) => {
            let name = instance.character(id).map(|c| c.name.clone()).unwrap_or_default();
            format!("{caster_name} used {} on {name}", skill.name)
        }
        _ => format!("{caster_name} used {}", skill.name),
    };
    execution.push(instance, headline);

    for target in &targets {
        if skill.target.is_offensive() {
            strike(instance, &mut execution, &faction, &stats, skill, target);
        } else if skill.damage == DamageKind::None {
            let amount = (f64::from(stats.magic_attack) * skill.multiplier).max(0.0) as u32;
            mend(instance, &mut execution, target, amount);
        }
    }

    Ok(execution)
}

fn resolve_targets(
    instance: &CombatInstance,
    caster: &CharacterId,
    faction: &FactionId,
    shape: SkillTarget,
    target: Option<&CharacterId>,
) -> Result<Vec<CharacterId>, CombatError> {
    let targets = match shape {
        SkillTarget::SelfOnly => vec![caster.clone()],
        SkillTarget::AllyAll => instance
            .alive_in_faction(faction)
            .map(|c| c.id.clone())
            .collect(),
        SkillTarget::EnemyAll => instance.enemies_of(faction).map(|c| c.id.clone()).collect(),
        SkillTarget::AllySingle | SkillTarget::EnemySingle => {
            let wants_ally = shape == SkillTarget::AllySingle;
            let resolved = target
                .and_then(|id| instance.character(id))
                .filter(|c| c.is_alive() && (c.faction == *faction) == wants_ally)
                .ok_or(CombatError::InvalidTarget)?;
            vec![resolved.id.clone()]
        }
    };
    Ok(targets)
}

fn strike(
    instance: &mut CombatInstance,
    execution: &mut SkillExecution,
    faction: &FactionId,
    stats: &CombatStats,
    skill: &SkillDefinition,
    target: &CharacterId,
) {
    let Some(defender) = instance.character(target).filter(|c| c.is_alive()) else {
        return;
    };
    let (defender_stats, name) = (defender.stats, defender.name.clone());

    let result = resolve_attack(
        instance.rng_mut(),
        stats,
        &defender_stats,
        skill.damage,
        skill.multiplier,
    );
    if result.missed {
        execution.push(instance, format!("{name} dodged the attack"));
        return;
    }

    let Some(defender) = instance.character_mut(target) else {
        return;
    };
    defender.take_damage(result.damage);
    let (health, max_health, alive) = (defender.health, defender.max_health, defender.is_alive());

    instance.ledger_mut().record_damage(faction, target, result.damage);

    let crit = if result.crit { " (critical!)" } else { "" };
    execution.push(
        instance,
        format!("{name} took {} damage{crit} ({health}/{max_health})", result.damage),
    );
    if !alive {
        execution.push(instance, format!("{name} was defeated!"));
    }
}

fn mend(
    instance: &mut CombatInstance,
    execution: &mut SkillExecution,
    target: &CharacterId,
    amount: u32,
) {
    let Some(character) = instance.character_mut(target) else {
        return;
    };
    let restored = character.heal(amount);
    let line = format!(
        "{} recovered {restored} HP ({}/{})",
        character.name, character.health, character.max_health
    );
    execution.push(instance, line);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::CombatCharacter;
    use crate::types::{CharacterKind, CombatId};

    fn stats(physical_attack: i32, physical_defense: i32, magic_attack: i32) -> CombatStats {
        CombatStats {
            physical_attack,
            physical_defense,
            magic_attack,
            speed: 100,
            hit_rate: 1.0,
            ..CombatStats::default()
        }
    }

    fn fighter(
        id: &str,
        kind: CharacterKind,
        name: &str,
        health: u32,
        mana: u32,
        stats: CombatStats,
    ) -> CombatCharacter {
        let faction = if kind == CharacterKind::Player { "heroes" } else { "wild" };
        CombatCharacter::new(id, kind, name, faction, health, mana, stats)
    }

    fn arena() -> CombatInstance {
        let mut instance = CombatInstance::with_seed(CombatId(1), "forest", 42);
        let heroes = vec![
            fighter("k", CharacterKind::Player, "Knight", 200, 50, stats(60, 30, 0)),
            fighter("c", CharacterKind::Player, "Cleric", 100, 80, stats(10, 10, 40))
                .with_resources(40, 80),
        ];
        let monsters = vec![
            fighter("w1", CharacterKind::Enemy, "Wolf", 50, 0, stats(20, 20, 0)),
            fighter("w2", CharacterKind::Enemy, "Bear", 300, 0, stats(40, 40, 0)),
        ];
        instance.add_party("heroes".into(), heroes).expect("heroes join");
        instance.add_party("wild".into(), monsters).expect("monsters join");
        instance
    }

    fn skill(target: SkillTarget, damage: DamageKind, multiplier: f64) -> SkillDefinition {
        SkillDefinition {
            id: "test".into(),
            name: "Test".into(),
            target,
            damage,
            mana_cost: 0,
            cooldown: 0,
            multiplier,
        }
    }

    #[test]
    fn single_target_strike_records_damage_for_caster_faction() {
        let mut instance = arena();
        let basic = SkillDefinition::basic_attack();
        let wolf = CharacterId::from("w1");

        let out = execute_skill(&mut instance, &"k".into(), &basic, Some(&wolf)).expect("executes");

        assert_eq!(instance.character(&wolf).map(|c| c.health), Some(10));
        assert_eq!(instance.ledger().total_by(&wolf, &"heroes".into()), 40);
        assert_eq!(out.logs[0], "Knight used Attack on Wolf");
        assert!(out.logs[1].starts_with("Wolf took 40 damage"));
    }

    #[test]
    fn killing_blow_logs_defeat() {
        let mut instance = arena();
        let smash = skill(SkillTarget::EnemySingle, DamageKind::Physical, 2.0);
        let out = execute_skill(&mut instance, &"k".into(), &smash, Some(&"w1".into()))
            .expect("executes");
        assert_eq!(out.logs.last().map(String::as_str), Some("Wolf was defeated!"));
        assert!(instance.character(&"w1".into()).is_some_and(|c| c.dead));
    }

    #[test]
    fn area_strike_hits_every_living_enemy_once() {
        let mut instance = arena();
        let sweep = skill(SkillTarget::EnemyAll, DamageKind::Physical, 1.0);
        execute_skill(&mut instance, &"k".into(), &sweep, None).expect("executes");
        assert_eq!(instance.character(&"w1".into()).map(|c| c.health), Some(10));
        assert_eq!(instance.character(&"w2".into()).map(|c| c.health), Some(280));
        assert_eq!(instance.character(&"c".into()).map(|c| c.health), Some(40));
    }

    #[test]
    fn support_skills_heal_by_magic_attack() {
        let mut instance = arena();
        let mend = skill(SkillTarget::AllySingle, DamageKind::None, 1.5);
        execute_skill(&mut instance, &"k".into(), &mend, Some(&"c".into())).expect("heals ally");
        // Knight has no magic attack.
        assert_eq!(instance.character(&"c".into()).map(|c| c.health), Some(40));

        let prayer = skill(SkillTarget::SelfOnly, DamageKind::None, 1.5);
        execute_skill(&mut instance, &"c".into(), &prayer, None).expect("heals self");
        assert_eq!(instance.character(&"c".into()).map(|c| c.health), Some(100));
    }

    #[test]
    fn invalid_single_targets_are_rejected_before_any_effect() {
        let mut instance = arena();
        let basic = SkillDefinition::basic_attack();
        let before = instance.log().last_sequence();

        for target in [None, Some(CharacterId::from("ghost")), Some(CharacterId::from("c"))] {
            let err = execute_skill(&mut instance, &"k".into(), &basic, target.as_ref());
            assert_eq!(err, Err(CombatError::InvalidTarget));
        }
        let heal = skill(SkillTarget::AllySingle, DamageKind::None, 1.0);
        let err = execute_skill(&mut instance, &"c".into(), &heal, Some(&"w1".into()));
        assert_eq!(err, Err(CombatError::InvalidTarget));

        assert_eq!(instance.log().last_sequence(), before);
    }

    #[test]
    fn dead_casters_cannot_act() {
        let mut instance = arena();
        if let Some(k) = instance.character_mut(&"k".into()) {
            k.take_damage(999);
        }
        let attack = SkillDefinition::basic_attack();
        let err = execute_skill(&mut instance, &"k".into(), &attack, Some(&"w1".into()));
        assert_eq!(err, Err(CombatError::CasterUnavailable));
    }
}
