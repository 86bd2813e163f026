//! Decision making for non-player combatants.
use std::cmp::Reverse;

use rand::seq::SliceRandom;

use crate::env::SkillOracle;
use crate::instance::CombatInstance;
use crate::skill::{SkillDefinition, SkillTarget, skill_by_id};
use crate::types::CharacterId;

/// What a non-player combatant does with its turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AiDecision {
    Skip,
    Cast {
        skill_id: String,
        target: Option<CharacterId>,
    },
}

/// Chooses actions for combatants no player controls.
pub trait CombatAi: Send + Sync {
    fn decide(
        &self,
        instance: &mut CombatInstance,
        actor: &CharacterId,
        skills: &dyn SkillOracle,
    ) -> AiDecision;
}

/// Goes after the sturdiest opponent with a random ready skill.
///
/// The target is the living opponent with the highest physical plus magic
/// defense (first in join order on ties). The skill is drawn uniformly from
/// known skills that are off cooldown and affordable, falling back to the
/// basic attack.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreatAi;

impl CombatAi for ThreatAi {
    fn decide(
        &self,
        instance: &mut CombatInstance,
        actor: &CharacterId,
        skills: &dyn SkillOracle,
    ) -> AiDecision {
        let Some(me) = instance.character(actor).filter(|c| c.is_alive()) else {
            return AiDecision::Skip;
        };

        let Some(target) = instance
            .enemies_of(&me.faction)
            .min_by_key(|c| Reverse(c.stats.total_defense()))
            .map(|c| c.id.clone())
        else {
            return AiDecision::Skip;
        };

        let available: Vec<SkillDefinition> = me
            .skills
            .iter()
            .filter(|id| !me.is_skill_on_cooldown(id))
            .filter_map(|id| skill_by_id(skills, id))
            .filter(|s| s.mana_cost <= me.mana)
            .collect();

        let skill = available
            .choose(instance.rng_mut())
            .cloned()
            .unwrap_or_else(SkillDefinition::basic_attack);

        let target = match skill.target {
            SkillTarget::EnemySingle => Some(target),
            SkillTarget::AllySingle => Some(actor.clone()),
            SkillTarget::SelfOnly | SkillTarget::AllyAll | SkillTarget::EnemyAll => None,
        };

        AiDecision::Cast {
            skill_id: skill.id,
            target,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::character::{CombatCharacter, CombatStats};
    use crate::combat::DamageKind;
    use crate::skill::BASIC_ATTACK_ID;
    use crate::types::{CharacterKind, CombatId};

    struct Skills(HashMap<String, SkillDefinition>);

    impl SkillOracle for Skills {
        fn skill(&self, id: &str) -> Option<SkillDefinition> {
            self.0.get(id).cloned()
        }
    }

    fn bite() -> SkillDefinition {
        SkillDefinition {
            id: "bite".into(),
            name: "Bite".into(),
            target: SkillTarget::EnemySingle,
            damage: DamageKind::Physical,
            mana_cost: 0,
            cooldown: 3,
            multiplier: 1.4,
        }
    }

    fn defense(physical_defense: i32, magic_defense: i32) -> CombatStats {
        CombatStats {
            physical_defense,
            magic_defense,
            speed: 100,
            ..CombatStats::default()
        }
    }

    fn hero(id: &str, name: &str, health: u32, mana: u32, stats: CombatStats) -> CombatCharacter {
        CombatCharacter::new(id, CharacterKind::Player, name, "heroes", health, mana, stats)
    }

    fn den() -> CombatInstance {
        let stats = defense(5, 5);
        let wolf = CombatCharacter::new("wolf", CharacterKind::Enemy, "Wolf", "wild", 80, 0, stats)
            .with_skills(["bite"]);
        let mut instance = CombatInstance::with_seed(CombatId(9), "cave", 3);
        instance
            .add_party(
                "heroes".into(),
                vec![
                    hero("mage", "Mage", 60, 90, defense(5, 40)),
                    hero("tank", "Tank", 200, 10, defense(50, 10)),
                    hero("rogue", "Rogue", 90, 30, defense(20, 20)),
                ],
            )
            .expect("heroes join");
        instance
            .add_character("wild".into(), wolf)
            .expect("wolf joins");
        instance
    }

    #[test]
    fn targets_the_highest_total_defense() {
        let mut instance = den();
        let skills = Skills(HashMap::from([("bite".to_string(), bite())]));
        let decision = ThreatAi.decide(&mut instance, &"wolf".into(), &skills);
        assert_eq!(
            decision,
            AiDecision::Cast {
                skill_id: "bite".into(),
                target: Some("tank".into())
            }
        );
    }

    #[test]
    fn falls_back_to_basic_attack_when_everything_is_cooling_down() {
        let mut instance = den();
        if let Some(wolf) = instance.character_mut(&"wolf".into()) {
            wolf.set_cooldown("bite", 2);
        }
        let skills = Skills(HashMap::from([("bite".to_string(), bite())]));
        match ThreatAi.decide(&mut instance, &"wolf".into(), &skills) {
            AiDecision::Cast { skill_id, .. } => assert_eq!(skill_id, BASIC_ATTACK_ID),
            AiDecision::Skip => panic!("wolf should attack"),
        }
    }

    #[test]
    fn skips_without_living_opponents() {
        let mut instance = den();
        for id in ["mage", "tank", "rogue"] {
            if let Some(c) = instance.character_mut(&id.into()) {
                c.take_damage(1_000);
            }
        }
        let skills = Skills(HashMap::new());
        assert_eq!(ThreatAi.decide(&mut instance, &"wolf".into(), &skills), AiDecision::Skip);
    }
}
