//! Skill definitions and lookup by player-facing name.
mod executor;

pub use executor::{SkillExecution, execute_skill};

use crate::character::CombatCharacter;
use crate::combat::DamageKind;
use crate::env::SkillOracle;
use crate::error::CombatError;

/// Id of the attack every combatant knows without learning it.
pub const BASIC_ATTACK_ID: &str = "basic_attack";

/// Shape of a skill's targeting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum SkillTarget {
    #[strum(serialize = "SELF")]
    SelfOnly,
    AllySingle,
    AllyAll,
    EnemySingle,
    EnemyAll,
}

impl SkillTarget {
    pub fn is_single(self) -> bool {
        matches!(self, SkillTarget::AllySingle | SkillTarget::EnemySingle)
    }

    pub fn is_offensive(self) -> bool {
        matches!(self, SkillTarget::EnemySingle | SkillTarget::EnemyAll)
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkillDefinition {
    pub id: String,
    pub name: String,
    pub target: SkillTarget,
    pub damage: DamageKind,
    pub mana_cost: u32,
    /// Turns the skill stays unavailable after use.
    pub cooldown: u32,
    pub multiplier: f64,
}

impl SkillDefinition {
    pub fn basic_attack() -> Self {
        Self {
            id: BASIC_ATTACK_ID.to_owned(),
            name: "Attack".to_owned(),
            target: SkillTarget::EnemySingle,
            damage: DamageKind::Physical,
            mana_cost: 0,
            cooldown: 0,
            multiplier: 1.0,
        }
    }

    pub fn is_basic_attack(&self) -> bool {
        self.id == BASIC_ATTACK_ID
    }
}

/// Looks up a skill by id, answering the basic attack without the oracle.
pub fn skill_by_id<O>(oracle: &O, id: &str) -> Option<SkillDefinition>
where
    O: SkillOracle + ?Sized,
{
    if id == BASIC_ATTACK_ID {
        return Some(SkillDefinition::basic_attack());
    }
    oracle.skill(id)
}

/// Resolves what a player typed into one of the caster's skills.
///
/// Accepts the basic attack by id or name, then an exact id from the
/// caster's skill list, then a case-insensitive display name among the
/// caster's skills.
pub fn resolve_skill<O>(
    oracle: &O,
    caster: &CombatCharacter,
    name: &str,
) -> Result<SkillDefinition, CombatError>
where
    O: SkillOracle + ?Sized,
{
    let name = name.trim();
    let basic = SkillDefinition::basic_attack();
    if name == basic.id || name.eq_ignore_ascii_case(&basic.name) {
        return Ok(basic);
    }

    if caster.skills.iter().any(|s| s == name) {
        return oracle.skill(name).ok_or(CombatError::SkillNotFound);
    }

    caster
        .skills
        .iter()
        .filter_map(|id| oracle.skill(id))
        .find(|skill| skill.name.eq_ignore_ascii_case(name))
        .ok_or(CombatError::SkillNotFound)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::character::CombatStats;
    use crate::types::CharacterKind;

    struct Skills(HashMap<String, SkillDefinition>);

    impl SkillOracle for Skills {
        fn skill(&self, id: &str) -> Option<SkillDefinition> {
            self.0.get(id).cloned()
        }
    }

    fn oracle() -> Skills {
        let fireball = SkillDefinition {
            id: "fireball".into(),
            name: "Fire Ball".into(),
            target: SkillTarget::EnemySingle,
            damage: DamageKind::Magical,
            mana_cost: 10,
            cooldown: 2,
            multiplier: 1.5,
        };
        Skills(HashMap::from([(fireball.id.clone(), fireball)]))
    }

    fn mage() -> CombatCharacter {
        CombatCharacter::new(
            "m",
            CharacterKind::Player,
            "Mira",
            "heroes",
            80,
            100,
            CombatStats::default(),
        )
        .with_skills(["fireball"])
    }

    #[test]
    fn resolves_by_id_then_by_display_name() {
        let oracle = oracle();
        let mage = mage();
        assert_eq!(resolve_skill(&oracle, &mage, "fireball").map(|s| s.id), Ok("fireball".into()));
        assert_eq!(resolve_skill(&oracle, &mage, "fire ball").map(|s| s.id), Ok("fireball".into()));
        assert_eq!(
            resolve_skill(&oracle, &mage, "attack").map(|s| s.id),
            Ok(BASIC_ATTACK_ID.into())
        );
    }

    #[test]
    fn unknown_or_unlearned_skills_are_rejected() {
        let oracle = oracle();
        let mut mage = mage();
        assert_eq!(resolve_skill(&oracle, &mage, "meteor"), Err(CombatError::SkillNotFound));
        mage.skills.clear();
        assert_eq!(resolve_skill(&oracle, &mage, "fireball"), Err(CombatError::SkillNotFound));
    }

    #[test]
    fn target_names_parse_case_insensitively() {
        assert_eq!("self".parse::<SkillTarget>(), Ok(SkillTarget::SelfOnly));
        assert_eq!("enemy_all".parse::<SkillTarget>(), Ok(SkillTarget::EnemyAll));
    }
}
