//! Damage arithmetic.

use crate::character::CombatStats;

/// Which attack/defense pair a skill uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum DamageKind {
    #[default]
    Physical,
    Magical,
    /// Support skills; heal instead of dealing damage.
    None,
}

/// Computes damage for a landed attack.
///
/// ```text
/// base   = attack - defense          (1 if non-positive)
/// damage = trunc(base * multiplier)
/// crit   = trunc(damage * (1.5 + crit_damage))
/// ```
///
/// Truncation happens after each multiplication, in that order.
pub fn calculate_damage(
    attacker: &CombatStats,
    defender: &CombatStats,
    kind: DamageKind,
    multiplier: f64,
    crit: bool,
) -> u32 {
    let (attack, defense) = match kind {
        DamageKind::Physical => (attacker.physical_attack, defender.physical_defense),
        DamageKind::Magical | DamageKind::None => (attacker.magic_attack, defender.magic_defense),
    };

    let mut base = i64::from(attack) - i64::from(defense);
    if base <= 0 {
        base = 1;
    }

    let damage = (base as f64 * multiplier) as u32;
    if crit {
        (f64::from(damage) * (1.5 + attacker.crit_damage)) as u32
    } else {
        damage
    }
}
