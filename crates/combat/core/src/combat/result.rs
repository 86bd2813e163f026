//! Attack result types and full attack resolution.

use rand::Rng;

use crate::character::CombatStats;

use super::damage::{DamageKind, calculate_damage};
use super::hit::{check_crit, check_hit};

/// Result of one attack against one target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttackResult {
    pub hit: bool,
    pub crit: bool,
    pub damage: u32,
    pub missed: bool,
}

impl AttackResult {
    pub const MISS: Self = Self {
        hit: false,
        crit: false,
        damage: 0,
        missed: true,
    };
}

/// Resolves a complete attack: hit roll, crit roll, then damage.
///
/// A miss ends resolution immediately, so it consumes one roll while a hit
/// consumes two.
pub fn resolve_attack<R>(
    rng: &mut R,
    attacker: &CombatStats,
    defender: &CombatStats,
    kind: DamageKind,
    multiplier: f64,
) -> AttackResult
where
    R: Rng + ?Sized,
{
    if !check_hit(attacker.hit_rate, defender.dodge_rate, rng.r#gen::<f64>()) {
        return AttackResult::MISS;
    }

    let crit = check_crit(attacker.crit_rate, rng.r#gen::<f64>());
    let damage = calculate_damage(attacker, defender, kind, multiplier, crit);

    AttackResult {
        hit: true,
        crit,
        damage,
        missed: false,
    }
}
