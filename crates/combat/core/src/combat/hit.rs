//! Hit and critical rolls.

/// Rolls whether an attack lands.
///
/// The success probability is `hit_rate - dodge_rate`; a non-positive value
/// never hits. `roll` is uniform in `[0, 1)`.
pub fn check_hit(hit_rate: f64, dodge_rate: f64, roll: f64) -> bool {
    let chance = (hit_rate - dodge_rate).max(0.0);
    roll < chance
}

/// Rolls whether a landed attack is critical.
pub fn check_crit(crit_rate: f64, roll: f64) -> bool {
    roll < crit_rate
}
