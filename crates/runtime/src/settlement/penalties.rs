//! Death penalties for defeated players.

use tracing::{error, info, warn};

use combat_core::{DefeatedPlayer, MapOracle, RewardDistribution, Waypoint};

use crate::repository::{PlayerRecord, PlayerRepository, Result};

/// Share of experience a defeated player loses, as a divisor.
const EXPERIENCE_LOSS_DIVISOR: u64 = 10;

/// Penalizes, teleports and restores every defeated player.
///
/// Experience is only lost when the map has a recommended level and the
/// player was above it when the fight ended.
pub(crate) fn apply(
    players: &dyn PlayerRepository,
    maps: &dyn MapOracle,
    reward: &RewardDistribution,
) {
    let recommended = maps
        .map(&reward.map_id)
        .and_then(|map| map.recommended_level);

    for defeated in &reward.defeated_players {
        if let Err(e) = penalize(players, maps, recommended, defeated) {
            error!(
                combat = %reward.combat_id,
                player = %defeated.id,
                "failed to apply death penalty: {e}"
            );
        }
    }
}

fn penalize(
    players: &dyn PlayerRepository,
    maps: &dyn MapOracle,
    recommended: Option<u32>,
    defeated: &DefeatedPlayer,
) -> Result<()> {
    let Some(mut record) = players.load(&defeated.id)? else {
        warn!(player = %defeated.id, "defeated player has no record");
        return Ok(());
    };

    if recommended.is_some_and(|level| defeated.level > level) {
        let lost = record.experience / EXPERIENCE_LOSS_DIVISOR;
        record.experience -= lost;
        info!(player = %defeated.id, lost, "experience lost on defeat");
    }

    match respawn_point(maps, &record) {
        Some(waypoint) => {
            record.map_id = waypoint.map_id;
            record.position = (waypoint.x, waypoint.y);
        }
        None => warn!(player = %defeated.id, "no safe waypoint to respawn at"),
    }

    record.health = record.max_health;
    record.mana = record.max_mana;
    record.in_combat = None;
    players.save(&record)
}

/// The player's last safe waypoint if it still sits on a safe map, else the
/// world's fallback.
fn respawn_point(maps: &dyn MapOracle, record: &PlayerRecord) -> Option<Waypoint> {
    record
        .last_safe_waypoint
        .as_deref()
        .and_then(|id| maps.waypoint(id))
        .filter(|waypoint| maps.map(&waypoint.map_id).is_some_and(|map| map.safe))
        .or_else(|| maps.fallback_waypoint())
}
