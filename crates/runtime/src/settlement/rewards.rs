//! Grants experience, gold and items to the winners.

use tracing::{error, info, warn};

use combat_core::{CharacterId, ItemOracle, RewardDistribution};

use crate::repository::{PlayerRepository, Result};

/// Every rewarded player gets the full experience and an equal share of
/// gold; the party leader receives all item drops.
pub(crate) fn distribute(
    players: &dyn PlayerRepository,
    items: &dyn ItemOracle,
    reward: &RewardDistribution,
) {
    for player in &reward.rewarded_players {
        let is_leader = reward.party_leader.as_ref() == Some(player);
        if let Err(e) = grant(players, items, reward, player, is_leader) {
            error!(combat = %reward.combat_id, %player, "failed to grant rewards: {e}");
        }
    }
}

fn grant(
    players: &dyn PlayerRepository,
    items: &dyn ItemOracle,
    reward: &RewardDistribution,
    player: &CharacterId,
    is_leader: bool,
) -> Result<()> {
    let Some(mut record) = players.load(player)? else {
        warn!(combat = %reward.combat_id, %player, "rewarded player has no record");
        return Ok(());
    };

    record.experience = record.experience.saturating_add(reward.total_experience);
    record.gold = record.gold.saturating_add(reward.gold_per_player);
    record.in_combat = None;

    if is_leader {
        for item_id in &reward.items {
            let stackable = items.item(item_id).is_none_or(|item| item.stackable());
            if !record.add_item(item_id, 1, stackable) {
                warn!(%player, item = %item_id, "inventory full; drop lost");
            }
        }
    }

    info!(
        combat = %reward.combat_id,
        %player,
        experience = reward.total_experience,
        gold = reward.gold_per_player,
        items = if is_leader { reward.items.len() } else { 0 },
        "rewards granted"
    );
    players.save(&record)
}
