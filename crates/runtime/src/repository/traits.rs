//! Collaborator contracts consumed by the engine and settlement.

use chrono::{DateTime, Utc};

use combat_core::{CharacterId, CombatId};

use super::error::Result;
use super::types::{PlayerRecord, Window, WindowTransition};

/// Player records: health, mana, experience, gold, inventory, location.
pub trait PlayerRepository: Send + Sync {
    fn load(&self, id: &CharacterId) -> Result<Option<PlayerRecord>>;

    fn save(&self, record: &PlayerRecord) -> Result<()>;
}

/// Map-placed enemy lifecycle.
pub trait EnemyRepository: Send + Sync {
    /// Flags an enemy as engaged so nobody else can start a fight with it.
    fn engage(&self, map_id: &str, instance_id: &str, combat: CombatId) -> Result<()>;

    /// Kills an enemy until `respawn_at`.
    fn mark_dead(&self, map_id: &str, instance_id: &str, respawn_at: DateTime<Utc>) -> Result<()>;

    /// Returns an enemy to its idle, alive state.
    fn reset(&self, map_id: &str, instance_id: &str) -> Result<()>;
}

/// Tracks which view each player's client shows.
pub trait WindowStateService: Send + Sync {
    fn current_window(&self, player: &CharacterId) -> Option<Window>;

    /// Applies every transition or none of them.
    ///
    /// Returns `Ok(false)` when a transition's `from` no longer matches.
    fn transition_batch(&self, transitions: &[WindowTransition]) -> Result<bool>;
}
