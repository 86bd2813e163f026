//! In-memory collaborators for tests and local runs.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use combat_core::{CharacterId, CombatId};

use super::error::{RepositoryError, Result};
use super::traits::{EnemyRepository, PlayerRepository, WindowStateService};
use super::types::{EnemyRecord, PlayerRecord, Window, WindowTransition};

/// Player records keyed by id.
#[derive(Default)]
pub struct InMemoryPlayers {
    records: RwLock<HashMap<CharacterId, PlayerRecord>>,
}

impl InMemoryPlayers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_players(players: impl IntoIterator<Item = PlayerRecord>) -> Self {
        let records = players.into_iter().map(|p| (p.id.clone(), p)).collect();
        Self {
            records: RwLock::new(records),
        }
    }

    /// Snapshot of one record, for assertions.
    pub fn get(&self, id: &CharacterId) -> Option<PlayerRecord> {
        self.records.read().ok()?.get(id).cloned()
    }
}

impl PlayerRepository for InMemoryPlayers {
    fn load(&self, id: &CharacterId) -> Result<Option<PlayerRecord>> {
        let records = self
            .records
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(records.get(id).cloned())
    }

    fn save(&self, record: &PlayerRecord) -> Result<()> {
        let mut records = self
            .records
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        records.insert(record.id.clone(), record.clone());
        Ok(())
    }
}

/// Enemy records keyed by `(map_id, instance_id)`.
#[derive(Default)]
pub struct InMemoryEnemies {
    records: RwLock<HashMap<(String, String), EnemyRecord>>,
}

impl InMemoryEnemies {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_enemies(enemies: impl IntoIterator<Item = EnemyRecord>) -> Self {
        let records = enemies
            .into_iter()
            .map(|e| ((e.map_id.clone(), e.instance_id.clone()), e))
            .collect();
        Self {
            records: RwLock::new(records),
        }
    }

    pub fn get(&self, map_id: &str, instance_id: &str) -> Option<EnemyRecord> {
        let key = (map_id.to_owned(), instance_id.to_owned());
        self.records.read().ok()?.get(&key).cloned()
    }

    fn update<F>(&self, map_id: &str, instance_id: &str, apply: F) -> Result<()>
    where
        F: FnOnce(&mut EnemyRecord),
    {
        let mut records = self
            .records
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        let key = (map_id.to_owned(), instance_id.to_owned());
        let record = records
            .get_mut(&key)
            .ok_or_else(|| RepositoryError::NotFound(format!("enemy {map_id}/{instance_id}")))?;
        apply(record);
        Ok(())
    }
}

impl EnemyRepository for InMemoryEnemies {
    fn engage(&self, map_id: &str, instance_id: &str, combat: CombatId) -> Result<()> {
        self.update(map_id, instance_id, |e| e.in_combat = Some(combat))
    }

    fn mark_dead(&self, map_id: &str, instance_id: &str, respawn_at: DateTime<Utc>) -> Result<()> {
        self.update(map_id, instance_id, |e| {
            e.dead = true;
            e.respawn_at = Some(respawn_at);
            e.in_combat = None;
        })
    }

    fn reset(&self, map_id: &str, instance_id: &str) -> Result<()> {
        self.update(map_id, instance_id, |e| {
            e.dead = false;
            e.respawn_at = None;
            e.in_combat = None;
        })
    }
}

/// Window state per player, with all-or-nothing batches.
#[derive(Default)]
pub struct InMemoryWindows {
    windows: RwLock<HashMap<CharacterId, Window>>,
}

impl InMemoryWindows {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, player: &CharacterId, window: Window) {
        if let Ok(mut windows) = self.windows.write() {
            windows.insert(player.clone(), window);
        }
    }
}

impl WindowStateService for InMemoryWindows {
    fn current_window(&self, player: &CharacterId) -> Option<Window> {
        self.windows.read().ok()?.get(player).copied()
    }

    fn transition_batch(&self, transitions: &[WindowTransition]) -> Result<bool> {
        let mut windows = self
            .windows
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;

        let consistent = transitions
            .iter()
            .all(|t| windows.get(&t.player).copied().unwrap_or_default() == t.from);
        if !consistent {
            return Ok(false);
        }

        for t in transitions {
            windows.insert(t.player.clone(), t.to);
        }
        Ok(true)
    }
}
