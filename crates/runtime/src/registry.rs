//! Live combats by id.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::Mutex;

use combat_core::{CombatId, CombatInstance};

use crate::coordination::TurnWaitCoordinator;

/// Shared handles to one combat.
///
/// The instance mutex serializes every mutation of the fight. Never hold a
/// registry reference across an await; clone the entry out instead.
#[derive(Clone)]
pub struct CombatEntry {
    pub instance: Arc<Mutex<CombatInstance>>,
    pub waits: Arc<TurnWaitCoordinator>,
}

pub struct CombatRegistry {
    combats: DashMap<CombatId, CombatEntry>,
    next_id: AtomicU64,
}

impl Default for CombatRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CombatRegistry {
    pub fn new() -> Self {
        Self {
            combats: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Registers an empty combat on `map_id`.
    pub fn create(&self, map_id: &str, seed: Option<u64>, turn_wait: Duration) -> CombatId {
        let id = CombatId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let instance = match seed {
            Some(seed) => CombatInstance::with_seed(id, map_id, seed),
            None => CombatInstance::new(id, map_id),
        };
        self.combats.insert(
            id,
            CombatEntry {
                instance: Arc::new(Mutex::new(instance)),
                waits: Arc::new(TurnWaitCoordinator::new(turn_wait)),
            },
        );
        id
    }

    pub fn get(&self, id: CombatId) -> Option<CombatEntry> {
        self.combats.get(&id).map(|entry| entry.value().clone())
    }

    pub fn remove(&self, id: CombatId) -> Option<CombatEntry> {
        self.combats.remove(&id).map(|(_, entry)| entry)
    }

    pub fn contains(&self, id: CombatId) -> bool {
        self.combats.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.combats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.combats.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ids_are_unique_and_entries_share_state() {
        let registry = CombatRegistry::new();
        let a = registry.create("forest", Some(1), Duration::from_secs(1));
        let b = registry.create("forest", None, Duration::from_secs(1));
        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);

        let first = registry.get(a).expect("registered");
        first.instance.lock().await.push_log("hello");
        let again = registry.get(a).expect("registered");
        assert_eq!(again.instance.lock().await.log().last_sequence(), 1);

        assert!(registry.remove(a).is_some());
        assert!(!registry.contains(a));
    }
}
