//! Skips players who sit on their turn.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::task::AbortHandle;
use tracing::debug;

use combat_core::{CharacterId, CombatId};

/// Invoked when a player's turn timer fires.
///
/// `generation` identifies the armed turn. The handler can pass it to
/// [`TurnTimeoutManager::superseded`] to detect a turn re-armed while it was
/// waiting to run.
#[async_trait]
pub trait TurnTimeoutHandler: Send + Sync {
    async fn on_turn_timeout(&self, combat: CombatId, character: CharacterId, generation: u64);
}

struct ArmedTimer {
    character: CharacterId,
    generation: u64,
    abort: AbortHandle,
}

/// At most one armed timer per combat.
pub struct TurnTimeoutManager {
    window: Duration,
    handler: Arc<dyn TurnTimeoutHandler>,
    timers: Arc<DashMap<CombatId, ArmedTimer>>,
    generation: AtomicU64,
}

impl TurnTimeoutManager {
    pub fn new(window: Duration, handler: Arc<dyn TurnTimeoutHandler>) -> Self {
        Self {
            window,
            handler,
            timers: Arc::new(DashMap::new()),
            generation: AtomicU64::new(0),
        }
    }

    /// Arms the timer for `character`, replacing whatever was armed.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start_turn(&self, combat: CombatId, character: CharacterId) {
        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;

        // The entry guard is held while spawning so the task cannot look for
        // its own entry before it is inserted.
        match self.timers.entry(combat) {
            Entry::Occupied(mut slot) => {
                let previous = slot.insert(self.arm(combat, character, generation));
                previous.abort.abort();
            }
            Entry::Vacant(slot) => {
                slot.insert(self.arm(combat, character, generation));
            }
        }
    }

    fn arm(&self, combat: CombatId, character: CharacterId, generation: u64) -> ArmedTimer {
        let window = self.window;
        let timers = Arc::clone(&self.timers);
        let handler = Arc::clone(&self.handler);
        let target = character.clone();

        let task = tokio::spawn(async move {
            tokio::time::sleep(window).await;
            let fired = timers
                .remove_if(&combat, |_, timer| timer.generation == generation)
                .is_some();
            if fired {
                debug!(%combat, character = %target, "turn timer fired");
                handler.on_turn_timeout(combat, target, generation).await;
            }
        });

        ArmedTimer {
            character,
            generation,
            abort: task.abort_handle(),
        }
    }

    /// Cancels the timer if `character` is the one it is armed for.
    pub fn acted_now(&self, combat: CombatId, character: &CharacterId) -> bool {
        match self
            .timers
            .remove_if(&combat, |_, timer| &timer.character == character)
        {
            Some((_, timer)) => {
                timer.abort.abort();
                true
            }
            None => false,
        }
    }

    pub fn combat_ended(&self, combat: CombatId) {
        if let Some((_, timer)) = self.timers.remove(&combat) {
            timer.abort.abort();
        }
    }

    /// True when a timer other than `generation` is armed for `combat`.
    ///
    /// A fired timer removes its own entry, so any entry still present
    /// belongs to a later turn.
    pub fn superseded(&self, combat: CombatId, generation: u64) -> bool {
        self.timers
            .get(&combat)
            .is_some_and(|timer| timer.generation != generation)
    }

    /// Who the combat's timer is currently armed for.
    pub fn armed(&self, combat: CombatId) -> Option<CharacterId> {
        self.timers.get(&combat).map(|t| t.character.clone())
    }
}
