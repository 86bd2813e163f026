//! Bounded waits for a player's turn.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::oneshot;
use tokio::time::timeout;

use combat_core::CharacterId;

/// How a wait ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum WaitOutcome {
    /// The character's turn came up, or the combat ended.
    Notified,
    /// The window elapsed first.
    TimedOut,
    /// A newer wait for the same character replaced this one.
    Interrupted,
}

struct Gate {
    token: u64,
    tx: oneshot::Sender<()>,
}

/// One pending wait per character, each bounded by the same window.
pub struct TurnWaitCoordinator {
    window: Duration,
    gates: DashMap<CharacterId, Gate>,
    next_token: AtomicU64,
}

impl TurnWaitCoordinator {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            gates: DashMap::new(),
            next_token: AtomicU64::new(0),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Registers a wait without awaiting it.
    ///
    /// Registering before releasing the combat lock means a notification
    /// sent in between is not lost. A previous wait for the same character
    /// resolves as [`WaitOutcome::Interrupted`].
    pub fn register(self: &Arc<Self>, character: CharacterId) -> TurnWait {
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        self.gates.insert(character.clone(), Gate { token, tx });
        TurnWait {
            coordinator: Arc::clone(self),
            character,
            token,
            rx,
        }
    }

    pub async fn wait_for_turn(self: &Arc<Self>, character: CharacterId) -> WaitOutcome {
        self.register(character).wait().await
    }

    /// Wakes the waiter for `character`, if any.
    pub fn notify_turn(&self, character: &CharacterId) -> bool {
        match self.gates.remove(character) {
            Some((_, gate)) => gate.tx.send(()).is_ok(),
            None => false,
        }
    }

    /// Wakes every waiter. Returns how many were woken.
    pub fn notify_all(&self) -> usize {
        let waiting: Vec<CharacterId> = self.gates.iter().map(|g| g.key().clone()).collect();
        waiting
            .iter()
            .filter(|character| self.notify_turn(character))
            .count()
    }

    pub fn is_waiting(&self, character: &CharacterId) -> bool {
        self.gates.contains_key(character)
    }

    pub fn pending(&self) -> usize {
        self.gates.len()
    }
}

/// A registered wait. Dropping it withdraws the registration.
pub struct TurnWait {
    coordinator: Arc<TurnWaitCoordinator>,
    character: CharacterId,
    token: u64,
    rx: oneshot::Receiver<()>,
}

impl TurnWait {
    pub async fn wait(mut self) -> WaitOutcome {
        match timeout(self.coordinator.window, &mut self.rx).await {
            Ok(Ok(())) => WaitOutcome::Notified,
            Ok(Err(_)) => WaitOutcome::Interrupted,
            Err(_) => WaitOutcome::TimedOut,
        }
    }
}

impl Drop for TurnWait {
    fn drop(&mut self) {
        let token = self.token;
        self.coordinator
            .gates
            .remove_if(&self.character, |_, gate| gate.token == token);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn notification_sent_before_awaiting_is_not_lost() {
        let waits = Arc::new(TurnWaitCoordinator::new(Duration::from_secs(10)));
        let hero = CharacterId::from("hero");

        let wait = waits.register(hero.clone());
        assert!(waits.notify_turn(&hero));
        assert_eq!(wait.wait().await, WaitOutcome::Notified);
        assert_eq!(waits.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn a_newer_wait_interrupts_the_older_one() {
        let waits = Arc::new(TurnWaitCoordinator::new(Duration::from_secs(10)));
        let hero = CharacterId::from("hero");

        let first = waits.register(hero.clone());
        let second = waits.register(hero.clone());
        assert_eq!(first.wait().await, WaitOutcome::Interrupted);
        // Dropping the stale wait must not withdraw the newer registration.
        assert!(waits.is_waiting(&hero));

        assert!(waits.notify_turn(&hero));
        assert_eq!(second.wait().await, WaitOutcome::Notified);
    }
}
