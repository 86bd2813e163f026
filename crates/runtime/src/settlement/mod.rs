//! Exactly-once settlement of concluded combats.
//!
//! Several callers can notice a combat ending at the same time: the acting
//! player, a waiting player, a turn timer. The first one to take the reward
//! payload from the instance applies it; everyone else waits on a per-combat
//! gate until that application is done, so every caller can report success
//! without anything being granted twice.
mod penalties;
mod rewards;

use std::sync::Arc;

use chrono::{TimeDelta, Utc};
use dashmap::DashMap;
use tokio::sync::watch;
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, warn};

use combat_core::{CombatId, EnemyRef, RewardDistribution};

use crate::config::EngineConfig;
use crate::events::{EventBus, SettlementEvent};
use crate::oracle::OracleManager;
use crate::registry::CombatRegistry;
use crate::repository::{
    EnemyRepository, PlayerRepository, Window, WindowStateService, WindowTransition,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum SettlementPhase {
    Pending,
    InProgress,
    Done,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum SettlementOutcome {
    /// This caller applied the rewards.
    Settled,
    /// Another caller applied them.
    AlreadySettled,
    /// Another caller is applying them and did not finish within the wait.
    WaitTimedOut,
    /// The combat is still running or unknown.
    NotFinished,
}

impl SettlementOutcome {
    pub fn is_success(self) -> bool {
        matches!(
            self,
            SettlementOutcome::Settled | SettlementOutcome::AlreadySettled
        )
    }
}

type Gate = Arc<watch::Sender<SettlementPhase>>;

/// Marks the gate done however the claimer leaves.
struct DoneGuard(Gate);

impl Drop for DoneGuard {
    fn drop(&mut self) {
        self.0.send_replace(SettlementPhase::Done);
    }
}

pub struct CombatSettlement {
    registry: Arc<CombatRegistry>,
    oracles: OracleManager,
    players: Arc<dyn PlayerRepository>,
    enemies: Arc<dyn EnemyRepository>,
    windows: Arc<dyn WindowStateService>,
    gates: Arc<DashMap<CombatId, Gate>>,
    config: EngineConfig,
    events: EventBus,
}

impl CombatSettlement {
    pub fn new(
        registry: Arc<CombatRegistry>,
        oracles: OracleManager,
        players: Arc<dyn PlayerRepository>,
        enemies: Arc<dyn EnemyRepository>,
        windows: Arc<dyn WindowStateService>,
        config: EngineConfig,
        events: EventBus,
    ) -> Self {
        Self {
            registry,
            oracles,
            players,
            enemies,
            windows,
            gates: Arc::new(DashMap::new()),
            config,
            events,
        }
    }

    pub fn phase(&self, combat: CombatId) -> Option<SettlementPhase> {
        self.gates.get(&combat).map(|gate| *gate.borrow())
    }

    /// Settles `combat` if it is over. Safe to call any number of times
    /// from any number of tasks.
    pub async fn handle_combat_end(&self, combat: CombatId) -> SettlementOutcome {
        let Some(entry) = self.registry.get(combat) else {
            return match self.phase(combat) {
                Some(SettlementPhase::Done) => SettlementOutcome::AlreadySettled,
                _ => SettlementOutcome::NotFinished,
            };
        };

        let (claimed, gate) = {
            let mut instance = entry.instance.lock().await;
            if !instance.is_over() {
                return SettlementOutcome::NotFinished;
            }
            let gate: Gate = self
                .gates
                .entry(combat)
                .or_insert_with(|| Arc::new(watch::channel(SettlementPhase::Pending).0))
                .clone();
            let reward = instance.take_reward();
            if reward.is_some() {
                gate.send_replace(SettlementPhase::InProgress);
            }
            (reward, gate)
        };

        if let Some(reward) = claimed {
            let _done = DoneGuard(Arc::clone(&gate));
            self.apply(&reward);
            self.events.publish(SettlementEvent::Completed { combat });
            info!(
                %combat,
                winner = ?reward.winner,
                rewarded = reward.rewarded_players.len(),
                defeated = reward.defeated_players.len(),
                "combat settled"
            );
            self.schedule_cleanup(combat);
            return SettlementOutcome::Settled;
        }

        let mut phase = gate.subscribe();
        if *phase.borrow() == SettlementPhase::Pending {
            // The payload was claimed under an earlier gate that has since
            // been recycled.
            gate.send_replace(SettlementPhase::Done);
            return SettlementOutcome::AlreadySettled;
        }

        match timeout(
            self.config.settlement_wait,
            phase.wait_for(|p| *p == SettlementPhase::Done),
        )
        .await
        {
            Ok(Ok(_)) => SettlementOutcome::AlreadySettled,
            Ok(Err(_)) | Err(_) => {
                warn!(%combat, "timed out waiting for settlement by another caller");
                SettlementOutcome::WaitTimedOut
            }
        }
    }

    /// Writes the distribution back to the collaborators. Each step logs
    /// and swallows its own failures so the rest still runs.
    fn apply(&self, reward: &RewardDistribution) {
        if reward.enemies_disengaged {
            self.reset_enemies(&reward.enemies_to_reset);
        } else {
            rewards::distribute(self.players.as_ref(), self.oracles.items(), reward);

            let now = Utc::now();
            for enemy in &reward.defeated_enemies {
                let respawn_at = now + TimeDelta::seconds(i64::from(enemy.respawn_seconds));
                if let Err(e) = self
                    .enemies
                    .mark_dead(&enemy.map_id, &enemy.instance_id, respawn_at)
                {
                    error!(
                        map = %enemy.map_id,
                        enemy = %enemy.instance_id,
                        "failed to mark enemy dead: {e}"
                    );
                }
            }
            self.reset_enemies(&reward.enemies_to_reset);
        }

        penalties::apply(self.players.as_ref(), self.oracles.maps(), reward);
        self.sync_final_states(reward);
        self.release_windows(reward);
    }

    fn reset_enemies(&self, enemies: &[EnemyRef]) {
        for enemy in enemies {
            if let Err(e) = self.enemies.reset(&enemy.map_id, &enemy.instance_id) {
                error!(
                    map = %enemy.map_id,
                    enemy = %enemy.instance_id,
                    "failed to reset enemy: {e}"
                );
            }
        }
    }

    /// Copies end-of-fight health and mana onto players who were not
    /// defeated; defeated players were restored by their penalty.
    fn sync_final_states(&self, reward: &RewardDistribution) {
        for (player, state) in &reward.final_states {
            if reward.is_defeated(player) {
                continue;
            }
            let result = self.players.load(player).and_then(|record| match record {
                Some(mut record) => {
                    record.health = state.health.min(record.max_health);
                    record.mana = state.mana.min(record.max_mana);
                    record.in_combat = None;
                    self.players.save(&record)
                }
                None => Ok(()),
            });
            if let Err(e) = result {
                error!(combat = %reward.combat_id, %player, "failed to sync final state: {e}");
            }
        }
    }

    /// Moves every participant's client from the combat view back to the map.
    fn release_windows(&self, reward: &RewardDistribution) {
        let transitions: Vec<WindowTransition> = reward
            .participants
            .iter()
            .map(|player| WindowTransition {
                player: player.clone(),
                from: self
                    .windows
                    .current_window(player)
                    .unwrap_or(Window::Combat),
                to: Window::Map,
                window_id: None,
            })
            .collect();
        if transitions.is_empty() {
            return;
        }

        match self.windows.transition_batch(&transitions) {
            Ok(true) => debug!(combat = %reward.combat_id, "windows released"),
            Ok(false) => warn!(combat = %reward.combat_id, "window state changed during release"),
            Err(e) => error!(combat = %reward.combat_id, "failed to release windows: {e}"),
        }
    }

    fn schedule_cleanup(&self, combat: CombatId) {
        let gates = Arc::clone(&self.gates);
        let grace = self.config.settlement_gate_grace;
        tokio::spawn(async move {
            sleep(grace).await;
            gates.remove(&combat);
        });

        let registry = Arc::clone(&self.registry);
        let retention = self.config.retention;
        tokio::spawn(async move {
            sleep(retention).await;
            if registry.remove(combat).is_some() {
                debug!(%combat, "combat evicted");
            }
        });
    }
}
