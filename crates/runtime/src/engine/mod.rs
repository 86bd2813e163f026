//! The combat engine facade.
//!
//! [`CombatEngine`] is a cheap, cloneable handle. Every operation looks the
//! combat up in the registry, takes that combat's lock for the duration of
//! its synchronous work, and releases it before awaiting anything else
//! (turn waits, settlement). Validation failures come back as unsuccessful
//! [`ActionOutcome`]s; only setup calls return `Err`.
mod actions;
mod turns;

use std::sync::{Arc, Weak};

use tokio::sync::broadcast;
use tracing::{info, warn};

use combat_core::{
    CharacterId, CombatAi, CombatCharacter, CombatError, CombatId, CombatInstance,
    CombatLogEntry, CombatSnapshot, FactionId, ThreatAi,
};

use crate::api::{ActionOutcome, Result, RuntimeError};
use crate::config::EngineConfig;
use crate::coordination::TurnTimeoutManager;
use crate::events::{CombatEvent, Event, EventBus, Topic};
use crate::oracle::OracleManager;
use crate::registry::{CombatEntry, CombatRegistry};
use crate::repository::{EnemyRepository, PlayerRepository, WindowStateService};
use crate::settlement::{CombatSettlement, SettlementOutcome};

use turns::TimeoutSkipper;

/// Cloneable handle to the engine.
#[derive(Clone)]
pub struct CombatEngine {
    inner: Arc<EngineInner>,
}

pub(crate) struct EngineInner {
    config: EngineConfig,
    registry: Arc<CombatRegistry>,
    oracles: OracleManager,
    players: Arc<dyn PlayerRepository>,
    enemies: Arc<dyn EnemyRepository>,
    ai: Arc<dyn CombatAi>,
    timeouts: TurnTimeoutManager,
    settlement: CombatSettlement,
    events: EventBus,
}

impl EngineInner {
    fn entry(&self, combat: CombatId) -> Result<CombatEntry> {
        self.registry
            .get(combat)
            .ok_or(RuntimeError::CombatNotFound(combat))
    }

    /// Flags players and map enemies as busy with `combat`.
    fn engage(&self, combat: CombatId, members: &[CombatCharacter]) {
        for member in members {
            if member.is_player() {
                let marked = self.players.load(&member.id).and_then(|record| match record {
                    Some(mut record) => {
                        record.in_combat = Some(combat);
                        self.players.save(&record)
                    }
                    None => Ok(()),
                });
                if let Err(e) = marked {
                    warn!(%combat, player = %member.id, "failed to mark player in combat: {e}");
                }
            }
            if let Some(origin) = &member.enemy
                && let Err(e) = self
                    .enemies
                    .engage(&origin.map_id, &origin.instance_id, combat)
            {
                warn!(%combat, enemy = %origin.instance_id, "failed to engage enemy: {e}");
            }
        }
    }

    /// Settles the combat if the outcome says it ended. Runs without the
    /// combat lock held.
    async fn settle_if_ended(&self, combat: CombatId, outcome: &ActionOutcome) {
        if outcome.combat_ended {
            let settled = self.settlement.handle_combat_end(combat).await;
            if !settled.is_success() {
                warn!(%combat, outcome = %settled, "settlement did not complete");
            }
        }
    }
}

impl CombatEngine {
    pub fn builder() -> CombatEngineBuilder {
        CombatEngineBuilder::new()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.inner.events.subscribe(topic)
    }

    /// Registers an empty combat on `map_id`.
    pub fn create_combat(&self, map_id: &str) -> CombatId {
        let combat = self
            .inner
            .registry
            .create(map_id, None, self.inner.config.turn_wait);
        info!(%combat, map = map_id, "combat created");
        combat
    }

    /// Like [`create_combat`](Self::create_combat) with reproducible rolls.
    pub fn create_combat_seeded(&self, map_id: &str, seed: u64) -> CombatId {
        let combat = self
            .inner
            .registry
            .create(map_id, Some(seed), self.inner.config.turn_wait);
        info!(%combat, map = map_id, seed, "combat created");
        combat
    }

    pub async fn add_party(
        &self,
        combat: CombatId,
        faction: FactionId,
        members: Vec<CombatCharacter>,
    ) -> Result<()> {
        let entry = self.inner.entry(combat)?;
        let mut instance = entry.instance.lock().await;
        if instance.is_over() {
            return Err(CombatError::CombatOver.into());
        }
        instance.add_party(faction, members.clone())?;
        self.inner.engage(combat, &members);
        Ok(())
    }

    pub async fn add_character(
        &self,
        combat: CombatId,
        faction: FactionId,
        member: CombatCharacter,
    ) -> Result<()> {
        let entry = self.inner.entry(combat)?;
        let mut instance = entry.instance.lock().await;
        if instance.is_over() {
            return Err(CombatError::CombatOver.into());
        }
        instance.add_character(faction, member.clone())?;
        self.inner.engage(combat, std::slice::from_ref(&member));
        Ok(())
    }

    /// Hands out the first turn, running non-player turns until a player
    /// is up or the fight is decided.
    pub async fn start(&self, combat: CombatId) -> Result<ActionOutcome> {
        let entry = self.inner.entry(combat)?;
        let outcome = {
            let mut instance = entry.instance.lock().await;
            if instance.is_over() || instance.current_turn().is_some() {
                return Err(RuntimeError::AlreadyStarted(combat));
            }
            if instance.parties().len() < 2 {
                return Err(RuntimeError::NotEnoughFactions(combat));
            }

            let mark = instance.log().last_sequence();
            instance.push_log("The fight begins!");
            self.inner.events.publish(CombatEvent::Started { combat });
            info!(%combat, combat_type = %instance.combat_type(), "combat started");

            self.inner.run_until_player_turn(&mut instance, &entry.waits);
            turn_report(&instance, mark, "combat started")
        };
        self.inner.settle_if_ended(combat, &outcome).await;
        Ok(outcome)
    }

    /// True while the combat is running and `player` holds the turn.
    pub async fn is_player_turn(&self, combat: CombatId, player: &CharacterId) -> bool {
        let Ok(entry) = self.inner.entry(combat) else {
            return false;
        };
        let instance = entry.instance.lock().await;
        !instance.is_over() && instance.is_turn_of(player)
    }

    /// Log entries with a sequence number greater than `sequence`.
    pub async fn logs_since(&self, combat: CombatId, sequence: u64) -> Result<Vec<CombatLogEntry>> {
        let entry = self.inner.entry(combat)?;
        let instance = entry.instance.lock().await;
        Ok(instance.logs_since(sequence).to_vec())
    }

    pub async fn snapshot(&self, combat: CombatId) -> Option<CombatSnapshot> {
        let entry = self.inner.entry(combat).ok()?;
        let instance = entry.instance.lock().await;
        Some(instance.snapshot())
    }

    /// Applies the end-of-combat payload, at most once per combat.
    pub async fn settle(&self, combat: CombatId) -> SettlementOutcome {
        self.inner.settlement.handle_combat_end(combat).await
    }
}

/// Successful outcome carrying everything logged since `mark`.
fn turn_report(instance: &CombatInstance, mark: u64, message: impl Into<String>) -> ActionOutcome {
    ActionOutcome::ok(message, instance.is_over(), instance.log().render_since(mark))
}

/// Builder for [`CombatEngine`].
pub struct CombatEngineBuilder {
    config: EngineConfig,
    oracles: Option<OracleManager>,
    players: Option<Arc<dyn PlayerRepository>>,
    enemies: Option<Arc<dyn EnemyRepository>>,
    windows: Option<Arc<dyn WindowStateService>>,
    ai: Option<Arc<dyn CombatAi>>,
    events: Option<EventBus>,
}

impl CombatEngineBuilder {
    fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            oracles: None,
            players: None,
            enemies: None,
            windows: None,
            ai: None,
            events: None,
        }
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Set required oracle manager
    pub fn oracles(mut self, oracles: OracleManager) -> Self {
        self.oracles = Some(oracles);
        self
    }

    pub fn players(mut self, players: Arc<dyn PlayerRepository>) -> Self {
        self.players = Some(players);
        self
    }

    pub fn enemies(mut self, enemies: Arc<dyn EnemyRepository>) -> Self {
        self.enemies = Some(enemies);
        self
    }

    pub fn windows(mut self, windows: Arc<dyn WindowStateService>) -> Self {
        self.windows = Some(windows);
        self
    }

    /// Replaces the default [`ThreatAi`].
    pub fn ai(mut self, ai: Arc<dyn CombatAi>) -> Self {
        self.ai = Some(ai);
        self
    }

    /// Publishes into an existing bus instead of a fresh one.
    pub fn events(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    pub fn build(self) -> Result<CombatEngine> {
        let oracles = self
            .oracles
            .ok_or(RuntimeError::MissingCollaborator("oracles"))?;
        let players = self
            .players
            .ok_or(RuntimeError::MissingCollaborator("player repository"))?;
        let enemies = self
            .enemies
            .ok_or(RuntimeError::MissingCollaborator("enemy repository"))?;
        let windows = self
            .windows
            .ok_or(RuntimeError::MissingCollaborator("window state service"))?;

        let config = self.config;
        let events = self
            .events
            .unwrap_or_else(|| EventBus::with_capacity(config.event_buffer_size));
        let ai = self
            .ai
            .unwrap_or_else(|| Arc::new(ThreatAi) as Arc<dyn CombatAi>);
        let registry = Arc::new(CombatRegistry::new());

        let settlement = CombatSettlement::new(
            Arc::clone(&registry),
            oracles.clone(),
            Arc::clone(&players),
            Arc::clone(&enemies),
            windows,
            config.clone(),
            events.clone(),
        );

        let inner = Arc::new_cyclic(|engine: &Weak<EngineInner>| EngineInner {
            timeouts: TurnTimeoutManager::new(
                config.turn_timeout,
                Arc::new(TimeoutSkipper::new(engine.clone())),
            ),
            config,
            registry,
            oracles,
            players,
            enemies,
            ai,
            settlement,
            events,
        });

        Ok(CombatEngine { inner })
    }
}
