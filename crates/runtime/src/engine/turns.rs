//! Turn progression and the turn-timeout callback.
//!
//! Progression runs with the combat lock held and never awaits.

use std::sync::Weak;

use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use tracing::{debug, info, warn};

use combat_core::{
    AiDecision, CharacterId, CombatError, CombatId, CombatInstance, SkillDefinition,
    SkillExecution, execute_skill, skill_by_id,
};

use crate::coordination::{TurnTimeoutHandler, TurnWaitCoordinator};
use crate::events::{CombatEvent, TurnEvent};

use super::EngineInner;

/// Non-player turns processed per call before the fight is called off as a
/// stalemate.
const MAX_AI_TURNS: usize = 1_000;

/// Where turn processing stopped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(super) enum Progress {
    PlayerTurn(CharacterId),
    Ended,
}

/// Executes a skill and closes the actor's turn.
///
/// Mana is spent after the effect lands. The cooldown is set after the turn
/// ends, so a cooldown of `n` blocks the actor's next `n` turns.
pub(super) fn apply_cast(
    instance: &mut CombatInstance,
    actor: &CharacterId,
    skill: &SkillDefinition,
    target: Option<&CharacterId>,
) -> Result<SkillExecution, CombatError> {
    let execution = execute_skill(instance, actor, skill, target)?;
    if let Some(character) = instance.character_mut(actor) {
        character.consume_mana(skill.mana_cost);
    }
    instance.end_turn(actor);
    if skill.cooldown > 0
        && let Some(character) = instance.character_mut(actor)
    {
        character.set_cooldown(&skill.id, skill.cooldown);
    }
    Ok(execution)
}

impl EngineInner {
    /// Advances the fight until a player holds the turn or it is over.
    ///
    /// A player who already holds the turn is returned as is; otherwise the
    /// next ready character is announced, and non-player characters act
    /// immediately. An ongoing fight is never left without a turn holder:
    /// if no player gets a turn within [`MAX_AI_TURNS`], it is called off.
    pub(super) fn run_until_player_turn(
        &self,
        instance: &mut CombatInstance,
        waits: &TurnWaitCoordinator,
    ) -> Progress {
        let limit = TimeDelta::from_std(self.config.combat_time_limit).unwrap_or(TimeDelta::MAX);

        for _ in 0..MAX_AI_TURNS {
            if instance.is_over() {
                return Progress::Ended;
            }
            if instance.is_finished() {
                instance.finish(self.oracles.loot());
                self.on_concluded(instance, waits);
                return Progress::Ended;
            }
            if instance.is_expired(Utc::now(), limit) {
                instance.time_out(self.oracles.loot());
                self.on_concluded(instance, waits);
                return Progress::Ended;
            }

            if let Some(holder) = instance.current_turn().cloned() {
                match instance.character(&holder) {
                    Some(c) if c.is_alive() && c.is_player() => {
                        return Progress::PlayerTurn(holder);
                    }
                    Some(c) if c.is_alive() => {}
                    _ => instance.end_turn(&holder),
                }
            }

            let Some(actor) = instance.advance_turn() else {
                warn!(combat = %instance.id(), "nobody left who can act");
                return self.call_off(instance, waits);
            };
            let Some((name, is_player)) = instance
                .character(&actor)
                .filter(|c| c.is_alive())
                .map(|c| (c.name.clone(), c.is_player()))
            else {
                instance.end_turn(&actor);
                continue;
            };

            instance.push_log(format!("=== {name}'s turn ==="));
            self.events.publish(TurnEvent::Started {
                combat: instance.id(),
                character: actor.clone(),
            });

            if is_player {
                debug!(combat = %instance.id(), player = %actor, "player turn");
                self.timeouts.start_turn(instance.id(), actor.clone());
                waits.notify_turn(&actor);
                return Progress::PlayerTurn(actor);
            }
            self.take_ai_turn(instance, &actor, &name);
        }

        warn!(
            combat = %instance.id(),
            turns = MAX_AI_TURNS,
            "no player turn came up; calling the fight off"
        );
        self.call_off(instance, waits)
    }

    /// Ends a fight that can no longer make progress the same way the time
    /// limit does, so it still settles and gets evicted.
    fn call_off(&self, instance: &mut CombatInstance, waits: &TurnWaitCoordinator) -> Progress {
        instance.time_out(self.oracles.loot());
        self.on_concluded(instance, waits);
        Progress::Ended
    }

    fn take_ai_turn(&self, instance: &mut CombatInstance, actor: &CharacterId, name: &str) {
        let skills = self.oracles.skills();
        match self.ai.decide(instance, actor, skills) {
            AiDecision::Cast { skill_id, target } => {
                let cast = skill_by_id(skills, &skill_id)
                    .ok_or(CombatError::SkillNotFound)
                    .and_then(|skill| apply_cast(instance, actor, &skill, target.as_ref()));
                if let Err(e) = cast {
                    warn!(
                        combat = %instance.id(),
                        %actor,
                        skill = %skill_id,
                        "ai action failed: {e}"
                    );
                    instance.push_log(format!("{name} hesitates"));
                    instance.end_turn(actor);
                }
            }
            AiDecision::Skip => {
                instance.push_log(format!("{name} hesitates"));
                instance.end_turn(actor);
            }
        }
    }

    fn on_concluded(&self, instance: &CombatInstance, waits: &TurnWaitCoordinator) {
        let combat = instance.id();
        self.timeouts.combat_ended(combat);
        waits.notify_all();

        let winner = instance.winner();
        info!(%combat, status = %instance.status(), winner = ?winner, "combat concluded");
        self.events.publish(CombatEvent::Ended {
            combat,
            status: instance.status(),
            winner,
        });
    }

    /// Bookkeeping after a player acted: stop their timer, wake waiters,
    /// then move the fight on.
    pub(super) fn after_player_action(
        &self,
        instance: &mut CombatInstance,
        waits: &TurnWaitCoordinator,
        actor: &CharacterId,
    ) -> Progress {
        self.timeouts.acted_now(instance.id(), actor);
        waits.notify_all();
        self.run_until_player_turn(instance, waits)
    }

    /// Skips `character`'s turn unless the timer that fired is stale: the
    /// combat ended, the turn moved on, or a newer turn was armed while this
    /// callback waited for the lock.
    pub(super) async fn skip_timed_out_turn(
        &self,
        combat: CombatId,
        character: CharacterId,
        generation: u64,
    ) {
        let Ok(entry) = self.entry(combat) else {
            return;
        };
        let ended = {
            let mut instance = entry.instance.lock().await;
            if instance.is_over()
                || !instance.is_turn_of(&character)
                || self.timeouts.superseded(combat, generation)
            {
                debug!(%combat, player = %character, "stale turn timer ignored");
                return;
            }
            let name = instance
                .character(&character)
                .map(|c| c.name.clone())
                .unwrap_or_else(|| character.to_string());

            instance.push_log(format!("{name}'s turn timed out; skipped"));
            info!(%combat, player = %character, "turn timed out");
            self.events.publish(TurnEvent::TimedOut {
                combat,
                character: character.clone(),
            });

            instance.end_turn(&character);
            entry.waits.notify_all();
            self.run_until_player_turn(&mut instance, &entry.waits) == Progress::Ended
        };

        if ended {
            self.settlement.handle_combat_end(combat).await;
        }
    }
}

/// Turn timer callback. Holds the engine weakly so timers never keep a
/// dropped engine alive.
pub(super) struct TimeoutSkipper {
    engine: Weak<EngineInner>,
}

impl TimeoutSkipper {
    pub(super) fn new(engine: Weak<EngineInner>) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl TurnTimeoutHandler for TimeoutSkipper {
    async fn on_turn_timeout(&self, combat: CombatId, character: CharacterId, generation: u64) {
        if let Some(engine) = self.engine.upgrade() {
            engine
                .skip_timed_out_turn(combat, character, generation)
                .await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use combat_core::{CharacterKind, CombatCharacter, CombatStats};

    use super::*;
    use crate::engine::CombatEngine;
    use crate::oracle::{OracleManager, StaticContent};
    use crate::repository::{InMemoryEnemies, InMemoryPlayers, InMemoryWindows};

    fn fighter(id: &str, kind: CharacterKind, faction: &str, speed: i32) -> CombatCharacter {
        let stats = CombatStats {
            physical_attack: 10,
            speed,
            hit_rate: 1.0,
            ..CombatStats::default()
        };
        CombatCharacter::new(id, kind, id, faction, 500, 0, stats)
    }

    async fn hero_against_a_slow_wolf() -> (CombatEngine, CombatId) {
        let engine = CombatEngine::builder()
            .oracles(OracleManager::from_content(StaticContent::new()))
            .players(Arc::new(InMemoryPlayers::new()))
            .enemies(Arc::new(InMemoryEnemies::new()))
            .windows(Arc::new(InMemoryWindows::new()))
            .build()
            .expect("engine builds");

        let combat = engine.create_combat_seeded("field", 3);
        let hero = fighter("hero", CharacterKind::Player, "heroes", 1_000);
        let wolf = fighter("wolf", CharacterKind::Enemy, "wild", 10);
        engine
            .add_party(combat, "heroes".into(), vec![hero])
            .await
            .expect("hero joins");
        engine
            .add_party(combat, "wild".into(), vec![wolf])
            .await
            .expect("wolf joins");
        engine.start(combat).await.expect("starts");
        (engine, combat)
    }

    fn timed_out_lines(log: &[combat_core::CombatLogEntry]) -> usize {
        log.iter()
            .filter(|entry| entry.message.ends_with("turn timed out; skipped"))
            .count()
    }

    #[tokio::test(start_paused = true)]
    async fn a_timer_from_an_earlier_turn_does_not_skip_the_current_one() {
        let (engine, combat) = hero_against_a_slow_wolf().await;
        let hero = CharacterId::from("hero");

        // Generation 1 armed the opening turn; acting arms generation 2.
        let acted = engine.cast_skill(combat, &hero, "Attack", None).await;
        assert!(acted.success, "{}", acted.message);
        assert!(engine.is_player_turn(combat, &hero).await);

        engine
            .inner
            .skip_timed_out_turn(combat, hero.clone(), 1)
            .await;

        assert!(engine.is_player_turn(combat, &hero).await);
        let log = engine.logs_since(combat, 0).await.expect("log");
        assert_eq!(timed_out_lines(&log), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn the_current_timer_skips_the_turn() {
        let (engine, combat) = hero_against_a_slow_wolf().await;
        let hero = CharacterId::from("hero");

        engine
            .inner
            .skip_timed_out_turn(combat, hero.clone(), 1)
            .await;

        let log = engine.logs_since(combat, 0).await.expect("log");
        assert_eq!(timed_out_lines(&log), 1);
        let snapshot = engine.snapshot(combat).await.expect("snapshot");
        assert!(!snapshot.status.is_over());
    }
}
