//! Player commands.

use tracing::debug;

use combat_core::{
    CharacterId, CombatCharacter, CombatError, CombatId, CombatInstance, ItemEffect, ItemKind,
    SkillDefinition, SkillTarget, resolve_skill,
};

use crate::api::{ActionOutcome, Result};
use crate::coordination::WaitOutcome;
use crate::registry::CombatEntry;

use super::turns::apply_cast;
use super::{CombatEngine, EngineInner, turn_report};

impl CombatEngine {
    /// Casts a skill by id or display name, optionally at a named target.
    pub async fn cast_skill(
        &self,
        combat: CombatId,
        caster: &CharacterId,
        skill_name: &str,
        target_name: Option<&str>,
    ) -> ActionOutcome {
        self.act(combat, caster, |inner, instance| {
            inner.cast(instance, caster, skill_name, target_name)
        })
        .await
    }

    /// Drinks or eats a consumable from the player's inventory.
    pub async fn use_item(
        &self,
        combat: CombatId,
        player: &CharacterId,
        item_name: &str,
    ) -> ActionOutcome {
        self.act(combat, player, |inner, instance| {
            inner.use_item(instance, player, item_name)
        })
        .await
    }

    /// On the player's own turn, passes it. Otherwise blocks until the turn
    /// comes up, the combat ends, or the wait window elapses.
    pub async fn wait_turn(&self, combat: CombatId, player: &CharacterId) -> ActionOutcome {
        let Ok(entry) = self.inner.entry(combat) else {
            return ActionOutcome::rejected(CombatError::CombatNotFound, Vec::new());
        };

        let (wait, mark) = {
            let mut instance = entry.instance.lock().await;
            let mark = instance.log().last_sequence();
            if instance.is_over() {
                return ActionOutcome::ended(Vec::new());
            }
            let name = match instance.character(player) {
                Some(c) if c.is_alive() => c.name.clone(),
                Some(_) => {
                    return ActionOutcome::rejected(CombatError::CasterUnavailable, Vec::new());
                }
                None => {
                    let err = CombatError::CharacterNotFound(player.clone());
                    return ActionOutcome::rejected(err, Vec::new());
                }
            };

            if instance.is_turn_of(player) {
                instance.push_log(format!("{name} waits"));
                instance.end_turn(player);
                self.inner.after_player_action(&mut instance, &entry.waits, player);
                let outcome = turn_report(&instance, mark, format!("{name} waits"));
                drop(instance);
                self.inner.settle_if_ended(combat, &outcome).await;
                return outcome;
            }

            (entry.waits.register(player.clone()), mark)
        };

        let waited = wait.wait().await;
        debug!(%combat, %player, outcome = %waited, "turn wait finished");

        let outcome = {
            let instance = entry.instance.lock().await;
            let log = instance.log().render_since(mark);
            match waited {
                WaitOutcome::Interrupted => ActionOutcome::rejected("wait interrupted", log),
                _ if instance.is_over() => ActionOutcome::ok("combat over", true, log),
                _ if instance.is_turn_of(player) => ActionOutcome::ok("your turn", false, log),
                _ => ActionOutcome::ok(
                    "not your turn yet; send wait to keep waiting",
                    false,
                    log,
                ),
            }
        };
        self.inner.settle_if_ended(combat, &outcome).await;
        outcome
    }

    /// Leaves a PVE fight. The player counts as fallen but is not penalized.
    pub async fn forfeit(&self, combat: CombatId, player: &CharacterId) -> ActionOutcome {
        let Ok(entry) = self.inner.entry(combat) else {
            return ActionOutcome::rejected(CombatError::CombatNotFound, Vec::new());
        };

        let outcome = {
            let mut instance = entry.instance.lock().await;
            let mark = instance.log().last_sequence();
            if instance.is_over() {
                return ActionOutcome::ended(Vec::new());
            }
            match instance.forfeit(player) {
                Ok(()) => {
                    self.inner
                        .after_player_action(&mut instance, &entry.waits, player);
                    turn_report(&instance, mark, "you fled the fight")
                }
                Err(e) => ActionOutcome::rejected(e, instance.log().render_since(mark)),
            }
        };
        self.inner.settle_if_ended(combat, &outcome).await;
        outcome
    }

    /// Shared shape of turn-consuming commands: validate and apply under the
    /// combat lock, move the fight on, then settle outside the lock.
    async fn act<F>(&self, combat: CombatId, actor: &CharacterId, command: F) -> ActionOutcome
    where
        F: FnOnce(&EngineInner, &mut CombatInstance) -> Result<String>,
    {
        let Ok(CombatEntry { instance, waits }) = self.inner.entry(combat) else {
            return ActionOutcome::rejected(CombatError::CombatNotFound, Vec::new());
        };

        let outcome = {
            let mut instance = instance.lock().await;
            let mark = instance.log().last_sequence();
            if instance.is_over() {
                return ActionOutcome::ended(Vec::new());
            }
            match command(self.inner.as_ref(), &mut *instance) {
                Ok(message) => {
                    self.inner.after_player_action(&mut instance, &waits, actor);
                    turn_report(&instance, mark, message)
                }
                Err(e) => ActionOutcome::rejected(e, instance.log().render_since(mark)),
            }
        };
        self.inner.settle_if_ended(combat, &outcome).await;
        outcome
    }
}

/// The caller must be a living combatant holding the turn.
fn turn_holder<'a>(
    instance: &'a CombatInstance,
    actor: &CharacterId,
) -> std::result::Result<&'a CombatCharacter, CombatError> {
    let character = instance
        .character(actor)
        .filter(|c| c.is_alive())
        .ok_or(CombatError::CasterUnavailable)?;
    if !instance.is_turn_of(actor) {
        return Err(CombatError::NotYourTurn);
    }
    Ok(character)
}

impl EngineInner {
    fn cast(
        &self,
        instance: &mut CombatInstance,
        caster_id: &CharacterId,
        skill_name: &str,
        target_name: Option<&str>,
    ) -> Result<String> {
        let caster = turn_holder(instance, caster_id)?;
        let skill = resolve_skill(self.oracles.skills(), caster, skill_name)?;

        let remaining = caster.cooldown_remaining(&skill.id);
        if remaining > 0 {
            return Err(CombatError::SkillOnCooldown { remaining }.into());
        }
        if caster.mana < skill.mana_cost {
            return Err(CombatError::InsufficientMana {
                required: skill.mana_cost,
                available: caster.mana,
            }
            .into());
        }

        let target = pick_target(instance, caster, &skill, target_name)?;
        let execution = apply_cast(instance, caster_id, &skill, target.as_ref())?;
        let headline = execution
            .logs
            .into_iter()
            .next()
            .unwrap_or_else(|| format!("used {}", skill.name));
        Ok(headline)
    }

    fn use_item(
        &self,
        instance: &mut CombatInstance,
        user: &CharacterId,
        item_name: &str,
    ) -> Result<String> {
        let name = turn_holder(instance, user)?.name.clone();
        let item_name = item_name.trim();
        let missing = || CombatError::ItemNotFound(item_name.to_owned());

        let mut record = self.players.load(user)?.ok_or_else(missing)?;
        let item = record
            .inventory
            .iter()
            .filter(|slot| slot.quantity > 0)
            .filter_map(|slot| self.oracles.items().item(&slot.item_id))
            .find(|item| item.id == item_name || item.name.eq_ignore_ascii_case(item_name))
            .ok_or_else(missing)?;

        let effect = match item.effect {
            None => return Err(CombatError::ItemHasNoEffect.into()),
            Some(_) if item.kind != ItemKind::Consumable => {
                return Err(CombatError::ItemNotConsumable.into());
            }
            Some(ItemEffect::Other) => return Err(CombatError::ItemNotUsableInCombat.into()),
            Some(effect) => effect,
        };

        if !record.take_one(&item.id) {
            return Err(missing().into());
        }
        self.players.save(&record)?;

        let Some(character) = instance.character_mut(user) else {
            return Err(CombatError::CasterUnavailable.into());
        };
        let line = match effect {
            ItemEffect::HealHp(amount) => {
                let restored = character.heal(amount);
                format!(
                    "{name} used {}, restored {restored} HP ({}/{})",
                    item.name, character.health, character.max_health
                )
            }
            ItemEffect::HealMp(amount) => {
                let restored = character.restore_mana(amount);
                format!(
                    "{name} used {}, restored {restored} MP ({}/{})",
                    item.name, character.mana, character.max_mana
                )
            }
            ItemEffect::Other => return Err(CombatError::ItemNotUsableInCombat.into()),
        };

        instance.push_log(line.clone());
        instance.end_turn(user);
        Ok(line)
    }
}

/// Resolves the target a player named, or the default for the skill's shape.
fn pick_target(
    instance: &CombatInstance,
    caster: &CombatCharacter,
    skill: &SkillDefinition,
    target_name: Option<&str>,
) -> std::result::Result<Option<CharacterId>, CombatError> {
    let named = |name: &str| {
        instance
            .find_by_name(name)
            .or_else(|| instance.character(&CharacterId::from(name.trim())))
            .map(|c| c.id.clone())
            .ok_or(CombatError::InvalidTarget)
    };

    match (skill.target, target_name) {
        (SkillTarget::SelfOnly | SkillTarget::AllyAll | SkillTarget::EnemyAll, _) => Ok(None),
        (_, Some(name)) => named(name).map(Some),
        (SkillTarget::EnemySingle, None) => instance
            .enemies_of(&caster.faction)
            .next()
            .map(|c| Some(c.id.clone()))
            .ok_or(CombatError::NoTargets),
        (SkillTarget::AllySingle, None) => Ok(Some(caster.id.clone())),
    }
}
