//! Combat instance aggregate.
//!
//! Owns everything one fight needs: parties in join order, action bars,
//! the sequenced log, the loot ledger, the turn holder, and the reward slot
//! that is filled exactly once when the fight concludes. Callers serialize
//! access; nothing in here is synchronized.
use chrono::{DateTime, TimeDelta, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::action_bar::{ActionBar, ActionBarEntry};
use crate::character::{CombatCharacter, CombatParty};
use crate::env::LootOracle;
use crate::error::CombatError;
use crate::log::{CombatLog, CombatLogEntry};
use crate::loot::LootLedger;
use crate::reward::{self, RewardDistribution};
use crate::types::{CharacterId, CharacterKind, CombatId, CombatStatus, CombatType, FactionId};

pub struct CombatInstance {
    id: CombatId,
    map_id: String,
    started_at: DateTime<Utc>,
    status: CombatStatus,
    parties: Vec<CombatParty>,
    action_bar: ActionBar,
    log: CombatLog,
    ledger: LootLedger,
    current_turn: Option<CharacterId>,
    reward: Option<RewardDistribution>,
    rng: StdRng,
}

impl CombatInstance {
    pub fn new(id: CombatId, map_id: impl Into<String>) -> Self {
        Self::with_rng(id, map_id, StdRng::from_entropy())
    }

    /// Creates an instance whose rolls are reproducible from `seed`.
    pub fn with_seed(id: CombatId, map_id: impl Into<String>, seed: u64) -> Self {
        Self::with_rng(id, map_id, StdRng::seed_from_u64(seed))
    }

    fn with_rng(id: CombatId, map_id: impl Into<String>, rng: StdRng) -> Self {
        Self {
            id,
            map_id: map_id.into(),
            started_at: Utc::now(),
            status: CombatStatus::Ongoing,
            parties: Vec::new(),
            action_bar: ActionBar::new(),
            log: CombatLog::new(),
            ledger: LootLedger::new(),
            current_turn: None,
            reward: None,
            rng,
        }
    }

    pub fn id(&self) -> CombatId {
        self.id
    }

    pub fn map_id(&self) -> &str {
        &self.map_id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn status(&self) -> CombatStatus {
        self.status
    }

    pub fn is_over(&self) -> bool {
        self.status.is_over()
    }

    pub fn current_turn(&self) -> Option<&CharacterId> {
        self.current_turn.as_ref()
    }

    pub fn parties(&self) -> &[CombatParty] {
        &self.parties
    }

    pub fn action_bar(&self) -> &ActionBar {
        &self.action_bar
    }

    pub fn log(&self) -> &CombatLog {
        &self.log
    }

    pub fn ledger(&self) -> &LootLedger {
        &self.ledger
    }

    pub(crate) fn ledger_mut(&mut self) -> &mut LootLedger {
        &mut self.ledger
    }

    pub(crate) fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    pub fn push_log(&mut self, message: impl Into<String>) -> u64 {
        self.log.push(message)
    }

    pub fn logs_since(&self, sequence: u64) -> &[CombatLogEntry] {
        self.log.since(sequence)
    }

    /// PVE when players face enemies, PVP when only players take part.
    pub fn combat_type(&self) -> CombatType {
        let has = |kind| self.characters().any(|c| c.kind == kind);
        match (has(CharacterKind::Player), has(CharacterKind::Enemy)) {
            (true, true) => CombatType::Pve,
            (true, false) => CombatType::Pvp,
            _ => CombatType::Unknown,
        }
    }

    /// Joins characters under a faction, creating its party on first use.
    pub fn add_party(
        &mut self,
        faction: FactionId,
        members: Vec<CombatCharacter>,
    ) -> Result<(), CombatError> {
        if let Some(dup) = members.iter().find(|m| self.character(&m.id).is_some()) {
            return Err(CombatError::CharacterAlreadyInCombat(dup.id.clone()));
        }
        for (i, member) in members.iter().enumerate() {
            if members[..i].iter().any(|m| m.id == member.id) {
                return Err(CombatError::CharacterAlreadyInCombat(member.id.clone()));
            }
        }
        for member in members {
            self.join(faction.clone(), member);
        }
        Ok(())
    }

    pub fn add_character(
        &mut self,
        faction: FactionId,
        member: CombatCharacter,
    ) -> Result<(), CombatError> {
        if self.character(&member.id).is_some() {
            return Err(CombatError::CharacterAlreadyInCombat(member.id));
        }
        self.join(faction, member);
        Ok(())
    }

    fn join(&mut self, faction: FactionId, mut member: CombatCharacter) {
        member.faction = faction.clone();
        self.action_bar.add(member.id.clone(), member.stats.speed);
        self.log.push(format!("{} joined the fight ({})", member.name, faction));

        match self.parties.iter_mut().find(|p| p.faction == faction) {
            Some(party) => party.members.push(member),
            None => {
                let mut party = CombatParty::new(faction);
                party.members.push(member);
                self.parties.push(party);
            }
        }
    }

    pub fn characters(&self) -> impl Iterator<Item = &CombatCharacter> {
        self.parties.iter().flat_map(|p| p.members.iter())
    }

    pub fn players(&self) -> impl Iterator<Item = &CombatCharacter> {
        self.characters().filter(|c| c.is_player())
    }

    pub fn character(&self, id: &CharacterId) -> Option<&CombatCharacter> {
        self.characters().find(|c| &c.id == id)
    }

    pub fn character_mut(&mut self, id: &CharacterId) -> Option<&mut CombatCharacter> {
        self.parties
            .iter_mut()
            .flat_map(|p| p.members.iter_mut())
            .find(|c| &c.id == id)
    }

    /// Case-insensitive lookup by display name.
    pub fn find_by_name(&self, name: &str) -> Option<&CombatCharacter> {
        let name = name.trim();
        self.characters().find(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub fn alive_in_faction<'a>(
        &'a self,
        faction: &'a FactionId,
    ) -> impl Iterator<Item = &'a CombatCharacter> + 'a {
        self.characters()
            .filter(move |c| &c.faction == faction && c.is_alive())
    }

    /// Living characters of every other faction.
    pub fn enemies_of<'a>(
        &'a self,
        faction: &'a FactionId,
    ) -> impl Iterator<Item = &'a CombatCharacter> + 'a {
        self.characters()
            .filter(move |c| &c.faction != faction && c.is_alive())
    }

    pub fn is_turn_of(&self, id: &CharacterId) -> bool {
        self.current_turn.as_ref() == Some(id)
    }

    /// Moves the clock to the next ready character and hands it the turn.
    ///
    /// If someone already holds the turn, that character is returned.
    pub fn advance_turn(&mut self) -> Option<CharacterId> {
        if self.current_turn.is_some() {
            return self.current_turn.clone();
        }
        let parties = &self.parties;
        let alive = |id: &CharacterId| {
            parties
                .iter()
                .flat_map(|p| p.members.iter())
                .any(|c| &c.id == id && c.is_alive())
        };
        self.current_turn = self.action_bar.advance_to_next_ready(alive);
        self.current_turn.clone()
    }

    /// Closes a character's turn: resets its bar and ticks its cooldowns.
    pub fn end_turn(&mut self, id: &CharacterId) {
        self.action_bar.reset(id);
        if let Some(character) = self.character_mut(id) {
            character.tick_cooldowns();
        }
        if self.is_turn_of(id) {
            self.current_turn = None;
        }
    }

    /// True once at most one faction still has someone standing.
    pub fn is_finished(&self) -> bool {
        self.parties
            .iter()
            .filter(|p| p.has_alive_characters())
            .count()
            <= 1
    }

    pub fn winner(&self) -> Option<FactionId> {
        if !self.is_finished() {
            return None;
        }
        self.parties
            .iter()
            .find(|p| p.has_alive_characters())
            .map(|p| p.faction.clone())
    }

    /// Concludes a finished combat and fills the reward slot.
    ///
    /// Returns `false` if the combat is still undecided or already over.
    pub fn finish(&mut self, loot: &dyn LootOracle) -> bool {
        if self.is_over() || !self.is_finished() {
            return false;
        }
        self.status = CombatStatus::Finished;
        self.current_turn = None;

        let winner = self.winner();
        match &winner {
            Some(faction) => self.log.push(format!("Combat over: {faction} wins!")),
            None => self.log.push("Combat over: draw"),
        };
        self.settle_rewards(winner, loot);
        true
    }

    /// Ends a combat that ran past its time limit.
    ///
    /// PVE: the players are overwhelmed and the enemies win. Anything else
    /// ends as a draw.
    pub fn time_out(&mut self, loot: &dyn LootOracle) -> bool {
        if self.is_over() {
            return false;
        }
        self.status = CombatStatus::TimedOut;
        self.current_turn = None;
        self.log.push("The fight dragged on too long and was called off");

        let winner = if self.combat_type() == CombatType::Pve {
            for character in self.parties.iter_mut().flat_map(|p| p.members.iter_mut()) {
                if character.is_player() && character.is_alive() {
                    character.dead = true;
                }
            }
            let winner = self.winner();
            if let Some(faction) = &winner {
                self.log.push(format!("Combat over: {faction} wins!"));
            }
            winner
        } else {
            self.log.push("Combat over: draw");
            None
        };
        self.settle_rewards(winner, loot);
        true
    }

    fn settle_rewards(&mut self, winner: Option<FactionId>, loot: &dyn LootOracle) {
        let distribution = reward::calculate(self, winner, loot);
        if distribution.total_experience > 0 || distribution.total_gold > 0 {
            self.log.push(format!(
                "Spoils: {} experience each, {} gold each",
                distribution.total_experience, distribution.gold_per_player
            ));
        }
        if !distribution.items.is_empty() {
            self.log.push(format!("Loot: {}", distribution.items.join(", ")));
        }
        self.reward = Some(distribution);
    }

    /// Removes the reward payload. Only the first caller gets `Some`.
    pub fn take_reward(&mut self) -> Option<RewardDistribution> {
        self.reward.take()
    }

    pub fn has_pending_reward(&self) -> bool {
        self.reward.is_some()
    }

    /// A player walks away from a PVE fight.
    pub fn forfeit(&mut self, id: &CharacterId) -> Result<(), CombatError> {
        if self.is_over() {
            return Err(CombatError::CombatOver);
        }
        let combat_type = self.combat_type();
        let character = self
            .character(id)
            .ok_or_else(|| CombatError::CharacterNotFound(id.clone()))?;
        if !character.is_player() {
            return Err(CombatError::ForfeitNotPlayer);
        }
        if combat_type == CombatType::Pvp {
            return Err(CombatError::ForfeitInPvp);
        }
        if !character.is_alive() {
            return Err(CombatError::CasterUnavailable);
        }

        let name = character.name.clone();
        if let Some(character) = self.character_mut(id) {
            character.forfeit();
        }
        if self.is_turn_of(id) {
            self.current_turn = None;
        }
        self.log.push(format!("{name} fled the fight"));
        Ok(())
    }

    pub fn is_expired(&self, now: DateTime<Utc>, limit: TimeDelta) -> bool {
        now - self.started_at >= limit
    }

    pub fn snapshot(&self) -> CombatSnapshot {
        let characters = self
            .characters()
            .map(|c| CharacterSnapshot {
                id: c.id.clone(),
                name: c.name.clone(),
                kind: c.kind,
                faction: c.faction.clone(),
                health: c.health,
                max_health: c.max_health,
                mana: c.mana,
                max_mana: c.max_mana,
                alive: c.is_alive(),
                time_to_ready: self
                    .action_bar
                    .entry(&c.id)
                    .map_or(0.0, ActionBarEntry::time_to_ready),
            })
            .collect();

        CombatSnapshot {
            id: self.id,
            map_id: self.map_id.clone(),
            status: self.status,
            combat_type: self.combat_type(),
            current_turn: self.current_turn.clone(),
            characters,
            last_sequence: self.log.last_sequence(),
        }
    }
}

/// Read-only view of a combat for display.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatSnapshot {
    pub id: CombatId,
    pub map_id: String,
    pub status: CombatStatus,
    pub combat_type: CombatType,
    pub current_turn: Option<CharacterId>,
    pub characters: Vec<CharacterSnapshot>,
    pub last_sequence: u64,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CharacterSnapshot {
    pub id: CharacterId,
    pub name: String,
    pub kind: CharacterKind,
    pub faction: FactionId,
    pub health: u32,
    pub max_health: u32,
    pub mana: u32,
    pub max_mana: u32,
    pub alive: bool,
    pub time_to_ready: f64,
}
