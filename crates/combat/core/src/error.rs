//! Validation errors raised by combat operations.
//!
//! Every variant renders a short, human-readable reason. The runtime converts
//! these into failed action outcomes instead of propagating them, so the
//! display strings are what players end up reading.
use thiserror::Error;

use crate::types::CharacterId;

/// Rejection reasons for combat commands.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CombatError {
    #[error("combat not found")]
    CombatNotFound,

    #[error("combat has already ended")]
    CombatOver,

    #[error("character {0} is not in this combat")]
    CharacterNotFound(CharacterId),

    #[error("character {0} is already in this combat")]
    CharacterAlreadyInCombat(CharacterId),

    #[error("caster not found or dead")]
    CasterUnavailable,

    #[error("not your turn yet")]
    NotYourTurn,

    #[error("skill does not exist")]
    SkillNotFound,

    #[error("skill on cooldown ({remaining} turns left)")]
    SkillOnCooldown { remaining: u32 },

    #[error("insufficient mana (need {required}, have {available})")]
    InsufficientMana { required: u32, available: u32 },

    #[error("target does not exist or is dead")]
    InvalidTarget,

    #[error("no enemies left to target")]
    NoTargets,

    #[error("item {0} is not in your inventory")]
    ItemNotFound(String),

    #[error("this item cannot be used")]
    ItemHasNoEffect,

    #[error("only consumables can be used in combat")]
    ItemNotConsumable,

    #[error("this item cannot be used in combat")]
    ItemNotUsableInCombat,

    #[error("cannot forfeit a player-versus-player combat")]
    ForfeitInPvp,

    #[error("only players can forfeit")]
    ForfeitNotPlayer,
}
