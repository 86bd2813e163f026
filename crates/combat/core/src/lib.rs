//! Pure combat rules shared by the engine and offline tools.
//!
//! `combat-core` holds everything about a fight that does not involve time or
//! concurrency: combat-time character snapshots, the CTB action bar, damage
//! resolution, skill effects, the threat AI, loot attribution, protection
//! rules and the [`CombatInstance`] aggregate that ties them together. The
//! async engine in `combat-runtime` serializes access to instances and adds
//! waiting, timeouts and settlement on top.
pub mod action_bar;
pub mod ai;
pub mod character;
pub mod combat;
pub mod env;
pub mod error;
pub mod instance;
pub mod log;
pub mod loot;
pub mod protection;
pub mod reward;
pub mod skill;
pub mod types;

pub use action_bar::{ACTION_BAR_MAX, ActionBar, ActionBarEntry};
pub use ai::{AiDecision, CombatAi, ThreatAi};
pub use character::{CombatCharacter, CombatParty, CombatStats, EnemyOrigin};
pub use combat::{AttackResult, DamageKind, calculate_damage, resolve_attack};
pub use env::{
    EnemyLoot, ItemDefinition, ItemEffect, ItemKind, ItemOracle, LootDrop, LootOracle, MapInfo,
    MapOracle, SkillOracle, Waypoint,
};
pub use error::CombatError;
pub use instance::{CharacterSnapshot, CombatInstance, CombatSnapshot};
pub use log::{CombatLog, CombatLogEntry};
pub use loot::{DamageRecord, LootLedger};
pub use protection::{DenyReason, ProtectionChecker, ProtectionVerdict};
pub use reward::{DefeatedEnemy, DefeatedPlayer, EnemyRef, FinalState, RewardDistribution};
pub use skill::{
    BASIC_ATTACK_ID, SkillDefinition, SkillExecution, SkillTarget, execute_skill, resolve_skill,
    skill_by_id,
};
pub use types::{CharacterId, CharacterKind, CombatId, CombatStatus, CombatType, FactionId, PartyId};
