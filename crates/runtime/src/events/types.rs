//! Event payloads per topic.

use serde::{Deserialize, Serialize};

use combat_core::{CharacterId, CombatId, CombatStatus, FactionId};

/// Combat lifecycle changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatEvent {
    Started {
        combat: CombatId,
    },
    Ended {
        combat: CombatId,
        status: CombatStatus,
        winner: Option<FactionId>,
    },
}

/// Turn handoffs and skips.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnEvent {
    /// `character` now holds the turn.
    Started {
        combat: CombatId,
        character: CharacterId,
    },
    /// The holder idled past the turn timeout and lost the turn.
    TimedOut {
        combat: CombatId,
        character: CharacterId,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettlementEvent {
    /// Rewards and penalties were applied.
    Completed { combat: CombatId },
}
