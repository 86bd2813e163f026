use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Result of a combat command as shown to the player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub success: bool,
    pub message: String,
    /// Set whenever the combat is over, so the caller can leave the combat view.
    pub combat_ended: bool,
    /// Rendered log lines produced since the command started.
    pub battle_log: Vec<String>,
}

impl ActionOutcome {
    pub fn ok(message: impl Into<String>, combat_ended: bool, battle_log: Vec<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            combat_ended,
            battle_log,
        }
    }

    pub fn rejected(reason: impl Display, battle_log: Vec<String>) -> Self {
        Self {
            success: false,
            message: reason.to_string(),
            combat_ended: false,
            battle_log,
        }
    }

    /// Reply for commands sent to a combat that is already over.
    pub fn ended(battle_log: Vec<String>) -> Self {
        Self {
            success: false,
            message: "combat has already ended".to_owned(),
            combat_ended: true,
            battle_log,
        }
    }
}
