//! Unified error type surfaced by the engine API.
//!
//! Validation failures inside a running combat are reported through
//! [`ActionOutcome`](super::ActionOutcome) instead; these errors cover setup
//! calls and collaborator failures.
use thiserror::Error;

use combat_core::{CombatError, CombatId};

pub use crate::repository::RepositoryError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("combat {0} not found")]
    CombatNotFound(CombatId),

    #[error("combat {0} needs at least two factions to start")]
    NotEnoughFactions(CombatId),

    #[error("combat {0} has already started")]
    AlreadyStarted(CombatId),

    #[error(transparent)]
    Combat(#[from] CombatError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("engine requires {0} to be configured before building")]
    MissingCollaborator(&'static str),
}
