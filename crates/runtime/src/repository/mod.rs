//! Write-back surfaces for state that outlives a combat.
//!
//! The engine never owns player or enemy records. It reads inventories for
//! item use and hands settlement results to these collaborators, which apply
//! their own atomicity. In-memory implementations back tests and local runs.
mod error;
mod memory;
mod traits;
mod types;

pub use error::{RepositoryError, Result};
pub use memory::{InMemoryEnemies, InMemoryPlayers, InMemoryWindows};
pub use traits::{EnemyRepository, PlayerRepository, WindowStateService};
pub use types::{
    EnemyRecord, INVENTORY_CAPACITY, InventorySlot, PlayerRecord, Window, WindowTransition,
};
