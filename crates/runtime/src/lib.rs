//! Server-side orchestration for turn-based combat.
//!
//! This crate wraps the pure rules in `combat-core` with everything that
//! involves time and concurrency. Consumers build a [`CombatEngine`] and drive
//! fights through it; the engine serializes each combat behind its own lock,
//! lets players wait for their turn, skips idle players, and settles each
//! concluded fight exactly once.
//!
//! Modules are organized by responsibility:
//! - [`engine`] hosts the facade, its builder and turn processing
//! - [`api`] exposes the outcome and error types callers see
//! - [`coordination`] provides turn waits and turn timeouts
//! - [`settlement`] applies rewards and penalties once per combat
//! - [`events`] provides a topic-based event bus for observers
//! - [`oracle`] and [`repository`] provide data adapters and in-memory backends
pub mod api;
pub mod config;
pub mod coordination;
pub mod engine;
pub mod events;
pub mod oracle;
pub mod registry;
pub mod repository;
pub mod settlement;

pub use api::{ActionOutcome, Result, RuntimeError};
pub use config::EngineConfig;
pub use coordination::{TurnTimeoutHandler, TurnTimeoutManager, TurnWaitCoordinator, WaitOutcome};
pub use engine::{CombatEngine, CombatEngineBuilder};
pub use events::{CombatEvent, Event, EventBus, SettlementEvent, Topic, TurnEvent};
pub use oracle::{OracleManager, StaticContent};
pub use registry::{CombatEntry, CombatRegistry};
pub use repository::{
    EnemyRecord, EnemyRepository, InMemoryEnemies, InMemoryPlayers, InMemoryWindows,
    InventorySlot, PlayerRecord, PlayerRepository, RepositoryError, Window, WindowStateService,
    WindowTransition,
};
pub use settlement::{CombatSettlement, SettlementOutcome, SettlementPhase};
