//! Per-combat timing coordination.
//!
//! [`TurnWaitCoordinator`] lets a player block until their turn comes up or
//! a window elapses. [`TurnTimeoutManager`] skips a player who holds the turn
//! for too long. Both keep their state in concurrent maps so they can be
//! driven from any task without holding a combat lock across an await.
mod turn_timeout;
mod turn_wait;

pub use turn_timeout::{TurnTimeoutHandler, TurnTimeoutManager};
pub use turn_wait::{TurnWait, TurnWaitCoordinator, WaitOutcome};
