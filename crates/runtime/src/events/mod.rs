//! Topic-based event bus for engine events.
//!
//! Events are best-effort notifications for observers such as a UI or a
//! metrics sink; nothing in the engine depends on them being received.

mod bus;
mod types;

pub use bus::{Event, EventBus, Topic};
pub use types::{CombatEvent, SettlementEvent, TurnEvent};
