//! Topic-based event bus implementation.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use super::types::{CombatEvent, SettlementEvent, TurnEvent};

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    Combat,
    Turn,
    Settlement,
}

/// Event wrapper that carries the topic and typed event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    Combat(CombatEvent),
    Turn(TurnEvent),
    Settlement(SettlementEvent),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::Combat(_) => Topic::Combat,
            Event::Turn(_) => Topic::Turn,
            Event::Settlement(_) => Topic::Settlement,
        }
    }
}

impl From<CombatEvent> for Event {
    fn from(event: CombatEvent) -> Self {
        Event::Combat(event)
    }
}

impl From<TurnEvent> for Event {
    fn from(event: TurnEvent) -> Self {
        Event::Turn(event)
    }
}

impl From<SettlementEvent> for Event {
    fn from(event: SettlementEvent) -> Self {
        Event::Settlement(event)
    }
}

struct Channels {
    combat: broadcast::Sender<Event>,
    turn: broadcast::Sender<Event>,
    settlement: broadcast::Sender<Event>,
}

impl Channels {
    fn sender(&self, topic: Topic) -> &broadcast::Sender<Event> {
        match topic {
            Topic::Combat => &self.combat,
            Topic::Turn => &self.turn,
            Topic::Settlement => &self.settlement,
        }
    }
}

/// Topic-based event bus
///
/// Consumers subscribe to the topics they care about. Cloning is cheap and
/// every clone publishes into the same channels.
#[derive(Clone)]
pub struct EventBus {
    channels: Arc<Channels>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            channels: Arc::new(Channels {
                combat: broadcast::channel(capacity).0,
                turn: broadcast::channel(capacity).0,
                settlement: broadcast::channel(capacity).0,
            }),
        }
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: impl Into<Event>) {
        let event = event.into();
        let topic = event.topic();
        if self.channels.sender(topic).send(event).is_err() {
            tracing::trace!("No subscribers for topic {:?}", topic);
        }
    }

    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.channels.sender(topic).subscribe()
    }
}

#[cfg(test)]
mod tests {
    use combat_core::{CharacterId, CombatId};

    use super::*;

    #[tokio::test]
    async fn subscribers_only_see_their_topic() {
        let bus = EventBus::with_capacity(8);
        let mut turns = bus.subscribe(Topic::Turn);
        let mut combats = bus.subscribe(Topic::Combat);

        bus.publish(CombatEvent::Started {
            combat: CombatId(1),
        });
        bus.publish(TurnEvent::Started {
            combat: CombatId(1),
            character: CharacterId::from("hero"),
        });

        assert!(matches!(
            turns.recv().await.expect("turn event"),
            Event::Turn(TurnEvent::Started { .. })
        ));
        assert!(matches!(
            combats.recv().await.expect("combat event"),
            Event::Combat(CombatEvent::Started { .. })
        ));
        assert!(turns.try_recv().is_err());
    }

    #[test]
    fn publishing_without_subscribers_is_fine() {
        EventBus::new().publish(SettlementEvent::Completed {
            combat: CombatId(9),
        });
    }
}
