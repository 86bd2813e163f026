//! Persistent records the engine writes back to.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use combat_core::{CharacterId, CombatId};

/// Slots a player inventory can hold.
pub const INVENTORY_CAPACITY: usize = 50;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventorySlot {
    pub item_id: String,
    pub quantity: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub id: CharacterId,
    pub name: String,
    pub level: u32,
    pub experience: u64,
    pub gold: u64,
    pub health: u32,
    pub max_health: u32,
    pub mana: u32,
    pub max_mana: u32,
    pub map_id: String,
    pub position: (i32, i32),
    pub last_safe_waypoint: Option<String>,
    pub inventory: Vec<InventorySlot>,
    pub in_combat: Option<CombatId>,
}

impl PlayerRecord {
    pub fn new(
        id: impl Into<CharacterId>,
        name: impl Into<String>,
        map_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            level: 1,
            experience: 0,
            gold: 0,
            health: 100,
            max_health: 100,
            mana: 50,
            max_mana: 50,
            map_id: map_id.into(),
            position: (0, 0),
            last_safe_waypoint: None,
            inventory: Vec::new(),
            in_combat: None,
        }
    }

    pub fn quantity_of(&self, item_id: &str) -> u32 {
        self.inventory
            .iter()
            .filter(|s| s.item_id == item_id)
            .map(|s| s.quantity)
            .sum()
    }

    /// Adds items, stacking onto an existing slot when allowed.
    ///
    /// Returns `false` when no slot is free; nothing is added then.
    pub fn add_item(&mut self, item_id: &str, quantity: u32, stackable: bool) -> bool {
        if stackable
            && let Some(slot) = self.inventory.iter_mut().find(|s| s.item_id == item_id)
        {
            slot.quantity = slot.quantity.saturating_add(quantity);
            return true;
        }
        if self.inventory.len() >= INVENTORY_CAPACITY {
            return false;
        }
        self.inventory.push(InventorySlot {
            item_id: item_id.to_owned(),
            quantity,
        });
        true
    }

    /// Removes one unit, dropping the slot once empty.
    pub fn take_one(&mut self, item_id: &str) -> bool {
        let Some(index) = self
            .inventory
            .iter()
            .position(|s| s.item_id == item_id && s.quantity > 0)
        else {
            return false;
        };
        self.inventory[index].quantity -= 1;
        if self.inventory[index].quantity == 0 {
            self.inventory.remove(index);
        }
        true
    }
}

/// Lifecycle of one enemy placed on a map.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemyRecord {
    pub map_id: String,
    pub instance_id: String,
    pub dead: bool,
    pub respawn_at: Option<DateTime<Utc>>,
    pub in_combat: Option<CombatId>,
}

impl EnemyRecord {
    pub fn new(map_id: impl Into<String>, instance_id: impl Into<String>) -> Self {
        Self {
            map_id: map_id.into(),
            instance_id: instance_id.into(),
            dead: false,
            respawn_at: None,
            in_combat: None,
        }
    }
}

/// Client-side view a player is looking at.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum Window {
    #[default]
    Map,
    Combat,
    Inventory,
    Shop,
    Trade,
    Dialog,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowTransition {
    pub player: CharacterId,
    pub from: Window,
    pub to: Window,
    pub window_id: Option<String>,
}
