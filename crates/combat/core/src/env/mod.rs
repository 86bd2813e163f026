//! Read-only metadata lookups the combat domain consumes.
//!
//! Each trait covers one kind of static content. The runtime provides
//! implementations; combat code only ever borrows them. Lookups are live,
//! so content edits are visible to combats already in progress.
mod items;
mod loot;
mod maps;
mod skills;

pub use items::{ItemDefinition, ItemEffect, ItemKind, ItemOracle};
pub use loot::{EnemyLoot, LootDrop, LootOracle};
pub use maps::{MapInfo, MapOracle, Waypoint};
pub use skills::SkillOracle;
