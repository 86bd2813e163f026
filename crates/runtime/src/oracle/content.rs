//! Content tables held in memory.
use std::collections::HashMap;

use combat_core::{
    EnemyLoot, ItemDefinition, ItemOracle, LootOracle, MapInfo, MapOracle, SkillDefinition,
    SkillOracle,
};

/// Skills, maps, items and loot tables loaded once at startup.
#[derive(Clone, Debug, Default)]
pub struct StaticContent {
    skills: HashMap<String, SkillDefinition>,
    maps: Vec<MapInfo>,
    items: HashMap<String, ItemDefinition>,
    loot: HashMap<String, EnemyLoot>,
}

impl StaticContent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_skill(&mut self, skill: SkillDefinition) {
        self.skills.insert(skill.id.clone(), skill);
    }

    /// Adds a map, replacing one with the same id in place.
    pub fn add_map(&mut self, map: MapInfo) {
        match self.maps.iter_mut().find(|m| m.id == map.id) {
            Some(existing) => *existing = map,
            None => self.maps.push(map),
        }
    }

    pub fn add_item(&mut self, item: ItemDefinition) {
        self.items.insert(item.id.clone(), item);
    }

    pub fn add_enemy_loot(&mut self, template_id: impl Into<String>, loot: EnemyLoot) {
        self.loot.insert(template_id.into(), loot);
    }

    pub fn with_skill(mut self, skill: SkillDefinition) -> Self {
        self.add_skill(skill);
        self
    }

    pub fn with_map(mut self, map: MapInfo) -> Self {
        self.add_map(map);
        self
    }

    pub fn with_item(mut self, item: ItemDefinition) -> Self {
        self.add_item(item);
        self
    }

    pub fn with_enemy_loot(mut self, template_id: impl Into<String>, loot: EnemyLoot) -> Self {
        self.add_enemy_loot(template_id, loot);
        self
    }
}

impl SkillOracle for StaticContent {
    fn skill(&self, id: &str) -> Option<SkillDefinition> {
        self.skills.get(id).cloned()
    }
}

impl MapOracle for StaticContent {
    fn map(&self, id: &str) -> Option<MapInfo> {
        self.maps.iter().find(|m| m.id == id).cloned()
    }

    fn maps(&self) -> Vec<MapInfo> {
        self.maps.clone()
    }
}

impl ItemOracle for StaticContent {
    fn item(&self, id: &str) -> Option<ItemDefinition> {
        self.items.get(id).cloned()
    }

    fn item_by_name(&self, name: &str) -> Option<ItemDefinition> {
        let name = name.trim();
        self.items
            .values()
            .find(|i| i.name.eq_ignore_ascii_case(name))
            .cloned()
    }
}

impl LootOracle for StaticContent {
    fn enemy_loot(&self, template_id: &str) -> Option<EnemyLoot> {
        self.loot.get(template_id).cloned()
    }
}
