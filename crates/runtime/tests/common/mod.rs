//! Shared world for the engine integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use combat_core::{
    CharacterKind, CombatCharacter, CombatStats, DamageKind, EnemyLoot, EnemyOrigin,
    ItemDefinition, ItemEffect, ItemKind, LootDrop, MapInfo, SkillDefinition, SkillTarget,
    Waypoint,
};
use combat_runtime::{
    CombatEngine, EngineConfig, EnemyRecord, InMemoryEnemies, InMemoryPlayers, InMemoryWindows,
    OracleManager, PlayerRecord, StaticContent, Window,
};

pub const MEADOW: &str = "meadow";
pub const TOWN: &str = "town";

pub fn content() -> StaticContent {
    StaticContent::new()
        .with_map(MapInfo {
            id: MEADOW.into(),
            name: "Meadow".into(),
            recommended_level: Some(10),
            safe: false,
            waypoints: Vec::new(),
        })
        .with_map(MapInfo {
            id: TOWN.into(),
            name: "Town".into(),
            recommended_level: None,
            safe: true,
            waypoints: vec![Waypoint {
                id: "town_square".into(),
                map_id: TOWN.into(),
                x: 5,
                y: 5,
            }],
        })
        .with_skill(SkillDefinition {
            id: "fireball".into(),
            name: "Fireball".into(),
            target: SkillTarget::EnemySingle,
            damage: DamageKind::Magical,
            mana_cost: 20,
            cooldown: 2,
            multiplier: 1.5,
        })
        .with_skill(SkillDefinition {
            id: "mend".into(),
            name: "Mend".into(),
            target: SkillTarget::AllySingle,
            damage: DamageKind::None,
            mana_cost: 10,
            cooldown: 0,
            multiplier: 2.0,
        })
        .with_item(item("potion", "Potion", ItemKind::Consumable, Some(ItemEffect::HealHp(30))))
        .with_item(item("ether", "Ether", ItemKind::Consumable, Some(ItemEffect::HealMp(20))))
        .with_item(item("scroll", "Scroll", ItemKind::Consumable, Some(ItemEffect::Other)))
        .with_item(item("amulet", "Amulet", ItemKind::Equipment, Some(ItemEffect::HealHp(5))))
        .with_item(item("ore", "Ore", ItemKind::Material, None))
        .with_item(item("wolf_pelt", "Wolf Pelt", ItemKind::Material, None))
        .with_enemy_loot(
            "wolf",
            EnemyLoot {
                experience: 40,
                gold: 30,
                drops: vec![LootDrop {
                    item_id: "wolf_pelt".into(),
                    chance: 1.0,
                }],
            },
        )
}

fn item(id: &str, name: &str, kind: ItemKind, effect: Option<ItemEffect>) -> ItemDefinition {
    ItemDefinition {
        id: id.into(),
        name: name.into(),
        kind,
        effect,
    }
}

/// Stats that always hit and never crit or dodge.
pub fn stats(speed: i32, attack: i32, defense: i32) -> CombatStats {
    CombatStats {
        physical_attack: attack,
        physical_defense: defense,
        magic_attack: 10,
        magic_defense: 0,
        speed,
        crit_rate: 0.0,
        crit_damage: 0.0,
        hit_rate: 1.0,
        dodge_rate: 0.0,
    }
}

/// Fast hero who one-shots a 50 hp wolf with a basic attack.
pub fn hero() -> CombatCharacter {
    let stats = stats(150, 60, 10);
    CombatCharacter::new("hero", CharacterKind::Player, "Hero", "heroes", 200, 50, stats)
        .with_level(12)
        .with_skills(["fireball", "mend"])
        .with_party("band", true)
}

/// Slow support player.
pub fn mage() -> CombatCharacter {
    CombatCharacter::new("mage", CharacterKind::Player, "Mage", "heroes", 150, 80, stats(10, 5, 5))
        .with_level(12)
        .with_skills(["mend"])
        .with_party("band", false)
}

pub fn wolf(id: &str, health: u32) -> CombatCharacter {
    CombatCharacter::new(id, CharacterKind::Enemy, "Wolf", "wild", health, 0, stats(80, 20, 10))
        .with_enemy_origin(EnemyOrigin {
            map_id: MEADOW.into(),
            instance_id: id.into(),
            template_id: "wolf".into(),
            respawn_seconds: 60,
        })
}

pub struct World {
    pub engine: CombatEngine,
    pub players: Arc<InMemoryPlayers>,
    pub enemies: Arc<InMemoryEnemies>,
    pub windows: Arc<InMemoryWindows>,
}

impl World {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let mut hero = PlayerRecord::new("hero", "Hero", MEADOW);
        hero.level = 12;
        hero.experience = 1_000;
        hero.max_health = 200;
        hero.health = 200;
        hero.last_safe_waypoint = Some("town_square".into());
        hero.add_item("potion", 2, true);
        hero.add_item("scroll", 1, true);
        hero.add_item("amulet", 1, false);
        hero.add_item("ore", 3, true);

        let mut mage = PlayerRecord::new("mage", "Mage", MEADOW);
        mage.level = 12;
        mage.experience = 500;

        let players = Arc::new(InMemoryPlayers::with_players([hero, mage]));
        let enemies = Arc::new(InMemoryEnemies::with_enemies([
            EnemyRecord::new(MEADOW, "w1"),
            EnemyRecord::new(MEADOW, "w2"),
        ]));
        let windows = Arc::new(InMemoryWindows::new());
        windows.set(&"hero".into(), Window::Combat);
        windows.set(&"mage".into(), Window::Combat);

        let engine = CombatEngine::builder()
            .config(config)
            .oracles(OracleManager::from_content(content()))
            .players(players.clone())
            .enemies(enemies.clone())
            .windows(windows.clone())
            .build()
            .expect("engine builds");

        Self {
            engine,
            players,
            enemies,
            windows,
        }
    }
}
