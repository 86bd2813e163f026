//! Content and collaborators for the scripted fight.
use std::sync::Arc;

use combat_core::{
    CharacterKind, CombatCharacter, CombatStats, DamageKind, EnemyLoot, EnemyOrigin,
    ItemDefinition, ItemEffect, ItemKind, LootDrop, MapInfo, SkillDefinition, SkillTarget,
    Waypoint,
};
use combat_runtime::{
    EnemyRecord, InMemoryEnemies, InMemoryPlayers, InMemoryWindows, PlayerRecord, StaticContent,
    Window,
};

pub const FOREST: &str = "whispering_forest";
pub const VILLAGE: &str = "village";
pub const PLAYER_ID: &str = "ranger";

pub fn content() -> StaticContent {
    StaticContent::new()
        .with_map(MapInfo {
            id: FOREST.into(),
            name: "Whispering Forest".into(),
            recommended_level: Some(5),
            safe: false,
            waypoints: Vec::new(),
        })
        .with_map(MapInfo {
            id: VILLAGE.into(),
            name: "Village".into(),
            recommended_level: None,
            safe: true,
            waypoints: vec![Waypoint {
                id: "village_well".into(),
                map_id: VILLAGE.into(),
                x: 12,
                y: 8,
            }],
        })
        .with_skill(SkillDefinition {
            id: "power_shot".into(),
            name: "Power Shot".into(),
            target: SkillTarget::EnemySingle,
            damage: DamageKind::Physical,
            mana_cost: 15,
            cooldown: 2,
            multiplier: 1.8,
        })
        .with_skill(SkillDefinition {
            id: "bite".into(),
            name: "Bite".into(),
            target: SkillTarget::EnemySingle,
            damage: DamageKind::Physical,
            mana_cost: 0,
            cooldown: 1,
            multiplier: 1.3,
        })
        .with_item(ItemDefinition {
            id: "herb".into(),
            name: "Healing Herb".into(),
            kind: ItemKind::Consumable,
            effect: Some(ItemEffect::HealHp(40)),
        })
        .with_item(ItemDefinition {
            id: "fang".into(),
            name: "Sharp Fang".into(),
            kind: ItemKind::Material,
            effect: None,
        })
        .with_enemy_loot(
            "forest_wolf",
            EnemyLoot {
                experience: 25,
                gold: 12,
                drops: vec![LootDrop {
                    item_id: "fang".into(),
                    chance: 0.5,
                }],
            },
        )
}

fn stats(speed: i32, attack: i32, defense: i32) -> CombatStats {
    CombatStats {
        physical_attack: attack,
        physical_defense: defense,
        magic_attack: 5,
        magic_defense: 5,
        speed,
        crit_rate: 0.1,
        crit_damage: 0.5,
        hit_rate: 0.95,
        dodge_rate: 0.05,
    }
}

pub fn ranger() -> CombatCharacter {
    CombatCharacter::new(
        PLAYER_ID,
        CharacterKind::Player,
        "Ranger",
        "adventurers",
        160,
        60,
        stats(120, 34, 12),
    )
    .with_level(7)
    .with_skills(["power_shot"])
    .with_party("solo", true)
}

pub fn forest_wolf(instance_id: &str) -> CombatCharacter {
    CombatCharacter::new(
        instance_id,
        CharacterKind::Enemy,
        "Forest Wolf",
        "pack",
        70,
        0,
        stats(90, 22, 6),
    )
    .with_level(4)
    .with_skills(["bite"])
    .with_enemy_origin(EnemyOrigin {
        map_id: FOREST.into(),
        instance_id: instance_id.into(),
        template_id: "forest_wolf".into(),
        respawn_seconds: 90,
    })
}

pub struct Collaborators {
    pub players: Arc<InMemoryPlayers>,
    pub enemies: Arc<InMemoryEnemies>,
    pub windows: Arc<InMemoryWindows>,
}

pub fn collaborators(wolves: &[&str]) -> Collaborators {
    let mut record = PlayerRecord::new(PLAYER_ID, "Ranger", FOREST);
    record.level = 7;
    record.max_health = 160;
    record.health = 160;
    record.max_mana = 60;
    record.mana = 60;
    record.position = (3, 4);
    record.last_safe_waypoint = Some("village_well".into());
    record.add_item("herb", 3, true);

    let windows = Arc::new(InMemoryWindows::new());
    windows.set(&PLAYER_ID.into(), Window::Combat);

    Collaborators {
        players: Arc::new(InMemoryPlayers::with_players([record])),
        enemies: Arc::new(InMemoryEnemies::with_enemies(
            wolves.iter().map(|id| EnemyRecord::new(FOREST, *id)),
        )),
        windows,
    }
}
