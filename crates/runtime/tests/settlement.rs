mod common;

use std::sync::Arc;

use combat_core::{CharacterId, CharacterKind, CombatCharacter, CombatId};
use combat_runtime::{
    CombatRegistry, CombatSettlement, EngineConfig, EnemyRecord, EventBus, InMemoryEnemies,
    InMemoryPlayers, InMemoryWindows, OracleManager, PlayerRecord, SettlementOutcome,
    SettlementPhase, Window, WindowStateService,
};

use common::{MEADOW, content, hero, stats, wolf};

struct Harness {
    registry: Arc<CombatRegistry>,
    settlement: Arc<CombatSettlement>,
    oracles: OracleManager,
    players: Arc<InMemoryPlayers>,
    enemies: Arc<InMemoryEnemies>,
    windows: Arc<InMemoryWindows>,
}

fn harness() -> Harness {
    let config = EngineConfig::default();
    let registry = Arc::new(CombatRegistry::new());
    let oracles = OracleManager::from_content(content());

    let mut first = PlayerRecord::new("hero", "Hero", MEADOW);
    first.experience = 100;
    let mut second = PlayerRecord::new("ally", "Ally", MEADOW);
    second.experience = 100;
    let players = Arc::new(InMemoryPlayers::with_players([first, second]));
    let enemies = Arc::new(InMemoryEnemies::with_enemies([EnemyRecord::new(MEADOW, "w1")]));
    let windows = Arc::new(InMemoryWindows::new());
    windows.set(&"hero".into(), Window::Combat);
    windows.set(&"ally".into(), Window::Combat);

    let settlement = Arc::new(CombatSettlement::new(
        Arc::clone(&registry),
        oracles.clone(),
        players.clone(),
        enemies.clone(),
        windows.clone(),
        config,
        EventBus::new(),
    ));

    Harness {
        registry,
        settlement,
        oracles,
        players,
        enemies,
        windows,
    }
}

fn ally() -> CombatCharacter {
    let stats = stats(90, 40, 10);
    CombatCharacter::new("ally", CharacterKind::Player, "Ally", "heroes", 150, 30, stats)
        .with_level(12)
        .with_party("band", false)
}

async fn won_fight(h: &Harness) -> CombatId {
    let combat = h
        .registry
        .create(MEADOW, Some(3), EngineConfig::default().turn_wait);
    let entry = h.registry.get(combat).expect("registered");
    let mut instance = entry.instance.lock().await;
    instance
        .add_party("heroes".into(), vec![hero(), ally()])
        .expect("heroes join");
    instance
        .add_party("wild".into(), vec![wolf("w1", 50)])
        .expect("wolf joins");

    instance
        .character_mut(&CharacterId::from("w1"))
        .expect("wolf present")
        .take_damage(50);
    assert!(instance.finish(h.oracles.loot()));
    combat
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_callers_settle_exactly_once() {
    let h = harness();
    let combat = won_fight(&h).await;

    let calls: Vec<_> = (0..16)
        .map(|_| {
            let settlement = Arc::clone(&h.settlement);
            tokio::spawn(async move { settlement.handle_combat_end(combat).await })
        })
        .collect();

    let mut outcomes = Vec::new();
    for call in calls {
        outcomes.push(call.await.expect("settlement task"));
    }

    let settled = outcomes
        .iter()
        .filter(|o| **o == SettlementOutcome::Settled)
        .count();
    assert_eq!(settled, 1);
    assert!(outcomes.iter().all(|o| o.is_success()), "{outcomes:?}");
    assert_eq!(h.settlement.phase(combat), Some(SettlementPhase::Done));

    let leader = h.players.get(&"hero".into()).expect("hero record");
    let member = h.players.get(&"ally".into()).expect("ally record");
    assert_eq!(leader.experience, 140);
    assert_eq!(member.experience, 140);
    assert_eq!(leader.gold, 15);
    assert_eq!(member.gold, 15);
    assert!(leader.inventory.iter().any(|s| s.item_id == "wolf_pelt"));
    assert!(member.inventory.iter().all(|s| s.item_id != "wolf_pelt"));

    let wolf = h.enemies.get(MEADOW, "w1").expect("wolf record");
    assert!(wolf.dead);
    assert!(wolf.respawn_at.is_some());
    assert_eq!(h.windows.current_window(&"hero".into()), Some(Window::Map));
    assert_eq!(h.windows.current_window(&"ally".into()), Some(Window::Map));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn later_calls_report_already_settled() {
    let h = harness();
    let combat = won_fight(&h).await;

    assert_eq!(
        h.settlement.handle_combat_end(combat).await,
        SettlementOutcome::Settled
    );
    assert_eq!(
        h.settlement.handle_combat_end(combat).await,
        SettlementOutcome::AlreadySettled
    );

    let leader = h.players.get(&"hero".into()).expect("hero record");
    assert_eq!(leader.experience, 140);
}

#[tokio::test]
async fn ongoing_and_unknown_combats_are_not_finished() {
    let h = harness();
    let combat = h
        .registry
        .create(MEADOW, None, EngineConfig::default().turn_wait);
    {
        let entry = h.registry.get(combat).expect("registered");
        let mut instance = entry.instance.lock().await;
        instance
            .add_party("heroes".into(), vec![hero()])
            .expect("hero joins");
        instance
            .add_party("wild".into(), vec![wolf("w1", 50)])
            .expect("wolf joins");
    }

    assert_eq!(
        h.settlement.handle_combat_end(combat).await,
        SettlementOutcome::NotFinished
    );
    assert_eq!(
        h.settlement.handle_combat_end(CombatId(u64::MAX)).await,
        SettlementOutcome::NotFinished
    );
    assert_eq!(h.settlement.phase(combat), None);
}
