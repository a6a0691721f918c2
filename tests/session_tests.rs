//! Game session integration tests.
//!
//! Full loop: open or restore a session, drag cards, settle wins through
//! combat, regenerate, change difficulty and persist through both stores.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use math_idle::arrangement::{ArrangementEvent, DropOutcome, EngineState};
use math_idle::combat::{CombatEvent, EnemyCatalog, EnemySpec, EnemyState};
use math_idle::core::{Card, CardId, ConfigError, GameConfig, Progress, SessionState};
use math_idle::error::GameError;
use math_idle::session::GameSession;
use math_idle::store::{FileSessionStore, MemorySessionStore, SessionStore, StoreFormat};
use math_idle::zones::Point;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn config() -> GameConfig {
    GameConfig::new().with_seed(42).with_settle_delay(Duration::ZERO)
}

fn id(s: &str) -> CardId {
    CardId::from(s)
}

fn center(slot: usize) -> Point {
    Point::new(32.0 + 80.0 * slot as f64, 55.0)
}

fn duck() -> EnemyState {
    EnemyState::new(EnemySpec::new(1, "Duck", 10, 5))
}

/// A stored session with `values` dealt in order and a fresh duck.
fn stored(values: &[i64], number_range: i64, coins: u64) -> SessionState {
    let progress = Progress {
        coins,
        level: 1,
        enemy: Some(duck()),
    };
    SessionState::from_parts(Card::deal(values), values.len(), number_range, progress)
}

async fn open_with(state: SessionState) -> GameSession<Arc<MemorySessionStore>> {
    let store = Arc::new(MemorySessionStore::with_state(state));
    GameSession::open(config(), EnemyCatalog::standard(), store)
        .await
        .unwrap()
}

// =============================================================================
// Lifecycle Tests
// =============================================================================

/// A new session is dealt, given a level-1 enemy and saved; reopening
/// restores it unchanged.
#[tokio::test]
async fn test_open_then_restore() {
    init_tracing();
    let store = Arc::new(MemorySessionStore::new());

    let first = GameSession::open(config(), EnemyCatalog::standard(), store.clone())
        .await
        .unwrap();
    assert_eq!(first.card_count(), 5);
    assert_eq!(first.number_range(), 10);
    assert_eq!(first.enemy().unwrap().enemy_spec.level, 1);
    assert_eq!(store.save_count(), 1);

    let second = GameSession::open(GameConfig::new(), EnemyCatalog::standard(), store.clone())
        .await
        .unwrap();
    assert_eq!(second.engine().cards(), first.engine().cards());
    assert_eq!(second.progress(), first.progress());
    // Nothing to repair, so nothing re-saved.
    assert_eq!(store.save_count(), 1);
}

/// A torn stored arrangement is re-dealt; progression survives.
#[tokio::test]
async fn test_corrupt_arrangement_is_redealt() {
    init_tracing();
    let mut state = stored(&[1, 2, 3], 10, 30);
    state.level = 4;
    state.cards[1].slot_index = 0;

    let session = open_with(state).await;

    assert!(session.engine().check_invariants().is_ok());
    assert_eq!(session.engine().cards().len(), 3);
    assert_eq!(session.coins(), 30);
    assert_eq!(session.level(), 4);
    assert_eq!(session.store().save_count(), 1);
}

/// A stored session without an enemy gets the one for its level.
#[tokio::test]
async fn test_missing_enemy_is_initialized() {
    let mut state = stored(&[4, 1, 7], 10, 0);
    state.enemy = None;
    state.level = 3;

    let session = open_with(state).await;

    assert_eq!(session.enemy().unwrap().enemy_spec.name, "Goblin");
    let saved = session.store().snapshot().unwrap().unwrap();
    assert_eq!(saved.enemy.unwrap().enemy_spec.name, "Goblin");
}

/// New game wipes progression but keeps (or changes) difficulty.
#[tokio::test]
async fn test_new_game_resets_progression() {
    let mut state = stored(&[4, 1, 7], 10, 99);
    state.level = 8;
    let mut session = open_with(state).await;

    assert!(session.new_game(None, Some(100)).await.unwrap());

    assert_eq!(session.coins(), 0);
    assert_eq!(session.level(), 1);
    assert_eq!(session.enemy().unwrap().enemy_spec.name, "Duck");
    assert_eq!(session.card_count(), 3);
    assert_eq!(session.number_range(), 100);
    assert!(session.engine().cards().iter().all(|c| (0..=100).contains(&c.value)));
}

// =============================================================================
// Drag and Win Tests
// =============================================================================

/// Swaps persist immediately.
#[tokio::test]
async fn test_swap_is_saved() {
    let mut session = open_with(stored(&[5, 9, 1, 7], 10, 0)).await;

    session.begin_drag(&id("card-1"), center(0)).unwrap();
    session.update_drag(&id("card-1"), center(1)).unwrap();
    let report = session.end_drag(&id("card-1"), center(1)).await.unwrap();

    assert_eq!(report.drop.outcome, DropOutcome::Swapped { occupant: id("card-2") });
    assert!(!report.is_win());
    assert!(report.saved);

    let saved = session.store().snapshot().unwrap().unwrap();
    assert_eq!(saved.values_in_slot_order(), vec![9, 5, 1, 7]);
    assert!(saved.timestamp.is_some());
}

/// A winning drop damages the enemy and deals new cards, keeping progression.
#[tokio::test]
async fn test_win_damages_and_regenerates() {
    init_tracing();
    let mut session = open_with(stored(&[2, 1, 3], 10, 7)).await;

    let arrangement = Arc::new(Mutex::new(Vec::new()));
    let sink = arrangement.clone();
    session.subscribe_arrangement(move |e: &ArrangementEvent| sink.lock().unwrap().push(e.clone()));

    session.begin_drag(&id("card-2"), center(1)).unwrap();
    let report = session.end_drag(&id("card-2"), center(0)).await.unwrap();

    let win = report.win.clone().unwrap();
    assert_eq!(win.damage, 6);
    assert!(!win.enemy_defeated);
    assert_eq!(win.remaining_health, Some(4));

    assert_eq!(session.coins(), 7);
    assert_eq!(session.level(), 1);
    assert_eq!(session.enemy().unwrap().current_health, 4);

    assert_eq!(session.engine().state(), EngineState::Steady);
    assert_eq!(session.engine().cards().len(), 3);
    assert!(session.engine().cards().iter().all(|c| (0..=10).contains(&c.value)));
    assert!(session.engine().check_invariants().is_ok());

    let events = arrangement.lock().unwrap().clone();
    assert!(matches!(events[0], ArrangementEvent::CardSwapped { .. }));
    assert!(events[1].is_win());
    assert_eq!(events[2], ArrangementEvent::CardsReplaced { card_count: 3 });

    let saved = session.store().snapshot().unwrap().unwrap();
    assert_eq!(saved.enemy.unwrap().current_health, 4);
    assert_eq!(saved.cards.len(), 3);
}

/// Defeating the enemy pays out and brings in the next one.
#[tokio::test]
async fn test_win_defeats_enemy() {
    let mut session = open_with(stored(&[5, 3, 4], 10, 0)).await;

    let combat = Arc::new(Mutex::new(Vec::new()));
    let sink = combat.clone();
    session.subscribe_combat(move |e: &CombatEvent| sink.lock().unwrap().push(e.clone()));

    // 5 to the end: 3, 4, 5 = 12 damage against 10 health.
    let report = session.resolve_drop(&id("card-1"), 2).await.unwrap();
    assert!(matches!(report.drop.outcome, DropOutcome::Swapped { .. }));
    let report = session.resolve_drop(&id("card-2"), 0).await.unwrap();
    let win = report.win.unwrap();

    assert!(win.enemy_defeated);
    assert!(win.level_increased);
    assert_eq!(win.coins_awarded, 5);
    assert_eq!(session.coins(), 5);
    assert_eq!(session.level(), 2);
    assert_eq!(session.enemy().unwrap().enemy_spec.name, "Slime");

    let events = combat.lock().unwrap().clone();
    assert_eq!(events.len(), 3);
    assert!(matches!(events[1], CombatEvent::EnemyDefeated { reward: 5, .. }));
}

/// Drags on cards from before a regeneration are gone afterwards.
#[tokio::test]
async fn test_regeneration_clears_stale_drags() {
    let mut session = open_with(stored(&[1, 3, 2, 4], 10, 0)).await;

    session.begin_drag(&id("card-4"), center(3)).unwrap();
    session.begin_drag(&id("card-2"), center(1)).unwrap();
    let report = session.end_drag(&id("card-2"), center(2)).await.unwrap();
    assert!(report.is_win());

    assert_eq!(session.drag().active_count(), 0);
    assert!(session.cancel_drag(&id("card-4")).await.is_err());
}

/// The settle delay elapses between the win and the new deal.
#[tokio::test(start_paused = true)]
async fn test_settle_delay() {
    let store = Arc::new(MemorySessionStore::with_state(stored(&[2, 1], 10, 0)));
    let cfg = config().with_settle_delay(Duration::from_millis(400));
    let mut session = GameSession::open(cfg, EnemyCatalog::standard(), store)
        .await
        .unwrap();

    let start = tokio::time::Instant::now();
    let report = session.resolve_drop(&id("card-2"), 0).await.unwrap();

    assert!(report.is_win());
    assert!(start.elapsed() >= Duration::from_millis(400));
    assert_eq!(session.engine().state(), EngineState::Steady);
}

/// A deal that came out sorted is settled by an explicit check.
#[tokio::test]
async fn test_check_win_on_sorted_deal() {
    let mut session = open_with(stored(&[1, 2, 2], 10, 0)).await;

    let win = session.check_win().await.unwrap().unwrap();
    assert_eq!(win.damage, 5);
    assert_eq!(session.enemy().unwrap().current_health, 5);
    assert_eq!(session.engine().state(), EngineState::Steady);
}

// =============================================================================
// Difficulty Tests
// =============================================================================

/// 7 cards in [0, 20], no combat, progression untouched.
#[tokio::test]
async fn test_update_difficulty() {
    let mut session = open_with(stored(&[4, 1, 7], 10, 12)).await;
    let combat = Arc::new(Mutex::new(0usize));
    let sink = combat.clone();
    session.subscribe_combat(move |_: &CombatEvent| *sink.lock().unwrap() += 1);

    let before = session.progress().clone();
    assert!(session.update_difficulty(7, 20).await.unwrap());

    assert_eq!(session.engine().cards().len(), 7);
    assert!(session.engine().cards().iter().all(|c| (0..=20).contains(&c.value)));
    assert_eq!(session.progress(), &before);
    assert_eq!(session.engine().state(), EngineState::Steady);
    assert_eq!(session.drag().grid().len(), 7);
    assert_eq!(*combat.lock().unwrap(), 0);

    let saved = session.store().snapshot().unwrap().unwrap();
    assert_eq!((saved.card_count, saved.number_range), (7, 20));
}

#[tokio::test]
async fn test_update_difficulty_rejects_out_of_range() {
    let mut session = open_with(stored(&[4, 1, 7], 10, 0)).await;

    let err = session.update_difficulty(11, 10).await.unwrap_err();
    assert!(matches!(
        err,
        GameError::Config(ConfigError::CardCountOutOfRange { card_count: 11, .. })
    ));
    let err = session.update_difficulty(5, 20_000).await.unwrap_err();
    assert!(matches!(err, GameError::Config(ConfigError::NumberRangeOutOfRange { .. })));

    assert_eq!(session.card_count(), 3);
}

// =============================================================================
// Persistence Tests
// =============================================================================

/// Save failures are reported, not raised; memory stays authoritative.
#[tokio::test]
async fn test_save_failure_is_not_fatal() {
    init_tracing();
    let mut session = open_with(stored(&[5, 9, 1], 10, 0)).await;
    session.store().set_fail_saves(true);

    let report = session.resolve_drop(&id("card-1"), 1).await.unwrap();
    assert!(!report.saved);
    assert_eq!(session.engine().values_in_slot_order().as_slice(), &[9, 5, 1]);
    assert!(!session.add_coins(3).await);
    assert_eq!(session.coins(), 3);
    assert!(session.save().await.is_err());

    session.store().set_fail_saves(false);
    assert!(session.set_level(6).await);
    let saved = session.store().snapshot().unwrap().unwrap();
    assert_eq!(saved.values_in_slot_order(), vec![9, 5, 1]);
    assert_eq!((saved.coins, saved.level), (3, 6));
}

/// Both on-disk formats survive a reopen.
#[tokio::test]
async fn test_file_store_reopen() {
    let dir = tempfile::tempdir().unwrap();

    for format in [StoreFormat::Json, StoreFormat::Bincode] {
        let key = format!("{format:?}");
        let store = FileSessionStore::open(dir.path(), key.as_str(), format).await.unwrap();
        store.save(&stored(&[6, 2, 1], 10, 1)).await.unwrap();

        let mut session = GameSession::open(config(), EnemyCatalog::standard(), store.clone())
            .await
            .unwrap();
        session.resolve_drop(&id("card-2"), 0).await.unwrap();

        let reopened = GameSession::open(config(), EnemyCatalog::standard(), store)
            .await
            .unwrap();
        assert_eq!(reopened.engine().values_in_slot_order().as_slice(), &[2, 6, 1]);
        assert_eq!(reopened.coins(), 1);
    }
}

/// An unreadable save file starts a fresh session instead of failing.
#[tokio::test]
async fn test_unreadable_file_starts_fresh() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileSessionStore::open(dir.path(), "game", StoreFormat::Json).await.unwrap();
    std::fs::write(store.path(), b"{ truncated").unwrap();

    let session = GameSession::open(config(), EnemyCatalog::standard(), store.clone())
        .await
        .unwrap();
    assert_eq!(session.level(), 1);
    assert!(store.load().await.unwrap().is_some());
}

/// A save written by the browser game restores as-is and is not overwritten.
#[tokio::test]
async fn test_browser_save_restores() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let store = FileSessionStore::open(dir.path(), "game", StoreFormat::Json).await.unwrap();
    let browser_save = br#"{
        "cards": [
            {"id": "card-1", "value": 7, "slotIndex": 1, "originalIndex": 0},
            {"id": "card-2", "value": 2, "slotIndex": 0, "originalIndex": 1},
            {"id": "card-3", "value": 1, "slotIndex": 2, "originalIndex": 2}
        ],
        "score": 0,
        "level": 1,
        "cardCount": 3,
        "numberRange": 10,
        "timestamp": 1700000000000,
        "enemy": {
            "enemy": {"level": 1, "name": "Vampire", "imgsrc": "img/enemy/001_vampire.png", "health": 10, "reward": 5},
            "currentHealth": 4
        }
    }"#;
    std::fs::write(store.path(), browser_save).unwrap();

    let session = GameSession::open(config(), EnemyCatalog::standard(), store.clone())
        .await
        .unwrap();

    assert_eq!(session.engine().values_in_slot_order().as_slice(), &[2, 7, 1]);
    assert_eq!(session.coins(), 0);
    let enemy = session.enemy().unwrap();
    assert_eq!(enemy.enemy_spec.name, "Vampire");
    assert_eq!(enemy.current_health, 4);
    assert_eq!(std::fs::read(store.path()).unwrap(), browser_save.to_vec());
}

// =============================================================================
// Task Tests
// =============================================================================

/// Session futures are `Send`, so a session can run on a spawned task.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_session_runs_on_spawned_task() {
    let mut session = open_with(stored(&[6, 2, 1], 10, 0)).await;
    let swaps = Arc::new(Mutex::new(0usize));
    let sink = swaps.clone();
    session.subscribe_arrangement(move |event: &ArrangementEvent| {
        if matches!(event, ArrangementEvent::CardSwapped { .. }) {
            *sink.lock().unwrap() += 1;
        }
    });

    let handle = tokio::spawn(async move {
        session.resolve_drop(&id("card-2"), 0).await.unwrap();
        assert!(session.update_difficulty(3, 20).await.unwrap());
        session.save().await.unwrap();
        session
    });
    let session = handle.await.unwrap();

    assert_eq!(*swaps.lock().unwrap(), 1);
    assert_eq!(session.number_range(), 20);
    let saved = session.store().snapshot().unwrap().unwrap();
    assert_eq!(saved.number_range, 20);
}
