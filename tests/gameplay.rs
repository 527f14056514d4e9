use std::time::Duration;
use termtris::bag::Bag;
use termtris::board::{Board, Cell};
use termtris::game::{EngineConfig, GameEngine, GameEvent, Intent, Phase};
use termtris::settings::Settings;
use termtris::tetromino::PieceKind;

fn instant_clear() -> EngineConfig {
    EngineConfig {
        clear_step: Duration::ZERO,
        ..EngineConfig::default()
    }
}

/// Bottom four rows full except column 5, where a vertical I lands
fn tetris_well() -> Board {
    let mut board = Board::new();
    for row in 16..20 {
        for col in 0..10 {
            if col != 5 {
                board.set(row, col, Cell::Filled(PieceKind::Z));
            }
        }
    }
    board
}

#[test]
fn four_row_clear_scores_with_bonus() {
    let bag = Bag::with_queue(&[PieceKind::I, PieceKind::T], 0);
    let mut engine = GameEngine::with_parts(instant_clear(), tetris_well(), bag);

    assert!(engine.apply_intent(Intent::RotateCW));
    assert!(engine.apply_intent(Intent::HardDrop));

    let status = engine.game_state();
    // 16 rows of hard drop plus 4 * 150 + 500
    assert_eq!(status.score, 16 + 1100);
    assert_eq!(status.lines_cleared, 4);
    assert_eq!(status.message, Some("Tetris! + 500"));
    assert!(engine.board().is_empty());
    assert!(engine.drain_events().contains(&GameEvent::LinesCleared {
        rows: 4,
        points: 1100
    }));
}

#[test]
fn clear_animation_runs_before_scoring() {
    let bag = Bag::with_queue(&[PieceKind::I, PieceKind::T], 0);
    let mut engine = GameEngine::with_parts(EngineConfig::default(), tetris_well(), bag);

    engine.apply_intent(Intent::RotateCW);
    engine.apply_intent(Intent::HardDrop);
    assert_eq!(engine.phase(), Phase::RowClearing);
    assert_eq!(engine.game_state().lines_cleared, 0);
    assert!(engine.active().is_none());

    // movement during the animation waits for the next piece
    assert!(engine.apply_intent(Intent::Left));

    // center-out over 10 columns: 6 steps of 30ms
    engine.tick(Duration::from_millis(90));
    assert_eq!(engine.phase(), Phase::RowClearing);
    engine.tick(Duration::from_millis(90));
    assert_eq!(engine.phase(), Phase::Falling);
    assert_eq!(engine.game_state().lines_cleared, 4);

    let piece = engine.active().expect("next piece");
    assert_eq!(piece.kind, PieceKind::T);
    assert_eq!(piece.origin(), (3, 0));
}

#[test]
fn every_seven_spawns_are_a_full_set() {
    let board = Board::with_size(10, 120);
    let mut engine = GameEngine::with_parts(EngineConfig::default(), board, Bag::with_seed(42));

    for _ in 0..13 {
        engine.apply_intent(Intent::HardDrop);
    }
    let spawned: Vec<PieceKind> = engine
        .drain_events()
        .into_iter()
        .filter_map(|event| match event {
            GameEvent::Spawned(kind) => Some(kind),
            _ => None,
        })
        .collect();
    assert_eq!(spawned.len(), 14);

    for cycle in spawned.chunks(7) {
        let mut kinds = cycle.to_vec();
        kinds.sort();
        assert_eq!(kinds, PieceKind::ALL.to_vec());
    }
}

#[test]
fn gravity_alone_tops_out_the_stack() {
    let mut engine = GameEngine::with_seed(instant_clear(), 9);
    for _ in 0..5000 {
        engine.tick(Duration::from_millis(100));
        if engine.phase() == Phase::GameOver {
            break;
        }
    }
    assert_eq!(engine.phase(), Phase::GameOver);
    assert!(engine.active().is_none());
    assert!(
        engine
            .drain_events()
            .iter()
            .any(|event| matches!(event, GameEvent::GameOver { .. }))
    );

    // nothing moves after game over, but restart starts a fresh round
    assert!(!engine.apply_intent(Intent::Left));
    assert!(engine.apply_intent(Intent::Restart));
    assert_eq!(engine.phase(), Phase::Falling);
    assert!(engine.board().is_empty());
    assert_eq!(engine.game_state().score, 0);
}

#[test]
fn paused_game_ignores_time_and_movement() {
    let mut engine = GameEngine::with_seed(EngineConfig::default(), 5);
    let before = engine.active().expect("piece").origin();

    engine.apply_intent(Intent::Pause);
    engine.tick(Duration::from_secs(10));
    assert!(!engine.apply_intent(Intent::Right));
    assert_eq!(engine.active().expect("piece").origin(), before);

    engine.apply_intent(Intent::Pause);
    engine.tick(Duration::from_millis(800));
    assert_eq!(engine.active().expect("piece").origin(), (before.0, before.1 + 1));
}

#[test]
fn snapshot_shows_piece_and_ghost() {
    let bag = Bag::with_queue(&[PieceKind::O, PieceKind::I], 0);
    let engine = GameEngine::with_parts(EngineConfig::default(), Board::with_size(4, 4), bag);
    assert_eq!(engine.snapshot().to_text(), ".OO.\n.OO.\n.::.\n.::.\n");
}

#[test]
fn settings_flow_into_engine() {
    let settings: Settings = toml::from_str(
        r#"
        [visual]
        show_ghost = false

        [gameplay]
        min_fall_interval_ms = 250
        "#,
    )
    .expect("parse");
    let engine = GameEngine::with_seed(settings.engine_config(20), 1);

    assert!(!engine.config().show_ghost);
    assert_eq!(engine.game_state().level, 20);
    // 0.8 * 0.9^20 is about 97ms, below the configured floor
    assert_eq!(engine.fall_interval(), Duration::from_millis(250));
    assert!(
        engine
            .snapshot()
            .rows()
            .flatten()
            .all(|cell| !matches!(cell, termtris::SnapshotCell::Ghost(_)))
    );
}
