use chess_gate::config::{GameConfig, PlayerColor};
use chess_gate::core::{GameStatus, MoveRequest, Side};
use chess_gate::game::{spawn_session, MoveRejection, SessionHandle, SessionState};
use chess_gate::logic::ShakmatyRules;
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;
use shakmaty::Square;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
const BLACK_MATES_IN_ONE: &str = "rnbqkbnr/pppp1ppp/8/4p3/6P1/5P2/PPPPP2P/RNBQKBNR b KQkq - 0 2";
const WHITE_MATES_IN_ONE: &str = "k7/8/1K6/8/8/8/8/7R w - - 0 1";

fn start(config: GameConfig) -> (SessionHandle, Arc<AtomicUsize>) {
    let fired = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&fired);
    let handle = spawn_session(
        config,
        ShakmatyRules::new(),
        Box::new(StdRng::seed_from_u64(7)),
        Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }),
    )
    .unwrap();
    (handle, fired)
}

fn mv(uci: &str) -> MoveRequest {
    uci.parse().unwrap()
}

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

#[tokio::test(start_paused = true)]
async fn player_flag_falls_after_exact_budget() {
    let (handle, fired) = start(GameConfig::default());

    sleep(ms(599_500)).await;
    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.status, GameStatus::Ongoing);
    assert_eq!(snap.player_clock, 1);
    assert_eq!(snap.opponent_clock, 600);

    sleep(ms(1_000)).await;
    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.status, GameStatus::Timeout);
    assert_eq!(snap.winner, Some(Side::Opponent));
    assert_eq!(snap.state, SessionState::Terminal);
    assert_eq!(snap.player_clock, 0);
    assert_eq!(snap.active_clock, None);

    sleep(ms(10_000)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 0);
    handle.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn opponent_flag_falls_and_player_wins() {
    let mut config = GameConfig::default();
    config.timing.think_min_ms = 1_000_000;
    config.timing.think_max_ms = 1_000_000;
    let (handle, fired) = start(config);

    handle.submit(mv("e2e4")).await.unwrap();
    sleep(ms(600_500)).await;
    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.status, GameStatus::Timeout);
    assert_eq!(snap.winner, Some(Side::Player));
    assert_eq!(snap.opponent_clock, 0);
    assert_eq!(snap.player_clock, 600);
    assert_eq!(snap.history.len(), 1);

    sleep(ms(1_000)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 0);
    sleep(ms(1_000)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 1);
    handle.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn engine_finds_mate_in_one() {
    let mut config = GameConfig::default();
    config.start_fen = Some(BLACK_MATES_IN_ONE.to_string());
    config.engine.skill = 3000;
    let (handle, fired) = start(config);

    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.state, SessionState::EngineThinking);

    sleep(ms(2_600)).await;
    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.status, GameStatus::Checkmate);
    assert_eq!(snap.winner, Some(Side::Opponent));
    assert_eq!(snap.history.len(), 1);
    assert_eq!(snap.history[0].san, "Qh4#");
    assert_eq!(snap.history[0].side, Side::Opponent);
    assert_eq!(snap.last_move, Some((Square::D8, Square::H4)));
    assert_eq!(snap.message, "Checkmate! The engine wins.");

    sleep(ms(5_000)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 0);
    assert_eq!(
        handle.submit(mv("a2a3")).await,
        Err(MoveRejection::GameOver)
    );
    handle.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn player_mate_fires_signal_once_after_settle() {
    let mut config = GameConfig::default();
    config.start_fen = Some(WHITE_MATES_IN_ONE.to_string());
    let (handle, fired) = start(config);

    let record = handle.submit(mv("h1h8")).await.unwrap();
    assert_eq!(record.san, "Rh8#");

    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.status, GameStatus::Checkmate);
    assert_eq!(snap.winner, Some(Side::Player));
    assert!(!snap.unlocked);

    sleep(ms(1_999)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 0);
    sleep(ms(2)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 1);

    sleep(ms(60_000)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 1);
    assert!(handle.snapshot().await.unwrap().unlocked);
    handle.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn reset_while_thinking_discards_engine_move() {
    let (handle, _) = start(GameConfig::default());

    handle.submit(mv("e2e4")).await.unwrap();
    sleep(ms(500)).await;
    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.state, SessionState::EngineThinking);
    assert!((1..=95).contains(&snap.progress), "progress {}", snap.progress);

    let snap = handle.reset().await.unwrap();
    assert!(snap.history.is_empty());
    assert_eq!(snap.state, SessionState::PlayerToMove);
    assert_eq!(snap.fen, START_FEN);

    sleep(ms(5_000)).await;
    let snap = handle.snapshot().await.unwrap();
    assert!(snap.history.is_empty());
    assert_eq!(snap.state, SessionState::PlayerToMove);
    assert_eq!(snap.fen, START_FEN);
    handle.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn clocks_reset_on_every_initialization() {
    let (handle, _) = start(GameConfig::default());

    handle.submit(mv("e2e4")).await.unwrap();
    sleep(ms(10_000)).await;
    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.history.len(), 2);
    assert_eq!(snap.state, SessionState::PlayerToMove);
    assert!(snap.player_clock < 600);

    let snap = handle.reset().await.unwrap();
    assert_eq!((snap.player_clock, snap.opponent_clock), (600, 600));

    sleep(ms(30_000)).await;
    let snap = handle.switch_sides().await.unwrap();
    assert_eq!((snap.player_clock, snap.opponent_clock), (600, 600));
    assert_eq!(snap.player_color, PlayerColor::Black);
    assert_eq!(snap.state, SessionState::EngineThinking);
    assert_eq!(snap.active_clock, Some(Side::Opponent));

    sleep(ms(3_000)).await;
    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.history.len(), 1);
    assert_eq!(snap.state, SessionState::PlayerToMove);
    handle.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn invalid_moves_are_rejected() {
    let (handle, _) = start(GameConfig::default());
    let before = handle.snapshot().await.unwrap();

    assert_eq!(
        handle.submit(mv("e7e5")).await,
        Err(MoveRejection::WrongColor(Square::E7))
    );
    assert_eq!(
        handle.submit(mv("e4e5")).await,
        Err(MoveRejection::EmptySquare(Square::E4))
    );
    assert_eq!(
        handle.submit(mv("g1g3")).await,
        Err(MoveRejection::Illegal(mv("g1g3")))
    );
    assert_eq!(handle.snapshot().await.unwrap(), before);

    handle.submit(mv("e2e4")).await.unwrap();
    assert_eq!(
        handle.submit(mv("d2d4")).await,
        Err(MoveRejection::NotPlayersTurn)
    );
    handle.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn stalemate_is_a_draw_without_signal() {
    let mut config = GameConfig::default();
    config.start_fen = Some("7k/8/6K1/8/8/8/8/5Q2 w - - 0 1".to_string());
    let (handle, fired) = start(config);

    handle.submit(mv("f1f7")).await.unwrap();
    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.status, GameStatus::Stalemate);
    assert_eq!(snap.winner, None);
    assert_eq!(snap.message, "Game drawn by stalemate.");

    sleep(ms(10_000)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 0);
    handle.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn subscribers_see_updates() {
    let (handle, _) = start(GameConfig::default());
    let mut updates = handle.subscribe();
    updates.borrow_and_update();

    handle.submit(mv("d2d4")).await.unwrap();
    updates.changed().await.unwrap();
    assert_eq!(updates.borrow_and_update().history.len(), 1);

    sleep(ms(3_000)).await;
    assert_eq!(updates.borrow().history.len(), 2);
    handle.shutdown().await.unwrap();
}
