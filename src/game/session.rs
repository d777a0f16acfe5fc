//! # Gate session
//!
//! One game between the player and the built-in opponent, driven as a state
//! machine:
//!
//! ```text
//! Initializing ─┬─> PlayerToMove ──(legal move)──> EngineThinking ─┐
//!               └─> EngineThinking ──(delay)──> PlayerToMove <─────┘
//!   any ──(mate / draw / flag)──> Terminal
//! ```
//!
//! The session never blocks. Everything time-based is a timer task that posts
//! an event back; the owner (see [`crate::game::driver`]) feeds those events
//! into [`Session::handle_timer`] one at a time, so board mutation is fully
//! serialized.

use rand::{Rng, RngCore};
use serde::Serialize;
use shakmaty::{Color, Square};
use std::time::Duration;
use tokio::sync::mpsc;

use super::clock::ClockManager;
use super::timer::{TimerEvent, TimerKind, Timers};
use crate::config::{GameConfig, PlayerColor};
use crate::core::{Board, GameStatus, Move, MoveRecord, MoveRequest, Outcome, Side};
use crate::logic::{RulesEngine, RulesError, ShakmatyRules};
use crate::player::{AlphaBetaAI, PlayerController, RandomAI};

/// Progress never shows more than this before the move is committed.
const PROGRESS_CAP: f64 = 95.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionState {
    Initializing,
    PlayerToMove,
    EngineThinking,
    Terminal,
}

/// Why a submitted move was refused. The session is unchanged in every case.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveRejection {
    #[error("it is not the player's turn")]
    NotPlayersTurn,

    #[error("no piece on {0}")]
    EmptySquare(Square),

    #[error("the piece on {0} is not the player's")]
    WrongColor(Square),

    #[error("illegal move {0}")]
    Illegal(MoveRequest),

    #[error("the game is over")]
    GameOver,

    #[error("the session has shut down")]
    SessionClosed,
}

/// Receives the "objective achieved" notification.
pub trait UnlockGate: Send {
    fn objective_achieved(&mut self);
}

impl<F: FnMut() + Send> UnlockGate for F {
    fn objective_achieved(&mut self) {
        self()
    }
}

/// Identifies the position an engine move was scheduled for.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SearchTag {
    generation: u64,
    fen: String,
}

/// Read-only view of a session, published after every change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub generation: u64,
    pub start_fen: String,
    pub fen: String,
    #[serde(skip)]
    pub board: Board,
    pub player_color: PlayerColor,
    pub status: GameStatus,
    pub winner: Option<Side>,
    pub player_clock: u32,
    pub opponent_clock: u32,
    pub active_clock: Option<Side>,
    /// Cosmetic thinking progress, 0..=100.
    pub progress: u8,
    pub history: Vec<MoveRecord>,
    #[serde(skip)]
    pub last_move: Option<(Square, Square)>,
    pub message: String,
    pub unlocked: bool,
}

pub struct Session<R: RulesEngine + Clone = ShakmatyRules> {
    config: GameConfig,
    rules: R,
    engine: AlphaBetaAI<R>,
    fallback: RandomAI,
    rng: Box<dyn RngCore + Send>,
    gate: Box<dyn UnlockGate>,
    timers: Timers,

    state: SessionState,
    start: Board,
    board: Board,
    player_color: Color,
    history: Vec<MoveRecord>,
    clocks: ClockManager,
    outcome: Option<Outcome>,
    progress: f64,
    last_move: Option<(Square, Square)>,
    generation: u64,
    pending: Option<SearchTag>,
    signal_fired: bool,
}

impl<R: RulesEngine + Clone> Session<R> {
    /// Builds a session in `Initializing`. Call [`Session::initialize`] to
    /// start play.
    pub fn new(
        config: GameConfig,
        rules: R,
        rng: Box<dyn RngCore + Send>,
        gate: Box<dyn UnlockGate>,
        events: mpsc::UnboundedSender<TimerEvent>,
    ) -> Result<Self, RulesError> {
        let start = match &config.start_fen {
            Some(fen) => rules.load(fen)?,
            None => rules.starting_board(),
        };
        let engine = AlphaBetaAI::with_rules(
            "opponent",
            rules.clone(),
            config.engine.depth,
            config.engine.skill,
        );
        Ok(Session {
            player_color: config.player_color.color(),
            clocks: ClockManager::new(config.clock.budget_secs),
            engine,
            fallback: RandomAI::new("fallback"),
            rng,
            gate,
            timers: Timers::new(events),
            state: SessionState::Initializing,
            board: start.clone(),
            start,
            history: Vec::new(),
            outcome: None,
            progress: 0.0,
            last_move: None,
            generation: 0,
            pending: None,
            signal_fired: false,
            rules,
            config,
        })
    }

    // --- Transitions ---

    /// Enters `Initializing`: fresh board, clocks and history, play timers
    /// cancelled, then hands the move to whoever's color is to move.
    ///
    /// A settle delay armed by a previous win keeps running: the signal was
    /// earned and still fires.
    pub fn initialize(&mut self) {
        self.cancel_play_timers();
        self.state = SessionState::Initializing;
        self.generation += 1;
        self.pending = None;
        self.board = self.start.clone();
        self.history.clear();
        self.clocks.reset();
        self.outcome = None;
        self.progress = 0.0;
        self.last_move = None;
        self.signal_fired = false;

        tracing::info!(
            generation = self.generation,
            player = %PlayerColor::from(self.player_color),
            fen = %self.board.fen(),
            "session initialized"
        );

        if let Some(outcome) = self.resolve_terminal() {
            self.finish(outcome);
        } else if self.rules.side_to_move(&self.board) == self.player_color {
            self.enter_player_turn();
        } else {
            self.enter_engine_turn();
        }
    }

    pub fn reset(&mut self) {
        tracing::info!(state = ?self.state, "reset requested");
        self.initialize();
    }

    /// The player takes the other color; the game restarts.
    pub fn switch_sides(&mut self) {
        self.player_color = self.player_color.other();
        tracing::info!(player = %PlayerColor::from(self.player_color), "switching sides");
        self.initialize();
    }

    /// Cancels every timer. No further events will be accepted.
    pub fn shutdown(&mut self) {
        self.timers.cancel_all();
        self.pending = None;
        tracing::debug!(generation = self.generation, "session shut down");
    }

    fn enter_player_turn(&mut self) {
        self.timers.cancel(TimerKind::Thinking);
        self.timers.cancel(TimerKind::Progress);
        self.state = SessionState::PlayerToMove;
        self.start_clock(Side::Player);
    }

    fn enter_engine_turn(&mut self) {
        self.state = SessionState::EngineThinking;
        self.start_clock(Side::Opponent);

        self.progress = 0.0;
        self.timers
            .start_interval(TimerKind::Progress, self.config.timing.progress_interval());

        let delay = self.rng.gen_range(self.config.timing.think_range());
        self.pending = Some(self.current_tag());
        self.timers
            .start_once(TimerKind::Thinking, Duration::from_millis(delay));
        tracing::debug!(delay_ms = delay, "engine thinking");
    }

    fn cancel_play_timers(&mut self) {
        self.timers.cancel(TimerKind::Clock);
        self.timers.cancel(TimerKind::Thinking);
        self.timers.cancel(TimerKind::Progress);
    }

    fn start_clock(&mut self, side: Side) {
        self.clocks.start(side);
        self.timers
            .start_interval(TimerKind::Clock, self.config.timing.tick());
    }

    /// Sets the final result. Later calls are ignored.
    fn finish(&mut self, outcome: Outcome) {
        if self.outcome.is_some() {
            return;
        }
        // A start position that is already over was not won by playing.
        let played = self.state != SessionState::Initializing;
        self.cancel_play_timers();
        self.clocks.stop();
        self.pending = None;
        self.state = SessionState::Terminal;
        self.outcome = Some(outcome);

        tracing::info!(
            status = %outcome.status,
            winner = ?outcome.winner,
            moves = self.history.len(),
            "game over"
        );

        if played && outcome.winner == Some(Side::Player) {
            self.timers
                .start_once(TimerKind::Settle, self.config.timing.settle());
        }
    }

    // --- Player input ---

    /// Applies the player's move. Promotion defaults to a queen.
    pub fn submit_move(&mut self, request: MoveRequest) -> Result<MoveRecord, MoveRejection> {
        match self.state {
            SessionState::PlayerToMove => {}
            SessionState::Terminal => return Err(MoveRejection::GameOver),
            _ => return Err(MoveRejection::NotPlayersTurn),
        }

        let piece = self
            .board
            .piece_at(request.from)
            .ok_or(MoveRejection::EmptySquare(request.from))?;
        if piece.color != self.player_color {
            return Err(MoveRejection::WrongColor(request.from));
        }

        let mv = self
            .rules
            .find_move(&self.board, &request)
            .ok_or(MoveRejection::Illegal(request))?;
        let next = self.rules.apply(&self.board, &mv).map_err(|e| {
            tracing::warn!(error = %e, "legal move failed to apply");
            MoveRejection::Illegal(request)
        })?;

        let record = self.commit(Side::Player, &mv, next);
        tracing::info!(mv = %record.san, "player moved");

        match self.resolve_terminal() {
            Some(outcome) => self.finish(outcome),
            None => self.enter_engine_turn(),
        }
        Ok(record)
    }

    // --- Timer events ---

    pub fn handle_timer(&mut self, event: TimerEvent) {
        if !self.timers.is_live(&event) {
            tracing::trace!(?event, "stale timer event dropped");
            return;
        }

        match event.kind {
            TimerKind::Clock => {
                if let Some(flagged) = self.clocks.tick() {
                    tracing::info!(side = %flagged, "clock ran out");
                    self.finish(Outcome::decisive(GameStatus::Timeout, flagged.other()));
                }
            }
            TimerKind::Progress => {
                let step: f64 = self.rng.gen_range(1.0..6.0);
                self.progress = (self.progress + step).min(PROGRESS_CAP);
            }
            TimerKind::Thinking => {
                self.timers.cancel(TimerKind::Thinking);
                self.play_engine_move();
            }
            TimerKind::Settle => {
                self.timers.cancel(TimerKind::Settle);
                if !self.signal_fired {
                    self.signal_fired = true;
                    tracing::info!("objective achieved");
                    self.gate.objective_achieved();
                }
            }
        }
    }

    fn current_tag(&self) -> SearchTag {
        SearchTag {
            generation: self.generation,
            fen: self.board.fen(),
        }
    }

    /// Searches, selects and applies the opponent's move.
    fn play_engine_move(&mut self) {
        let tag = self.pending.take();
        if self.state != SessionState::EngineThinking || tag.as_ref() != Some(&self.current_tag())
        {
            tracing::debug!(?tag, "discarding engine move for a position no longer current");
            return;
        }

        let legal = self.rules.legal_moves(&self.board);
        let chosen = self
            .engine
            .choose_move(&self.board, &legal, &mut self.rng)
            .and_then(|mv| match self.rules.apply(&self.board, &mv) {
                Ok(next) => Some((mv, next)),
                Err(e) => {
                    tracing::warn!(error = %e, "engine move failed, falling back");
                    None
                }
            });

        let chosen = chosen.or_else(|| {
            let mv = self
                .fallback
                .choose_move(&self.board, &legal, &mut self.rng)?;
            let next = self.rules.apply(&self.board, &mv).ok()?;
            tracing::warn!(mv = %mv, "playing random fallback move");
            Some((mv, next))
        });

        let Some((mv, next)) = chosen else {
            tracing::error!(fen = %self.board.fen(), "no engine move could be applied");
            if let Some(outcome) = self.resolve_terminal() {
                self.finish(outcome);
            } else {
                self.enter_engine_turn();
            }
            return;
        };

        self.timers.cancel(TimerKind::Progress);
        self.progress = 100.0;
        let record = self.commit(Side::Opponent, &mv, next);
        tracing::info!(mv = %record.san, "opponent moved");

        match self.resolve_terminal() {
            Some(outcome) => self.finish(outcome),
            None => self.enter_player_turn(),
        }
    }

    fn commit(&mut self, side: Side, mv: &Move, next: Board) -> MoveRecord {
        let record = MoveRecord {
            side,
            uci: mv.uci(),
            san: self.board.san_plus(mv),
            fen_after: self.rules.serialize(&next),
        };
        self.board = next;
        self.history.push(record.clone());
        self.last_move = Some((mv.from, mv.to));
        self.clocks.stop();
        record
    }

    /// Status of the current board, or `None` while play continues.
    fn resolve_terminal(&self) -> Option<Outcome> {
        let board = &self.board;
        if self.rules.is_checkmate(board) {
            let loser = if self.rules.side_to_move(board) == self.player_color {
                Side::Player
            } else {
                Side::Opponent
            };
            return Some(Outcome::decisive(GameStatus::Checkmate, loser.other()));
        }
        let status = if self.rules.is_stalemate(board) {
            GameStatus::Stalemate
        } else if self.rules.is_threefold_repetition(board) {
            GameStatus::DrawByRepetition
        } else if self.rules.is_insufficient_material(board) {
            GameStatus::InsufficientMaterial
        } else if self.rules.is_draw(board) {
            GameStatus::Draw
        } else {
            return None;
        };
        Some(Outcome::drawn(status))
    }

    // --- Queries ---

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn history(&self) -> &[MoveRecord] {
        &self.history
    }

    pub fn status(&self) -> GameStatus {
        self.outcome.map(|o| o.status).unwrap_or_default()
    }

    pub fn winner(&self) -> Option<Side> {
        self.outcome.and_then(|o| o.winner)
    }

    pub fn clocks(&self) -> &ClockManager {
        &self.clocks
    }

    pub fn player_color(&self) -> Color {
        self.player_color
    }

    pub fn last_move(&self) -> Option<(Square, Square)> {
        self.last_move
    }

    pub fn progress(&self) -> u8 {
        self.progress.round() as u8
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn status_message(&self) -> String {
        if let Some(outcome) = self.outcome {
            return match (outcome.status, outcome.winner) {
                (GameStatus::Checkmate, Some(Side::Player)) => "Checkmate! You win!".to_string(),
                (GameStatus::Checkmate, _) => "Checkmate! The engine wins.".to_string(),
                (GameStatus::Timeout, Some(Side::Player)) => {
                    "The engine ran out of time. You win!".to_string()
                }
                (GameStatus::Timeout, _) => "You ran out of time. The engine wins.".to_string(),
                (GameStatus::Stalemate, _) => "Game drawn by stalemate.".to_string(),
                (GameStatus::DrawByRepetition, _) => "Game drawn by repetition.".to_string(),
                (GameStatus::InsufficientMaterial, _) => {
                    "Game drawn by insufficient material.".to_string()
                }
                (status, _) => format!("Game over: {status}."),
            };
        }
        match self.state {
            SessionState::Initializing => "Setting up the board...".to_string(),
            SessionState::EngineThinking => "Engine is thinking...".to_string(),
            SessionState::PlayerToMove if self.board.is_check() => {
                "Check! Your move.".to_string()
            }
            SessionState::PlayerToMove => "Your move.".to_string(),
            SessionState::Terminal => "Game over.".to_string(),
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state,
            generation: self.generation,
            start_fen: self.rules.serialize(&self.start),
            fen: self.rules.serialize(&self.board),
            board: self.board.clone(),
            player_color: PlayerColor::from(self.player_color),
            status: self.status(),
            winner: self.winner(),
            player_clock: self.clocks.remaining(Side::Player),
            opponent_clock: self.clocks.remaining(Side::Opponent),
            active_clock: self.clocks.active(),
            progress: self.progress(),
            history: self.history.clone(),
            last_move: self.last_move,
            message: self.status_message(),
            unlocked: self.signal_fired,
        }
    }
}
