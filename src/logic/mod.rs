//! Rules engine boundary.
//!
//! Everything the gate needs to know about chess legality is asked through
//! [`RulesEngine`]. The search, the selector and the session never inspect
//! move legality themselves. [`ShakmatyRules`] is the production
//! implementation on top of `shakmaty`.

use shakmaty::fen::Fen;
use shakmaty::{CastlingMode, Chess, Color, Position, Role};

use crate::core::{Board, Move, MoveRequest};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RulesError {
    #[error("illegal move {uci} in position {fen}")]
    IllegalMove { uci: String, fen: String },

    #[error("invalid position string {fen:?}: {reason}")]
    InvalidFen { fen: String, reason: String },
}

/// Queries and mutations consumed from the rules engine.
///
/// `apply` never mutates its input; it returns the successor board.
pub trait RulesEngine {
    fn side_to_move(&self, board: &Board) -> Color;

    /// Verbose legal moves: capture, promotion and notation included.
    fn legal_moves(&self, board: &Board) -> Vec<Move>;

    fn apply(&self, board: &Board, mv: &Move) -> Result<Board, RulesError>;

    fn is_checkmate(&self, board: &Board) -> bool;
    fn is_stalemate(&self, board: &Board) -> bool;
    fn is_threefold_repetition(&self, board: &Board) -> bool;
    fn is_insufficient_material(&self, board: &Board) -> bool;

    /// Any drawn position: stalemate, repetition, insufficient material or
    /// the fifty-move rule.
    fn is_draw(&self, board: &Board) -> bool;

    fn is_game_over(&self, board: &Board) -> bool {
        self.is_checkmate(board) || self.is_draw(board)
    }

    fn serialize(&self, board: &Board) -> String;
    fn load(&self, fen: &str) -> Result<Board, RulesError>;

    fn starting_board(&self) -> Board {
        Board::starting()
    }

    /// Resolves a player's request to a legal move. When the move needs a
    /// promotion and none was requested, the queen is chosen.
    fn find_move(&self, board: &Board, request: &MoveRequest) -> Option<Move> {
        let candidates: Vec<Move> = self
            .legal_moves(board)
            .into_iter()
            .filter(|m| m.from == request.from && m.to == request.to)
            .collect();
        if candidates.iter().any(|m| m.promotion.is_some()) {
            let wanted = request.promotion.unwrap_or(Role::Queen);
            candidates
                .into_iter()
                .find(|m| m.promotion == Some(wanted))
        } else {
            candidates.into_iter().next()
        }
    }
}

/// Standard chess rules backed by `shakmaty`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShakmatyRules;

impl ShakmatyRules {
    /// Half-moves without capture or pawn move after which the game is drawn.
    const FIFTY_MOVE_PLIES: u32 = 100;

    pub fn new() -> Self {
        ShakmatyRules
    }

    fn is_fifty_move_draw(&self, board: &Board) -> bool {
        board.position().halfmoves() >= Self::FIFTY_MOVE_PLIES
    }
}

impl RulesEngine for ShakmatyRules {
    fn side_to_move(&self, board: &Board) -> Color {
        board.turn()
    }

    fn legal_moves(&self, board: &Board) -> Vec<Move> {
        let position = board.position();
        position
            .legal_moves()
            .into_iter()
            .filter_map(|raw| Move::describe(position, raw))
            .collect()
    }

    fn apply(&self, board: &Board, mv: &Move) -> Result<Board, RulesError> {
        match board.position().clone().play(&mv.raw) {
            Ok(next) => Ok(board.advance(next)),
            Err(_) => Err(RulesError::IllegalMove {
                uci: mv.uci(),
                fen: board.fen(),
            }),
        }
    }

    fn is_checkmate(&self, board: &Board) -> bool {
        board.position().is_checkmate()
    }

    fn is_stalemate(&self, board: &Board) -> bool {
        board.position().is_stalemate()
    }

    fn is_threefold_repetition(&self, board: &Board) -> bool {
        board.repetitions() >= 3
    }

    fn is_insufficient_material(&self, board: &Board) -> bool {
        board.position().is_insufficient_material()
    }

    fn is_draw(&self, board: &Board) -> bool {
        self.is_stalemate(board)
            || self.is_threefold_repetition(board)
            || self.is_insufficient_material(board)
            || self.is_fifty_move_draw(board)
    }

    fn serialize(&self, board: &Board) -> String {
        board.fen()
    }

    fn load(&self, fen: &str) -> Result<Board, RulesError> {
        let invalid = |reason: String| RulesError::InvalidFen {
            fen: fen.to_string(),
            reason,
        };
        let setup: Fen = fen.trim().parse().map_err(|e| invalid(format!("{e}")))?;
        let position: Chess = setup
            .into_position(CastlingMode::Standard)
            .map_err(|e| invalid(format!("{e}")))?;
        Ok(Board::from_position(position))
    }
}
