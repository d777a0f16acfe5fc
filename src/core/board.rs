use shakmaty::fen::Fen;
use shakmaty::san::SanPlus;
use shakmaty::zobrist::{Zobrist64, ZobristHash};
use shakmaty::{Chess, Color, EnPassantMode, Piece, Position, Square};

use super::Move;

/// Board snapshot handed around by the session and the search.
///
/// Wraps the rules engine position together with the keys of every position
/// reached since the last irreversible move, so repetition can be detected
/// without any shared history. Children are always produced by cloning; a
/// board is never mutated after construction.
#[derive(Debug, Clone)]
pub struct Board {
    position: Chess,
    /// Position keys since the last capture or pawn move, current included.
    seen: Vec<Zobrist64>,
}

impl Board {
    pub fn starting() -> Self {
        Self::from_position(Chess::default())
    }

    pub(crate) fn from_position(position: Chess) -> Self {
        let key = position.zobrist_hash::<Zobrist64>(EnPassantMode::Legal);
        Board {
            position,
            seen: vec![key],
        }
    }

    /// Builds the successor board after `next` was reached from `self`.
    pub(crate) fn advance(&self, next: Chess) -> Self {
        let key = next.zobrist_hash::<Zobrist64>(EnPassantMode::Legal);
        // Positions before a capture or pawn move can never repeat.
        let mut seen = if next.halfmoves() == 0 {
            Vec::new()
        } else {
            self.seen.clone()
        };
        seen.push(key);
        Board {
            position: next,
            seen,
        }
    }

    pub fn position(&self) -> &Chess {
        &self.position
    }

    pub fn turn(&self) -> Color {
        self.position.turn()
    }

    /// Whether the side to move is in check.
    pub fn is_check(&self) -> bool {
        self.position.is_check()
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.position.board().piece_at(square)
    }

    /// All occupied squares with their pieces.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        let board = self.position.board();
        board
            .occupied()
            .into_iter()
            .filter_map(move |sq| board.piece_at(sq).map(|piece| (sq, piece)))
    }

    pub fn fen(&self) -> String {
        Fen::from_position(self.position.clone(), EnPassantMode::Legal).to_string()
    }

    /// How many times the current position has occurred.
    pub fn repetitions(&self) -> usize {
        match self.seen.last() {
            Some(current) => self.seen.iter().filter(|&key| key == current).count(),
            None => 0,
        }
    }

    /// Notation of `mv` with check and mate suffixes.
    pub fn san_plus(&self, mv: &Move) -> String {
        SanPlus::from_move(self.position.clone(), &mv.raw).to_string()
    }
}

impl PartialEq for Board {
    fn eq(&self, other: &Self) -> bool {
        self.fen() == other.fen() && self.seen == other.seen
    }
}
