//! # Evaluation Module
//!
//! Static evaluation of a board from a chosen perspective.
//!
//! ## Scoring Strategy
//! Every occupied square contributes `material + piece-square bonus`, added
//! when the piece belongs to the perspective color and subtracted otherwise.
//! The result is therefore antisymmetric: looking from the other side flips
//! the sign.
//!
//! ## Values
//! Centipawns. The king's value is large but finite so that it never
//! overflows sums while still dwarfing every other term.

use shakmaty::{Color, Role};

use crate::core::Board;
use crate::player::ai::pst::get_pst_value;

const VAL_PAWN: i32 = 100;
const VAL_KNIGHT: i32 = 320;
const VAL_BISHOP: i32 = 330;
const VAL_ROOK: i32 = 500;
const VAL_QUEEN: i32 = 900;
const VAL_KING: i32 = 20000;

/// Returns the static material value of a piece kind.
pub fn piece_val(role: Role) -> i32 {
    match role {
        Role::Pawn => VAL_PAWN,
        Role::Knight => VAL_KNIGHT,
        Role::Bishop => VAL_BISHOP,
        Role::Rook => VAL_ROOK,
        Role::Queen => VAL_QUEEN,
        Role::King => VAL_KING,
    }
}

/// Evaluates `board` from `perspective`'s point of view.
///
/// Positive means `perspective` is better. Pure: the same board always gets
/// the same score.
pub fn evaluate(board: &Board, perspective: Color) -> i32 {
    board
        .pieces()
        .map(|(square, piece)| {
            let value = piece_val(piece.role) + get_pst_value(piece.role, square, piece.color);
            if piece.color == perspective {
                value
            } else {
                -value
            }
        })
        .sum()
}
