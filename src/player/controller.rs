use rand::RngCore;

use crate::core::{Board, Move};

/// Something that picks a move for the side to move.
///
/// Randomness is always supplied by the caller so that a session (or a test)
/// decides which generator drives the choice.
pub trait PlayerController {
    fn choose_move(
        &self,
        board: &Board,
        legal_moves: &[Move],
        rng: &mut dyn RngCore,
    ) -> Option<Move>;

    fn name(&self) -> &str;
}
