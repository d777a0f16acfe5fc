use crate::core::{Board, Move};
use crate::player::PlayerController;
use rand::seq::SliceRandom;
use rand::RngCore;

/// Uniform choice among the legal moves. Used as the fallback when the
/// engine's move cannot be applied.
pub struct RandomAI {
    pub name: String,
}

impl RandomAI {
    pub fn new(name: &str) -> Self {
        RandomAI {
            name: name.to_string(),
        }
    }
}

impl PlayerController for RandomAI {
    fn name(&self) -> &str {
        &self.name
    }

    fn choose_move(
        &self,
        _board: &Board,
        legal_moves: &[Move],
        rng: &mut dyn RngCore,
    ) -> Option<Move> {
        legal_moves.choose(rng).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::{RulesEngine, ShakmatyRules};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_picks_a_legal_move() {
        let rules = ShakmatyRules::new();
        let board = rules.starting_board();
        let moves = rules.legal_moves(&board);
        let ai = RandomAI::new("fallback");
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..20 {
            let mv = ai.choose_move(&board, &moves, &mut rng).unwrap();
            assert!(moves.contains(&mv));
        }
    }

    #[test]
    fn test_no_moves() {
        let rules = ShakmatyRules::new();
        let board = rules.starting_board();
        let ai = RandomAI::new("fallback");
        let mut rng = StdRng::seed_from_u64(3);
        assert!(ai.choose_move(&board, &[], &mut rng).is_none());
    }
}
