//! Skill-based move selection.
//!
//! The search always finds its best move; the selector decides whether to
//! play it. One uniform sample is drawn per engine move. When it exceeds the
//! skill factor, a different move is played instead.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::core::Move;

/// Skill at or below which the best move is always overridden.
const SKILL_FLOOR: f64 = 1400.0;
/// Width of the band over which the override probability falls to zero.
const SKILL_SPAN: f64 = 1000.0;

/// Probability of keeping the best move, in `[0, 1]`.
pub fn skill_factor(skill: u16) -> f64 {
    ((f64::from(skill) - SKILL_FLOOR) / SKILL_SPAN).clamp(0.0, 1.0)
}

/// Returns `best`, or with probability `1 - skill_factor(skill)` a uniform
/// pick among the candidates that do not travel between the same squares
/// as `best`.
pub fn select_move<G: Rng + ?Sized>(
    best: &Move,
    candidates: &[Move],
    skill: u16,
    rng: &mut G,
) -> Move {
    let sample: f64 = rng.gen();
    if sample > skill_factor(skill) && candidates.len() > 1 {
        let others: Vec<&Move> = candidates
            .iter()
            .filter(|m| !m.same_squares(best))
            .collect();
        if let Some(pick) = others.choose(rng) {
            tracing::debug!(best = %best, played = %pick, sample, "skill override");
            return (*pick).clone();
        }
    }
    best.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::{RulesEngine, ShakmatyRules};
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn start_moves() -> Vec<Move> {
        let rules = ShakmatyRules::new();
        rules.legal_moves(&rules.starting_board())
    }

    #[test]
    fn test_skill_factor() {
        assert_eq!(skill_factor(0), 0.0);
        assert_eq!(skill_factor(1400), 0.0);
        assert_eq!(skill_factor(1900), 0.5);
        assert_eq!(skill_factor(2400), 1.0);
        assert_eq!(skill_factor(3000), 1.0);
    }

    #[test]
    fn test_max_skill_always_best() {
        let moves = start_moves();
        let best = moves[7].clone();
        // Largest possible sample.
        let mut rng = StepRng::new(u64::MAX, 0);
        for _ in 0..10 {
            assert_eq!(select_move(&best, &moves, 3000, &mut rng), best);
        }
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..500 {
            assert_eq!(select_move(&best, &moves, 3000, &mut rng), best);
        }
    }

    #[test]
    fn test_single_candidate_is_kept() {
        let moves = start_moves();
        let best = moves[0].clone();
        let only = vec![best.clone()];
        let mut rng = StepRng::new(u64::MAX, 0);
        assert_eq!(select_move(&best, &only, 0, &mut rng), best);
    }

    #[test]
    fn test_zero_skill_avoids_best() {
        let moves = start_moves();
        let best = moves[0].clone();
        let mut rng = StdRng::seed_from_u64(42);
        let mut best_count = 0;
        let mut seen = std::collections::HashSet::new();
        for _ in 0..2000 {
            let mv = select_move(&best, &moves, 0, &mut rng);
            if mv == best {
                best_count += 1;
            }
            seen.insert(mv.uci());
        }
        // Far below the 1/20 uniform baseline, never 100%.
        assert!(best_count < 100, "best picked {best_count} times");
        assert_eq!(seen.len(), moves.len() - 1);
    }

    #[test]
    fn test_mid_skill_mixes() {
        let moves = start_moves();
        let best = moves[3].clone();
        let mut rng = StdRng::seed_from_u64(7);
        let trials = 2000;
        let best_count = (0..trials)
            .filter(|_| select_move(&best, &moves, 1900, &mut rng) == best)
            .count();
        assert!(
            (800..1200).contains(&best_count),
            "best picked {best_count} of {trials}"
        );
    }
}
