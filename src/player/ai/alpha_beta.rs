use super::eval::{self, piece_val};
use super::selector;
use crate::core::{Board, Move};
use crate::logic::{RulesEngine, ShakmatyRules};
use crate::player::PlayerController;

use rand::RngCore;
use shakmaty::Color;
use std::cell::Cell;
use std::cmp::Reverse;

/// Score of a mated side, before the distance bonus.
pub const MATE_SCORE: i32 = 1_000_000;
/// Larger than any reachable score.
const INF: i32 = i32::MAX / 2;

/// Outcome of a root search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub best_move: Move,
    /// White's point of view.
    pub score: i32,
    pub nodes: u64,
}

/// Fixed-depth minimax with alpha-beta pruning.
///
/// Scores are always from White's point of view: White maximizes, Black
/// minimizes. Every child is a fresh board returned by the rules engine; the
/// parent is never touched.
pub struct AlphaBetaAI<R: RulesEngine = ShakmatyRules> {
    name: String,
    rules: R,
    depth: u8,
    skill: u16,
    nodes_evaluated: Cell<u64>,
}

impl AlphaBetaAI<ShakmatyRules> {
    pub fn new(name: &str, depth: u8, skill: u16) -> Self {
        Self::with_rules(name, ShakmatyRules::new(), depth, skill)
    }
}

impl<R: RulesEngine> AlphaBetaAI<R> {
    pub fn with_rules(name: &str, rules: R, depth: u8, skill: u16) -> Self {
        Self {
            name: name.to_string(),
            rules,
            depth,
            skill,
            nodes_evaluated: Cell::new(0),
        }
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    pub fn skill(&self) -> u16 {
        self.skill
    }

    /// Nodes visited by the last search.
    pub fn nodes(&self) -> u64 {
        self.nodes_evaluated.get()
    }

    // --- Search Root ---

    /// Best move for the side to move at the configured depth.
    ///
    /// Ties go to the first move in search order. Candidates the rules engine
    /// refuses to apply are skipped. `None` when nothing could be searched.
    pub fn find_best_move(&self, board: &Board) -> Option<SearchResult> {
        self.nodes_evaluated.set(0);

        let maximizing = self.rules.side_to_move(board) == Color::White;
        let mut moves = self.rules.legal_moves(board);
        order_moves(&mut moves);

        let mut alpha = -INF;
        let mut beta = INF;
        let mut best: Option<(Move, i32)> = None;

        for mv in moves {
            let child = match self.rules.apply(board, &mv) {
                Ok(child) => child,
                Err(e) => {
                    tracing::warn!(error = %e, "skipping root candidate");
                    continue;
                }
            };
            let score = self.minimax(
                &child,
                self.depth.saturating_sub(1),
                alpha,
                beta,
                !maximizing,
            );

            let improves = match &best {
                None => true,
                Some((_, best_score)) if maximizing => score > *best_score,
                Some((_, best_score)) => score < *best_score,
            };
            if improves {
                best = Some((mv, score));
                if maximizing {
                    alpha = alpha.max(score);
                } else {
                    beta = beta.min(score);
                }
            }
        }

        let nodes = self.nodes();
        best.map(|(best_move, score)| {
            tracing::debug!(
                mv = %best_move,
                score,
                nodes,
                depth = self.depth,
                "search finished"
            );
            SearchResult {
                best_move,
                score,
                nodes,
            }
        })
    }

    // --- Alpha-Beta Search ---

    /// Value of `board` searched `depth` plies deep within `[alpha, beta]`.
    pub fn minimax(
        &self,
        board: &Board,
        depth: u8,
        mut alpha: i32,
        mut beta: i32,
        maximizing: bool,
    ) -> i32 {
        self.nodes_evaluated.set(self.nodes_evaluated.get() + 1);

        if depth == 0 || self.rules.is_game_over(board) {
            return self.leaf_score(board, depth);
        }

        let mut moves = self.rules.legal_moves(board);
        order_moves(&mut moves);

        let mut best = if maximizing { -INF } else { INF };
        let mut searched = false;

        for mv in moves.iter() {
            let child = match self.rules.apply(board, mv) {
                Ok(child) => child,
                Err(e) => {
                    tracing::warn!(error = %e, "skipping candidate");
                    continue;
                }
            };
            searched = true;
            let score = self.minimax(&child, depth - 1, alpha, beta, !maximizing);

            if maximizing {
                best = best.max(score);
                alpha = alpha.max(score);
            } else {
                best = best.min(score);
                beta = beta.min(score);
            }
            if beta <= alpha {
                break; // Cutoff
            }
        }

        if searched {
            best
        } else {
            self.leaf_score(board, depth)
        }
    }

    /// Static score, with mates overriding material. A mate found with more
    /// plies left to search is closer to the root and scores further out.
    pub(crate) fn leaf_score(&self, board: &Board, depth: u8) -> i32 {
        if self.rules.is_checkmate(board) {
            let mate = MATE_SCORE + i32::from(depth);
            return match self.rules.side_to_move(board) {
                Color::White => -mate,
                Color::Black => mate,
            };
        }
        eval::evaluate(board, Color::White)
    }
}

/// Captures first, most valuable victim first. Stable, so quiet moves keep
/// generation order.
pub fn order_moves(moves: &mut [Move]) {
    moves.sort_by_key(|mv| Reverse(mv.captured.map_or(0, piece_val)));
}

impl<R: RulesEngine> PlayerController for AlphaBetaAI<R> {
    fn choose_move(
        &self,
        board: &Board,
        legal_moves: &[Move],
        rng: &mut dyn RngCore,
    ) -> Option<Move> {
        let result = self.find_best_move(board)?;
        Some(selector::select_move(
            &result.best_move,
            legal_moves,
            self.skill,
            rng,
        ))
    }

    fn name(&self) -> &str {
        &self.name
    }
}
