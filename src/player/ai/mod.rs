pub mod alpha_beta;
pub mod eval;
pub mod pst;
pub mod random;
pub mod selector;

pub use alpha_beta::{AlphaBetaAI, SearchResult, MATE_SCORE};
pub use random::RandomAI;
