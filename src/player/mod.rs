pub mod ai;
pub mod controller;

pub use ai::{AlphaBetaAI, RandomAI};
pub use controller::PlayerController;
