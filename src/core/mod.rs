pub mod board;
pub mod r#move;
pub mod types;

pub use board::Board;
pub use r#move::{Move, MoveRecord, MoveRequest, ParseMoveError};
pub use types::{GameStatus, Outcome, Side};
