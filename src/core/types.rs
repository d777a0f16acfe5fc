use serde::{Deserialize, Serialize};
use std::fmt;

/// Participant of a gate session: the human, or the built-in opponent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Player,
    Opponent,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::Player => Side::Opponent,
            Side::Opponent => Side::Player,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Side::Player => write!(f, "player"),
            Side::Opponent => write!(f, "opponent"),
        }
    }
}

/// Game status. Anything other than `Ongoing` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameStatus {
    #[default]
    Ongoing,
    Checkmate,
    Stalemate,
    DrawByRepetition,
    InsufficientMaterial,
    /// Fifty-move rule.
    Draw,
    Timeout,
}

impl GameStatus {
    pub fn is_terminal(self) -> bool {
        self != GameStatus::Ongoing
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let text = match self {
            GameStatus::Ongoing => "ongoing",
            GameStatus::Checkmate => "checkmate",
            GameStatus::Stalemate => "stalemate",
            GameStatus::DrawByRepetition => "draw-by-repetition",
            GameStatus::InsufficientMaterial => "insufficient-material",
            GameStatus::Draw => "draw",
            GameStatus::Timeout => "timeout",
        };
        f.write_str(text)
    }
}

/// Final result of a session, written once together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub status: GameStatus,
    pub winner: Option<Side>,
}

impl Outcome {
    pub fn decisive(status: GameStatus, winner: Side) -> Self {
        Outcome {
            status,
            winner: Some(winner),
        }
    }

    pub fn drawn(status: GameStatus) -> Self {
        Outcome {
            status,
            winner: None,
        }
    }
}
