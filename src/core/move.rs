use serde::{Deserialize, Serialize};
use shakmaty::san::San;
use shakmaty::uci::UciMove;
use shakmaty::{CastlingMode, Chess, Role, Square};
use std::fmt;
use std::str::FromStr;

use super::types::Side;

/// A legal move as produced by move generation.
///
/// `from`/`to` use king-to-destination coordinates for castling, the same
/// squares a player would drag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<Role>,
    pub captured: Option<Role>,
    pub san: String,
    pub(crate) raw: shakmaty::Move,
}

impl Move {
    /// Describes `raw`, which must be legal in `position`. Drops (`Put`) have
    /// no origin square and are not representable.
    pub(crate) fn describe(position: &Chess, raw: shakmaty::Move) -> Option<Self> {
        match raw.to_uci(CastlingMode::Standard) {
            UciMove::Normal {
                from,
                to,
                promotion,
            } => Some(Move {
                from,
                to,
                promotion,
                captured: raw.capture(),
                san: San::from_move(position, &raw).to_string(),
                raw,
            }),
            _ => None,
        }
    }

    pub fn uci(&self) -> String {
        match self.promotion {
            Some(role) => format!("{}{}{}", self.from, self.to, role.char()),
            None => format!("{}{}", self.from, self.to),
        }
    }

    /// Whether both moves travel between the same squares.
    pub fn same_squares(&self, other: &Move) -> bool {
        self.from == other.from && self.to == other.to
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.san)
    }
}

/// A move as requested by the player: origin, destination and an optional
/// promotion piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveRequest {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<Role>,
}

impl MoveRequest {
    pub fn new(from: Square, to: Square) -> Self {
        MoveRequest {
            from,
            to,
            promotion: None,
        }
    }

    pub fn promote_to(mut self, role: Role) -> Self {
        self.promotion = Some(role);
        self
    }
}

impl fmt::Display for MoveRequest {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(role) = self.promotion {
            write!(f, "{}", role.char())?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("expected a move like `e2e4` or `e7e8q`, got {0:?}")]
pub struct ParseMoveError(pub String);

impl FromStr for MoveRequest {
    type Err = ParseMoveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let err = || ParseMoveError(s.to_string());
        if !(4..=5).contains(&s.len()) || !s.is_ascii() {
            return Err(err());
        }
        let from: Square = s[0..2].parse().map_err(|_| err())?;
        let to: Square = s[2..4].parse().map_err(|_| err())?;
        let promotion = match s[4..].chars().next() {
            Some(c) => match Role::from_char(c.to_ascii_lowercase()) {
                Some(role) if role != Role::Pawn && role != Role::King => Some(role),
                _ => return Err(err()),
            },
            None => None,
        };
        Ok(MoveRequest {
            from,
            to,
            promotion,
        })
    }
}

/// One applied half-move. Never changed after it is appended to the history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    pub side: Side,
    pub uci: String,
    pub san: String,
    pub fen_after: String,
}
