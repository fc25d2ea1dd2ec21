use crate::chess::{Position, Role};
use derive_more::{DebugCustom, Display, Error};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// A chess move in [pure coordinate notation].
///
/// [pure coordinate notation]: https://www.chessprogramming.org/Algebraic_Chess_Notation#Pure_coordinate_notation
#[derive(DebugCustom, Copy, Clone, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
#[cfg_attr(test, filter(#self.start != #self.end))]
#[debug(fmt = "Move({self})")]
pub struct Move {
    pub start: Position,
    pub end: Position,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion: Option<Role>,
}

impl Move {
    /// Constructs a [`Move`] without promotion.
    pub fn new(start: Position, end: Position) -> Self {
        Move {
            start,
            end,
            promotion: None,
        }
    }

    /// Constructs a promotion [`Move`].
    pub fn promoting(start: Position, end: Position, role: Role) -> Self {
        Move {
            start,
            end,
            promotion: Some(role),
        }
    }

    /// The source [`Position`].
    pub fn whence(&self) -> Position {
        self.start
    }

    /// The destination [`Position`].
    pub fn whither(&self) -> Position {
        self.end
    }

    /// The kind the moving pawn promotes to, if any.
    pub fn promotion(&self) -> Option<Role> {
        self.promotion
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.start, self.end)?;
        if let Some(r) = self.promotion {
            write!(f, "{r}")?;
        }

        Ok(())
    }
}

/// The reason why the string is not valid move.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error)]
#[display(fmt = "failed to parse move")]
pub struct ParseMoveError;

impl FromStr for Move {
    type Err = ParseMoveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let start = s.get(..2).ok_or(ParseMoveError)?;
        let end = s.get(2..4).ok_or(ParseMoveError)?;

        let start = start.parse().map_err(|_| ParseMoveError)?;
        let end = end.parse().map_err(|_| ParseMoveError)?;

        let promotion = match s.get(4..).ok_or(ParseMoveError)? {
            "" => None,
            r => match r.parse() {
                Ok(r) if Role::PROMOTIONS.contains(&r) => Some(r),
                _ => return Err(ParseMoveError),
            },
        };

        Ok(Move {
            start,
            end,
            promotion,
        })
    }
}
