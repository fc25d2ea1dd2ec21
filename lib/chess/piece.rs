use crate::chess::{Color, ParseRoleError, Role};
use derive_more::Constructor;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter, Write};

/// A chess [piece][`Role`] of a certain [`Color`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Constructor, Deserialize, Serialize)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
pub struct Piece {
    pub color: Color,
    #[serde(rename = "kind")]
    pub role: Role,
}

impl Piece {
    /// This piece's [`Color`].
    pub fn color(&self) -> Color {
        self.color
    }

    /// This piece's [`Role`].
    pub fn role(&self) -> Role {
        self.role
    }

    /// Parses a piece from its FEN letter, uppercase for white.
    pub fn from_fen(c: char) -> Result<Self, ParseRoleError> {
        let role = c.to_ascii_lowercase().to_string().parse()?;
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };

        Ok(Piece::new(color, role))
    }
}

/// Prints the FEN letter of this piece, uppercase for white.
impl Display for Piece {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let c = self.role.letter();
        match self.color {
            Color::White => f.write_char(c.to_ascii_uppercase()),
            Color::Black => f.write_char(c),
        }
    }
}
