use crate::chess::{Color, Piece, Position, Role};
use derive_more::{DebugCustom, Display, Error};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write};
use std::str::FromStr;

/// The chess board.
///
/// Holds at most one [`Piece`] on each of its 64 [`Position`]s and knows nothing
/// about the rules of the game.
#[derive(DebugCustom, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[debug(fmt = "Board({self})")]
#[serde(into = "String", try_from = "String")]
pub struct Board([[Option<Piece>; 8]; 8]);

/// The standard initial position.
impl Default for Board {
    fn default() -> Self {
        use Role::*;

        let mut board = Board::empty();
        let back = [Rook, Knight, Bishop, Queen, King, Bishop, Knight, Rook];

        for c in Color::ALL {
            let pawns = (c.back_rank() as i8 + c.forward()) as u8;
            for (col, role) in (1..=8).zip(back) {
                if let Some(p) = Position::new(c.back_rank(), col) {
                    board.place(p, Piece::new(c, role));
                }

                if let Some(p) = Position::new(pawns, col) {
                    board.place(p, Piece::new(c, Pawn));
                }
            }
        }

        board
    }
}

impl Board {
    /// A board without any pieces.
    pub fn empty() -> Self {
        Board([[None; 8]; 8])
    }

    /// The [`Piece`] on the given [`Position`], if any.
    pub fn piece_on(&self, p: Position) -> Option<Piece> {
        let (r, c) = p.index();
        self.0[r][c]
    }

    /// Places a [`Piece`] on the given [`Position`], returning the one it replaced.
    pub fn place(&mut self, p: Position, piece: Piece) -> Option<Piece> {
        let (r, c) = p.index();
        self.0[r][c].replace(piece)
    }

    /// Clears the given [`Position`], returning the piece that was there.
    pub fn remove(&mut self, p: Position) -> Option<Piece> {
        let (r, c) = p.index();
        self.0[r][c].take()
    }

    /// An iterator over all pieces on the board.
    pub fn iter(&self) -> impl Iterator<Item = (Piece, Position)> + '_ {
        Position::iter().filter_map(move |p| Some((self.piece_on(p)?, p)))
    }

    /// [`Position`] occupied by the king of a [`Color`].
    pub fn king(&self, side: Color) -> Option<Position> {
        let king = Piece::new(side, Role::King);
        self.iter().find(|&(p, _)| p == king).map(|(_, pos)| pos)
    }

    /// Renders the board as a text grid, white at the bottom.
    pub fn grid(&self) -> String {
        let mut grid = String::new();

        for row in (1..=8).rev() {
            grid.push(char::from(b'0' + row));
            for col in 1..=8 {
                grid.push(' ');
                match Position::new(row, col).and_then(|p| self.piece_on(p)) {
                    Some(piece) => grid.push_str(&piece.to_string()),
                    None => grid.push('.'),
                }
            }

            grid.push('\n');
        }

        grid.push_str("  a b c d e f g h");
        grid
    }
}

/// Prints the piece placement field of the [FEN] notation.
///
/// [FEN]: https://www.chessprogramming.org/Forsyth-Edwards_Notation
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in (1..=8u8).rev() {
            let mut skip = 0;

            for col in 1..=8 {
                match Position::new(row, col).and_then(|p| self.piece_on(p)) {
                    None => skip += 1,
                    Some(piece) => {
                        if skip > 0 {
                            write!(f, "{skip}")?;
                            skip = 0;
                        }

                        write!(f, "{piece}")?;
                    }
                }
            }

            if skip > 0 {
                write!(f, "{skip}")?;
            }

            if row > 1 {
                f.write_char('/')?;
            }
        }

        Ok(())
    }
}

/// The reason why parsing [`Board`] failed.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error)]
#[display(fmt = "failed to parse board")]
pub struct ParseBoardError;

impl FromStr for Board {
    type Err = ParseBoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rows: Vec<_> = s.split('/').collect();
        if rows.len() != 8 {
            return Err(ParseBoardError);
        }

        let mut board = Board::empty();

        for (row, fen) in (1..=8u8).rev().zip(rows) {
            let mut col = 1u8;

            for c in fen.chars() {
                match c.to_digit(10) {
                    Some(n @ 1..=8) => col += n as u8,
                    Some(_) => return Err(ParseBoardError),
                    None => {
                        let piece = Piece::from_fen(c).map_err(|_| ParseBoardError)?;
                        let p = Position::new(row, col).ok_or(ParseBoardError)?;
                        board.place(p, piece);
                        col += 1;
                    }
                }

                if col > 9 {
                    return Err(ParseBoardError);
                }
            }

            if col != 9 {
                return Err(ParseBoardError);
            }
        }

        Ok(board)
    }
}

impl From<Board> for String {
    fn from(board: Board) -> Self {
        board.to_string()
    }
}

impl TryFrom<String> for Board {
    type Error = ParseBoardError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}
