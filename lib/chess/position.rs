use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// A square on the chess board, addressed by row and column, both in `1..=8`.
///
/// Row 1 is white's back rank and column 1 is the `a` file.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
#[serde(try_from = "Coordinates")]
pub struct Position {
    #[cfg_attr(test, strategy(1u8..=8))]
    row: u8,
    #[cfg_attr(test, strategy(1u8..=8))]
    col: u8,
}

#[derive(Deserialize)]
struct Coordinates {
    row: i64,
    col: i64,
}

/// The reason why a pair of coordinates is not a [`Position`].
#[derive(Debug, Display, Clone, Eq, PartialEq, Error)]
#[display(fmt = "({row}, {col}) is outside of the board")]
pub struct OutOfBoard {
    pub row: i64,
    pub col: i64,
}

impl TryFrom<Coordinates> for Position {
    type Error = OutOfBoard;

    fn try_from(Coordinates { row, col }: Coordinates) -> Result<Self, Self::Error> {
        match (u8::try_from(row), u8::try_from(col)) {
            (Ok(r), Ok(c)) => Position::new(r, c).ok_or(OutOfBoard { row, col }),
            _ => Err(OutOfBoard { row, col }),
        }
    }
}

impl Position {
    /// Constructs [`Position`] if both coordinates are on the board.
    pub fn new(row: u8, col: u8) -> Option<Self> {
        if (1..=8).contains(&row) && (1..=8).contains(&col) {
            Some(Position { row, col })
        } else {
            None
        }
    }

    /// This position's row, `1` being white's back rank.
    pub fn row(&self) -> u8 {
        self.row
    }

    /// This position's column, `1` being the `a` file.
    pub fn col(&self) -> u8 {
        self.col
    }

    /// The position displaced by the given offsets, if still on the board.
    pub fn offset(&self, rows: i8, cols: i8) -> Option<Self> {
        let row = u8::try_from((self.row as i8).checked_add(rows)?).ok()?;
        let col = u8::try_from((self.col as i8).checked_add(cols)?).ok()?;
        Position::new(row, col)
    }

    /// An iterator over all 64 positions, row by row starting at `a1`.
    pub fn iter() -> impl DoubleEndedIterator<Item = Self> + ExactSizeIterator {
        (0..64u8).map(|i| Position {
            row: i / 8 + 1,
            col: i % 8 + 1,
        })
    }

    pub(crate) fn index(&self) -> (usize, usize) {
        (self.row as usize - 1, self.col as usize - 1)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file = char::from(b'a' + self.col - 1);
        write!(f, "{}{}", file, self.row)
    }
}

/// The reason why parsing [`Position`] failed.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error)]
#[display(fmt = "failed to parse position")]
pub struct ParsePositionError;

impl FromStr for Position {
    type Err = ParsePositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.as_bytes() {
            &[f @ b'a'..=b'h', r @ b'1'..=b'8'] => {
                Position::new(r - b'0', f - b'a' + 1).ok_or(ParsePositionError)
            }

            _ => Err(ParsePositionError),
        }
    }
}
