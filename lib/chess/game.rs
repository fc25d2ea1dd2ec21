use crate::chess::{legality, Board, Color, Move, Moves, Outcome, Piece, Position};
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};

#[cfg(test)]
use proptest::{prelude::*, sample::*, strategy::Map};

#[cfg(test)]
use std::ops::Range;

/// Represents an illegal [`Move`] in a given [`Game`].
#[derive(Debug, Display, Clone, Eq, PartialEq, Error)]
#[display(fmt = "move `{_0}` is illegal in this position")]
pub struct IllegalMove(#[error(not(source))] pub Move);

/// Whether a [`Game`] still accepts moves.
#[derive(Debug, Display, Copy, Clone, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    #[display(fmt = "in progress")]
    InProgress,
    #[display(fmt = "finished")]
    Finished,
}

/// A game of chess.
///
/// Owns the [`Board`] and tracks whose turn it is and whether the game is over.
/// Once [`Status::Finished`] no more moves are accepted.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Deserialize, Serialize)]
pub struct Game {
    board: Board,
    turn: Color,
    status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    outcome: Option<Outcome>,
}

/// The standard initial position, white to move.
impl Default for Game {
    fn default() -> Self {
        Game::new(Board::default(), Color::White)
    }
}

#[cfg(test)]
impl Arbitrary for Game {
    type Parameters = ();
    type Strategy = Map<(Range<usize>, SelectorStrategy), fn((usize, Selector)) -> Game>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (0..48, any::<Selector>()).prop_map(|(plies, selector)| {
            let mut game = Game::default();

            for _ in 0..plies {
                let next = selector.try_select(game.moves(game.turn()));
                match next {
                    Some(m) if !game.is_finished() => {
                        game.apply(m).unwrap();
                    }
                    _ => break,
                }
            }

            game
        })
    }
}

impl Game {
    /// Starts a game from the given [`Board`] with `turn` to move.
    pub fn new(board: Board, turn: Color) -> Self {
        Game {
            board,
            turn,
            status: Status::InProgress,
            outcome: None,
        }
    }

    /// The current [`Board`].
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The side to move.
    pub fn turn(&self) -> Color {
        self.turn
    }

    /// Whether the game is still in progress.
    pub fn status(&self) -> Status {
        self.status
    }

    /// Whether the game is over.
    pub fn is_finished(&self) -> bool {
        self.status == Status::Finished
    }

    /// The reason why the game is over, if it is.
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// The legal moves of the piece on the given [`Position`].
    ///
    /// Empty squares and pieces that cannot move yield no moves.
    pub fn valid_moves(&self, at: Position) -> Moves {
        legality::legal_moves(&self.board, at)
    }

    /// Every legal move of the given [`Color`].
    pub fn moves(&self, side: Color) -> impl Iterator<Item = Move> + '_ {
        self.board
            .iter()
            .filter(move |(p, _)| p.color() == side)
            .flat_map(move |(_, at)| self.valid_moves(at))
    }

    /// Plays a [`Move`] if legal and returns the [`Piece`] moved, otherwise
    /// returns the reason why not.
    ///
    /// Only pieces of the side to move may be moved. After the turn passes,
    /// the game finishes if the side now to move is checkmated or stalemated.
    pub fn apply(&mut self, m: Move) -> Result<Piece, IllegalMove> {
        let piece = match self.board.piece_on(m.whence()) {
            Some(p) if p.color() == self.turn && !self.is_finished() => p,
            _ => return Err(IllegalMove(m)),
        };

        if !self.valid_moves(m.whence()).contains(&m) {
            return Err(IllegalMove(m));
        }

        let landing = match m.promotion() {
            Some(r) => Piece::new(piece.color(), r),
            None => piece,
        };

        self.board.remove(m.whence());
        self.board.place(m.whither(), landing);
        self.turn = !self.turn;

        if self.is_in_checkmate(self.turn) {
            self.finish(Outcome::Checkmate(!self.turn));
        } else if self.is_in_stalemate(self.turn) {
            self.finish(Outcome::Stalemate);
        }

        Ok(piece)
    }

    /// Whether the king of the given [`Color`] is attacked.
    pub fn is_in_check(&self, side: Color) -> bool {
        legality::is_attacked(&self.board, side)
    }

    /// Whether the given [`Color`] is in check and has no legal move at all.
    pub fn is_in_checkmate(&self, side: Color) -> bool {
        self.is_in_check(side) && self.moves(side).next().is_none()
    }

    /// Whether the given [`Color`] is not in check but has no legal move.
    pub fn is_in_stalemate(&self, side: Color) -> bool {
        !self.is_in_check(side) && self.moves(side).next().is_none()
    }

    /// The given [`Color`] concedes, finishing the game unconditionally.
    pub fn resign(&mut self, side: Color) {
        self.finish(Outcome::Resignation(side));
    }

    fn finish(&mut self, outcome: Outcome) {
        self.status = Status::Finished;
        self.outcome = Some(outcome);
    }
}
