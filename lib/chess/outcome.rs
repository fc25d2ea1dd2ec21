use super::Color;
use derive_more::Display;
use serde::{Deserialize, Serialize};

/// One of the possible outcomes of a chess game.
#[derive(Debug, Display, Copy, Clone, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    #[display(fmt = "checkmate by the {_0} player")]
    Checkmate(Color),

    #[display(fmt = "{_0} player resigned")]
    Resignation(Color),

    #[display(fmt = "stalemate")]
    Stalemate,
}

impl Outcome {
    /// The winning side, unless the game is a [draw].
    ///
    /// [draw]: https://www.chessprogramming.org/Draw
    pub fn winner(&self) -> Option<Color> {
        match *self {
            Outcome::Checkmate(c) => Some(c),
            Outcome::Resignation(c) => Some(!c),
            Outcome::Stalemate => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_strategy::proptest;

    #[test]
    fn neither_side_wins_a_stalemate() {
        assert_eq!(Outcome::Stalemate.winner(), None);
    }

    #[proptest]
    fn the_side_that_checkmates_wins(c: Color) {
        assert_eq!(Outcome::Checkmate(c).winner(), Some(c));
    }

    #[proptest]
    fn only_stalemate_has_no_winner(#[filter(#o != Outcome::Stalemate)] o: Outcome) {
        assert_ne!(o.winner(), None);
    }

    #[test]
    fn outcome_describes_how_the_game_ended() {
        assert_eq!(Outcome::Checkmate(Color::Black).to_string(), "checkmate by the black player");
        assert_eq!(Outcome::Resignation(Color::White).to_string(), "white player resigned");
    }

    #[proptest]
    fn the_side_that_resigns_loses(c: Color) {
        assert_eq!(Outcome::Resignation(c).winner(), Some(!c));
    }
}
