use crate::chess::Move;
use crate::store::GameId;
use serde::{Deserialize, Serialize};

/// A request sent by a participant on behalf of the identity owning `token`.
#[derive(Debug, Clone, Eq, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Command {
    /// Joins the game as a player or observer.
    Connect {
        #[serde(rename = "identity")]
        token: String,
        #[serde(rename = "gameID")]
        game: GameId,
    },

    /// Plays a move on behalf of the player to move.
    MakeMove {
        #[serde(rename = "identity")]
        token: String,
        #[serde(rename = "gameID")]
        game: GameId,
        #[serde(rename = "move")]
        action: Move,
    },

    /// Stops following the game, giving up the seat if one is held.
    Leave {
        #[serde(rename = "identity")]
        token: String,
        #[serde(rename = "gameID")]
        game: GameId,
    },

    /// Concedes the game.
    Resign {
        #[serde(rename = "identity")]
        token: String,
        #[serde(rename = "gameID")]
        game: GameId,
    },
}

impl Command {
    /// The authentication token of the sender.
    pub fn token(&self) -> &str {
        match self {
            Command::Connect { token, .. }
            | Command::MakeMove { token, .. }
            | Command::Leave { token, .. }
            | Command::Resign { token, .. } => token,
        }
    }

    /// The game this command is addressed to.
    pub fn game(&self) -> GameId {
        match *self {
            Command::Connect { game, .. }
            | Command::MakeMove { game, .. }
            | Command::Leave { game, .. }
            | Command::Resign { game, .. } => game,
        }
    }
}
