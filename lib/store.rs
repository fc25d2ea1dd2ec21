use crate::chess::{Color, Game};
use async_trait::async_trait;
use derive_more::{Display, Error, From};
use serde::{Deserialize, Serialize};

mod memory;

pub use memory::*;

/// Uniquely identifies a game.
#[derive(Debug, Display, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, From)]
#[derive(Deserialize, Serialize)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
#[display(fmt = "{_0}")]
#[serde(transparent)]
pub struct GameId(pub u64);

/// A participant's relationship to a game.
#[derive(Debug, Display, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Seat {
    #[display(fmt = "{_0}")]
    Player(Color),
    #[display(fmt = "observer")]
    Observer,
}

/// A game as persisted by a [`GameStore`].
#[derive(Debug, Clone, Eq, PartialEq, Deserialize, Serialize)]
pub struct GameRecord {
    #[serde(rename = "gameID")]
    pub game_id: GameId,
    #[serde(rename = "whiteIdentity", default, skip_serializing_if = "Option::is_none")]
    pub white: Option<String>,
    #[serde(rename = "blackIdentity", default, skip_serializing_if = "Option::is_none")]
    pub black: Option<String>,
    pub name: String,
    pub game: Game,
}

impl GameRecord {
    /// A game in the standard initial position with both seats open.
    pub fn new(game_id: GameId, name: impl Into<String>) -> Self {
        GameRecord {
            game_id,
            white: None,
            black: None,
            name: name.into(),
            game: Game::default(),
        }
    }

    /// The identity holding the seat of the given [`Color`], if any.
    pub fn player(&self, side: Color) -> Option<&str> {
        match side {
            Color::White => self.white.as_deref(),
            Color::Black => self.black.as_deref(),
        }
    }

    /// Seats an identity as the given [`Color`], replacing whoever held it.
    pub fn sit(&mut self, side: Color, identity: impl Into<String>) {
        let seat = match side {
            Color::White => &mut self.white,
            Color::Black => &mut self.black,
        };

        *seat = Some(identity.into());
    }

    /// How an identity takes part in this game, white taking precedence.
    pub fn seat_of(&self, identity: &str) -> Seat {
        Color::ALL
            .into_iter()
            .find(|&c| self.player(c) == Some(identity))
            .map_or(Seat::Observer, Seat::Player)
    }

    /// Clears every seat held by an identity, returning whether any was.
    pub fn vacate(&mut self, identity: &str) -> bool {
        let mut vacated = false;

        for seat in [&mut self.white, &mut self.black] {
            if seat.as_deref() == Some(identity) {
                *seat = None;
                vacated = true;
            }
        }

        vacated
    }
}

/// The reason why a token could not be resolved into an identity.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error)]
#[display(fmt = "invalid or expired token")]
pub struct Unauthorized;

/// The reason why a [`GameStore`] operation failed.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error)]
pub enum StoreError {
    #[display(fmt = "game `{_0}` does not exist")]
    NotFound(#[error(not(source))] GameId),

    #[display(fmt = "storage failure: {_0}")]
    Failure(#[error(not(source))] String),
}

/// Trait for types that resolve authentication tokens into identities.
#[async_trait]
pub trait Identity: Send + Sync {
    /// The identity that owns the token.
    async fn resolve(&self, token: &str) -> Result<String, Unauthorized>;
}

/// Trait for types that persist [`GameRecord`]s.
#[async_trait]
pub trait GameStore: Send + Sync {
    /// Loads a game.
    async fn get(&self, id: GameId) -> Result<GameRecord, StoreError>;

    /// Writes a game back, replacing the stored record with the same id.
    async fn put(&self, record: GameRecord) -> Result<(), StoreError>;
}

#[cfg(test)]
mockall::mock! {
    pub(crate) Identity {
        pub(crate) fn resolve(&self, token: &str) -> Result<String, Unauthorized>;
    }
}

#[cfg(test)]
#[async_trait]
impl Identity for MockIdentity {
    async fn resolve(&self, token: &str) -> Result<String, Unauthorized> {
        MockIdentity::resolve(self, token)
    }
}

#[cfg(test)]
mockall::mock! {
    pub(crate) GameStore {
        pub(crate) fn get(&self, id: GameId) -> Result<GameRecord, StoreError>;
        pub(crate) fn put(&self, record: GameRecord) -> Result<(), StoreError>;
    }
}

#[cfg(test)]
#[async_trait]
impl GameStore for MockGameStore {
    async fn get(&self, id: GameId) -> Result<GameRecord, StoreError> {
        MockGameStore::get(self, id)
    }

    async fn put(&self, record: GameRecord) -> Result<(), StoreError> {
        MockGameStore::put(self, record)
    }
}
