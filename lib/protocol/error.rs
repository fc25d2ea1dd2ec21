use crate::chess::IllegalMove;
use crate::store::{GameId, StoreError, Unauthorized};
use derive_more::{Display, Error};

/// The reason why a [`Command`][`super::Command`] was rejected.
///
/// Prints as `TAG: detail`, which is also the message sent to the offending
/// participant.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error)]
pub enum ProtocolError {
    #[display(fmt = "UNAUTHORIZED: {_0}")]
    Unauthorized(Unauthorized),

    #[display(fmt = "GAME_NOT_FOUND: game `{_0}` does not exist")]
    GameNotFound(#[error(not(source))] GameId),

    #[display(fmt = "OBSERVER_FORBIDDEN: observers may not {_0}")]
    ObserverForbidden(#[error(not(source))] &'static str),

    #[display(fmt = "GAME_FINISHED: the game is over")]
    GameFinished,

    #[display(fmt = "INVALID_MOVE: it is not your turn")]
    NotYourTurn,

    #[display(fmt = "INVALID_MOVE: {_0}")]
    IllegalMove(IllegalMove),

    #[display(fmt = "INTERNAL_ERROR: {_0}")]
    Internal(#[error(not(source))] String),

    #[display(fmt = "BAD_REQUEST: {_0}")]
    BadRequest(#[error(not(source))] String),
}

impl ProtocolError {
    /// The machine readable kind of this error.
    ///
    /// Playing out of turn is reported as an invalid move.
    pub fn tag(&self) -> &'static str {
        match self {
            ProtocolError::Unauthorized(_) => "UNAUTHORIZED",
            ProtocolError::GameNotFound(_) => "GAME_NOT_FOUND",
            ProtocolError::ObserverForbidden(_) => "OBSERVER_FORBIDDEN",
            ProtocolError::GameFinished => "GAME_FINISHED",
            ProtocolError::NotYourTurn | ProtocolError::IllegalMove(_) => "INVALID_MOVE",
            ProtocolError::Internal(_) => "INTERNAL_ERROR",
            ProtocolError::BadRequest(_) => "BAD_REQUEST",
        }
    }
}

impl From<Unauthorized> for ProtocolError {
    fn from(e: Unauthorized) -> Self {
        ProtocolError::Unauthorized(e)
    }
}

impl From<IllegalMove> for ProtocolError {
    fn from(e: IllegalMove) -> Self {
        ProtocolError::IllegalMove(e)
    }
}

impl From<StoreError> for ProtocolError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => ProtocolError::GameNotFound(id),
            e @ StoreError::Failure(_) => ProtocolError::Internal(e.to_string()),
        }
    }
}
