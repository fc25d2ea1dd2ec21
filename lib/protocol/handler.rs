use super::{Command, Notification, ProtocolError};
use crate::chess::{Color, Move, Outcome};
use crate::session::Registry;
use crate::store::{GameId, GameRecord, GameStore, Identity, Seat};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{mpsc::Sender, Mutex};
use tracing::{debug, error, info, instrument};

/// Drives games on behalf of their participants.
///
/// Commands addressed to the same game are processed one at a time, from
/// loading the record to the last notification they cause.
#[derive(Debug)]
pub struct Handler<I, S> {
    identity: I,
    store: S,
    registry: Registry<Notification>,
    locks: DashMap<GameId, Arc<Mutex<()>>>,
}

impl<I: Identity, S: GameStore> Handler<I, S> {
    /// Constructs [`Handler`] over the given collaborators.
    pub fn new(identity: I, store: S) -> Self {
        Handler {
            identity,
            store,
            registry: Registry::default(),
            locks: DashMap::new(),
        }
    }

    /// The collaborator that persists games.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The participants of every game.
    pub fn registry(&self) -> &Registry<Notification> {
        &self.registry
    }

    /// Executes a [`Command`] received through the `reply` channel.
    ///
    /// If the command is rejected, the error is sent back through `reply` only.
    #[instrument(level = "debug", skip(self, command, reply), fields(game = %command.game()), err)]
    pub async fn handle(
        &self,
        command: Command,
        reply: &Sender<Notification>,
    ) -> Result<(), ProtocolError> {
        let result = self.dispatch(command, reply).await;

        if let Err(e) = &result {
            self.reject(e, reply);
        }

        result
    }

    /// Sends an error to the participant behind `reply`.
    pub fn reject(&self, e: &ProtocolError, reply: &Sender<Notification>) {
        if let Err(e) = reply.try_send(e.into()) {
            debug!(error = %e, "failed to deliver error");
        }
    }

    async fn dispatch(
        &self,
        command: Command,
        reply: &Sender<Notification>,
    ) -> Result<(), ProtocolError> {
        let identity = self.identity.resolve(command.token()).await?;

        let id = command.game();
        let lock = self.locks.entry(id).or_default().clone();
        let _guard = lock.lock().await;

        let record = match self.store.get(id).await {
            Ok(record) => record,
            Err(e) => {
                // Only the table and this command hold the lock.
                self.locks.remove_if(&id, |_, l| Arc::strong_count(l) == 2);
                return Err(e.into());
            }
        };
        let seat = record.seat_of(&identity);

        match command {
            Command::Connect { .. } => self.connect(record, &identity, seat, reply),
            Command::MakeMove { action, .. } => {
                self.make_move(record, &identity, seat, action).await
            }
            Command::Leave { .. } => self.leave(record, &identity, seat).await,
            Command::Resign { .. } => self.resign(record, &identity, seat).await,
        }
    }

    #[instrument(level = "trace", skip(self, record, reply), fields(game = %record.game_id))]
    fn connect(
        &self,
        record: GameRecord,
        identity: &str,
        seat: Seat,
        reply: &Sender<Notification>,
    ) -> Result<(), ProtocolError> {
        let id = record.game_id;
        self.registry.join(id, identity, reply.clone());

        let state = Notification::LoadGame { game: record.game };
        self.registry.send_to(id, identity, state);

        let joined = match seat {
            Seat::Player(c) => Notification::message(format!("{identity} joined as {c}")),
            Seat::Observer => Notification::message(format!("{identity} joined as an observer")),
        };

        self.registry.broadcast(id, Some(identity), &joined);

        Ok(())
    }

    #[instrument(level = "trace", skip(self, record), fields(game = %record.game_id))]
    async fn make_move(
        &self,
        mut record: GameRecord,
        identity: &str,
        seat: Seat,
        action: Move,
    ) -> Result<(), ProtocolError> {
        let side = match seat {
            Seat::Player(c) => c,
            Seat::Observer => return Err(ProtocolError::ObserverForbidden("move")),
        };

        if record.game.is_finished() {
            return Err(ProtocolError::GameFinished);
        } else if record.game.turn() != side {
            return Err(ProtocolError::NotYourTurn);
        }

        let piece = record.game.apply(action)?;
        self.persist(&record).await?;

        let id = record.game_id;
        debug!(game = %id, "\n{}", record.game.board().grid());

        let state = Notification::LoadGame {
            game: record.game.clone(),
        };

        self.registry.broadcast(id, None, &state);

        let mut description = format!("{identity} moved {} {action}", piece.role().name());

        if let Some(r) = action.promotion() {
            description.push_str(&format!(", promoted to {}", r.name()));
        }

        self.registry
            .broadcast(id, Some(identity), &Notification::message(description));

        let opponent = !side;
        let name = describe(&record, opponent);
        let announcement = match record.game.outcome() {
            Some(Outcome::Checkmate(_)) => Some(format!("{name} is in checkmate")),
            Some(Outcome::Stalemate) => Some(format!("{name} is in stalemate")),
            _ if record.game.is_in_check(opponent) => Some(format!("{name} is in check")),
            _ => None,
        };

        if let Some(text) = announcement {
            self.registry
                .broadcast(id, None, &Notification::message(text));
        }

        conclude(&record);

        Ok(())
    }

    #[instrument(level = "trace", skip(self, record), fields(game = %record.game_id))]
    async fn leave(
        &self,
        mut record: GameRecord,
        identity: &str,
        seat: Seat,
    ) -> Result<(), ProtocolError> {
        let vacated = match seat {
            Seat::Player(_) => record.vacate(identity),
            Seat::Observer => false,
        };

        if vacated {
            self.persist(&record).await?;
        }

        let id = record.game_id;
        if self.registry.leave(id, identity) || vacated {
            let left = Notification::message(format!("{identity} left"));
            self.registry.broadcast(id, Some(identity), &left);
        }

        Ok(())
    }

    #[instrument(level = "trace", skip(self, record), fields(game = %record.game_id))]
    async fn resign(
        &self,
        mut record: GameRecord,
        identity: &str,
        seat: Seat,
    ) -> Result<(), ProtocolError> {
        let side = match seat {
            Seat::Player(c) => c,
            Seat::Observer => return Err(ProtocolError::ObserverForbidden("resign")),
        };

        if record.game.is_finished() {
            return Err(ProtocolError::GameFinished);
        }

        record.game.resign(side);
        self.persist(&record).await?;

        let id = record.game_id;
        let resigned = Notification::message(format!("{identity} resigned"));
        self.registry.broadcast(id, None, &resigned);
        self.registry.leave(id, identity);

        conclude(&record);

        Ok(())
    }

    async fn persist(&self, record: &GameRecord) -> Result<(), ProtocolError> {
        match self.store.put(record.clone()).await {
            Ok(()) => Ok(()),
            Err(e) => {
                error!(game = %record.game_id, error = %e, "failed to persist game");
                Err(e.into())
            }
        }
    }
}

/// Records how the game ended, if it did.
fn conclude(record: &GameRecord) {
    if let Some(outcome) = record.game.outcome() {
        info!(game = %record.game_id, %outcome, winner = ?outcome.winner(), "game over");
    }
}

/// The identity seated as the given [`Color`], or the color itself.
fn describe(record: &GameRecord, side: Color) -> String {
    match record.player(side) {
        Some(identity) => identity.to_string(),
        None => side.to_string(),
    }
}
