use crate::store::GameId;
use dashmap::DashMap;
use std::{collections::HashMap, fmt::Debug};
use tokio::sync::mpsc::{error::TrySendError, Sender};
use tracing::{debug, instrument};

/// The live participants of every game, each reachable through its own channel.
///
/// Sends never block: a recipient whose queue is full or closed is dropped from
/// the game on the spot.
#[derive(Debug)]
pub struct Registry<M> {
    sessions: DashMap<GameId, HashMap<String, Sender<M>>>,
}

impl<M> Default for Registry<M> {
    fn default() -> Self {
        Registry {
            sessions: DashMap::new(),
        }
    }
}

impl<M: Clone + Debug> Registry<M> {
    /// Adds an identity to a game, replacing its previous channel if any.
    #[instrument(level = "debug", skip(self, channel))]
    pub fn join(&self, game: GameId, identity: &str, channel: Sender<M>) {
        self.sessions
            .entry(game)
            .or_default()
            .insert(identity.to_string(), channel);
    }

    /// Removes an identity from a game, returning whether it was there.
    #[instrument(level = "debug", skip(self), ret)]
    pub fn leave(&self, game: GameId, identity: &str) -> bool {
        match self.sessions.get_mut(&game) {
            Some(mut session) => session.remove(identity).is_some(),
            None => false,
        }
    }

    /// Removes a channel from every game it joined, returning how many.
    #[instrument(level = "debug", skip(self, channel), ret)]
    pub fn disconnect(&self, channel: &Sender<M>) -> usize {
        let mut left = 0;

        for mut session in self.sessions.iter_mut() {
            let before = session.len();
            session.retain(|_, tx| !tx.same_channel(channel));
            left += before - session.len();
        }

        left
    }

    /// Sends a message to every participant of a game except `exclude`.
    ///
    /// Returns how many participants the message was delivered to.
    #[instrument(level = "trace", skip(self))]
    pub fn broadcast(&self, game: GameId, exclude: Option<&str>, msg: &M) -> usize {
        let Some(mut session) = self.sessions.get_mut(&game) else {
            return 0;
        };

        let mut delivered = 0;

        session.retain(|identity, tx| {
            if Some(identity.as_str()) == exclude {
                return true;
            }

            match tx.try_send(msg.clone()) {
                Ok(()) => {
                    delivered += 1;
                    true
                }

                Err(TrySendError::Full(_)) => {
                    debug!(%game, %identity, "dropping participant whose queue is full");
                    false
                }

                Err(TrySendError::Closed(_)) => {
                    debug!(%game, %identity, "dropping participant that disconnected");
                    false
                }
            }
        });

        delivered
    }

    /// Sends a message to a single participant of a game, if present and open.
    #[instrument(level = "trace", skip(self), ret)]
    pub fn send_to(&self, game: GameId, identity: &str, msg: M) -> bool {
        let Some(mut session) = self.sessions.get_mut(&game) else {
            return false;
        };

        let Some(tx) = session.get(identity) else {
            return false;
        };

        match tx.try_send(msg) {
            Ok(()) => true,
            Err(e) => {
                debug!(%game, %identity, error = %e, "dropping participant");
                session.remove(identity);
                false
            }
        }
    }

    /// The identities currently taking part in a game.
    pub fn participants(&self, game: GameId) -> Vec<String> {
        let mut identities: Vec<_> = match self.sessions.get(&game) {
            Some(session) => session.keys().cloned().collect(),
            None => Vec::new(),
        };

        identities.sort();
        identities
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use test_strategy::proptest;
    use tokio::sync::mpsc::{channel, Receiver};

    fn connect(registry: &Registry<u32>, game: GameId, who: &str) -> Receiver<u32> {
        let (tx, rx) = channel(8);
        registry.join(game, who, tx);
        rx
    }

    #[proptest]
    fn broadcast_reaches_everyone_but_exclude_exactly_once(
        game: GameId,
        #[strategy(proptest::collection::hash_set("[a-z]{1,6}", 1..8))] who: HashSet<String>,
        #[strategy(0..#who.len())] excluded: usize,
        msg: u32,
    ) {
        let registry = Registry::default();
        let excluded = who.iter().nth(excluded).cloned();

        let mut inboxes: Vec<_> = who
            .iter()
            .map(|w| (w.clone(), connect(&registry, game, w)))
            .collect();

        let delivered = registry.broadcast(game, excluded.as_deref(), &msg);
        assert_eq!(delivered, who.len() - 1);

        for (w, rx) in &mut inboxes {
            if Some(&*w) == excluded.as_ref() {
                assert!(rx.try_recv().is_err());
            } else {
                assert_eq!(rx.try_recv().ok(), Some(msg));
                assert!(rx.try_recv().is_err());
            }
        }
    }

    #[proptest]
    fn broadcast_without_exclude_reaches_everyone(game: GameId, msg: u32) {
        let registry = Registry::default();
        let mut a = connect(&registry, game, "alice");
        let mut b = connect(&registry, game, "bob");

        assert_eq!(registry.broadcast(game, None, &msg), 2);
        assert_eq!(a.try_recv().ok(), Some(msg));
        assert_eq!(b.try_recv().ok(), Some(msg));
    }

    #[test]
    fn games_do_not_share_participants() {
        let registry = Registry::default();
        let mut a = connect(&registry, GameId(1), "alice");
        let mut b = connect(&registry, GameId(2), "bob");

        assert_eq!(registry.broadcast(GameId(1), None, &7), 1);
        assert_eq!(a.try_recv().ok(), Some(7));
        assert!(b.try_recv().is_err());
    }

    #[test]
    fn join_replaces_the_previous_channel() {
        let registry = Registry::default();
        let mut old = connect(&registry, GameId(1), "alice");
        let mut new = connect(&registry, GameId(1), "alice");

        assert_eq!(registry.participants(GameId(1)), vec!["alice"]);
        assert_eq!(registry.broadcast(GameId(1), None, &1), 1);
        assert!(old.try_recv().is_err());
        assert_eq!(new.try_recv().ok(), Some(1));
    }

    #[test]
    fn leave_is_a_no_op_if_absent() {
        let registry = Registry::<u32>::default();
        let _rx = connect(&registry, GameId(1), "alice");

        assert!(!registry.leave(GameId(1), "bob"));
        assert!(!registry.leave(GameId(2), "alice"));
        assert!(registry.leave(GameId(1), "alice"));
        assert!(!registry.leave(GameId(1), "alice"));
        assert!(registry.participants(GameId(1)).is_empty());
    }

    #[test]
    fn closed_recipients_are_dropped_silently() {
        let registry = Registry::default();
        let mut a = connect(&registry, GameId(1), "alice");
        drop(connect(&registry, GameId(1), "bob"));

        assert_eq!(registry.broadcast(GameId(1), None, &3), 1);
        assert_eq!(a.try_recv().ok(), Some(3));
        assert_eq!(registry.participants(GameId(1)), vec!["alice"]);
    }

    #[test]
    fn full_recipients_are_dropped_silently() {
        let registry = Registry::default();
        let (tx, _rx) = channel(1);
        registry.join(GameId(1), "alice", tx);

        assert_eq!(registry.broadcast(GameId(1), None, &1), 1);
        assert_eq!(registry.broadcast(GameId(1), None, &2), 0);
        assert!(registry.participants(GameId(1)).is_empty());
    }

    #[test]
    fn send_to_reaches_only_the_given_identity() {
        let registry = Registry::default();
        let mut a = connect(&registry, GameId(1), "alice");
        let mut b = connect(&registry, GameId(1), "bob");

        assert!(registry.send_to(GameId(1), "bob", 5));
        assert!(!registry.send_to(GameId(1), "carol", 5));
        assert!(!registry.send_to(GameId(2), "bob", 5));
        assert!(a.try_recv().is_err());
        assert_eq!(b.try_recv().ok(), Some(5));
    }

    #[test]
    fn disconnect_leaves_every_game_joined_through_the_channel() {
        let registry = Registry::default();
        let (tx, _rx) = channel(8);
        registry.join(GameId(1), "alice", tx.clone());
        registry.join(GameId(2), "alice", tx.clone());
        let _b = connect(&registry, GameId(1), "bob");

        assert_eq!(registry.disconnect(&tx), 2);
        assert_eq!(registry.participants(GameId(1)), vec!["bob"]);
        assert!(registry.participants(GameId(2)).is_empty());
    }
}
