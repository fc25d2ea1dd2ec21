use lib::chess::{Color, Game, Outcome, Position, Role, Status};
use lib::protocol::{Command, Handler, Notification, ProtocolError};
use lib::store::{GameId, GameStore, MemoryIdentity, MemoryStore};
use std::sync::Arc;
use tokio::sync::mpsc::{channel, Receiver, Sender};

type Server = Handler<MemoryIdentity, MemoryStore>;

struct Client {
    token: &'static str,
    tx: Sender<Notification>,
    rx: Receiver<Notification>,
}

impl Client {
    fn new(token: &'static str) -> Self {
        let (tx, rx) = channel(64);
        Client { token, tx, rx }
    }

    async fn send(&self, server: &Server, game: GameId, cmd: &str) -> Result<(), ProtocolError> {
        let token = self.token.into();
        let command = match cmd {
            "connect" => Command::Connect { token, game },
            "leave" => Command::Leave { token, game },
            "resign" => Command::Resign { token, game },
            m => Command::MakeMove {
                token,
                game,
                action: m.parse().unwrap(),
            },
        };

        server.handle(command, &self.tx).await
    }

    fn drain(&mut self) -> Vec<Notification> {
        let mut received = Vec::new();
        while let Ok(n) = self.rx.try_recv() {
            received.push(n);
        }

        received
    }

    fn messages(&mut self) -> Vec<String> {
        self.drain()
            .into_iter()
            .filter_map(|n| match n {
                Notification::Message { message } => Some(message),
                _ => None,
            })
            .collect()
    }
}

async fn server() -> (Server, GameId) {
    let identity: MemoryIdentity = [("ta", "alice"), ("tb", "bob"), ("tc", "carol")]
        .into_iter()
        .collect();

    let store = MemoryStore::default();
    let mut record = store.create("casual");
    record.sit(Color::White, "alice");
    record.sit(Color::Black, "bob");
    let id = record.game_id;

    let server = Handler::new(identity, store);
    server.store().put(record).await.unwrap();

    (server, id)
}

fn pos(s: &str) -> Position {
    s.parse().unwrap()
}

#[tokio::test]
async fn fools_mate_is_announced_and_persisted() {
    let (server, id) = server().await;
    let mut alice = Client::new("ta");
    let mut bob = Client::new("tb");
    let mut carol = Client::new("tc");

    for c in [&alice, &bob, &carol] {
        c.send(&server, id, "connect").await.unwrap();
    }

    alice.drain();
    bob.drain();
    carol.drain();

    alice.send(&server, id, "f2f3").await.unwrap();
    bob.send(&server, id, "e7e5").await.unwrap();
    alice.send(&server, id, "g2g4").await.unwrap();
    bob.send(&server, id, "d8h4").await.unwrap();

    let record = server.store().get(id).await.unwrap();
    assert!(record.game.is_in_checkmate(Color::White));
    assert_eq!(record.game.status(), Status::Finished);
    assert_eq!(record.game.outcome(), Some(Outcome::Checkmate(Color::Black)));

    let seen = carol.messages();
    assert_eq!(seen.last().map(String::as_str), Some("alice is in checkmate"));
    assert!(seen.contains(&"bob moved queen d8h4".to_string()));

    assert_eq!(
        alice.send(&server, id, "e2e4").await,
        Err(ProtocolError::GameFinished)
    );
}

#[tokio::test]
async fn every_participant_sees_the_same_game() {
    let (server, id) = server().await;
    let mut alice = Client::new("ta");
    let mut bob = Client::new("tb");

    alice.send(&server, id, "connect").await.unwrap();
    bob.send(&server, id, "connect").await.unwrap();
    alice.send(&server, id, "e2e4").await.unwrap();

    let last = |ns: Vec<Notification>| {
        ns.into_iter().rev().find_map(|n| match n {
            Notification::LoadGame { game } => Some(game),
            _ => None,
        })
    };

    let a = last(alice.drain()).unwrap();
    let b = last(bob.drain()).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.board().piece_on(pos("e2")), None);
    assert_eq!(a.board().piece_on(pos("e4")).map(|p| p.role()), Some(Role::Pawn));
    assert_eq!(a.turn(), Color::Black);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_moves_for_the_same_turn_are_serialized() {
    let (server, id) = server().await;
    let server = Arc::new(server);

    let tasks: Vec<_> = ["e2e4", "d2d4", "c2c4", "g1f3"]
        .into_iter()
        .map(|m| {
            let server = server.clone();
            tokio::spawn(async move {
                let client = Client::new("ta");
                client.send(&server, id, m).await
            })
        })
        .collect();

    let mut accepted = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(()) => accepted += 1,
            Err(e) => assert_eq!(e, ProtocolError::NotYourTurn),
        }
    }

    assert_eq!(accepted, 1);

    let record = server.store().get(id).await.unwrap();
    assert_eq!(record.game.turn(), Color::Black);

    let moved = ["e2", "d2", "c2", "g1"]
        .into_iter()
        .filter(|&s| record.game.board().piece_on(pos(s)).is_none())
        .count();

    assert_eq!(moved, 1);
}

#[tokio::test]
async fn observers_watch_but_may_not_play() {
    let (server, id) = server().await;
    let mut alice = Client::new("ta");
    let mut carol = Client::new("tc");

    alice.send(&server, id, "connect").await.unwrap();
    carol.send(&server, id, "connect").await.unwrap();

    assert_eq!(alice.messages(), vec!["carol joined as an observer"]);
    assert_eq!(
        carol.drain(),
        vec![Notification::LoadGame {
            game: Game::default()
        }]
    );

    assert_eq!(
        carol.send(&server, id, "e2e4").await,
        Err(ProtocolError::ObserverForbidden("move"))
    );

    assert!(alice.drain().is_empty());
    assert_eq!(carol.drain().len(), 1);

    let record = server.store().get(id).await.unwrap();
    assert_eq!(record.game, Game::default());
}

#[tokio::test]
async fn promotion_is_described_to_the_opponent() {
    let (server, id) = server().await;
    let mut alice = Client::new("ta");
    let mut bob = Client::new("tb");

    alice.send(&server, id, "connect").await.unwrap();
    bob.send(&server, id, "connect").await.unwrap();

    for (who, m) in [
        (&alice, "h2h4"),
        (&bob, "g7g5"),
        (&alice, "h4g5"),
        (&bob, "g8f6"),
        (&alice, "g5g6"),
        (&bob, "f6e4"),
        (&alice, "g6g7"),
        (&bob, "e4d6"),
        (&alice, "g7h8q"),
    ] {
        who.send(&server, id, m).await.unwrap();
    }

    let seen = bob.messages();
    assert_eq!(
        seen.last().map(String::as_str),
        Some("alice moved pawn g7h8q, promoted to queen")
    );

    let record = server.store().get(id).await.unwrap();
    let h8 = record.game.board().piece_on(pos("h8"));
    assert_eq!(h8.map(|p| (p.color(), p.role())), Some((Color::White, Role::Queen)));
    assert!(alice.messages().iter().all(|m| !m.starts_with("alice moved")));
}

#[tokio::test]
async fn resigning_ends_the_game_for_everyone() {
    let (server, id) = server().await;
    let mut alice = Client::new("ta");
    let mut bob = Client::new("tb");

    alice.send(&server, id, "connect").await.unwrap();
    bob.send(&server, id, "connect").await.unwrap();
    alice.drain();

    bob.send(&server, id, "resign").await.unwrap();
    assert_eq!(alice.messages(), vec!["bob resigned"]);
    assert_eq!(bob.messages(), vec!["bob resigned"]);

    let record = server.store().get(id).await.unwrap();
    assert_eq!(record.game.outcome(), Some(Outcome::Resignation(Color::Black)));
    assert_eq!(server.registry().participants(id), vec!["alice"]);

    assert_eq!(
        alice.send(&server, id, "resign").await,
        Err(ProtocolError::GameFinished)
    );
}

#[tokio::test]
async fn leaving_player_frees_the_seat_for_the_next_one() {
    let (server, id) = server().await;
    let mut alice = Client::new("ta");
    let mut bob = Client::new("tb");

    alice.send(&server, id, "connect").await.unwrap();
    bob.send(&server, id, "connect").await.unwrap();
    bob.drain();

    alice.send(&server, id, "leave").await.unwrap();
    assert_eq!(bob.messages(), vec!["alice left"]);

    let record = server.store().get(id).await.unwrap();
    assert_eq!(record.white, None);
    assert_eq!(record.black.as_deref(), Some("bob"));

    assert_eq!(
        alice.send(&server, id, "e2e4").await,
        Err(ProtocolError::ObserverForbidden("move"))
    );
}

#[tokio::test]
async fn unknown_tokens_and_games_are_rejected() {
    let (server, id) = server().await;
    let mut mallory = Client::new("tm");

    assert!(matches!(
        mallory.send(&server, id, "connect").await,
        Err(ProtocolError::Unauthorized(_))
    ));

    assert_eq!(mallory.drain().len(), 1);
    assert!(server.registry().participants(id).is_empty());

    let alice = Client::new("ta");
    assert_eq!(
        alice.send(&server, GameId(404), "connect").await,
        Err(ProtocolError::GameNotFound(GameId(404)))
    );
}
