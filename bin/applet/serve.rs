use crate::{config::ServerConfig, server::Server};
use anyhow::Error as Anyhow;
use clap::Parser;
use lib::chess::Color;
use lib::protocol::Handler;
use lib::store::{GameStore, MemoryIdentity, MemoryStore};
use tokio::net::TcpListener;
use tracing::{info, instrument};

/// Hosts live games over TCP, one JSON message per line.
#[derive(Debug, Default, Parser)]
pub struct Serve {
    /// The server configuration, either inline RON or the path to a RON file.
    #[clap(short, long, default_value_t)]
    config: ServerConfig,
}

impl Serve {
    #[instrument(level = "trace", skip(self), err)]
    pub async fn execute(self) -> Result<(), Anyhow> {
        let ServerConfig {
            address,
            capacity,
            tokens,
            games,
        } = self.config;

        let identity: MemoryIdentity = tokens.into_iter().collect();
        let store = MemoryStore::default();

        for seed in games {
            let mut record = store.create(&seed.name);

            for (side, who) in [(Color::White, seed.white), (Color::Black, seed.black)] {
                if let Some(who) = who {
                    record.sit(side, who);
                }
            }

            info!(id = %record.game_id, name = %record.name, "seeded game");
            store.put(record).await?;
        }

        let listener = TcpListener::bind(address).await?;
        Server::new(Handler::new(identity, store), capacity)
            .listen(listener)
            .await
    }
}
