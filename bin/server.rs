use crate::io::{Io, Pipe};
use anyhow::Error as Anyhow;
use lib::protocol::{Command, Handler, Notification, ProtocolError};
use lib::store::{GameStore, Identity};
use std::{io, sync::Arc};
use tokio::net::TcpListener;
use tokio::select;
use tokio::sync::mpsc::{channel, Receiver, Sender};
use tracing::{debug, info, info_span, instrument, warn, Instrument};

/// Accepts connections and hands each one its own [`Session`].
pub struct Server<I, S> {
    handler: Arc<Handler<I, S>>,
    capacity: usize,
}

impl<I: Identity + 'static, S: GameStore + 'static> Server<I, S> {
    /// Constructs [`Server`] that queues at most `capacity` notifications per participant.
    pub fn new(handler: Handler<I, S>, capacity: usize) -> Self {
        Server {
            handler: Arc::new(handler),
            capacity: capacity.max(1),
        }
    }

    /// Serves connections until the listener fails.
    #[instrument(level = "trace", skip(self, listener), err)]
    pub async fn listen(self, listener: TcpListener) -> Result<(), Anyhow> {
        info!(address = %listener.local_addr()?, "listening");

        loop {
            let (stream, peer) = listener.accept().await?;
            let session = Session::new(Pipe::from(stream), self.handler.clone(), self.capacity);

            tokio::spawn(
                async move {
                    match session.run().await {
                        Ok(()) => info!("disconnected"),
                        Err(e) => warn!(error = %e, "connection failed"),
                    }
                }
                .instrument(info_span!("session", %peer)),
            );
        }
    }
}

/// A single connection, forwarding commands to the [`Handler`] and
/// notifications back to the peer.
pub struct Session<T, I, S> {
    io: T,
    handler: Arc<Handler<I, S>>,
    tx: Sender<Notification>,
    rx: Receiver<Notification>,
}

impl<T: Io, I: Identity, S: GameStore> Session<T, I, S> {
    pub fn new(io: T, handler: Arc<Handler<I, S>>, capacity: usize) -> Self {
        let (tx, rx) = channel(capacity);
        Session {
            io,
            handler,
            tx,
            rx,
        }
    }

    /// Runs until the peer hangs up, then leaves every game joined.
    ///
    /// Seats are kept, so the peer may reconnect and carry on playing.
    pub async fn run(mut self) -> io::Result<()> {
        let result = self.serve().await;
        self.handler.registry().disconnect(&self.tx);

        match result {
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(()),
            result => result,
        }
    }

    async fn serve(&mut self) -> io::Result<()> {
        loop {
            select! {
                line = self.io.recv() => self.receive(&line?).await,
                Some(n) = self.rx.recv() => self.deliver(&n).await?,
            }
        }
    }

    #[instrument(level = "debug", skip(self, line))]
    async fn receive(&mut self, line: &str) {
        match serde_json::from_str::<Command>(line) {
            Ok(command) => {
                if let Err(e) = self.handler.handle(command, &self.tx).await {
                    debug!(error = %e, "command rejected");
                }
            }

            Err(e) => {
                warn!(error = %e, "malformed command");
                let e = ProtocolError::BadRequest(e.to_string());
                self.handler.reject(&e, &self.tx);
            }
        }
    }

    #[instrument(level = "trace", skip(self), err)]
    async fn deliver(&mut self, n: &Notification) -> io::Result<()> {
        self.io.send(&serde_json::to_string(n)?).await?;
        self.io.flush().await
    }
}
