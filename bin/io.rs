use async_trait::async_trait;
use std::io;

mod pipe;

pub use pipe::*;

/// Trait for line oriented transports.
#[async_trait]
pub trait Io: Send {
    /// Receive a line, without the line break.
    async fn recv(&mut self) -> io::Result<String>;

    /// Send a line.
    async fn send(&mut self, msg: &str) -> io::Result<()>;

    /// Flush the internal buffers.
    async fn flush(&mut self) -> io::Result<()>;
}

#[cfg(test)]
mockall::mock! {
    pub Io {
        pub fn recv(&mut self) -> io::Result<String>;
        pub fn send(&mut self, msg: &str) -> io::Result<()>;
        pub fn flush(&mut self) -> io::Result<()>;
    }
}

#[cfg(test)]
#[async_trait]
impl Io for MockIo {
    async fn recv(&mut self) -> io::Result<String> {
        MockIo::recv(self)
    }

    async fn send(&mut self, msg: &str) -> io::Result<()> {
        MockIo::send(self, msg)
    }

    async fn flush(&mut self) -> io::Result<()> {
        MockIo::flush(self)
    }
}
