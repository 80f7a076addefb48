//! Transport trait abstraction for pluggable listeners

use anyhow::Result;
use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};

/// A transport stream that can read and write bytes
#[async_trait]
pub trait TransportStream: AsyncRead + AsyncWrite + Send + Unpin + 'static {
    /// Close the transport gracefully
    async fn shutdown(&mut self) -> Result<()>;
}

/// Source of inbound client connections
#[async_trait]
pub trait TransportAcceptor: Send + Sync + 'static {
    /// The stream type this acceptor produces
    type Stream: TransportStream;

    /// Wait for the next client, returning its stream and peer address
    async fn accept(&self) -> Result<(Self::Stream, String)>;

    /// Address clients should connect to
    fn local_addr(&self) -> Result<String>;

    /// Human-readable name for this transport
    fn name(&self) -> &'static str;
}
