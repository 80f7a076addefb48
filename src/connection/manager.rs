//! Connection manager for a single remote client
//!
//! There is no reconnection path: once the first client goes away the
//! manager stops accepting and its event channel closes.

use crate::transport::{TransportAcceptor, TransportStream};
use anyhow::{anyhow, Result};
use hexa_shared::codec::FrameDecoder;
use hexa_shared::Frame;
use tokio::io::AsyncReadExt;
use tokio::sync::mpsc;
use tracing::debug;

/// Events emitted by the connection manager
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionEvent {
    /// A client connected
    Connected { peer: String },
    /// Received a frame from the client
    Received(Frame),
    /// The client went away
    Disconnected { reason: String },
    /// No client could be accepted
    ListenerFailed { reason: String },
}

pub struct ConnectionManager {
    transport: &'static str,
    /// Channel to receive connection events
    event_rx: mpsc::Receiver<ConnectionEvent>,
}

impl ConnectionManager {
    /// Start serving `acceptor` in the background
    pub fn start<T: TransportAcceptor>(acceptor: T, read_buffer: usize) -> Self {
        let (event_tx, event_rx) = mpsc::channel::<ConnectionEvent>(100);
        let transport = acceptor.name();

        tokio::spawn(async move {
            serve(acceptor, read_buffer.max(1), event_tx).await;
        });

        Self {
            transport,
            event_rx,
        }
    }

    /// Receive the next connection event
    pub async fn recv(&mut self) -> Option<ConnectionEvent> {
        self.event_rx.recv().await
    }

    /// Name of the underlying transport
    pub fn transport(&self) -> &'static str {
        self.transport
    }
}

/// Accept one client and pump its frames until it leaves
async fn serve<T: TransportAcceptor>(
    acceptor: T,
    read_buffer: usize,
    event_tx: mpsc::Sender<ConnectionEvent>,
) {
    let (stream, peer) = match acceptor.accept().await {
        Ok(accepted) => accepted,
        Err(e) => {
            let _ = event_tx
                .send(ConnectionEvent::ListenerFailed {
                    reason: e.to_string(),
                })
                .await;
            return;
        }
    };

    let _ = event_tx
        .send(ConnectionEvent::Connected { peer: peer.clone() })
        .await;

    let reason = match handle_connection(stream, read_buffer, &event_tx).await {
        Ok(()) => "Client closed connection".to_string(),
        Err(e) => e.to_string(),
    };
    debug!("[LINK] Session with {} ended: {}", peer, reason);

    let _ = event_tx
        .send(ConnectionEvent::Disconnected { reason })
        .await;
}

/// Handle an active connection
async fn handle_connection<S: TransportStream>(
    mut stream: S,
    read_buffer: usize,
    event_tx: &mpsc::Sender<ConnectionEvent>,
) -> Result<()> {
    let mut decoder = FrameDecoder::new();
    let mut read_buf = vec![0u8; read_buffer];

    let result = loop {
        let n = match stream.read(&mut read_buf).await {
            Ok(0) => break Ok(()),
            Ok(n) => n,
            Err(e) => break Err(anyhow!("Read error: {}", e)),
        };
        decoder.extend(&read_buf[..n]);

        // Process all complete frames
        match drain_frames(&mut decoder, event_tx).await {
            Ok(true) => {}
            // Host went away
            Ok(false) => break Ok(()),
            Err(e) => break Err(e),
        }
    };

    let _ = stream.shutdown().await;
    result
}

/// Forward every complete frame; `Ok(false)` when nobody is listening
async fn drain_frames(
    decoder: &mut FrameDecoder,
    event_tx: &mpsc::Sender<ConnectionEvent>,
) -> Result<bool> {
    while let Some(frame) = decoder
        .decode_next()
        .map_err(|e| anyhow!("Frame error: {}", e))?
    {
        if event_tx.send(ConnectionEvent::Received(frame)).await.is_err() {
            return Ok(false);
        }
    }
    Ok(true)
}
