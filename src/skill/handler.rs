//! Hooks a hosted skill exposes to the client-connection layer

use async_trait::async_trait;
use std::fmt;
use tokio::sync::mpsc;

/// Why the host should stop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShutdownReason {
    /// The controlling client went away
    RemoteDisconnected,
    /// The transport can no longer deliver clients
    TransportFailed { reason: String },
    /// Operator interrupt (Ctrl-C)
    Interrupted,
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShutdownReason::RemoteDisconnected => write!(f, "remote disconnected"),
            ShutdownReason::TransportFailed { reason } => write!(f, "transport failed: {}", reason),
            ShutdownReason::Interrupted => write!(f, "interrupted"),
        }
    }
}

/// Receives shutdown requests raised by the skill
pub type ShutdownReceiver = mpsc::UnboundedReceiver<ShutdownReason>;

/// Lifecycle and message hooks, invoked by the host loop
#[async_trait]
pub trait SkillHandler: Send + Sync {
    /// The skill was loaded
    async fn on_start(&self);

    /// A client connected
    async fn on_connect(&self);

    /// The client disconnected
    async fn on_disconnect(&self);

    /// The host is shutting down
    async fn on_close(&self);

    /// A text message arrived
    async fn on_recv_string(&self, data: &str);

    /// A structured message arrived
    async fn on_recv_structured(&self, data: &[u8]);
}
