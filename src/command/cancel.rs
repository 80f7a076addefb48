//! Stop signal shared between the dispatcher and its motion tasks

use std::sync::Arc;
use tokio::sync::watch;

/// Broadcast "stop was requested" to every listening motion task
///
/// Each `signal()` bumps a generation counter. Sending never blocks and never
/// fails, even when no task is listening.
#[derive(Debug, Clone)]
pub struct CancelSignal {
    tx: Arc<watch::Sender<u64>>,
}

impl CancelSignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0);
        Self { tx: Arc::new(tx) }
    }

    /// Request cancellation of every current listener
    pub fn signal(&self) {
        self.tx.send_modify(|generation| *generation += 1);
    }

    /// Number of stops signalled so far
    pub fn generation(&self) -> u64 {
        *self.tx.borrow()
    }

    /// Listen for stops signalled after this call
    pub fn subscribe(&self) -> CancelListener {
        CancelListener {
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for CancelSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct CancelListener {
    rx: watch::Receiver<u64>,
}

impl CancelListener {
    /// Whether a stop arrived since subscribing
    pub fn is_cancelled(&self) -> bool {
        self.rx.has_changed().unwrap_or(false)
    }

    /// Resolve once a stop arrives
    pub async fn cancelled(&mut self) {
        if self.is_cancelled() {
            return;
        }
        if self.rx.changed().await.is_err() {
            // Sender gone: no stop can ever arrive
            std::future::pending::<()>().await;
        }
    }
}
