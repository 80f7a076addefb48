//! The hexapod motion skill

use super::handler::{ShutdownReason, ShutdownReceiver, SkillHandler};
use crate::actuator::Actuator;
use crate::command::MotionDispatcher;
use crate::config::{MotionConfig, MotionPolicy};
use async_trait::async_trait;
use hexa_shared::{LinkEvent, LinkState, LinkStateMachine, TransitionResult};
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tokio::time::Duration;
use tracing::{debug, error, info, warn};

/// Drives the body from remote commands for the lifetime of one client
pub struct MotionSkill<A: Actuator> {
    actuator: Arc<A>,
    dispatcher: MotionDispatcher<A>,
    link: RwLock<LinkStateMachine>,
    shutdown_tx: mpsc::UnboundedSender<ShutdownReason>,
    head_neutral_deg: f64,
    head_recenter_duration_ms: u64,
    /// How long in-flight motions may run on close before being aborted:
    /// the longest routine plus one reaction latency
    close_grace: Duration,
}

impl<A: Actuator> MotionSkill<A> {
    /// Create the skill and the receiver for its shutdown requests
    pub fn new(
        actuator: Arc<A>,
        motion: MotionConfig,
        policy: MotionPolicy,
    ) -> (Self, ShutdownReceiver) {
        let (shutdown_tx, shutdown_rx) = mpsc::unbounded_channel();
        let close_grace = motion.longest_routine() + motion.reaction_latency();

        let skill = Self {
            head_neutral_deg: motion.head_neutral_deg,
            head_recenter_duration_ms: motion.head_recenter_duration_ms,
            close_grace,
            dispatcher: MotionDispatcher::new(actuator.clone(), motion, policy),
            actuator,
            link: RwLock::new(LinkStateMachine::new()),
            shutdown_tx,
        };
        (skill, shutdown_rx)
    }

    pub async fn link_state(&self) -> LinkState {
        self.link.read().await.state()
    }
}

#[async_trait]
impl<A: Actuator> SkillHandler for MotionSkill<A> {
    async fn on_start(&self) {
        let result = self
            .actuator
            .move_head(self.head_neutral_deg, self.head_recenter_duration_ms)
            .await;
        if let Err(e) = result {
            warn!("[SKILL] Head recenter failed: {:#}", e);
        }
        info!("[SKILL] Hexapod motion skill started on {} body", self.actuator.name());
    }

    async fn on_connect(&self) {
        let mut link = self.link.write().await;

        if let TransitionResult::Invalid { from, .. } = link.process_event(LinkEvent::ClientConnected) {
            warn!("[SKILL] Ignoring connect while {:?}", from);
            return;
        }

        let event = match self.actuator.start().await {
            Ok(()) => LinkEvent::ActuatorsStarted,
            Err(e) => {
                error!("[SKILL] {} body start error: {:#}", self.actuator.name(), e);
                LinkEvent::ActuatorsFailed {
                    reason: e.to_string(),
                }
            }
        };

        match link.process_event(event) {
            TransitionResult::Success(state) => {
                info!("[SKILL] Link {:?}, accepting commands", state);
            }
            TransitionResult::ConnectAborted { reason } => {
                warn!(
                    "[SKILL] Connect aborted after attempt {}: {}",
                    link.connect_attempts(),
                    reason
                );
            }
            other => warn!("[SKILL] Unexpected connect result: {:?}", other),
        }
    }

    async fn on_disconnect(&self) {
        let result = self
            .link
            .write()
            .await
            .process_event(LinkEvent::ClientDisconnected);

        match result {
            TransitionResult::Shutdown => {
                info!("[SKILL] Remote disconnected, requesting shutdown");
                let _ = self.shutdown_tx.send(ShutdownReason::RemoteDisconnected);
            }
            other => debug!("[SKILL] Disconnect ignored: {:?}", other),
        }
    }

    async fn on_close(&self) {
        if let Some(task) = self.dispatcher.current_task().await {
            info!("[SKILL] Closing with task {} ({:?}) in flight", task.id, task.kind);
        }
        let aborted = self.dispatcher.drain_for(self.close_grace).await;
        if aborted > 0 {
            warn!("[SKILL] Aborted {} motion task(s) on close", aborted);
        }

        if let Err(e) = self.actuator.close().await {
            error!("[SKILL] {} body close error: {:#}", self.actuator.name(), e);
        }
        info!("[SKILL] Closed");
    }

    async fn on_recv_string(&self, data: &str) {
        {
            let link = self.link.read().await;
            if !link.accepts_commands() {
                warn!("[SKILL] Dropping {:?}: link is {:?}", data, link.state());
                return;
            }
        }
        self.dispatcher.handle_token(data).await;
    }

    async fn on_recv_structured(&self, data: &[u8]) {
        debug!("[SKILL] Ignoring {} bytes of structured data", data.len());
    }
}
