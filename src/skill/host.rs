//! Host loop: feeds connection events to a skill until it asks to stop

use super::handler::{ShutdownReason, ShutdownReceiver, SkillHandler};
use crate::connection::{ConnectionEvent, ConnectionManager};
use hexa_shared::{Frame, FrameKind};
use tracing::{error, info, warn};

/// Run `skill` against `conn` and return why hosting ended
///
/// The caller owns process exit, so tests and supervisors can intercept the
/// shutdown instead of losing the process.
pub async fn host<H: SkillHandler>(
    skill: &H,
    conn: &mut ConnectionManager,
    shutdown_rx: &mut ShutdownReceiver,
) -> ShutdownReason {
    loop {
        tokio::select! {
            biased;

            Some(reason) = shutdown_rx.recv() => return reason,

            event = conn.recv() => match event {
                Some(ConnectionEvent::Connected { peer }) => {
                    info!("[LINK] Client connected from {} via {}", peer, conn.transport());
                    skill.on_connect().await;
                }
                Some(ConnectionEvent::Received(frame)) => {
                    deliver(skill, &frame).await;
                }
                Some(ConnectionEvent::Disconnected { reason }) => {
                    warn!("[LINK] Client disconnected: {}", reason);
                    skill.on_disconnect().await;
                }
                Some(ConnectionEvent::ListenerFailed { reason }) => {
                    error!("[LINK] Listener failed: {}", reason);
                    return ShutdownReason::TransportFailed { reason };
                }
                None => {
                    error!("[LINK] Connection manager closed");
                    return ShutdownReason::TransportFailed {
                        reason: "connection manager closed".into(),
                    };
                }
            },
        }
    }
}

async fn deliver<H: SkillHandler>(skill: &H, frame: &Frame) {
    match frame.kind {
        FrameKind::Text => match frame.as_text() {
            Ok(token) => skill.on_recv_string(token).await,
            Err(e) => warn!("[LINK] Dropping text frame: {}", e),
        },
        FrameKind::Structured => skill.on_recv_structured(&frame.payload).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actuator::mock::{ActuatorCall, RecordingActuator};
    use crate::config::{MotionConfig, MotionPolicy};
    use crate::skill::MotionSkill;
    use crate::transport::{TcpAcceptor, TransportAcceptor};
    use hexa_shared::codec::FrameEncoder;
    use std::sync::Arc;
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpStream;

    #[tokio::test]
    async fn test_session_end_to_end() {
        let actuator = Arc::new(RecordingActuator::new());
        let (skill, mut shutdown_rx) = MotionSkill::new(
            actuator.clone(),
            MotionConfig::default(),
            MotionPolicy::default(),
        );

        let acceptor = TcpAcceptor::bind("127.0.0.1:0").await.expect("bind failed");
        let addr = acceptor.local_addr().expect("no local addr");
        let mut conn = ConnectionManager::start(acceptor, 256);

        let client = tokio::spawn(async move {
            let mut stream = TcpStream::connect(addr).await.expect("connect failed");
            let mut encoder = FrameEncoder::new();
            encoder.encode(&Frame::text("stand-up")).unwrap();
            encoder.encode(&Frame::text("bogus")).unwrap();
            encoder.encode(&Frame::structured(&b"{}"[..])).unwrap();
            encoder.encode(&Frame::text("stop")).unwrap();
            stream.write_all(&encoder.take()).await.expect("write failed");
            stream.shutdown().await.expect("shutdown failed");
        });

        let reason = host(&skill, &mut conn, &mut shutdown_rx).await;
        client.await.unwrap();
        assert_eq!(reason, ShutdownReason::RemoteDisconnected);

        skill.on_close().await;

        let calls = actuator.calls();
        assert_eq!(calls.first(), Some(&ActuatorCall::Start));
        assert_eq!(calls.last(), Some(&ActuatorCall::Close));
        assert_eq!(
            actuator.count_where(|c| *c == ActuatorCall::StandWithHeight(50.0)),
            1
        );
        assert_eq!(actuator.count_where(|c| *c == ActuatorCall::Relax), 1);
    }
}
