mod actuator;
mod command;
mod config;
mod connection;
mod skill;
mod transport;

use actuator::SimulatedBody;
use anyhow::Context;
use config::{SkillConfig, CONFIG_ENV};
use connection::ConnectionManager;
use skill::{MotionSkill, ShutdownReason, SkillHandler};
use std::path::PathBuf;
use std::sync::Arc;
use transport::{TcpAcceptor, TransportAcceptor};

use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let arg = std::env::args().nth(1);
    if arg.as_deref() == Some("--print-config") {
        print!("{}", SkillConfig::default().to_toml()?);
        return Ok(());
    }

    // Config path: first argument, then the environment
    let config_path = arg
        .or_else(|| std::env::var(CONFIG_ENV).ok())
        .map(PathBuf::from);
    let config = SkillConfig::load(config_path.as_deref())?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    info!("Hexapod skill starting: body={}", config.body.name);
    match &config_path {
        Some(path) => info!("  Config: {}", path.display()),
        None => info!("  Config: built-in defaults"),
    }
    info!(
        "  Policy: preempt_previous={} cooperative_stop={}",
        config.policy.preempt_previous, config.policy.cooperative_stop
    );
    info!(
        "  Move duration: {}ms, reaction target: {}ms",
        config.motion.move_duration_ms, config.motion.reaction_latency_ms
    );

    let body = Arc::new(SimulatedBody::new(config.body.clone()));
    let (skill, mut shutdown_rx) = MotionSkill::new(
        body.clone(),
        config.motion.clone(),
        config.policy.clone(),
    );

    let acceptor = TcpAcceptor::bind(&config.transport.bind_address)
        .await
        .context("Failed to start transport")?;
    info!("  {} transport listening on {}", acceptor.name(), acceptor.local_addr()?);
    let mut conn = ConnectionManager::start(acceptor, config.transport.read_buffer);

    skill.on_start().await;

    let reason = tokio::select! {
        reason = skill::host(&skill, &mut conn, &mut shutdown_rx) => reason,
        _ = tokio::signal::ctrl_c() => ShutdownReason::Interrupted,
    };
    info!("Shutting down: {}", reason);
    debug!("Link state at shutdown: {:?}", skill.link_state().await);

    skill.on_close().await;
    debug!("Final pose: {:?}", body.pose());

    Ok(())
}
