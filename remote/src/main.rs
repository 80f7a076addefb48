mod busy;

use anyhow::{Context, Result};
use busy::{BusyWindow, Verdict};
use hexa_shared::{codec, link, Command, Frame};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::{Duration, Instant};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let address = std::env::args()
        .nth(1)
        .unwrap_or_else(|| format!("127.0.0.1:{}", link::DEFAULT_PORT));

    let mut stream = TcpStream::connect(&address)
        .await
        .with_context(|| format!("Cannot reach skill at {}", address))?;
    stream.set_nodelay(true)?;
    info!("Connected to {}", address);
    info!(
        "Commands: {}",
        Command::ALL.map(|c| c.token()).join(", ")
    );

    let mut busy = BusyWindow::new(Duration::from_millis(link::REMOTE_BUSY_WINDOW_MS));
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let token = line.trim();
        if token.is_empty() {
            continue;
        }
        if Command::from_token(token).is_none() {
            warn!("{:?} is not a known command; the skill will ignore it", token);
        }

        match busy.check(token, Instant::now()) {
            Verdict::Send => {
                let frame = codec::encode(&Frame::text(token))?;
                stream
                    .write_all(&frame)
                    .await
                    .context("Connection to skill lost")?;
                info!("Sent {}", token);
            }
            Verdict::Busy { remaining } => {
                warn!("Robot busy, dropped {} ({:?} left)", token, remaining);
            }
        }
    }

    info!("Input closed, disconnecting");
    stream.shutdown().await?;
    Ok(())
}
