//! Host role: listen for one peer at a time and chat with it.

use anyhow::{Context, Result};
use tokio::io::BufReader;
use tokio::net::TcpListener;
use tokio::select;
use tracing::{debug, info};

use crate::config::HostConfig;
use crate::interrupt::Interrupt;
use crate::screen;
use crate::session;

const RELISTEN_PROMPT: &str = "Wait for another connection? y/N: ";

/// Binds the listening socket, then accepts one connection per session
/// until the user declines to wait for another. Multi-party rooms are out
/// of scope: while a session runs, nobody else is accepted.
pub async fn run(config: HostConfig) -> Result<()> {
    let listener = TcpListener::bind(("0.0.0.0", config.port()))
        .await
        .with_context(|| format!("failed to listen on port {}", config.port()))?;
    info!("listening on {}", listener.local_addr()?);

    let mut input = BufReader::new(tokio::io::stdin());
    let mut out = tokio::io::stdout();
    let interrupt = Interrupt::install();

    loop {
        let text = format!("Waiting for a peer on port {}...", config.port());
        screen::print_line(&mut out, &text).await?;

        let mut accept_interrupt = interrupt.watch();
        let (stream, peer_addr) = select! {
            accepted = listener.accept() => accepted.context("failed to accept connection")?,
            _ = accept_interrupt.recv() => {
                debug!("interrupted while waiting for a peer");
                break;
            }
        };
        info!(%peer_addr, "peer connected");

        let outcome =
            session::run(stream, config.name(), &mut input, &mut out, interrupt.watch()).await?;
        info!(
            peer = %outcome.peer_name,
            send_end = ?outcome.send_end,
            recv_end = ?outcome.recv_end,
            "session ended"
        );

        if !screen::prompt_yes_no(&mut input, &mut out, RELISTEN_PROMPT, interrupt.watch())
            .await?
        {
            debug!("user chose not to wait for another peer");
            break;
        }
    }

    Ok(())
}
