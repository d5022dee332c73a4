//! Client role: resolve the peer, run sessions, and offer to reconnect.

use std::io::ErrorKind;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;
use thiserror::Error;
use tokio::io::BufReader;
use tokio::net::{lookup_host, TcpStream};
use tokio::time::timeout;
use tracing::{debug, info};

use crate::config::ConnectConfig;
use crate::interrupt::Interrupt;
use crate::screen;
use crate::session;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

const RECONNECT_PROMPT: &str = "Connect to another server? y/N: ";

/// Why connection establishment failed. Each variant renders the one
/// human-readable line the user sees before the run ends.
#[derive(Debug, Error)]
pub enum DialError {
    #[error("server {host} not found")]
    HostNotFound {
        host: String,
        #[source]
        source: std::io::Error,
    },
    #[error("server address {host} is not valid")]
    InvalidAddress { host: String },
    #[error("timed out connecting to {host}:{port}")]
    Timeout { host: String, port: u16 },
    #[error("error connecting to {host}:{port}")]
    Io {
        host: String,
        port: u16,
        #[source]
        source: std::io::Error,
    },
}

/// Keeps connecting and chatting until a session ends and the user declines
/// the reconnect prompt. Establishment failures end the whole run; anything
/// that breaks mid-session only ends the current one.
pub async fn run(config: ConnectConfig) -> Result<()> {
    let mut input = BufReader::new(tokio::io::stdin());
    let mut out = tokio::io::stdout();
    let interrupt = Interrupt::install();

    loop {
        let stream = dial(&config).await?;
        info!("connected to {}:{}", config.host(), config.port());

        let outcome =
            session::run(stream, config.name(), &mut input, &mut out, interrupt.watch()).await?;
        info!(
            peer = %outcome.peer_name,
            send_end = ?outcome.send_end,
            recv_end = ?outcome.recv_end,
            "session ended"
        );

        if !screen::prompt_yes_no(&mut input, &mut out, RECONNECT_PROMPT, interrupt.watch())
            .await?
        {
            debug!("user chose not to reconnect");
            break;
        }
    }

    Ok(())
}

/// Resolves the configured peer and opens a socket to it, mapping the
/// distinct failure modes to their own variants.
pub async fn dial(config: &ConnectConfig) -> Result<TcpStream, DialError> {
    let host = config.host();
    let port = config.port();

    let addrs = lookup_host((host, port))
        .await
        .map_err(|source| match source.kind() {
            ErrorKind::InvalidInput => DialError::InvalidAddress {
                host: host.to_string(),
            },
            _ => DialError::HostNotFound {
                host: host.to_string(),
                source,
            },
        })?;
    let addrs: Vec<SocketAddr> = addrs.collect();
    if addrs.is_empty() {
        return Err(DialError::InvalidAddress {
            host: host.to_string(),
        });
    }

    match timeout(CONNECT_TIMEOUT, TcpStream::connect(addrs.as_slice())).await {
        Err(_) => Err(DialError::Timeout {
            host: host.to_string(),
            port,
        }),
        Ok(Err(source)) if source.kind() == ErrorKind::TimedOut => Err(DialError::Timeout {
            host: host.to_string(),
            port,
        }),
        Ok(Err(source)) => Err(DialError::Io {
            host: host.to_string(),
            port,
            source,
        }),
        Ok(Ok(stream)) => Ok(stream),
    }
}

#[cfg(test)]
mod tests {
    use tokio::net::TcpListener;

    use super::*;
    use crate::cli::ConnectArgs;

    fn config(host: &str, port: u16) -> ConnectConfig {
        ConnectConfig::new(ConnectArgs {
            name: "alice".to_string(),
            host: host.to_string(),
            port,
        })
        .expect("valid config")
    }

    #[tokio::test]
    async fn dial_reaches_a_listening_peer() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let port = listener.local_addr().expect("local addr").port();

        let stream = dial(&config("127.0.0.1", port)).await.expect("dial");
        assert_eq!(
            stream.peer_addr().expect("peer addr").port(),
            port
        );
    }

    #[tokio::test]
    async fn dial_reports_unknown_hosts() {
        let result = dial(&config("host.invalid", 5000)).await;
        assert!(matches!(result, Err(DialError::HostNotFound { .. })));
    }

    #[tokio::test]
    async fn dial_reports_refused_connections_as_io() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let port = listener.local_addr().expect("local addr").port();
        drop(listener);

        let result = dial(&config("127.0.0.1", port)).await;
        assert!(matches!(result, Err(DialError::Io { .. })));
    }
}
