//! One chat session: the name handshake followed by the two concurrent
//! message loops.
//!
//! The send and receive loops run in parallel over the same [`Connection`]
//! and are joined with barrier semantics: the session only moves on once
//! BOTH have finished. Whichever loop finishes first raises a session-scoped
//! cancel signal; the other loop observes it at its next suspension point
//! rather than being torn down mid-write. The connection is closed exactly
//! once after the join.

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::select;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::connection::Connection;
use crate::interrupt::InterruptWatch;
use crate::message::{InvalidMessage, Message, LINE_ENDINGS};
use crate::screen;

/// Literal token that ends the send loop without being transmitted.
const QUIT_COMMAND: &str = "quit";

/// Why a send or receive loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopEnd {
    /// End of local input, a local interrupt, or the other loop's cancel
    /// signal.
    NormalEnd,
    /// The user typed the quit command.
    UserQuit,
    /// The peer closed its side of the socket cleanly.
    PeerClosed,
    /// The socket or the local terminal failed mid-session.
    IoError,
}

/// Per-line outcome of the receive path. Only `Delivered` lines reach the
/// display; dropping is an explicit policy, not a swallowed error.
#[derive(Debug, PartialEq, Eq)]
pub enum Inbound {
    Delivered(Message),
    Dropped(InvalidMessage),
}

pub fn classify_line(raw: &str) -> Inbound {
    match Message::decode(raw) {
        Ok(message) => Inbound::Delivered(message),
        Err(reason) => Inbound::Dropped(reason),
    }
}

/// How the session ended, as seen by each loop.
#[derive(Debug)]
pub struct SessionOutcome {
    pub peer_name: String,
    pub send_end: LoopEnd,
    pub recv_end: LoopEnd,
}

/// Runs one complete session over an established socket: handshake, both
/// loops to completion, then close.
pub async fn run<I, O>(
    stream: TcpStream,
    local_name: &str,
    input: &mut I,
    out: &mut O,
    mut interrupt: InterruptWatch,
) -> Result<SessionOutcome>
where
    I: AsyncBufRead + Unpin,
    O: AsyncWrite + Unpin,
{
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);

    let peer_name = exchange_names(&mut reader, &mut writer, local_name).await;
    let connection = Connection::new(peer_name, reader, writer);

    if connection.peer_name().is_empty() {
        screen::banner(&mut *out, "connection established").await?;
    } else {
        let text = format!("connection established with {}", connection.peer_name());
        screen::banner(&mut *out, &text).await?;
    }
    screen::print_line(&mut *out, "Type `quit` to exit").await?;

    let (cancel_tx, mut recv_cancel) = watch::channel(false);
    let mut send_cancel = cancel_tx.subscribe();

    let send_task = async {
        let end = send_loop(
            &connection,
            &mut *input,
            local_name,
            &mut send_cancel,
            &mut interrupt,
        )
        .await;
        let _ = cancel_tx.send(true);
        end
    };
    let recv_task = async {
        let end = recv_loop(&connection, &mut *out, &mut recv_cancel).await;
        let _ = cancel_tx.send(true);
        end
    };

    // Wait for both, never just the first.
    let (send_end, recv_end) = tokio::join!(send_task, recv_task);

    if let Err(error) = connection.close().await {
        debug!(?error, "error while closing connection");
    }
    screen::banner(&mut *out, "connection closed").await?;

    Ok(SessionOutcome {
        peer_name: connection.peer_name().to_string(),
        send_end,
        recv_end,
    })
}

/// Mutual name exchange: the local name goes out while the peer's first
/// line is read, concurrently; neither direction waits on the other.
///
/// A failed or empty read degrades to an unknown peer name instead of
/// aborting, so a transient peer hiccup never kills the handshake. A failed
/// write is likewise only logged; the session's loops will surface the
/// broken socket immediately afterwards.
pub async fn exchange_names(
    reader: &mut BufReader<OwnedReadHalf>,
    writer: &mut OwnedWriteHalf,
    local_name: &str,
) -> String {
    let send = async {
        let mut line = local_name.as_bytes().to_vec();
        line.push(b'\n');
        let sent = async {
            writer.write_all(&line).await?;
            writer.flush().await
        };
        match sent.await {
            Ok(()) => debug!(name = local_name, "sent local name to peer"),
            Err(error) => warn!(?error, "failed to send local name"),
        }
    };

    let receive = async {
        let mut line = String::new();
        match reader.read_line(&mut line).await {
            Ok(0) => {
                warn!("peer closed before sending a name");
                String::new()
            }
            Ok(_) => line.trim_end_matches(LINE_ENDINGS).to_string(),
            Err(error) => {
                warn!(?error, "failed to read peer name");
                String::new()
            }
        }
    };

    let ((), peer_name) = tokio::join!(send, receive);
    debug!(peer = %peer_name, "name exchange finished");
    peer_name
}

/// Reads local lines and forwards them to the peer until the user quits,
/// input ends, an interrupt arrives, or the cancel signal fires.
///
/// The cancel and interrupt signals are observed between lines; `read_line`
/// is not cancel-safe, so a line still being typed when one of them wins
/// the race is discarded rather than carried over to the prompt that
/// follows the session.
pub async fn send_loop<R>(
    connection: &Connection,
    input: &mut R,
    sender: &str,
    cancel: &mut watch::Receiver<bool>,
    interrupt: &mut InterruptWatch,
) -> LoopEnd
where
    R: AsyncBufRead + Unpin,
{
    let mut line = String::new();
    loop {
        line.clear();
        select! {
            bytes = input.read_line(&mut line) => match bytes {
                Ok(0) => return LoopEnd::NormalEnd,
                Ok(_) => {
                    let text = line.trim_end_matches(LINE_ENDINGS);
                    if text == QUIT_COMMAND {
                        return LoopEnd::UserQuit;
                    }
                    if text.trim().is_empty() {
                        continue;
                    }
                    let message = match Message::new(sender, text) {
                        Ok(message) => message,
                        Err(error) => {
                            debug!(?error, "skipping unsendable line");
                            continue;
                        }
                    };
                    if let Err(error) = connection.send(&message).await {
                        debug!(?error, "failed to send message to peer");
                        return LoopEnd::IoError;
                    }
                }
                Err(error) => {
                    debug!(?error, "local input failed");
                    return LoopEnd::IoError;
                }
            },
            _ = cancel.changed() => return LoopEnd::NormalEnd,
            _ = interrupt.recv() => return LoopEnd::NormalEnd,
        }
    }
}

/// Consumes peer lines until end-of-stream, a socket error, or the cancel
/// signal. Malformed lines are logged and dropped; they never reach the
/// display and never stop the loop.
pub async fn recv_loop<W>(
    connection: &Connection,
    out: &mut W,
    cancel: &mut watch::Receiver<bool>,
) -> LoopEnd
where
    W: AsyncWrite + Unpin,
{
    loop {
        select! {
            line = connection.next_line() => match line {
                Ok(Some(raw)) => match classify_line(&raw) {
                    Inbound::Delivered(message) => {
                        if let Err(error) = screen::show_message(&mut *out, &message).await {
                            debug!(?error, "failed to display message");
                            return LoopEnd::IoError;
                        }
                    }
                    Inbound::Dropped(reason) => {
                        debug!(%reason, %raw, "dropped malformed line");
                    }
                },
                Ok(None) => return LoopEnd::PeerClosed,
                Err(error) => {
                    debug!(?error, "connection read failed");
                    return LoopEnd::IoError;
                }
            },
            _ = cancel.changed() => return LoopEnd::NormalEnd,
        }
    }
}
