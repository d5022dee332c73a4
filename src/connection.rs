use std::io;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::Mutex;

use crate::message::{Message, LINE_ENDINGS};

/// One live duplex channel to the peer, with line framing in both directions.
///
/// The two halves of the socket sit behind separate async mutexes so that
/// exactly one reader and one writer can drive their own direction in
/// parallel without ever contending with each other. `close` is idempotent
/// and safe to call from any task; once it has run, every further read or
/// write fails with a connection-closed error.
pub struct Connection {
    peer_name: String,
    reader: Mutex<BufReader<OwnedReadHalf>>,
    writer: Mutex<OwnedWriteHalf>,
    closed: AtomicBool,
}

impl Connection {
    pub fn new(
        peer_name: String,
        reader: BufReader<OwnedReadHalf>,
        writer: OwnedWriteHalf,
    ) -> Self {
        Self {
            peer_name,
            reader: Mutex::new(reader),
            writer: Mutex::new(writer),
            closed: AtomicBool::new(false),
        }
    }

    /// Display name the peer announced during the handshake. Empty when the
    /// handshake read failed or the peer closed before sending one.
    pub fn peer_name(&self) -> &str {
        &self.peer_name
    }

    /// Reads the next newline-terminated line from the peer.
    ///
    /// Returns `Ok(None)` when the peer closed its side cleanly, so callers
    /// can tell a graceful end-of-stream from a socket error.
    pub async fn next_line(&self) -> io::Result<Option<String>> {
        if self.is_closed() {
            return Err(closed_error());
        }

        let mut reader = self.reader.lock().await;
        let mut line = String::new();
        let bytes = reader.read_line(&mut line).await?;
        if bytes == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(LINE_ENDINGS).to_string()))
    }

    /// Encodes `message` and writes it as one line, flushing immediately so
    /// buffering never delays delivery.
    pub async fn send(&self, message: &Message) -> io::Result<()> {
        if self.is_closed() {
            return Err(closed_error());
        }

        let mut writer = self.writer.lock().await;
        let mut encoded = message.encode().into_bytes();
        encoded.push(b'\n');
        writer.write_all(&encoded).await?;
        writer.flush().await
    }

    /// Shuts the connection down. The first call shuts the write half down,
    /// signalling end-of-stream to the peer; repeat calls are no-ops.
    pub async fn close(&self) -> io::Result<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        let mut writer = self.writer.lock().await;
        writer.shutdown().await
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

fn closed_error() -> io::Error {
    io::Error::new(io::ErrorKind::NotConnected, "connection is closed")
}

#[cfg(test)]
mod tests {
    use tokio::io::AsyncWriteExt;
    use tokio::net::{TcpListener, TcpStream};

    use super::*;

    async fn connection_pair() -> (Connection, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let connect = TcpStream::connect(addr);
        let accept = listener.accept();
        let (local, remote) = tokio::join!(connect, accept);
        let (reader, writer) = local.expect("connect").into_split();
        let connection = Connection::new("bob".to_string(), BufReader::new(reader), writer);
        (connection, remote.expect("accept").0)
    }

    #[tokio::test]
    async fn lines_arrive_in_order_and_end_gracefully() {
        let (connection, mut remote) = connection_pair().await;
        remote
            .write_all(b"bob,first\nbob,second\n")
            .await
            .expect("write");
        remote.shutdown().await.expect("shutdown");

        assert_eq!(
            connection.next_line().await.expect("read"),
            Some("bob,first".to_string())
        );
        assert_eq!(
            connection.next_line().await.expect("read"),
            Some("bob,second".to_string())
        );
        assert_eq!(connection.next_line().await.expect("read"), None);
    }

    #[tokio::test]
    async fn send_writes_one_encoded_line() {
        let (connection, remote) = connection_pair().await;
        let message = Message::new("alice", "hi there").expect("valid message");
        connection.send(&message).await.expect("send");

        let mut remote = BufReader::new(remote);
        let mut line = String::new();
        remote.read_line(&mut line).await.expect("read");
        assert_eq!(line, "alice,hi there\n");
    }

    #[tokio::test]
    async fn close_is_idempotent() {
        let (connection, _remote) = connection_pair().await;
        connection.close().await.expect("first close");
        connection.close().await.expect("second close");
        assert!(connection.is_closed());
    }

    #[tokio::test]
    async fn reads_and_writes_fail_after_close() {
        let (connection, _remote) = connection_pair().await;
        connection.close().await.expect("close");

        let read = connection.next_line().await;
        assert_eq!(read.unwrap_err().kind(), io::ErrorKind::NotConnected);

        let message = Message::new("alice", "late").expect("valid message");
        let write = connection.send(&message).await;
        assert_eq!(write.unwrap_err().kind(), io::ErrorKind::NotConnected);
    }
}
